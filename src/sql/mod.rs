//! SQL lexing and structural grouping.
//!
//!     The pipeline has two stages. The [lexer](lexing) turns text into a flat
//!     sequence of typed tokens using an ordered, dialect-parameterized rule
//!     table. The [grouping engine](grouping) then folds that sequence into a
//!     nested token tree: statements containing identifiers, identifier
//!     lists, function calls, parenthesized groups, CASE expressions, WHERE
//!     clauses, operations and comparisons.
//!
//!     Nothing here validates or executes SQL. The parser is tolerant:
//!     malformed text still comes back as a tree, with unmatched spans left
//!     flat and unlexable characters marked as `Error` tokens.
//!     What it does guarantee is exact round-trip: the leaves of every
//!     returned tree concatenate back to the input, byte for byte.

pub mod grouping;
pub mod lexing;
mod splitting;
pub mod testing;
pub mod token;

pub use lexing::{tokenize, tokenize_chars, DialectError, Tokenizer};
pub use token::{Children, Flatten, GroupKind, Node, Statement, TokenType};

/// Parse SQL text into grouped [Statement] trees: lex, split the flat token
/// sequence at top-level statement separators, and run the grouping pipeline
/// over each statement.
///
/// `dialect` is an opaque caller-chosen name (`"TransactSQL"` selects the
/// T-SQL-like variant); unknown names fall back to the default dialect.
/// Infallible: any input, however malformed, yields one tree per statement.
pub fn parse(sql: &str, dialect: Option<&str>) -> Vec<Statement> {
    let table = lexing::dialects::table_for(dialect);
    let tokens: Vec<(TokenType, String)> = tokenize(sql, dialect).collect();
    splitting::split_tokens(tokens, table)
        .into_iter()
        .map(|statement_tokens| {
            let mut stmt = Statement::from_tokens(statement_tokens);
            grouping::group(&mut stmt);
            stmt
        })
        .collect()
}
