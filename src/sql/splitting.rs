//! Statement splitting
//!
//!     The lexer emits statement separators as ordinary tokens; splitting is
//!     a separate sweep over the flat sequence. A separator only counts at
//!     parenthesis depth zero (quoted text is already folded into single
//!     tokens by the lexer, so only brackets need tracking), and it stays
//!     attached to the statement it terminates. Text after the last
//!     separator, even pure whitespace, forms a final statement so that no
//!     input is ever dropped.

use crate::sql::lexing::dialects::DialectTable;
use crate::sql::token::TokenType;
use crate::sql::token::tree::normalize_keyword;

pub(crate) fn split_tokens(
    tokens: Vec<(TokenType, String)>,
    table: &DialectTable,
) -> Vec<Vec<(TokenType, String)>> {
    let mut statements = Vec::new();
    let mut current: Vec<(TokenType, String)> = Vec::new();
    let mut depth = 0usize;

    for (ttype, value) in tokens {
        if ttype == TokenType::PUNCTUATION {
            match value.as_str() {
                "(" => depth += 1,
                ")" => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        let ends_statement = depth == 0
            && ((ttype == TokenType::PUNCTUATION && value == ";")
                || (ttype.is_a(TokenType::KEYWORD)
                    && table.is_batch_separator(&normalize_keyword(&value))));
        current.push((ttype, value));
        if ends_statement {
            statements.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        statements.push(current);
    }
    statements
}
