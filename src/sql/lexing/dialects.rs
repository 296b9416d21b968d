//! Dialect rule tables
//!
//!     A dialect is data, not code: an ordered list of lexical rules plus a
//!     keyword table and the words that separate batches. The scanner tries
//!     rules strictly in table order and the first accepted match wins, so
//!     ordering is load-bearing: comments before operators, multi-word
//!     keywords before the single-word rule, `:=` before `::` before
//!     placeholders.
//!
//!     Named dialects layer deltas over the base table (extra keyword sets, a
//!     different END-block alternation, batch separators) instead of
//!     re-specifying it. Tables are compiled once behind `Lazy` statics and
//!     shared read-only across all parse calls.
//!
//!     The regex crate has no lookarounds, so the places the original rule
//!     set would use them are expressed differently: whole-word matching is
//!     `\b` inside the pattern, and the two context conditions live on the
//!     rule as scanner guards (`signed_prefix` for `-1` vs subtraction,
//!     `not_after_word` for placeholders).

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::sql::token::TokenType;

/// What to emit when a rule matches.
#[derive(Debug)]
pub(crate) enum RuleAction {
    /// Emit the matched text with this fixed type.
    Emit(TokenType),
    /// Look the matched word up in the dialect keyword table; emit `Name`
    /// when it is not a keyword.
    ClassifyWord,
}

/// One lexical rule: an anchored pattern plus its action and scanner guards.
#[derive(Debug)]
pub(crate) struct LexRule {
    pub(crate) re: Regex,
    pub(crate) action: RuleAction,
    /// A match starting with `-` is only accepted in prefix position.
    pub(crate) signed_prefix: bool,
    /// The match is only accepted when the preceding character is not a word
    /// character (placeholders like `:name` must not fire inside `a:b`... of
    /// an identifier-adjacent context).
    pub(crate) not_after_word: bool,
}

/// A compiled dialect: ordered rules, keyword table, batch separators.
#[derive(Debug)]
pub(crate) struct DialectTable {
    pub(crate) rules: Vec<LexRule>,
    keywords: HashMap<&'static str, TokenType>,
    batch_separators: &'static [&'static str],
}

impl DialectTable {
    /// Keyword-vs-identifier disambiguation: exact, case-insensitive,
    /// whole-word lookup. Anything else is a plain `Name`.
    pub(crate) fn classify_word(&self, word: &str) -> TokenType {
        self.keywords
            .get(word.to_uppercase().as_str())
            .copied()
            .unwrap_or(TokenType::NAME)
    }

    /// True for dialect batch-separator words such as T-SQL `GO`.
    pub(crate) fn is_batch_separator(&self, word: &str) -> bool {
        self.batch_separators
            .iter()
            .any(|sep| sep.eq_ignore_ascii_case(word))
    }

    pub(crate) fn build(spec: &DialectSpec) -> Result<DialectTable, DialectError> {
        // (pattern, action, signed_prefix, not_after_word), in match order.
        let end_block = format!(r"(?i)END(?:\s+(?:{}))?\b", spec.end_block_words);
        let defs: Vec<(String, RuleAction, bool, bool)> = vec![
            def(r"(?:--|# )[^\r\n]*(?:\r\n|\r|\n)?", TokenType::COMMENT_SINGLE),
            def(r"/\*(?s:.*?)\*/", TokenType::COMMENT_MULTILINE),
            def(r"\r\n|\r|\n", TokenType::NEWLINE),
            def(r"[ \t\x0B\f]+", TokenType::WHITESPACE),
            def(r":=", TokenType::ASSIGNMENT),
            def(r"::", TokenType::PUNCTUATION),
            def(r"\*", TokenType::WILDCARD),
            def(r"`(?:``|[^`])*`", TokenType::NAME),
            def(r"\?", TokenType::NAME_PLACEHOLDER),
            def(r"%s", TokenType::NAME_PLACEHOLDER),
            (
                r"[$:]\w+".to_string(),
                RuleAction::Emit(TokenType::NAME_PLACEHOLDER),
                false,
                true,
            ),
            def(r"(?:@@|@|##|#)[A-Za-z_]\w*", TokenType::NAME),
            def(r"\[[^\]\[]+\]", TokenType::NAME),
            def(
                r"(?i)(?:(?:LEFT|RIGHT|FULL)\s+)?(?:(?:INNER|OUTER|STRAIGHT|CROSS|NATURAL)\s+)?JOIN\b",
                TokenType::KEYWORD,
            ),
            (end_block, RuleAction::Emit(TokenType::KEYWORD), false, false),
            def(r"(?i)NOT\s+NULL\b", TokenType::KEYWORD),
            def(r"(?i)NULLS\s+(?:FIRST|LAST)\b", TokenType::KEYWORD),
            def(r"(?i)UNION\s+ALL\b", TokenType::KEYWORD),
            def(r"(?i)CREATE(?:\s+OR\s+REPLACE)?\b", TokenType::KEYWORD_DDL),
            def(r"(?i)DOUBLE\s+PRECISION\b", TokenType::NAME_BUILTIN),
            def(r"(?i)GROUP\s+BY\b", TokenType::KEYWORD),
            def(r"(?i)ORDER\s+BY\b", TokenType::KEYWORD),
            def(r"(?i)PARTITION\s+BY\b", TokenType::KEYWORD),
            def(
                r"(?i)(?:NOT\s+)?(?:LIKE|ILIKE|RLIKE|REGEXP)\b",
                TokenType::OPERATOR_COMPARISON,
            ),
            signed(r"-?0[xX][0-9a-fA-F]+", TokenType::NUMBER_HEXADECIMAL),
            signed(r"-?\d+(?:\.\d+)?[eE][-+]?\d+", TokenType::NUMBER_FLOAT),
            signed(r"-?(?:\d+\.\d+|\d+\.|\.\d+)", TokenType::NUMBER_FLOAT),
            signed(r"-?\d+", TokenType::NUMBER_INTEGER),
            def(r"(?s)'(?:''|\\.|[^'\\])*'", TokenType::STRING_SINGLE),
            def(r#"(?s)"(?:""|\\.|[^"\\])*""#, TokenType::STRING_SYMBOL),
            (
                r"[A-Za-z_][\w$]*".to_string(),
                RuleAction::ClassifyWord,
                false,
                false,
            ),
            def(r"[;:()\[\],.]", TokenType::PUNCTUATION),
            def(r"[<>=~!]+", TokenType::OPERATOR_COMPARISON),
            def(r"[+/@#%^&|-]+", TokenType::OPERATOR),
        ];

        let mut rules = Vec::with_capacity(defs.len());
        for (pattern, action, signed_prefix, not_after_word) in defs {
            let anchored = format!("^(?:{})", pattern);
            let re = Regex::new(&anchored).map_err(|err| DialectError::InvalidRule {
                pattern,
                message: err.to_string(),
            })?;
            rules.push(LexRule {
                re,
                action,
                signed_prefix,
                not_after_word,
            });
        }

        let mut keywords = HashMap::new();
        for set in &spec.keyword_sets {
            keywords.extend(set.iter().copied());
        }

        Ok(DialectTable {
            rules,
            keywords,
            batch_separators: spec.batch_separators,
        })
    }
}

fn def(pattern: &str, ttype: TokenType) -> (String, RuleAction, bool, bool) {
    (pattern.to_string(), RuleAction::Emit(ttype), false, false)
}

fn signed(pattern: &str, ttype: TokenType) -> (String, RuleAction, bool, bool) {
    (pattern.to_string(), RuleAction::Emit(ttype), true, false)
}

/// The raw ingredients of a dialect, before compilation. Variants start from
/// [DialectSpec::base] and layer their differences on top.
pub(crate) struct DialectSpec {
    keyword_sets: Vec<&'static [(&'static str, TokenType)]>,
    end_block_words: &'static str,
    batch_separators: &'static [&'static str],
}

impl DialectSpec {
    pub(crate) fn base() -> Self {
        DialectSpec {
            keyword_sets: vec![KEYWORDS_COMMON],
            end_block_words: "IF|LOOP",
            batch_separators: &[],
        }
    }

    /// The T-SQL-like procedural variant: extra keywords, `GO` batches,
    /// more END-block forms.
    pub(crate) fn transact_sql() -> Self {
        let mut spec = DialectSpec::base();
        spec.keyword_sets.push(KEYWORDS_TRANSACT);
        spec.end_block_words = "IF|LOOP|WHILE|TRY|CATCH";
        spec.batch_separators = &["GO"];
        spec
    }
}

const KEYWORDS_COMMON: &[(&str, TokenType)] = &[
    ("SELECT", TokenType::KEYWORD_DML),
    ("INSERT", TokenType::KEYWORD_DML),
    ("UPDATE", TokenType::KEYWORD_DML),
    ("DELETE", TokenType::KEYWORD_DML),
    ("MERGE", TokenType::KEYWORD_DML),
    ("REPLACE", TokenType::KEYWORD_DML),
    ("DROP", TokenType::KEYWORD_DDL),
    ("ALTER", TokenType::KEYWORD_DDL),
    ("TRUNCATE", TokenType::KEYWORD_DDL),
    ("GRANT", TokenType::KEYWORD_DCL),
    ("REVOKE", TokenType::KEYWORD_DCL),
    ("WITH", TokenType::KEYWORD_CTE),
    ("FROM", TokenType::KEYWORD),
    ("WHERE", TokenType::KEYWORD),
    ("GROUP", TokenType::KEYWORD),
    ("ORDER", TokenType::KEYWORD),
    ("BY", TokenType::KEYWORD),
    ("HAVING", TokenType::KEYWORD),
    ("LIMIT", TokenType::KEYWORD),
    ("OFFSET", TokenType::KEYWORD),
    ("AS", TokenType::KEYWORD),
    ("CASE", TokenType::KEYWORD),
    ("WHEN", TokenType::KEYWORD),
    ("THEN", TokenType::KEYWORD),
    ("ELSE", TokenType::KEYWORD),
    ("END", TokenType::KEYWORD),
    ("IF", TokenType::KEYWORD),
    ("NULL", TokenType::KEYWORD),
    ("NOT", TokenType::KEYWORD),
    ("AND", TokenType::KEYWORD),
    ("OR", TokenType::KEYWORD),
    ("IN", TokenType::KEYWORD),
    ("IS", TokenType::KEYWORD),
    ("BETWEEN", TokenType::KEYWORD),
    ("EXISTS", TokenType::KEYWORD),
    ("DISTINCT", TokenType::KEYWORD),
    ("ALL", TokenType::KEYWORD),
    ("ANY", TokenType::KEYWORD),
    ("SOME", TokenType::KEYWORD),
    ("UNION", TokenType::KEYWORD),
    ("INTERSECT", TokenType::KEYWORD),
    ("EXCEPT", TokenType::KEYWORD),
    ("MINUS", TokenType::KEYWORD),
    ("JOIN", TokenType::KEYWORD),
    ("INNER", TokenType::KEYWORD),
    ("OUTER", TokenType::KEYWORD),
    ("LEFT", TokenType::KEYWORD),
    ("RIGHT", TokenType::KEYWORD),
    ("FULL", TokenType::KEYWORD),
    ("CROSS", TokenType::KEYWORD),
    ("NATURAL", TokenType::KEYWORD),
    ("STRAIGHT", TokenType::KEYWORD),
    ("ON", TokenType::KEYWORD),
    ("USING", TokenType::KEYWORD),
    ("VALUES", TokenType::KEYWORD),
    ("INTO", TokenType::KEYWORD),
    ("SET", TokenType::KEYWORD),
    ("ASC", TokenType::KEYWORD),
    ("DESC", TokenType::KEYWORD),
    ("LOOP", TokenType::KEYWORD),
    ("WHILE", TokenType::KEYWORD),
    ("BEGIN", TokenType::KEYWORD),
    ("COMMIT", TokenType::KEYWORD),
    ("ROLLBACK", TokenType::KEYWORD),
    ("TABLE", TokenType::KEYWORD),
    ("VIEW", TokenType::KEYWORD),
    ("INDEX", TokenType::KEYWORD),
    ("PRIMARY", TokenType::KEYWORD),
    ("FOREIGN", TokenType::KEYWORD),
    ("KEY", TokenType::KEYWORD),
    ("REFERENCES", TokenType::KEYWORD),
    ("DEFAULT", TokenType::KEYWORD),
    ("CONSTRAINT", TokenType::KEYWORD),
    ("UNIQUE", TokenType::KEYWORD),
    ("RETURNING", TokenType::KEYWORD),
    ("WINDOW", TokenType::KEYWORD),
    ("OVER", TokenType::KEYWORD),
    ("PARTITION", TokenType::KEYWORD),
    ("INT", TokenType::NAME_BUILTIN),
    ("INTEGER", TokenType::NAME_BUILTIN),
    ("BIGINT", TokenType::NAME_BUILTIN),
    ("SMALLINT", TokenType::NAME_BUILTIN),
    ("TINYINT", TokenType::NAME_BUILTIN),
    ("VARCHAR", TokenType::NAME_BUILTIN),
    ("NVARCHAR", TokenType::NAME_BUILTIN),
    ("CHAR", TokenType::NAME_BUILTIN),
    ("TEXT", TokenType::NAME_BUILTIN),
    ("DATE", TokenType::NAME_BUILTIN),
    ("DATETIME", TokenType::NAME_BUILTIN),
    ("TIMESTAMP", TokenType::NAME_BUILTIN),
    ("TIME", TokenType::NAME_BUILTIN),
    ("BOOLEAN", TokenType::NAME_BUILTIN),
    ("BOOL", TokenType::NAME_BUILTIN),
    ("FLOAT", TokenType::NAME_BUILTIN),
    ("REAL", TokenType::NAME_BUILTIN),
    ("DECIMAL", TokenType::NAME_BUILTIN),
    ("NUMERIC", TokenType::NAME_BUILTIN),
    ("SERIAL", TokenType::NAME_BUILTIN),
    ("UUID", TokenType::NAME_BUILTIN),
    ("JSON", TokenType::NAME_BUILTIN),
    ("BLOB", TokenType::NAME_BUILTIN),
];

const KEYWORDS_TRANSACT: &[(&str, TokenType)] = &[
    ("DECLARE", TokenType::KEYWORD),
    ("EXEC", TokenType::KEYWORD),
    ("EXECUTE", TokenType::KEYWORD),
    ("PRINT", TokenType::KEYWORD),
    ("RAISERROR", TokenType::KEYWORD),
    ("PROC", TokenType::KEYWORD),
    ("PROCEDURE", TokenType::KEYWORD),
    ("TRY", TokenType::KEYWORD),
    ("CATCH", TokenType::KEYWORD),
    ("NOCOUNT", TokenType::KEYWORD),
    ("IDENTITY", TokenType::KEYWORD),
    ("TOP", TokenType::KEYWORD),
    ("BREAK", TokenType::KEYWORD),
    ("CONTINUE", TokenType::KEYWORD),
    ("RETURN", TokenType::KEYWORD),
    ("GO", TokenType::KEYWORD),
];

/// Configuration failure while compiling a dialect table. The only fatal
/// error in the crate; it surfaces before any input is processed.
#[derive(Debug, Clone, PartialEq)]
pub enum DialectError {
    InvalidRule { pattern: String, message: String },
}

impl fmt::Display for DialectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialectError::InvalidRule { pattern, message } => {
                write!(f, "invalid lexical rule {:?}: {}", pattern, message)
            }
        }
    }
}

impl std::error::Error for DialectError {}

static DEFAULT_TABLE: Lazy<DialectTable> = Lazy::new(|| {
    DialectTable::build(&DialectSpec::base())
        .unwrap_or_else(|err| panic!("default dialect table failed to compile: {err}"))
});

static TRANSACT_SQL_TABLE: Lazy<DialectTable> = Lazy::new(|| {
    DialectTable::build(&DialectSpec::transact_sql())
        .unwrap_or_else(|err| panic!("TransactSQL dialect table failed to compile: {err}"))
});

/// Resolve a dialect by name. Unknown names fall back to the default table;
/// the name is an opaque caller-chosen string, not a closed enum.
pub(crate) fn table_for(name: Option<&str>) -> &'static DialectTable {
    match name {
        Some(n) if n.eq_ignore_ascii_case("transactsql") || n.eq_ignore_ascii_case("tsql") => {
            &TRANSACT_SQL_TABLE
        }
        _ => &DEFAULT_TABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_tables_compile() {
        assert!(DialectTable::build(&DialectSpec::base()).is_ok());
        assert!(DialectTable::build(&DialectSpec::transact_sql()).is_ok());
    }

    #[test]
    fn test_malformed_spec_is_a_setup_error() {
        let mut spec = DialectSpec::base();
        spec.end_block_words = "IF|(";
        let err = DialectTable::build(&spec).unwrap_err();
        match err {
            DialectError::InvalidRule { ref pattern, .. } => {
                assert!(pattern.contains("IF|("));
            }
        }
        assert!(err.to_string().contains("invalid lexical rule"));
    }

    #[test]
    fn test_classify_word_is_case_insensitive() {
        let table = table_for(None);
        assert_eq!(table.classify_word("select"), TokenType::KEYWORD_DML);
        assert_eq!(table.classify_word("SeLeCt"), TokenType::KEYWORD_DML);
        assert_eq!(table.classify_word("drop"), TokenType::KEYWORD_DDL);
        assert_eq!(table.classify_word("with"), TokenType::KEYWORD_CTE);
        assert_eq!(table.classify_word("varchar"), TokenType::NAME_BUILTIN);
        assert_eq!(table.classify_word("enddate"), TokenType::NAME);
        assert_eq!(table.classify_word("join_col"), TokenType::NAME);
    }

    #[test]
    fn test_transact_sql_layers_over_base() {
        let base = table_for(None);
        let tsql = table_for(Some("TransactSQL"));
        // base classifications survive in the variant
        assert_eq!(tsql.classify_word("select"), TokenType::KEYWORD_DML);
        // the variant adds its own
        assert_eq!(tsql.classify_word("declare"), TokenType::KEYWORD);
        assert_eq!(base.classify_word("declare"), TokenType::NAME);
        // batch separators only exist in the variant
        assert!(tsql.is_batch_separator("go"));
        assert!(!base.is_batch_separator("go"));
    }

    #[test]
    fn test_unknown_dialect_falls_back_to_default() {
        let unknown = table_for(Some("no-such-dialect"));
        assert!(std::ptr::eq(unknown, table_for(None)));
    }
}
