//! # sqlfold
//!
//! A tolerant SQL lexer and token-tree parser for formatting and linting
//! tools.
//!
//! sqlfold does not validate or execute SQL. It lexes text into typed tokens
//! and folds them into a structural token tree whose leaves reproduce the
//! input exactly, so tools can inspect and rewrite SQL without committing to
//! a full per-dialect grammar.
//!
//! ```rust,ignore
//! use sqlfold::parse;
//!
//! let statements = parse("select a, b from t where a = 1", None);
//! assert_eq!(statements[0].statement_type(), "SELECT");
//! ```

pub mod sql;

pub use sql::{parse, tokenize, tokenize_chars, GroupKind, Node, Statement, TokenType};
