//! Token types and the token tree shared across the lexer, grouping engine,
//! and downstream tooling.

pub mod tree;
pub mod types;

pub use tree::{Children, Flatten, GroupKind, Node, Statement};
pub use types::TokenType;
