//! Test factories for building expected token sequences succinctly.
//!
//!     Lexer tests assert exact token sequences; these helpers keep those
//!     assertions short. Shared by the in-module unit tests and the
//!     integration suite under `tests/`.

use super::token::TokenType;

/// Canonical alias for flat token sequences used across tests.
pub type Tokens = Vec<(TokenType, String)>;

/// Make a single `(type, text)` token.
pub fn mk_token(ttype: TokenType, value: &str) -> (TokenType, String) {
    (ttype, value.to_string())
}

/// Make a token sequence from a list of `(type, text)` pairs.
pub fn mk_tokens(specs: &[(TokenType, &str)]) -> Tokens {
    specs.iter().map(|&(t, v)| mk_token(t, v)).collect()
}

/// Concatenate the text of a token sequence.
pub fn tokens_text(tokens: &[(TokenType, String)]) -> String {
    tokens.iter().map(|(_, v)| v.as_str()).collect()
}
