//! Token type taxonomy
//!
//!     Lexical classifications form a hierarchy: `Keyword.DML` is a kind of
//!     `Keyword`, `Whitespace.Newline` is a kind of `Whitespace`. Instead of a
//!     deep enum-of-enums, a token type is an immutable path of segments and
//!     "is-a" is a prefix check on those segments. The full taxonomy is a fixed
//!     set of constants; nothing constructs new types at parse time.
//!
//!     Composite tree nodes (identifiers, functions, WHERE clauses, ...) are
//!     not part of this taxonomy. They are classified by
//!     [GroupKind](crate::sql::token::tree::GroupKind); a composite node has no
//!     token type at all.

use std::fmt;

use serde::{Serialize, Serializer};

/// A lexical token classification: an immutable path in the type hierarchy.
///
/// Values are compared with [TokenType::is_a] rather than equality wherever a
/// whole subtree of types is acceptable, e.g. `t.is_a(TokenType::KEYWORD)`
/// accepts `Keyword`, `Keyword.DML` and `Keyword.DDL` alike.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenType {
    segments: &'static [&'static str],
}

impl TokenType {
    pub const COMMENT: TokenType = TokenType::new(&["Comment"]);
    pub const COMMENT_SINGLE: TokenType = TokenType::new(&["Comment", "Single"]);
    pub const COMMENT_MULTILINE: TokenType = TokenType::new(&["Comment", "Multiline"]);

    pub const WHITESPACE: TokenType = TokenType::new(&["Whitespace"]);
    pub const NEWLINE: TokenType = TokenType::new(&["Whitespace", "Newline"]);

    pub const KEYWORD: TokenType = TokenType::new(&["Keyword"]);
    pub const KEYWORD_DML: TokenType = TokenType::new(&["Keyword", "DML"]);
    pub const KEYWORD_DDL: TokenType = TokenType::new(&["Keyword", "DDL"]);
    pub const KEYWORD_DCL: TokenType = TokenType::new(&["Keyword", "DCL"]);
    pub const KEYWORD_CTE: TokenType = TokenType::new(&["Keyword", "CTE"]);

    pub const NAME: TokenType = TokenType::new(&["Name"]);
    pub const NAME_PLACEHOLDER: TokenType = TokenType::new(&["Name", "Placeholder"]);
    pub const NAME_BUILTIN: TokenType = TokenType::new(&["Name", "Builtin"]);

    pub const LITERAL: TokenType = TokenType::new(&["Literal"]);
    pub const STRING_SINGLE: TokenType = TokenType::new(&["Literal", "String", "Single"]);
    pub const STRING_SYMBOL: TokenType = TokenType::new(&["Literal", "String", "Symbol"]);

    pub const NUMBER: TokenType = TokenType::new(&["Number"]);
    pub const NUMBER_INTEGER: TokenType = TokenType::new(&["Number", "Integer"]);
    pub const NUMBER_FLOAT: TokenType = TokenType::new(&["Number", "Float"]);
    pub const NUMBER_HEXADECIMAL: TokenType = TokenType::new(&["Number", "Hexadecimal"]);

    pub const OPERATOR: TokenType = TokenType::new(&["Operator"]);
    pub const OPERATOR_COMPARISON: TokenType = TokenType::new(&["Operator", "Comparison"]);
    pub const ASSIGNMENT: TokenType = TokenType::new(&["Assignment"]);
    pub const WILDCARD: TokenType = TokenType::new(&["Wildcard"]);
    pub const PUNCTUATION: TokenType = TokenType::new(&["Punctuation"]);

    pub const ERROR: TokenType = TokenType::new(&["Error"]);

    const fn new(segments: &'static [&'static str]) -> Self {
        TokenType { segments }
    }

    /// True iff `self` equals `ancestor` or lies below it in the hierarchy.
    ///
    /// Defined as a prefix match on path segments, so `Number.Integer` is a
    /// `Number` but `Name.Placeholder` is not a `Name.Builtin`. Total and
    /// side-effect free.
    pub fn is_a(self, ancestor: TokenType) -> bool {
        self.segments.len() >= ancestor.segments.len()
            && self.segments[..ancestor.segments.len()] == *ancestor.segments
    }

    /// The dotted path name, e.g. `"Keyword.DML"`.
    pub fn name(self) -> String {
        self.segments.join(".")
    }

    /// Whitespace and comments: the tokens traversal helpers skip over.
    pub fn is_insignificant(self) -> bool {
        self.is_a(TokenType::WHITESPACE) || self.is_a(TokenType::COMMENT)
    }
}

impl fmt::Debug for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for TokenType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_a_reflexive() {
        assert!(TokenType::KEYWORD.is_a(TokenType::KEYWORD));
        assert!(TokenType::NUMBER_FLOAT.is_a(TokenType::NUMBER_FLOAT));
    }

    #[test]
    fn test_is_a_descends() {
        assert!(TokenType::KEYWORD_DML.is_a(TokenType::KEYWORD));
        assert!(TokenType::NEWLINE.is_a(TokenType::WHITESPACE));
        assert!(TokenType::STRING_SINGLE.is_a(TokenType::LITERAL));
        assert!(!TokenType::KEYWORD.is_a(TokenType::KEYWORD_DML));
        assert!(!TokenType::NAME.is_a(TokenType::KEYWORD));
    }

    #[test]
    fn test_is_a_segment_boundaries() {
        // Sibling branches never match, even with a shared parent
        assert!(!TokenType::NAME_PLACEHOLDER.is_a(TokenType::NAME_BUILTIN));
        assert!(!TokenType::OPERATOR_COMPARISON.is_a(TokenType::PUNCTUATION));
    }

    #[test]
    fn test_name() {
        assert_eq!(TokenType::KEYWORD_DML.name(), "Keyword.DML");
        assert_eq!(TokenType::ERROR.name(), "Error");
        assert_eq!(
            TokenType::STRING_SINGLE.name(),
            "Literal.String.Single"
        );
    }

    #[test]
    fn test_insignificant() {
        assert!(TokenType::WHITESPACE.is_insignificant());
        assert!(TokenType::NEWLINE.is_insignificant());
        assert!(TokenType::COMMENT_SINGLE.is_insignificant());
        assert!(!TokenType::NAME.is_insignificant());
    }
}
