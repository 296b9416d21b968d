//! Operation and comparison folding.
//!
//!     `<operand> <operator> <operand>` spans fold pairwise, left to right,
//!     with no precedence climbing: `a + b * c` becomes `(a + b) * c` in
//!     tree shape. Comparison operators produce `Comparison` nodes, the rest
//!     `Operation` nodes. A `*` only acts as an operator when operands flank
//!     it; a bare projection wildcard stays a plain token.

use super::{next_significant, prev_significant};
use crate::sql::token::tree::{GroupKind, NodeId, Statement};
use crate::sql::token::TokenType;

enum OpClass {
    Arithmetic,
    Comparison,
}

fn operator_class(stmt: &Statement, id: NodeId) -> Option<OpClass> {
    match stmt.ttype_of(id) {
        Some(t) if t.is_a(TokenType::OPERATOR_COMPARISON) => Some(OpClass::Comparison),
        Some(t) if t == TokenType::OPERATOR || t == TokenType::WILDCARD => {
            Some(OpClass::Arithmetic)
        }
        _ => None,
    }
}

fn is_operand(stmt: &Statement, id: NodeId) -> bool {
    match stmt.group_kind_of(id) {
        Some(GroupKind::Identifier)
        | Some(GroupKind::Function)
        | Some(GroupKind::Parenthesis)
        | Some(GroupKind::Operation)
        | Some(GroupKind::Comparison) => true,
        Some(_) => false,
        None => stmt.ttype_of(id).is_some_and(|t| {
            t.is_a(TokenType::NUMBER)
                || t.is_a(TokenType::LITERAL)
                || t == TokenType::NAME
                || t == TokenType::NAME_BUILTIN
                || t == TokenType::NAME_PLACEHOLDER
        }),
    }
}

pub(super) fn fold_operations(stmt: &mut Statement, list: NodeId) {
    let mut i = 0;
    while i < stmt.children_of(list).len() {
        let child = stmt.children_of(list)[i];
        if let Some(class) = operator_class(stmt, child) {
            let prev = prev_significant(stmt, list, i);
            let next = next_significant(stmt, list, i + 1);
            if let (Some(p), Some(n)) = (prev, next) {
                let children = stmt.children_of(list);
                if is_operand(stmt, children[p]) && is_operand(stmt, children[n]) {
                    let kind = match class {
                        OpClass::Comparison => GroupKind::Comparison,
                        OpClass::Arithmetic => GroupKind::Operation,
                    };
                    stmt.group_span(list, p, n + 1, kind);
                    // the new node may be the left operand of what follows
                    i = p;
                }
            }
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use crate::sql::grouping::group;
    use crate::sql::lexing::tokenize;
    use crate::sql::token::{GroupKind, Statement};

    fn parse_one(sql: &str) -> Statement {
        let mut stmt = Statement::from_tokens(tokenize(sql, None).collect());
        group(&mut stmt);
        stmt
    }

    #[test]
    fn test_comparison() {
        let stmt = parse_one("a >= 1");
        let cmp = stmt.root().child(0).unwrap();
        assert_eq!(cmp.group_kind(), Some(GroupKind::Comparison));
        assert_eq!(cmp.value(), "a >= 1");
    }

    #[test]
    fn test_arithmetic_operation() {
        let stmt = parse_one("price * 0.9");
        let op = stmt.root().child(0).unwrap();
        assert_eq!(op.group_kind(), Some(GroupKind::Operation));
        assert_eq!(op.value(), "price * 0.9");
    }

    #[test]
    fn test_left_associative_pairwise_folding() {
        let stmt = parse_one("a + b * c");
        let outer = stmt.root().child(0).unwrap();
        assert_eq!(outer.group_kind(), Some(GroupKind::Operation));
        let inner = outer.child(0).unwrap();
        assert_eq!(inner.group_kind(), Some(GroupKind::Operation));
        assert_eq!(inner.value(), "a + b");
    }

    #[test]
    fn test_projection_wildcard_is_not_an_operation() {
        let stmt = parse_one("select * from t");
        assert!(stmt
            .root()
            .children()
            .all(|c| c.group_kind() != Some(GroupKind::Operation)));
    }

    #[test]
    fn test_like_is_a_comparison() {
        let stmt = parse_one("name LIKE 'a%'");
        let cmp = stmt.root().child(0).unwrap();
        assert_eq!(cmp.group_kind(), Some(GroupKind::Comparison));
        assert_eq!(cmp.value(), "name LIKE 'a%'");
    }

    #[test]
    fn test_dangling_operator_stays_flat() {
        let stmt = parse_one("a +");
        assert!(stmt
            .root()
            .children()
            .all(|c| c.group_kind() != Some(GroupKind::Operation)));
        assert_eq!(stmt.value(), "a +");
    }
}
