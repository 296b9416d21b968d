//! Function-call folding: an identifier adjacent to a parenthesis group.

use super::prev_significant;
use crate::sql::token::tree::{GroupKind, NodeId, Statement};

/// Fold `name ( ... )` into a `Function` group. The name may be qualified
/// (`schema.fn(...)`); adjacency skips whitespace and comments.
pub(super) fn fold_functions(stmt: &mut Statement, list: NodeId) {
    let mut i = 0;
    while i < stmt.children_of(list).len() {
        let child = stmt.children_of(list)[i];
        if stmt.group_kind_of(child) == Some(GroupKind::Parenthesis) {
            if let Some(p) = prev_significant(stmt, list, i) {
                let name = stmt.children_of(list)[p];
                if stmt.group_kind_of(name) == Some(GroupKind::Identifier) {
                    stmt.group_span(list, p, i + 1, GroupKind::Function);
                    i = p;
                }
            }
        }
        i += 1;
    }
}
