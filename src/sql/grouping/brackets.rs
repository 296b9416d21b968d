//! Parenthesis matching, the first grouping pass.

use super::is_punctuation;
use crate::sql::token::tree::{GroupKind, NodeId, Statement};

/// Fold every balanced `( ... )` span under `list` into a `Parenthesis`
/// group, innermost pairs included via recursion. An unmatched bracket stays
/// where it is as a plain token.
pub(super) fn fold_parentheses(stmt: &mut Statement, list: NodeId) {
    fold_from(stmt, list, 0);
}

fn fold_from(stmt: &mut Statement, list: NodeId, start: usize) {
    let mut i = start;
    while i < stmt.children_of(list).len() {
        let child = stmt.children_of(list)[i];
        if is_punctuation(stmt, child, "(") {
            if let Some(close) = matching_close(stmt, list, i) {
                let paren = stmt.group_span(list, i, close + 1, GroupKind::Parenthesis);
                // the group's own delimiters sit at the edges; fold the pairs
                // nested between them
                fold_from(stmt, paren, 1);
            }
        }
        i += 1;
    }
}

/// Index of the `)` closing the `(` at `open`, tracking nesting depth.
fn matching_close(stmt: &Statement, list: NodeId, open: usize) -> Option<usize> {
    let children = stmt.children_of(list);
    let mut depth = 1usize;
    for (idx, &child) in children.iter().enumerate().skip(open + 1) {
        if is_punctuation(stmt, child, "(") {
            depth += 1;
        } else if is_punctuation(stmt, child, ")") {
            depth -= 1;
            if depth == 0 {
                return Some(idx);
            }
        }
    }
    None
}
