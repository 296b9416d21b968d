//! Grouping engine
//!
//!     Folds a flat statement into the final token tree. Grouping runs a
//!     fixed, ordered pipeline of passes, each sweeping a child list left to
//!     right and replacing a matched contiguous span with one composite node,
//!     then re-examining from the replacement so newly adjacent nodes can
//!     match again. Passes recurse into nested groups bottom-up, so the
//!     inside of a parenthesis is fully shaped before the list containing it.
//!
//!     The pass order is load-bearing: brackets first (everything else
//!     respects bracket nesting), then names, function calls, aliases,
//!     operations, comma lists, and finally the keyword-delimited WHERE and
//!     CASE spans. The statement root exists from construction, so there is
//!     no separate wrapping step.
//!
//!     Grouping is pattern rewriting, not grammar-driven parsing: malformed
//!     structure (an unbalanced bracket, a CASE without END, a dangling
//!     clause keyword) is never an error, the affected span simply stays
//!     flat. Nothing in this module can fail; every sweep only re-nests the
//!     nodes it was given.

mod brackets;
mod clauses;
mod functions;
mod identifiers;
mod operators;

use crate::sql::token::tree::{normalize_keyword, NodeId, Statement};
use crate::sql::token::TokenType;

/// Run the full grouping pipeline over one statement, in place.
pub fn group(stmt: &mut Statement) {
    let root = stmt.root_id();
    brackets::fold_parentheses(stmt, root);
    walk(stmt, root, &identifiers::fold_names);
    walk(stmt, root, &functions::fold_functions);
    walk(stmt, root, &identifiers::fold_aliases);
    walk(stmt, root, &operators::fold_operations);
    walk(stmt, root, &identifiers::fold_identifier_lists);
    walk(stmt, root, &clauses::fold_where);
    walk(stmt, root, &clauses::fold_case);
}

/// Apply `pass` to `list` and every group below it, innermost first.
fn walk(stmt: &mut Statement, list: NodeId, pass: &dyn Fn(&mut Statement, NodeId)) {
    let nested: Vec<NodeId> = stmt
        .children_of(list)
        .iter()
        .copied()
        .filter(|&child| stmt.is_group(child))
        .collect();
    for child in nested {
        walk(stmt, child, pass);
    }
    pass(stmt, list);
}

// -- shared sweep helpers --

fn is_significant(stmt: &Statement, id: NodeId) -> bool {
    !stmt
        .ttype_of(id)
        .is_some_and(TokenType::is_insignificant)
}

/// Index of the first significant child at or after `from`.
fn next_significant(stmt: &Statement, list: NodeId, from: usize) -> Option<usize> {
    let children = stmt.children_of(list);
    (from..children.len()).find(|&idx| is_significant(stmt, children[idx]))
}

/// Index of the last significant child strictly before `before`.
fn prev_significant(stmt: &Statement, list: NodeId, before: usize) -> Option<usize> {
    let children = stmt.children_of(list);
    (0..before.min(children.len()))
        .rev()
        .find(|&idx| is_significant(stmt, children[idx]))
}

fn is_punctuation(stmt: &Statement, id: NodeId, value: &str) -> bool {
    stmt.ttype_of(id) == Some(TokenType::PUNCTUATION) && stmt.leaf_value(id) == Some(value)
}

/// Leaf keyword equal to `word` after case and whitespace normalization.
fn is_keyword(stmt: &Statement, id: NodeId, word: &str) -> bool {
    stmt.ttype_of(id)
        .is_some_and(|t| t.is_a(TokenType::KEYWORD))
        && stmt
            .leaf_value(id)
            .is_some_and(|v| normalize_keyword(v) == word)
}
