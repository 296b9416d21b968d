//! Keyword-delimited spans: WHERE clauses and CASE expressions.

use super::{is_keyword, is_punctuation};
use crate::sql::token::tree::{normalize_keyword, GroupKind, NodeId, Statement};
use crate::sql::token::TokenType;

/// Keywords that end a WHERE clause when met at the same nesting level.
const CLAUSE_TERMINATORS: &[&str] = &[
    "GROUP BY",
    "ORDER BY",
    "HAVING",
    "LIMIT",
    "OFFSET",
    "UNION",
    "UNION ALL",
    "EXCEPT",
    "INTERSECT",
    "MINUS",
    "RETURNING",
    "WINDOW",
    "GO",
];

fn terminates_clause(stmt: &Statement, id: NodeId) -> bool {
    if is_punctuation(stmt, id, ";") {
        return true;
    }
    stmt.ttype_of(id)
        .is_some_and(|t| t.is_a(TokenType::KEYWORD))
        && stmt
            .leaf_value(id)
            .is_some_and(|v| CLAUSE_TERMINATORS.contains(&normalize_keyword(v).as_str()))
}

/// Fold `WHERE ...` up to, but excluding, the next clause-terminating
/// keyword (or the end of the list) into a `Where` group. A WHERE with
/// nothing after it still folds; nothing here can fail.
pub(super) fn fold_where(stmt: &mut Statement, list: NodeId) {
    let mut i = 0;
    while i < stmt.children_of(list).len() {
        let child = stmt.children_of(list)[i];
        if is_keyword(stmt, child, "WHERE") {
            let len = stmt.children_of(list).len();
            let end = (i + 1..len)
                .find(|&j| terminates_clause(stmt, stmt.children_of(list)[j]))
                .unwrap_or(len);
            stmt.group_span(list, i, end, GroupKind::Where);
        }
        i += 1;
    }
}

/// Fold `CASE ... END` into a `Case` group, tracking nested CASE depth.
/// Multi-word enders like `END IF` are single tokens and never close a CASE.
/// A CASE without its END stays flat.
pub(super) fn fold_case(stmt: &mut Statement, list: NodeId) {
    case_scan(stmt, list, 0);
}

fn case_scan(stmt: &mut Statement, list: NodeId, start: usize) {
    let mut i = start;
    while i < stmt.children_of(list).len() {
        let child = stmt.children_of(list)[i];
        if is_keyword(stmt, child, "CASE") {
            if let Some(end) = matching_end(stmt, list, i) {
                let case = stmt.group_span(list, i, end + 1, GroupKind::Case);
                // the group's own CASE/END sit at the edges; fold the
                // expressions nested between them
                case_scan(stmt, case, 1);
            }
        }
        i += 1;
    }
}

fn matching_end(stmt: &Statement, list: NodeId, open: usize) -> Option<usize> {
    let children = stmt.children_of(list);
    let mut depth = 1usize;
    for (idx, &child) in children.iter().enumerate().skip(open + 1) {
        if is_keyword(stmt, child, "CASE") {
            depth += 1;
        } else if is_keyword(stmt, child, "END") {
            depth -= 1;
            if depth == 0 {
                return Some(idx);
            }
        }
    }
    None
}
