//! Identifier-shaped folding: qualified name chains, aliases, comma lists.
//!
//!     Three passes live here because they share one vocabulary: what counts
//!     as a name, what can carry an alias, what can sit in a comma list.
//!     They run at different points of the pipeline (names before function
//!     calls, aliases after them, lists after operations).

use super::{is_keyword, is_punctuation, next_significant, prev_significant};
use crate::sql::token::tree::{GroupKind, NodeId, Statement};
use crate::sql::token::TokenType;

/// A leaf that can act as a name: a plain or quoted identifier.
fn is_name_leaf(stmt: &Statement, id: NodeId) -> bool {
    stmt.ttype_of(id)
        .is_some_and(|t| t == TokenType::NAME || t == TokenType::STRING_SYMBOL)
}

fn is_wildcard(stmt: &Statement, id: NodeId) -> bool {
    stmt.ttype_of(id) == Some(TokenType::WILDCARD)
}

/// Fold dotted chains (`a.b.c`, `t.*`) and bare names into `Identifier`
/// groups. Every name leaf ends up inside an `Identifier` after this pass.
pub(super) fn fold_names(stmt: &mut Statement, list: NodeId) {
    let mut i = 0;
    while i < stmt.children_of(list).len() {
        let child = stmt.children_of(list)[i];
        if is_name_leaf(stmt, child) {
            let mut end = i;
            loop {
                let Some(dot) = next_significant(stmt, list, end + 1) else {
                    break;
                };
                if !is_punctuation(stmt, stmt.children_of(list)[dot], ".") {
                    break;
                }
                let Some(next) = next_significant(stmt, list, dot + 1) else {
                    break;
                };
                let next_id = stmt.children_of(list)[next];
                if is_name_leaf(stmt, next_id) {
                    end = next;
                } else if is_wildcard(stmt, next_id) {
                    end = next;
                    break;
                } else {
                    break;
                }
            }
            stmt.group_span(list, i, end + 1, GroupKind::Identifier);
        }
        i += 1;
    }
}

/// An expression that can carry an alias.
fn is_aliasable(stmt: &Statement, id: NodeId) -> bool {
    match stmt.group_kind_of(id) {
        Some(GroupKind::Identifier)
        | Some(GroupKind::Function)
        | Some(GroupKind::Parenthesis) => true,
        Some(_) => false,
        None => stmt.ttype_of(id).is_some_and(|t| {
            t.is_a(TokenType::NUMBER)
                || t.is_a(TokenType::LITERAL)
                || t == TokenType::NAME_BUILTIN
        }),
    }
}

/// An `Identifier` holding exactly one bare name, the only shape an alias
/// may take.
fn is_alias_name(stmt: &Statement, id: NodeId) -> bool {
    if stmt.group_kind_of(id) != Some(GroupKind::Identifier) {
        return false;
    }
    let children = stmt.children_of(id);
    children.len() == 1 && is_name_leaf(stmt, children[0])
}

/// Fold `<expr> AS <name>` and implicit `<expr> <name>` into `Identifier`
/// groups carrying both the expression and its alias. The implicit form only
/// fires for a plain following name, so keywords never get swallowed.
pub(super) fn fold_aliases(stmt: &mut Statement, list: NodeId) {
    let mut i = 0;
    while i < stmt.children_of(list).len() {
        let child = stmt.children_of(list)[i];
        if is_aliasable(stmt, child) {
            if let Some(next) = next_significant(stmt, list, i + 1) {
                let next_id = stmt.children_of(list)[next];
                if is_keyword(stmt, next_id, "AS") {
                    if let Some(alias) = next_significant(stmt, list, next + 1) {
                        if is_alias_name(stmt, stmt.children_of(list)[alias]) {
                            stmt.group_span(list, i, alias + 1, GroupKind::Identifier);
                        }
                    }
                } else if is_alias_name(stmt, next_id) {
                    stmt.group_span(list, i, next + 1, GroupKind::Identifier);
                }
            }
        }
        i += 1;
    }
}

/// Anything that can be an element of a comma-separated list.
fn is_listable(stmt: &Statement, id: NodeId) -> bool {
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
                || t == TokenType::WILDCARD
        }),
    }
}

/// Fold maximal `item , item [, item ...]` runs into `IdentifierList`
/// groups, commas included as children.
pub(super) fn fold_identifier_lists(stmt: &mut Statement, list: NodeId) {
    let mut i = 0;
    while i < stmt.children_of(list).len() {
        let child = stmt.children_of(list)[i];
        if is_punctuation(stmt, child, ",") {
            let first = prev_significant(stmt, list, i)
                .filter(|&p| is_listable(stmt, stmt.children_of(list)[p]));
            if let Some(first) = first {
                let mut last_item = None;
                let mut cursor = i;
                loop {
                    let Some(item) = next_significant(stmt, list, cursor + 1) else {
                        break;
                    };
                    if !is_listable(stmt, stmt.children_of(list)[item]) {
                        break;
                    }
                    last_item = Some(item);
                    let Some(comma) = next_significant(stmt, list, item + 1) else {
                        break;
                    };
                    if !is_punctuation(stmt, stmt.children_of(list)[comma], ",") {
                        break;
                    }
                    cursor = comma;
                }
                if let Some(last) = last_item {
                    stmt.group_span(list, first, last + 1, GroupKind::IdentifierList);
                    i = first;
                }
            }
        }
        i += 1;
    }
}
