//! Token tree storage and traversal
//!
//!     A parsed statement is a tree: leaf tokens exactly as the lexer produced
//!     them, re-nested under composite nodes by the grouping passes. The tree
//!     lives in a per-statement arena. Group slots own their children through
//!     an ordered id list (order is source order), and every slot records its
//!     parent id, which gives upward traversal without ownership cycles.
//!
//!     Grouping never creates, drops or reorders leaf tokens, it only moves a
//!     contiguous span of children under a fresh group slot. Concatenating the
//!     leaves of a finished tree in depth-first order therefore reproduces the
//!     original statement text byte for byte.
//!
//!     Callers never touch slots directly; [Node] is a copyable handle (tree
//!     reference plus id) carrying the read API.

use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use super::types::TokenType;

/// Index of a slot in a statement's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

/// Classification of a composite node.
///
/// Composite nodes have no [TokenType]; this enum is their whole
/// classification, mirroring the lexical taxonomy's role for leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GroupKind {
    Statement,
    Identifier,
    IdentifierList,
    Function,
    Parenthesis,
    Where,
    Case,
    Comparison,
    Operation,
}

#[derive(Debug, Clone)]
enum NodeData {
    Leaf {
        ttype: TokenType,
        value: String,
        parent: Option<NodeId>,
    },
    Group {
        kind: GroupKind,
        children: Vec<NodeId>,
        parent: Option<NodeId>,
    },
}

/// One parsed SQL statement: the root of a token tree.
///
/// Produced by [parse](crate::sql::parse); immutable afterwards. All access
/// goes through [Statement::root] or the delegating helpers below.
#[derive(Debug, Clone)]
pub struct Statement {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Statement {
    /// Build an ungrouped statement: a root with one leaf per lexed token.
    pub(crate) fn from_tokens(tokens: Vec<(TokenType, String)>) -> Self {
        let mut nodes = Vec::with_capacity(tokens.len() + 1);
        nodes.push(NodeData::Group {
            kind: GroupKind::Statement,
            children: Vec::with_capacity(tokens.len()),
            parent: None,
        });
        let root = NodeId(0);
        for (ttype, value) in tokens {
            let id = NodeId(nodes.len());
            nodes.push(NodeData::Leaf {
                ttype,
                value,
                parent: Some(root),
            });
            match &mut nodes[root.0] {
                NodeData::Group { children, .. } => children.push(id),
                NodeData::Leaf { .. } => unreachable!("root is always a group"),
            }
        }
        Statement { nodes, root }
    }

    /// Arena id of the root, for the grouping engine.
    pub(crate) fn root_id(&self) -> NodeId {
        self.root
    }

    /// Handle to the root node (always a `Statement` group).
    pub fn root(&self) -> Node<'_> {
        Node {
            tree: self,
            id: self.root,
        }
    }

    /// First root-level token, optionally skipping whitespace and comments.
    pub fn token_first(&self, skip_ws: bool) -> Option<Node<'_>> {
        self.root().token_first(skip_ws)
    }

    /// Lazy depth-first enumeration of all leaf tokens.
    pub fn flatten(&self) -> Flatten<'_> {
        self.root().flatten()
    }

    /// The exact statement text (concatenated leaf values).
    pub fn value(&self) -> String {
        self.root().value()
    }

    /// The kind of statement, as the uppercased first top-level DML or DDL
    /// keyword (`"SELECT"`, `"INSERT"`, `"CREATE OR REPLACE"`, ...), or
    /// `"UNKNOWN"` when the statement does not open with one. A leading CTE
    /// clause is skipped over.
    pub fn statement_type(&self) -> String {
        let mut past_cte = false;
        for child in self.root().children() {
            match child.ttype() {
                Some(t) if t.is_insignificant() => continue,
                Some(t) if t.is_a(TokenType::KEYWORD_DML) || t.is_a(TokenType::KEYWORD_DDL) => {
                    return child.normalized();
                }
                Some(t) if t.is_a(TokenType::KEYWORD_CTE) => {
                    past_cte = true;
                    continue;
                }
                // anything between the CTE clause and its main statement
                _ if past_cte => continue,
                _ => break,
            }
        }
        "UNKNOWN".to_string()
    }

    // -- slot accessors used by the grouping engine --

    pub(crate) fn is_group(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0], NodeData::Group { .. })
    }

    pub(crate) fn ttype_of(&self, id: NodeId) -> Option<TokenType> {
        match &self.nodes[id.0] {
            NodeData::Leaf { ttype, .. } => Some(*ttype),
            NodeData::Group { .. } => None,
        }
    }

    pub(crate) fn group_kind_of(&self, id: NodeId) -> Option<GroupKind> {
        match &self.nodes[id.0] {
            NodeData::Group { kind, .. } => Some(*kind),
            NodeData::Leaf { .. } => None,
        }
    }

    pub(crate) fn leaf_value(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0] {
            NodeData::Leaf { value, .. } => Some(value),
            NodeData::Group { .. } => None,
        }
    }

    pub(crate) fn children_of(&self, id: NodeId) -> &[NodeId] {
        match &self.nodes[id.0] {
            NodeData::Group { children, .. } => children,
            NodeData::Leaf { .. } => &[],
        }
    }

    /// Replace `list`'s children in `start..end` with one new group of `kind`
    /// containing exactly those children, in order. Returns the new group's
    /// id. The moved children are re-parented to the new group.
    pub(crate) fn group_span(
        &mut self,
        list: NodeId,
        start: usize,
        end: usize,
        kind: GroupKind,
    ) -> NodeId {
        let new_id = NodeId(self.nodes.len());
        let moved: Vec<NodeId> = match &mut self.nodes[list.0] {
            NodeData::Group { children, .. } => {
                children.splice(start..end, [new_id]).collect()
            }
            NodeData::Leaf { .. } => unreachable!("group_span target is always a group"),
        };
        for &child in &moved {
            match &mut self.nodes[child.0] {
                NodeData::Leaf { parent, .. } | NodeData::Group { parent, .. } => {
                    *parent = Some(new_id)
                }
            }
        }
        self.nodes.push(NodeData::Group {
            kind,
            children: moved,
            parent: Some(list),
        });
        new_id
    }
}

impl Serialize for Statement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root().serialize(serializer)
    }
}

/// A read handle on one tree node: a leaf token or a composite group.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    tree: &'a Statement,
    id: NodeId,
}

impl<'a> Node<'a> {
    /// Lexical type for leaves; `None` for composite nodes.
    pub fn ttype(&self) -> Option<TokenType> {
        self.tree.ttype_of(self.id)
    }

    /// Composite classification for groups; `None` for leaves.
    pub fn group_kind(&self) -> Option<GroupKind> {
        self.tree.group_kind_of(self.id)
    }

    pub fn is_group(&self) -> bool {
        self.tree.is_group(self.id)
    }

    /// The exact source text of this node (for groups, the concatenation of
    /// all leaves below it).
    pub fn value(&self) -> String {
        match self.tree.leaf_value(self.id) {
            Some(v) => v.to_string(),
            None => {
                let mut out = String::new();
                for leaf in self.flatten() {
                    out.push_str(self.tree.leaf_value(leaf.id).unwrap_or(""));
                }
                out
            }
        }
    }

    /// The value with keyword casing and internal whitespace normalized:
    /// `"end   if"` becomes `"END IF"`. Non-keyword nodes normalize to their
    /// plain value.
    pub fn normalized(&self) -> String {
        match self.ttype() {
            Some(t) if t.is_a(TokenType::KEYWORD) => normalize_keyword(&self.value()),
            _ => self.value(),
        }
    }

    pub fn parent(&self) -> Option<Node<'a>> {
        let parent = match &self.tree.nodes[self.id.0] {
            NodeData::Leaf { parent, .. } | NodeData::Group { parent, .. } => *parent,
        };
        parent.map(|id| Node {
            tree: self.tree,
            id,
        })
    }

    pub fn child_count(&self) -> usize {
        self.tree.children_of(self.id).len()
    }

    pub fn child(&self, index: usize) -> Option<Node<'a>> {
        self.tree
            .children_of(self.id)
            .get(index)
            .map(|&id| Node {
                tree: self.tree,
                id,
            })
    }

    /// Iterate direct children in source order (empty for leaves).
    pub fn children(&self) -> Children<'a> {
        Children {
            tree: self.tree,
            ids: self.tree.children_of(self.id).iter(),
        }
    }

    /// Lazy depth-first enumeration of the leaf tokens below this node (the
    /// node itself when it is a leaf). Restartable: each call starts a fresh
    /// traversal.
    pub fn flatten(&self) -> Flatten<'a> {
        if self.is_group() {
            Flatten {
                tree: self.tree,
                stack: vec![(self.id, 0)],
                pending_leaf: None,
            }
        } else {
            Flatten {
                tree: self.tree,
                stack: Vec::new(),
                pending_leaf: Some(self.id),
            }
        }
    }

    /// First child, optionally skipping whitespace and comment tokens.
    pub fn token_first(&self, skip_ws: bool) -> Option<Node<'a>> {
        self.children().find(|child| {
            !skip_ws || !child.ttype().is_some_and(TokenType::is_insignificant)
        })
    }

    /// First child at or after `start` satisfying any of `predicates`.
    pub fn token_matching(
        &self,
        predicates: &[&dyn Fn(&Node<'a>) -> bool],
        start: usize,
    ) -> Option<Node<'a>> {
        self.children()
            .skip(start)
            .find(|child| predicates.iter().any(|pred| pred(child)))
    }

    /// For an `Identifier` group: the alias name, if one is present (either
    /// `AS <name>` or an implicit trailing name).
    pub fn alias(&self) -> Option<String> {
        if self.group_kind() != Some(GroupKind::Identifier) {
            return None;
        }
        let children: Vec<Node<'a>> = self.children().collect();
        // Explicit form: the name following an AS keyword.
        if let Some(as_pos) = children.iter().position(|c| {
            c.ttype().is_some_and(|t| t.is_a(TokenType::KEYWORD)) && c.normalized() == "AS"
        }) {
            return children[as_pos + 1..]
                .iter()
                .find(|c| !c.ttype().is_some_and(TokenType::is_insignificant))
                .map(|c| strip_name_quotes(&c.value()).to_string());
        }
        // Implicit form: a trailing name directly preceded by whitespace
        // (a trailing name preceded by a dot is part of a qualified chain).
        let last = children
            .iter()
            .rposition(|c| !c.ttype().is_some_and(TokenType::is_insignificant))?;
        if last == 0 {
            return None;
        }
        let candidate = &children[last];
        let named = candidate.group_kind() == Some(GroupKind::Identifier)
            || candidate.ttype() == Some(TokenType::NAME)
            || candidate.ttype() == Some(TokenType::STRING_SYMBOL);
        let after_ws = children[last - 1]
            .ttype()
            .is_some_and(TokenType::is_insignificant);
        if named && after_ws {
            Some(strip_name_quotes(&candidate.value()).to_string())
        } else {
            None
        }
    }

    /// For an `Identifier` group: the real (unaliased, unqualified) name.
    pub fn real_name(&self) -> Option<String> {
        if self.group_kind() != Some(GroupKind::Identifier) {
            return None;
        }
        let named = |c: &Node<'a>| {
            c.ttype()
                .is_some_and(|t| t == TokenType::NAME || t == TokenType::STRING_SYMBOL)
        };
        // The name part is everything before an AS keyword or implicit alias;
        // within it, the name after the last dot wins.
        let mut result: Option<String> = None;
        let mut prev_was_dot = true; // a leading name counts
        for child in self.children() {
            if child.ttype().is_some_and(TokenType::is_insignificant) {
                continue;
            }
            if child.ttype().is_some_and(|t| t.is_a(TokenType::KEYWORD)) {
                break;
            }
            if child.ttype() == Some(TokenType::PUNCTUATION) && child.value() == "." {
                prev_was_dot = true;
                continue;
            }
            if prev_was_dot {
                if named(&child) {
                    result = Some(strip_name_quotes(&child.value()).to_string());
                } else if child.group_kind() == Some(GroupKind::Identifier) {
                    result = child.real_name();
                }
                prev_was_dot = false;
            } else {
                // implicit alias or anything else ends the name part
                break;
            }
        }
        result
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.group_kind() {
            Some(kind) => write!(f, "{:?}({:?})", kind, self.value()),
            None => write!(
                f,
                "{:?}({:?})",
                self.ttype().expect("leaf has a type"),
                self.value()
            ),
        }
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Serialize for Node<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Some(kind) = self.group_kind() {
            let mut map = serializer.serialize_map(Some(2))?;
            map.serialize_entry("group", &kind)?;
            map.serialize_entry("children", &SerChildren(*self))?;
            map.end()
        } else {
            let mut map = serializer.serialize_map(Some(2))?;
            map.serialize_entry("type", &self.ttype().expect("leaf has a type"))?;
            map.serialize_entry("value", &self.value())?;
            map.end()
        }
    }
}

struct SerChildren<'a>(Node<'a>);

impl Serialize for SerChildren<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.child_count()))?;
        for child in self.0.children() {
            seq.serialize_element(&child)?;
        }
        seq.end()
    }
}

/// Iterator over a node's direct children.
pub struct Children<'a> {
    tree: &'a Statement,
    ids: std::slice::Iter<'a, NodeId>,
}

impl<'a> Iterator for Children<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Node<'a>> {
        self.ids.next().map(|&id| Node {
            tree: self.tree,
            id,
        })
    }
}

/// Lazy depth-first leaf iterator, see [Node::flatten].
pub struct Flatten<'a> {
    tree: &'a Statement,
    stack: Vec<(NodeId, usize)>,
    pending_leaf: Option<NodeId>,
}

impl<'a> Iterator for Flatten<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Node<'a>> {
        if let Some(id) = self.pending_leaf.take() {
            return Some(Node {
                tree: self.tree,
                id,
            });
        }
        loop {
            let (id, index) = self.stack.last_mut()?;
            let children = self.tree.children_of(*id);
            if *index >= children.len() {
                self.stack.pop();
                continue;
            }
            let child = children[*index];
            *index += 1;
            if self.tree.is_group(child) {
                self.stack.push((child, 0));
            } else {
                return Some(Node {
                    tree: self.tree,
                    id: child,
                });
            }
        }
    }
}

/// Uppercase and collapse internal whitespace, for comparing keyword text:
/// `"end \t\n if"` becomes `"END IF"`.
pub(crate) fn normalize_keyword(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Strip one pair of identifier quotes (`"..."` or backticks), if present.
fn strip_name_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'`')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
