//! Immutable syntax tree arena and the owned node cursor over it.
//!
//! Nodes are stored in a flat `Vec` indexed by [`NodeId`]; children are
//! `(field, id)` pairs so both named slots and the plain child list come
//! from the same storage. A built tree is shared behind an `Arc`, and a
//! [`SyntaxNode`] is an (`Arc<SyntaxTree>`, [`NodeId`]) pair that can be
//! cloned, stored in caches and compared without lifetimes.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::{FieldName, LineIndex, NodeKind, Position, Span};

/// Identifier of a source file within a session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u32);

impl FileId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        FileId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Index of a node in its tree. Stable for the lifetime of the tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Cache key identifying a node across all files of a session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub file: FileId,
    pub node: NodeId,
}

/// A child slot: optional field label plus the child id.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Child {
    pub field: Option<FieldName>,
    pub node: NodeId,
}

impl Child {
    #[inline]
    pub const fn labeled(field: FieldName, node: NodeId) -> Self {
        Child {
            field: Some(field),
            node,
        }
    }

    #[inline]
    pub const fn plain(node: NodeId) -> Self {
        Child { field: None, node }
    }
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    span: Span,
    parent: Option<NodeId>,
    children: SmallVec<[Child; 4]>,
}

/// Syntax tree of one file.
pub struct SyntaxTree {
    file: FileId,
    source: Arc<str>,
    nodes: Vec<NodeData>,
    root: NodeId,
    lines: LineIndex,
}

impl SyntaxTree {
    #[inline]
    pub fn file(&self) -> FileId {
        self.file
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.index()].kind
    }

    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    #[inline]
    pub fn parent_id(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    #[inline]
    pub fn child_slots(&self, id: NodeId) -> &[Child] {
        &self.nodes[id.index()].children
    }

    /// Source text covered by a node. Empty when the span is out of bounds.
    pub fn text(&self, id: NodeId) -> &str {
        self.source
            .get(self.span(id).to_range())
            .unwrap_or_default()
    }

    pub fn position(&self, offset: u32) -> Position {
        self.lines.position(offset)
    }

    /// Root node cursor.
    pub fn root(self: &Arc<Self>) -> SyntaxNode {
        self.node(self.root)
    }

    pub fn node(self: &Arc<Self>, id: NodeId) -> SyntaxNode {
        SyntaxNode {
            tree: Arc::clone(self),
            id,
        }
    }

    /// Deepest node whose span contains `offset`.
    pub fn node_at_offset(self: &Arc<Self>, offset: u32) -> Option<SyntaxNode> {
        let mut current = self.root;
        if !self.span(current).contains(offset) {
            return None;
        }
        'descend: loop {
            for child in self.child_slots(current) {
                if self.span(child.node).contains(offset) {
                    current = child.node;
                    continue 'descend;
                }
            }
            return Some(self.node(current));
        }
    }

    /// Indented `kind [field] span` dump, one node per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(self.root, None, 0, &mut out);
        out
    }

    fn dump_node(&self, id: NodeId, field: Option<FieldName>, depth: usize, out: &mut String) {
        use std::fmt::Write as _;

        let _ = write!(out, "{:indent$}", "", indent = depth * 2);
        if let Some(field) = field {
            let _ = write!(out, "{field}: ");
        }
        let kind = self.kind(id);
        let _ = write!(out, "{kind} {}", self.span(id));
        if self.child_slots(id).is_empty() {
            let _ = write!(out, " {:?}", self.text(id));
        }
        out.push('\n');
        for child in self.child_slots(id) {
            self.dump_node(child.node, child.field, depth + 1, out);
        }
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("file", &self.file)
            .field("nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

/// Bottom-up tree construction.
///
/// Children are pushed before their parent; pushing a parent records the
/// parent link on each child.
pub struct TreeBuilder {
    file: FileId,
    source: Arc<str>,
    nodes: Vec<NodeData>,
}

impl TreeBuilder {
    pub fn new(file: FileId, source: impl Into<Arc<str>>) -> Self {
        TreeBuilder {
            file,
            source: source.into(),
            nodes: Vec::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of nodes pushed so far; a checkpoint for [`Self::truncate`].
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.index()].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn push(
        &mut self,
        kind: NodeKind,
        span: Span,
        children: impl IntoIterator<Item = Child>,
    ) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        let children: SmallVec<[Child; 4]> = children.into_iter().collect();
        for child in &children {
            if let Some(data) = self.nodes.get_mut(child.node.index()) {
                data.parent = Some(id);
            }
        }
        self.nodes.push(NodeData {
            kind,
            span,
            parent: None,
            children,
        });
        id
    }

    /// Roll back to a checkpoint taken with [`Self::len`], discarding every
    /// node pushed after it and any parent link pointing at them.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.nodes.len() {
            return;
        }
        self.nodes.truncate(len);
        for data in &mut self.nodes {
            if data.parent.is_some_and(|parent| parent.index() >= len) {
                data.parent = None;
            }
        }
    }

    pub fn finish(self, root: NodeId) -> SyntaxTree {
        let lines = LineIndex::new(&self.source);
        SyntaxTree {
            file: self.file,
            source: self.source,
            nodes: self.nodes,
            root,
            lines,
        }
    }
}

/// Owned cursor over one node of a shared tree.
#[derive(Clone)]
pub struct SyntaxNode {
    tree: Arc<SyntaxTree>,
    id: NodeId,
}

impl SyntaxNode {
    #[inline]
    pub fn tree(&self) -> &Arc<SyntaxTree> {
        &self.tree
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn file(&self) -> FileId {
        self.tree.file
    }

    #[inline]
    pub fn key(&self) -> NodeKey {
        NodeKey {
            file: self.tree.file,
            node: self.id,
        }
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.tree.kind(self.id)
    }

    #[inline]
    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind() == kind
    }

    #[inline]
    pub fn span(&self) -> Span {
        self.tree.span(self.id)
    }

    pub fn text(&self) -> &str {
        self.tree.text(self.id)
    }

    pub fn start_position(&self) -> Position {
        self.tree.position(self.span().start)
    }

    pub fn end_position(&self) -> Position {
        self.tree.position(self.span().end)
    }

    fn with_id(&self, id: NodeId) -> SyntaxNode {
        SyntaxNode {
            tree: Arc::clone(&self.tree),
            id,
        }
    }

    pub fn parent(&self) -> Option<SyntaxNode> {
        self.tree.parent_id(self.id).map(|id| self.with_id(id))
    }

    /// Strict ancestors, innermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        std::iter::successors(self.parent(), SyntaxNode::parent)
    }

    /// All children in source order.
    pub fn children(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.tree
            .child_slots(self.id)
            .iter()
            .map(move |child| self.with_id(child.node))
    }

    /// First child stored under `field`.
    pub fn child_by_field(&self, field: FieldName) -> Option<SyntaxNode> {
        self.tree
            .child_slots(self.id)
            .iter()
            .find(|child| child.field == Some(field))
            .map(|child| self.with_id(child.node))
    }

    pub fn children_by_field(&self, field: FieldName) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.tree
            .child_slots(self.id)
            .iter()
            .filter(move |child| child.field == Some(field))
            .map(move |child| self.with_id(child.node))
    }

    /// Children with the given kind, in source order.
    pub fn children_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.children().filter(move |child| child.kind() == kind)
    }

    pub fn last_child(&self) -> Option<SyntaxNode> {
        self.tree
            .child_slots(self.id)
            .last()
            .map(|child| self.with_id(child.node))
    }

    /// The label under which this node is stored in its parent.
    pub fn field_name(&self) -> Option<FieldName> {
        let parent = self.tree.parent_id(self.id)?;
        self.tree
            .child_slots(parent)
            .iter()
            .find(|child| child.node == self.id)
            .and_then(|child| child.field)
    }

    fn sibling_at(&self, offset: isize) -> Option<SyntaxNode> {
        let parent = self.tree.parent_id(self.id)?;
        let slots = self.tree.child_slots(parent);
        let position = slots.iter().position(|child| child.node == self.id)?;
        let target = position.checked_add_signed(offset)?;
        slots.get(target).map(|child| self.with_id(child.node))
    }

    pub fn next_sibling(&self) -> Option<SyntaxNode> {
        self.sibling_at(1)
    }

    pub fn prev_sibling(&self) -> Option<SyntaxNode> {
        self.sibling_at(-1)
    }

    /// Closest strict ancestor of the given kind.
    pub fn ancestor_of_kind(&self, kind: NodeKind) -> Option<SyntaxNode> {
        self.ancestors().find(|node| node.kind() == kind)
    }

    /// Whether `self` is `other` or lies inside it.
    pub fn is_within(&self, other: &SyntaxNode) -> bool {
        *self == *other || self.ancestors().any(|node| node == *other)
    }
}

impl PartialEq for SyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Arc::ptr_eq(&self.tree, &other.tree)
    }
}

impl Eq for SyntaxNode {}

impl std::hash::Hash for SyntaxNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.kind(), self.span())
    }
}
