//! Arena-backed rooted tree and its builder.
//!
//! Nodes live in a flat vector and refer to each other by index: children are
//! owned through `children` index lists, the parent link is a plain index that
//! owns nothing. Index 0 is always the root. An id -> index map is filled while
//! the tree is built so that lookup does not need a traversal.

use crate::error::{BuildError, BuildWarning};
use crate::record::{NodeId, NodeRecord};
use std::collections::HashMap;

/// Position of a node in the tree arena.
pub type NodeIndex = usize;

/// Arena index of the root node.
pub const ROOT: NodeIndex = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    parent: Option<NodeIndex>,
    children: Vec<NodeIndex>,
    tag: Option<i64>,
}

impl Node {
    fn new(id: NodeId, parent: Option<NodeIndex>, tag: Option<i64>) -> Self {
        Node { id, parent, children: Vec::new(), tag }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Arena index of the parent, `None` for the root.
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// Arena indices of the children, in input order.
    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    pub fn tag(&self) -> Option<i64> {
        self.tag
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// A rooted tree. Immutable once built.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    index_by_id: HashMap<NodeId, NodeIndex>,
}

impl Tree {
    pub fn root(&self) -> &Node {
        &self.nodes[ROOT]
    }

    /// Number of attached nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub(crate) fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Finds the arena index of the node with the given id.
    ///
    /// This is the single lookup used by both construction and path search.
    pub fn find_node(&self, id: NodeId) -> Option<NodeIndex> {
        self.index_by_id.get(&id).copied()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.find_node(id).map(|index| &self.nodes[index])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index_by_id.contains_key(&id)
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        node.parent.map(|p| self.nodes[p].id)
    }

    /// Child ids of `id` in input order, or `None` if `id` is not in the tree.
    pub fn children_of(&self, id: NodeId) -> Option<impl Iterator<Item = NodeId> + '_> {
        let node = self.get(id)?;
        Some(node.children.iter().map(move |&c| self.nodes[c].id))
    }

    /// Number of edges between the root and `id`.
    pub fn depth_of(&self, id: NodeId) -> Option<usize> {
        let mut index = self.find_node(id)?;
        let mut depth = 0;
        while let Some(parent) = self.nodes[index].parent {
            index = parent;
            depth += 1;
        }
        Some(depth)
    }

    /// True if one of the two nodes is the parent of the other.
    pub fn are_adjacent(&self, a: NodeId, b: NodeId) -> bool {
        match (self.find_node(a), self.find_node(b)) {
            (Some(ia), Some(ib)) => {
                self.nodes[ia].parent == Some(ib) || self.nodes[ib].parent == Some(ia)
            }
            _ => false,
        }
    }

    /// Depth-first preorder walk from the root, children in input order.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder { tree: self, stack: vec![ROOT] }
    }
}

/// Preorder iterator over a [`Tree`].
///
/// Uses an explicit stack so deep trees do not exhaust the call stack.
pub struct Preorder<'a> {
    tree: &'a Tree,
    stack: Vec<NodeIndex>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let node = &self.tree.nodes[index];
        // Reverse so the first child is popped first
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Result of a build: the tree plus every record that had to be dropped.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub tree: Tree,
    pub warnings: Vec<BuildWarning>,
}

/// Incremental tree construction from records in input order.
///
/// The first record pushed becomes the root. Every later record is attached
/// as the last child of its parent, which must already be in the tree;
/// records that cannot be attached are dropped and reported as warnings.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    index_by_id: HashMap<NodeId, NodeIndex>,
    warnings: Vec<BuildWarning>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        TreeBuilder {
            nodes: Vec::with_capacity(capacity),
            index_by_id: HashMap::with_capacity(capacity),
            warnings: Vec::new(),
        }
    }

    /// Adds one record. Returns the new node's index, or `None` if the record
    /// was dropped.
    pub fn push(&mut self, record: NodeRecord) -> Option<NodeIndex> {
        if self.nodes.is_empty() {
            return Some(self.insert(record, None));
        }

        if self.index_by_id.contains_key(&record.id) {
            self.warn(BuildWarning::DuplicateId { id: record.id });
            return None;
        }

        match self.index_by_id.get(&record.parent_id).copied() {
            Some(parent) => {
                let index = self.insert(record, Some(parent));
                self.nodes[parent].children.push(index);
                Some(index)
            }
            None => {
                self.warn(BuildWarning::MissingParent {
                    id: record.id,
                    parent_id: record.parent_id,
                });
                None
            }
        }
    }

    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }

    pub fn finish(self) -> Result<BuildReport, BuildError> {
        if self.nodes.is_empty() {
            return Err(BuildError::Empty);
        }

        log::info!(
            "built tree with {} nodes ({} records dropped)",
            self.nodes.len(),
            self.warnings.len()
        );

        Ok(BuildReport {
            tree: Tree {
                nodes: self.nodes,
                index_by_id: self.index_by_id,
            },
            warnings: self.warnings,
        })
    }

    fn insert(&mut self, record: NodeRecord, parent: Option<NodeIndex>) -> NodeIndex {
        let index = self.nodes.len();
        self.nodes.push(Node::new(record.id, parent, record.tag));
        self.index_by_id.insert(record.id, index);
        index
    }

    fn warn(&mut self, warning: BuildWarning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }
}

/// Builds a tree from records in input order.
///
/// Fails only when `records` is empty.
pub fn build(records: &[NodeRecord]) -> Result<BuildReport, BuildError> {
    let mut builder = TreeBuilder::with_capacity(records.len());
    for record in records {
        builder.push(*record);
    }
    builder.finish()
}
