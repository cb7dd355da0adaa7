use serde::{Deserialize, Serialize};

/// Type alias for node IDs (domain identifiers from input files)
pub type NodeId = i64;

/// One `(id, parent_id, tag)` input triple.
///
/// The parent id of the first record is ignored: that record becomes the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub parent_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<i64>,
}

impl NodeRecord {
    pub fn new(id: NodeId, parent_id: NodeId) -> Self {
        NodeRecord { id, parent_id, tag: None }
    }

    pub fn with_tag(id: NodeId, parent_id: NodeId, tag: i64) -> Self {
        NodeRecord { id, parent_id, tag: Some(tag) }
    }
}

/// A request for the path between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathQuery {
    pub start: NodeId,
    pub end: NodeId,
}

impl PathQuery {
    pub fn new(start: NodeId, end: NodeId) -> Self {
        PathQuery { start, end }
    }
}

/// Everything an input source provides: node records in construction order,
/// followed by the queries to run against the built tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeInput {
    pub records: Vec<NodeRecord>,
    pub queries: Vec<PathQuery>,
}
