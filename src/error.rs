//! Error and warning types shared by the reader, the tree builder and the path finder.

use crate::record::NodeId;
use std::io;

/// Errors raised while turning an input stream into records and queries.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid integer '{token}' at line {line}")]
    InvalidToken { line: usize, token: String },

    #[error("invalid UTF-8 at line {line}")]
    InvalidUtf8 { line: usize },

    #[error("input ended after {found} of {expected} {what}")]
    Truncated {
        expected: usize,
        found: usize,
        what: &'static str,
    },

    #[error("failed to parse JSON at line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that prevent a tree from being built at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("no node records to build a tree from")]
    Empty,
}

/// Errors raised by a single path query. They never affect later queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("node {0} not found in tree")]
    NodeNotFound(NodeId),
}

/// Records dropped during construction. The tree stays usable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildWarning {
    /// The record's parent id was not (yet) in the tree.
    #[error("node {id} dropped: parent {parent_id} not present")]
    MissingParent { id: NodeId, parent_id: NodeId },
    /// A node with this id is already attached.
    #[error("node {id} dropped: id already in tree")]
    DuplicateId { id: NodeId },
}
