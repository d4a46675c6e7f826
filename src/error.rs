//! Structured error types for docgrid.
//!
//! Infeasible edits (a merge rectangle that partially overlaps a span, deleting
//! the last column, ...) are not errors: mutators report them as `Ok(None)` or
//! `Ok(false)`. The variants here cover malformed trees and broken invariants.

use crate::doc::{ElementType, NodeId};

/// All errors that can occur while building or editing a document tree.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// A node id that does not belong to the document arena.
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// The tree schema does not allow `child` under `parent`.
    #[error("A {child:?} cannot be placed inside a {parent:?}")]
    InvalidChild {
        parent: ElementType,
        child: ElementType,
    },

    /// Attaching a node that already has a parent.
    #[error("Node {0} is already attached")]
    AlreadyAttached(NodeId),

    /// An operation expected a different kind of element.
    #[error("Expected a {expected:?} at node {node}")]
    UnexpectedElement { node: NodeId, expected: ElementType },

    /// The grid stopped being consistent in the middle of an edit.
    #[error("Table invariant violated: {0}")]
    Invariant(String),

    /// Configuration or script JSON could not be decoded.
    #[error("Configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TableError>;

