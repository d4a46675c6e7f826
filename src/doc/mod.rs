//! Document tree and position primitives.
//!
//! This module handles:
//! - The node arena (`Document`) with parent links and schema checks
//! - The closed set of structural element types
//! - Comparable positions with logical direction, and segments
//! - Insertion-position normalization

mod node;
mod position;
mod tree;

pub use node::{
    CellProps, ColumnDef, ColumnWidth, ElementType, Node, NodeId, NodeKind, TableProps, Thickness,
};
pub use position::{ElementEdge, LogicalDirection, TextPosition, TextSegment};
pub use tree::{Ancestors, Document};
