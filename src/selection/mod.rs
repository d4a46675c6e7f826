//! Table-aware selection.
//!
//! This module handles:
//! - Classifying a position pair against cell, row, row group and table
//!   boundaries
//! - Building rectangular cell ranges (one segment per row)
//! - Collapsing selections that leave a table to row-aligned segments

mod classify;
mod range;

pub use classify::{boundary_cells, classify, BoundarySide, TableBoundaries};
pub use range::{
    build_cell_range, build_cross_table_segment, build_range, cell_segment, column_bounds,
    ClassifiedRange, ColumnBounds, TableCellRange,
};
