//! Layout for tables.
//!
//! This module handles:
//! - Placing cells on the grid (column indices, column count)
//! - Pre-computing column widths and positions for a given width
//! - Binary search for column lookup at a horizontal coordinate

mod columns;
mod structure;

pub use columns::{ColumnRect, TableColumnLayout};
pub use structure::{check_grid, validate_structure};
