//! Common test utilities and assertion helpers.
//!
//! Grid invariants checked after every structural edit, plus helpers that
//! read a table back as texts and spans.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use docgrid::doc::{Document, NodeId};
use docgrid::layout::{check_grid, validate_structure};
use docgrid::table::{
    cells, column_count, column_range, is_regular, row_groups, row_index, rows, spanned_cells,
    table_rows,
};

// Re-export fixtures for convenience
pub use super::fixtures::*;

// ============================================================================
// Table Readers
// ============================================================================

/// Plain text of every stored cell, row by row.
pub fn cell_texts(doc: &Document, table: NodeId) -> Vec<Vec<String>> {
    table_rows(doc, table)
        .into_iter()
        .map(|row| cells(doc, row).iter().map(|&c| doc.plain_text(c)).collect())
        .collect()
}

/// `(column_span, row_span)` of every stored cell, row by row.
pub fn cell_spans(doc: &Document, table: NodeId) -> Vec<Vec<(usize, usize)>> {
    table_rows(doc, table)
        .into_iter()
        .map(|row| {
            cells(doc, row)
                .iter()
                .map(|&c| {
                    let p = doc.cell_props(c).unwrap();
                    (p.column_span, p.row_span)
                })
                .collect()
        })
        .collect()
}

/// Column index of every stored cell, row by row.
pub fn column_indices(doc: &Document, table: NodeId) -> Vec<Vec<Option<usize>>> {
    table_rows(doc, table)
        .into_iter()
        .map(|row| {
            cells(doc, row)
                .iter()
                .map(|&c| doc.cell_props(c).unwrap().column_index)
                .collect()
        })
        .collect()
}

// ============================================================================
// Assertions
// ============================================================================

/// Assert the grid invariants hold:
/// - every row's own spans plus the columns spanned from above add up to
///   the column count, without overlaps
/// - every row's index is its position in its row group
pub fn assert_grid_consistent(doc: &mut Document, table: NodeId) {
    validate_structure(doc, table).unwrap();
    if let Err(e) = check_grid(doc, table) {
        panic!("table {table}: {e}");
    }
    let count = column_count(doc, table);
    for group in row_groups(doc, table).to_vec() {
        for (position, &row) in rows(doc, group).iter().enumerate() {
            assert_eq!(row_index(doc, row), Some(position), "row index of {row}");
            let own: usize = cells(doc, row)
                .iter()
                .map(|&c| doc.cell_props(c).unwrap().column_span)
                .sum();
            let from_above: usize = spanned_cells(doc, row)
                .iter()
                .filter_map(|&c| column_range(doc, c))
                .map(|(first, last)| last - first + 1)
                .sum();
            assert_eq!(own + from_above, count, "columns occupied in row {row}");
        }
    }
    assert!(is_regular(doc, table), "table {table} is not a regular grid");
}

/// Assert a cell has the given spans.
pub fn assert_spans(doc: &Document, cell: NodeId, column_span: usize, row_span: usize) {
    let props = doc.cell_props(cell).unwrap();
    assert_eq!(
        (props.column_span, props.row_span),
        (column_span, row_span),
        "spans of cell {cell}"
    );
}
