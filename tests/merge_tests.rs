//! Merging rectangles of cells and splitting merged cells.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;
mod fixtures;

use common::{assert_grid_consistent, assert_spans, cell_spans, cell_texts};
use docgrid::editor::{merge_cell_range, merge_cells, split_cell};
use docgrid::selection::cell_segment;
use docgrid::table::{cells, row_groups, rows, TableSpec};
use fixtures::TableBuilder;
use test_case::test_case;

#[test]
fn test_merge_two_by_two_collapses_to_one_row() {
    let mut fx = TableBuilder::grid(2, 2).build();
    let group = row_groups(&fx.doc, fx.table)[0];

    let caret = merge_cell_range(&mut fx.doc, group, 0, 1, 0, 1).unwrap().unwrap();

    let remaining = rows(&fx.doc, group);
    assert_eq!(remaining.len(), 1);
    assert_eq!(cells(&fx.doc, remaining[0]).len(), 1);
    let merged = fx.cell(0, 0);
    assert_spans(&fx.doc, merged, 2, 2);
    assert_eq!(fx.doc.first_insertion_in(merged), Some(caret.start()));
    assert_grid_consistent(&mut fx.doc, fx.table);
}

#[test]
fn test_merge_keeps_content_in_reading_order() {
    let mut fx = TableBuilder::new()
        .row(&["a", "", "c"])
        .row(&["d", "e", ""])
        .build();
    let group = row_groups(&fx.doc, fx.table)[0];

    merge_cell_range(&mut fx.doc, group, 0, 1, 1, 2).unwrap().unwrap();

    assert_eq!(fx.doc.plain_text(fx.cell(0, 1)), "c\ne");
    assert_eq!(cell_texts(&fx.doc, fx.table), vec![vec!["a", "c\ne"], vec!["d"]]);
    assert_grid_consistent(&mut fx.doc, fx.table);
}

#[test]
fn test_merge_then_split_restores_two_cells() {
    let mut fx = TableBuilder::grid(2, 2).build();
    let group = row_groups(&fx.doc, fx.table)[0];

    let caret = merge_cell_range(&mut fx.doc, group, 0, 0, 0, 1).unwrap().unwrap();
    assert_eq!(cell_spans(&fx.doc, fx.table)[0], vec![(2, 1)]);

    split_cell(&mut fx.doc, caret, 1, 0).unwrap().unwrap();

    assert_eq!(cell_spans(&fx.doc, fx.table)[0], vec![(1, 1), (1, 1)]);
    assert_grid_consistent(&mut fx.doc, fx.table);
}

#[test_case(0, 1, 1, 2 ; "wide cell reaches out on the left")]
#[test_case(0, 1, 0, 3 ; "columns past the end")]
#[test_case(1, 3, 0, 0 ; "rows past the end")]
#[test_case(1, 0, 0, 0 ; "rows reversed")]
#[test_case(0, 0, 2, 1 ; "columns reversed")]
fn test_infeasible_merge_leaves_table_untouched(
    top: usize,
    bottom: usize,
    left: usize,
    right: usize,
) {
    // | wide      | x |
    // | a | b     | c |
    let mut fx = TableBuilder::new()
        .spanning_row(&[("wide", 2, 1), ("x", 1, 1)])
        .row(&["a", "b", "c"])
        .build();
    let group = row_groups(&fx.doc, fx.table)[0];
    let before = TableSpec::snapshot(&fx.doc, fx.table);

    let caret = merge_cell_range(&mut fx.doc, group, top, bottom, left, right).unwrap();

    assert!(caret.is_none());
    assert_eq!(TableSpec::snapshot(&fx.doc, fx.table), before);
}

#[test]
fn test_merge_refuses_rows_of_different_width() {
    // Row 1 is short: only two of three columns are occupied
    let mut fx = TableBuilder::new()
        .row(&["a", "b", "c"])
        .row(&["d", "e"])
        .build();
    let group = row_groups(&fx.doc, fx.table)[0];

    assert!(merge_cell_range(&mut fx.doc, group, 0, 1, 0, 1)
        .unwrap()
        .is_none());
}

#[test]
fn test_merge_selection_of_spanning_cells() {
    // | A (2 rows) | b |
    // |            | c |
    // | d          | e |
    let mut fx = TableBuilder::new()
        .spanning_row(&[("A", 1, 2), ("b", 1, 1)])
        .row(&["c"])
        .row(&["d", "e"])
        .build();
    let selection = cell_segment(&fx.doc, fx.cell(0, 0), fx.cell(1, 0)).unwrap();

    merge_cells(&mut fx.doc, selection).unwrap().unwrap();

    let merged = fx.cell(0, 0);
    assert_eq!(fx.doc.plain_text(merged), "A\nb\nc");
    // The two merged rows collapse into one, so the span shrinks to match
    assert_spans(&fx.doc, merged, 2, 1);
    assert_eq!(cell_texts(&fx.doc, fx.table), vec![vec!["A\nb\nc"], vec!["d", "e"]]);
    assert_grid_consistent(&mut fx.doc, fx.table);
}

#[test]
fn test_merge_across_groups_is_refused() {
    let mut fx = TableBuilder::new()
        .row(&["h0", "h1"])
        .group()
        .row(&["b0", "b1"])
        .build();
    let selection = cell_segment(&fx.doc, fx.cell(0, 0), fx.cell(1, 1)).unwrap();

    assert!(merge_cells(&mut fx.doc, selection).unwrap().is_none());
    assert_eq!(fx.rows().len(), 2);
}

#[test_case(1, vec![(2, 2), (1, 2)] ; "one carved cell")]
#[test_case(2, vec![(1, 2), (1, 2), (1, 2)] ; "every column")]
#[test_case(9, vec![(1, 2), (1, 2), (1, 2)] ; "count clamped")]
fn test_split_carves_columns(horizontal: usize, expected: Vec<(usize, usize)>) {
    let mut fx = TableBuilder::new()
        .spanning_row(&[("big", 3, 2)])
        .row(&[])
        .row(&["x", "y", "z"])
        .build();
    let selection = cell_segment(&fx.doc, fx.cell(0, 0), fx.cell(0, 0)).unwrap();

    split_cell(&mut fx.doc, selection, horizontal, 0).unwrap().unwrap();

    assert_eq!(cell_spans(&fx.doc, fx.table)[0], expected);
    assert_eq!(fx.doc.plain_text(fx.cell(0, 0)), "big");
    assert_grid_consistent(&mut fx.doc, fx.table);
}

#[test]
fn test_vertical_split_alone_does_nothing() {
    let mut fx = TableBuilder::new()
        .spanning_row(&[("tall", 1, 2), ("a", 1, 1)])
        .row(&["b"])
        .build();
    let selection = cell_segment(&fx.doc, fx.cell(0, 0), fx.cell(0, 0)).unwrap();

    assert!(split_cell(&mut fx.doc, selection, 0, 1).unwrap().is_none());
    assert_spans(&fx.doc, fx.cell(0, 0), 1, 2);
}
