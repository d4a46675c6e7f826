//! Row insertion and deletion against whole documents.
//!
//! Every edit is followed by a full grid check: row widths add up to the
//! column count and row indices match row positions.
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
use docgrid::editor::{delete_row_interval, delete_rows, insert_rows, InsertSide};
use docgrid::selection::cell_segment;
use docgrid::table::row_groups;
use docgrid::{EditorConfig, TableEditor};
use fixtures::TableBuilder;
use test_case::test_case;

#[test_case(1, 2, 0, 1, InsertSide::Before ; "one row before")]
#[test_case(1, 2, 0, 1, InsertSide::After ; "one row after")]
#[test_case(3, 3, 1, 2, InsertSide::Before ; "two rows into the middle")]
#[test_case(3, 1, 2, 4, InsertSide::After ; "four rows at the end")]
fn test_insert_rows_into_grid(
    rows: usize,
    columns: usize,
    reference: usize,
    count: usize,
    side: InsertSide,
) {
    let mut fx = TableBuilder::grid(rows, columns).build();
    let row = fx.row(reference);

    let range = insert_rows(&mut fx.doc, row, count, side).unwrap().unwrap();

    assert_eq!(fx.rows().len(), rows + count);
    assert_eq!(range.segments().len(), count);
    let first_new = match side {
        InsertSide::Before => reference,
        InsertSide::After => reference + 1,
    };
    for offset in 0..count {
        let texts = &cell_texts(&fx.doc, fx.table)[first_new + offset];
        assert_eq!(texts.len(), columns);
        assert!(texts.iter().all(String::is_empty));
    }
    assert_grid_consistent(&mut fx.doc, fx.table);
}

#[test]
fn test_insert_after_last_row_leaves_existing_span() {
    // | A (2 rows) | B |
    // |            | C |
    let mut fx = TableBuilder::new()
        .spanning_row(&[("A", 1, 2), ("B", 1, 1)])
        .row(&["C"])
        .build();
    let a = fx.cell(0, 0);
    let last = fx.row(1);

    insert_rows(&mut fx.doc, last, 1, InsertSide::After).unwrap();

    assert_eq!(fx.rows().len(), 3);
    assert_spans(&fx.doc, a, 1, 2);
    assert_eq!(cell_texts(&fx.doc, fx.table)[2].len(), 2);
    assert_grid_consistent(&mut fx.doc, fx.table);
}

#[test]
fn test_insert_between_spanned_rows_grows_the_span() {
    let mut fx = TableBuilder::new()
        .spanning_row(&[("A", 1, 2), ("B", 1, 1)])
        .row(&["C"])
        .build();
    let a = fx.cell(0, 0);
    let first = fx.row(0);

    insert_rows(&mut fx.doc, first, 2, InsertSide::After).unwrap();

    assert_spans(&fx.doc, a, 1, 4);
    assert_eq!(
        cell_texts(&fx.doc, fx.table),
        vec![vec!["A", "B"], vec![""], vec![""], vec!["C"]]
    );
    assert_grid_consistent(&mut fx.doc, fx.table);
}

#[test_case(InsertSide::After, 3 ; "below the tallest selected cell")]
#[test_case(InsertSide::Before, 0 ; "above the selection")]
fn test_editor_inserts_outside_a_selection_with_a_tall_first_cell(
    side: InsertSide,
    new_row: usize,
) {
    // | A (3 rows) | B |
    // |            | C |
    // |            | D |
    let fx = TableBuilder::new()
        .spanning_row(&[("A", 1, 3), ("B", 1, 1)])
        .row(&["C"])
        .row(&["D"])
        .build();
    let a = fx.cell(0, 0);
    let selection = fx.select_in_row(0, 0, 1);
    let mut editor = TableEditor::with_document(fx.doc.clone(), EditorConfig::default());

    let range = editor.insert_rows(selection, 1, side).unwrap().unwrap();

    let doc = editor.document();
    assert_eq!(range.segments().len(), 1);
    assert_spans(doc, a, 1, 3);
    let mut expected = vec![
        vec!["A".to_string(), "B".to_string()],
        vec!["C".to_string()],
        vec!["D".to_string()],
    ];
    expected.insert(new_row, vec![String::new(), String::new()]);
    assert_eq!(cell_texts(doc, fx.table), expected);

    let mut doc = doc.clone();
    assert_grid_consistent(&mut doc, fx.table);
}

#[test]
fn test_inserted_row_copies_column_spans() {
    let mut fx = TableBuilder::new()
        .spanning_row(&[("wide", 2, 1), ("x", 1, 1)])
        .row(&["a", "b", "c"])
        .build();
    let first = fx.row(0);

    insert_rows(&mut fx.doc, first, 1, InsertSide::Before).unwrap();

    assert_eq!(cell_spans(&fx.doc, fx.table)[0], vec![(2, 1), (1, 1)]);
    assert_grid_consistent(&mut fx.doc, fx.table);
}

#[test]
fn test_delete_selected_rows() {
    let mut fx = TableBuilder::grid(4, 2).build();
    let mut selection = cell_segment(&fx.doc, fx.cell(1, 1), fx.cell(2, 0)).unwrap();
    let start = selection.start();

    assert!(delete_rows(&mut fx.doc, &mut selection).unwrap());

    assert!(selection.is_empty());
    assert_eq!(selection.start(), start);
    assert_eq!(
        cell_texts(&fx.doc, fx.table),
        vec![vec!["r0c0", "r0c1"], vec!["r3c0", "r3c1"]]
    );
    assert_grid_consistent(&mut fx.doc, fx.table);
}

#[test]
fn test_delete_rows_follows_spans_of_boundary_cells() {
    // | A (2 rows) | B |
    // |            | C |
    // | D          | E |
    let mut fx = TableBuilder::new()
        .spanning_row(&[("A", 1, 2), ("B", 1, 1)])
        .row(&["C"])
        .row(&["D", "E"])
        .build();
    let mut selection = cell_segment(&fx.doc, fx.cell(0, 0), fx.cell(0, 0)).unwrap();

    assert!(delete_rows(&mut fx.doc, &mut selection).unwrap());

    assert_eq!(cell_texts(&fx.doc, fx.table), vec![vec!["D", "E"]]);
    assert_grid_consistent(&mut fx.doc, fx.table);
}

#[test]
fn test_delete_interval_moves_surviving_span_down() {
    let mut fx = TableBuilder::new()
        .spanning_row(&[("A", 1, 2), ("B", 1, 1)])
        .row(&["C"])
        .row(&["D", "E"])
        .build();
    let group = row_groups(&fx.doc, fx.table)[0];

    assert!(delete_row_interval(&mut fx.doc, group, 0, 0).unwrap());

    assert_eq!(
        cell_texts(&fx.doc, fx.table),
        vec![vec!["", "C"], vec!["D", "E"]]
    );
    assert_spans(&fx.doc, fx.cell(0, 0), 1, 1);
    assert_grid_consistent(&mut fx.doc, fx.table);
}

#[test]
fn test_delete_interval_shortens_span_from_above() {
    let mut fx = TableBuilder::new()
        .spanning_row(&[("A", 1, 3), ("B", 1, 1)])
        .row(&["C"])
        .row(&["D"])
        .build();
    let group = row_groups(&fx.doc, fx.table)[0];
    let a = fx.cell(0, 0);

    assert!(delete_row_interval(&mut fx.doc, group, 1, 1).unwrap());

    assert_spans(&fx.doc, a, 1, 2);
    assert_eq!(cell_texts(&fx.doc, fx.table), vec![vec!["A", "B"], vec!["D"]]);
    assert_grid_consistent(&mut fx.doc, fx.table);
}

#[test]
fn test_delete_every_row_removes_the_table() {
    let mut fx = TableBuilder::grid(2, 2).build();
    let mut selection = cell_segment(&fx.doc, fx.cell(0, 0), fx.cell(1, 1)).unwrap();

    assert!(delete_rows(&mut fx.doc, &mut selection).unwrap());

    assert!(!fx.doc.is_attached(fx.table));
    assert!(fx.doc.is_attached(fx.before));
    assert!(fx.doc.is_attached(fx.after));
}

#[test]
fn test_delete_every_row_of_one_group_removes_the_group() {
    let mut fx = TableBuilder::new()
        .row(&["h0", "h1"])
        .group()
        .row(&["b0", "b1"])
        .row(&["c0", "c1"])
        .build();
    let header = row_groups(&fx.doc, fx.table)[0];

    assert!(delete_row_interval(&mut fx.doc, header, 0, 0).unwrap());

    assert!(fx.doc.is_attached(fx.table));
    assert_eq!(row_groups(&fx.doc, fx.table).len(), 1);
    assert_eq!(cell_texts(&fx.doc, fx.table)[0], vec!["b0", "b1"]);
    assert_grid_consistent(&mut fx.doc, fx.table);
}

#[test]
fn test_delete_refuses_selection_across_groups() {
    let mut fx = TableBuilder::new()
        .row(&["h0", "h1"])
        .group()
        .row(&["b0", "b1"])
        .build();
    let mut selection = cell_segment(&fx.doc, fx.cell(0, 0), fx.cell(1, 1)).unwrap();
    let before = selection;

    assert!(!delete_rows(&mut fx.doc, &mut selection).unwrap());
    assert_eq!(selection, before);
    assert_eq!(fx.rows().len(), 2);
}

#[test]
fn test_row_edit_sequence_keeps_grid_consistent() {
    let mut fx = TableBuilder::new()
        .spanning_row(&[("A", 2, 3), ("B", 1, 1)])
        .row(&["C"])
        .row(&["D"])
        .row(&["E", "F", "G"])
        .build();
    let group = row_groups(&fx.doc, fx.table)[0];

    let row = fx.row(1);
    insert_rows(&mut fx.doc, row, 1, InsertSide::Before).unwrap();
    assert_grid_consistent(&mut fx.doc, fx.table);
    let row = fx.row(4);
    insert_rows(&mut fx.doc, row, 2, InsertSide::After).unwrap();
    assert_grid_consistent(&mut fx.doc, fx.table);
    delete_row_interval(&mut fx.doc, group, 2, 4).unwrap();
    assert_grid_consistent(&mut fx.doc, fx.table);
    delete_row_interval(&mut fx.doc, group, 0, 0).unwrap();
    assert_grid_consistent(&mut fx.doc, fx.table);
}
