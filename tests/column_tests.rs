//! Column insertion and deletion across spanned grids.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;
mod fixtures;

use common::{assert_grid_consistent, assert_spans, cell_texts, column_indices};
use docgrid::doc::ColumnWidth;
use docgrid::editor::{delete_column, delete_columns, insert_column, insert_columns, InsertSide};
use docgrid::table::column_count;
use fixtures::TableBuilder;
use test_case::test_case;

#[test]
fn test_delete_first_column_of_two() {
    let mut fx = TableBuilder::grid(3, 2).build();

    assert!(delete_column(&mut fx.doc, fx.table, 0).unwrap());

    assert_eq!(column_count(&fx.doc, fx.table), 1);
    assert_eq!(
        column_indices(&fx.doc, fx.table),
        vec![vec![Some(0)], vec![Some(0)], vec![Some(0)]]
    );
    assert_grid_consistent(&mut fx.doc, fx.table);
}

#[test_case(None, vec!["", "r0c0", "r0c1", "r0c2"] ; "leading edge")]
#[test_case(Some(0), vec!["r0c0", "", "r0c1", "r0c2"] ; "after first")]
#[test_case(Some(2), vec!["r0c0", "r0c1", "r0c2", ""] ; "trailing edge")]
fn test_insert_column_position(after: Option<usize>, expected: Vec<&str>) {
    let mut fx = TableBuilder::grid(2, 3).build();

    insert_column(&mut fx.doc, fx.table, after).unwrap();

    assert_eq!(column_count(&fx.doc, fx.table), 4);
    assert_eq!(cell_texts(&fx.doc, fx.table)[0], expected);
    assert_grid_consistent(&mut fx.doc, fx.table);
}

#[test]
fn test_insert_column_through_spans() {
    // | wide          | x |
    // | A (2 rows) | b | c |
    // |            | d | e |
    let mut fx = TableBuilder::new()
        .spanning_row(&[("wide", 2, 1), ("x", 1, 1)])
        .spanning_row(&[("A", 1, 2), ("b", 1, 1), ("c", 1, 1)])
        .row(&["d", "e"])
        .build();
    let wide = fx.cell(0, 0);

    insert_column(&mut fx.doc, fx.table, Some(0)).unwrap();

    assert_spans(&fx.doc, wide, 3, 1);
    assert_eq!(cell_texts(&fx.doc, fx.table)[1], vec!["A", "", "b", "c"]);
    assert_spans(&fx.doc, fx.cell(1, 1), 1, 2);
    assert_eq!(cell_texts(&fx.doc, fx.table)[2], vec!["d", "e"]);
    assert_grid_consistent(&mut fx.doc, fx.table);
}

fn column_widths(fx: &fixtures::TableFixture) -> Vec<ColumnWidth> {
    let props = fx.doc.table_props(fx.table).unwrap();
    props.columns.iter().map(|c| c.width).collect()
}

#[test]
fn test_column_definitions_follow_the_grid() {
    let mut fx = TableBuilder::grid(1, 2)
        .columns(vec![ColumnWidth::Fixed(30.0), ColumnWidth::Fixed(70.0)])
        .build();

    insert_column(&mut fx.doc, fx.table, Some(1)).unwrap();
    let widths = column_widths(&fx);
    assert_eq!(
        widths,
        vec![
            ColumnWidth::Fixed(30.0),
            ColumnWidth::Fixed(70.0),
            ColumnWidth::Fixed(70.0)
        ]
    );

    delete_column(&mut fx.doc, fx.table, 0).unwrap();
    let widths = column_widths(&fx);
    assert_eq!(widths, vec![ColumnWidth::Fixed(70.0), ColumnWidth::Fixed(70.0)]);
}

#[test]
fn test_delete_column_under_a_tall_cell() {
    let mut fx = TableBuilder::new()
        .spanning_row(&[("A", 1, 2), ("b", 1, 1)])
        .row(&["c"])
        .build();

    assert!(delete_column(&mut fx.doc, fx.table, 0).unwrap());

    assert_eq!(cell_texts(&fx.doc, fx.table), vec![vec!["b"], vec!["c"]]);
    assert_grid_consistent(&mut fx.doc, fx.table);
}

#[test_case(0 ; "nothing")]
#[test_case(3 ; "every column")]
#[test_case(5 ; "past the end")]
fn test_delete_columns_refuses(count: usize) {
    let mut fx = TableBuilder::grid(2, 3).build();
    let selection = fx.select_in_row(0, 0, 0);

    assert!(!delete_columns(&mut fx.doc, selection, count).unwrap());
    assert_eq!(column_count(&fx.doc, fx.table), 3);
}

#[test]
fn test_delete_columns_from_the_selected_column() {
    let mut fx = TableBuilder::grid(2, 4).build();
    let selection = fx.select_in_row(1, 1, 1);

    assert!(delete_columns(&mut fx.doc, selection, 2).unwrap());

    assert_eq!(
        cell_texts(&fx.doc, fx.table),
        vec![vec!["r0c0", "r0c3"], vec!["r1c0", "r1c3"]]
    );
    assert_grid_consistent(&mut fx.doc, fx.table);
}

#[test_case(InsertSide::Before, vec!["r0c0", "", "", "r0c1", "r0c2"] ; "before")]
#[test_case(InsertSide::After, vec!["r0c0", "r0c1", "r0c2", "", ""] ; "after")]
fn test_insert_columns_beside_selection(side: InsertSide, expected: Vec<&str>) {
    let mut fx = TableBuilder::grid(2, 3).build();
    let selection = fx.select_in_row(1, 1, 2);

    assert!(insert_columns(&mut fx.doc, selection, 2, side).unwrap());

    assert_eq!(cell_texts(&fx.doc, fx.table)[0], expected);
    assert_grid_consistent(&mut fx.doc, fx.table);
}

#[test]
fn test_column_ops_outside_tables_do_nothing() {
    let mut fx = TableBuilder::grid(2, 2).build();
    let position = fx.in_before_paragraph();
    let selection = docgrid::TextSegment::collapsed(position);

    assert!(!insert_columns(&mut fx.doc, selection, 1, InsertSide::After).unwrap());
    assert!(!delete_columns(&mut fx.doc, selection, 1).unwrap());
    assert_eq!(column_count(&fx.doc, fx.table), 2);
}
