//! Boundary classification and cell ranges over whole documents.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;
mod fixtures;

use docgrid::doc::{LogicalDirection, TextPosition};
use docgrid::editor::merge_cells;
use docgrid::selection::{
    boundary_cells, build_cell_range, build_range, cell_segment, classify, ClassifiedRange,
    ColumnBounds,
};
use fixtures::TableBuilder;
use test_case::test_case;

fn spanned_fixture() -> fixtures::TableFixture {
    // | A (2x2)   | b |
    // |           | c |
    // | d | e     | f |
    TableBuilder::new()
        .spanning_row(&[("A", 2, 2), ("b", 1, 1)])
        .row(&["c"])
        .row(&["d", "e", "f"])
        .build()
}

#[test]
fn test_equal_positions_never_cross_a_boundary() {
    let fx = spanned_fixture();
    let end = fx.doc.document_end();
    for offset in 0..=end {
        for direction in [LogicalDirection::Forward, LogicalDirection::Backward] {
            let p = TextPosition::new(offset, direction);
            assert!(classify(&fx.doc, p, p).is_none(), "offset {offset} {direction:?}");
        }
    }
}

#[test]
fn test_classification_is_symmetric_in_cells() {
    let fx = spanned_fixture();
    let a = fx.inside(0, 1);
    let b = fx.inside(2, 0);
    let forward = classify(&fx.doc, a, b);
    let backward = classify(&fx.doc, b, a);
    assert_eq!(forward.cells(), Some((fx.cell(0, 1), fx.cell(2, 0))));
    assert_eq!(backward.cells(), Some((fx.cell(2, 0), fx.cell(0, 1))));
    assert_eq!(forward.common_ancestor, backward.common_ancestor);
}

#[test_case((0, 0), (0, 0), 0, 1, 1 ; "merged cell alone")]
#[test_case((0, 1), (1, 0), 2, 2, 2 ; "right column")]
#[test_case((0, 0), (2, 2), 0, 2, 3 ; "everything")]
#[test_case((2, 1), (2, 2), 1, 2, 1 ; "bottom row right half")]
fn test_rectangle_bounds(
    from: (usize, usize),
    to: (usize, usize),
    first: usize,
    last: usize,
    segments: usize,
) {
    let fx = spanned_fixture();
    let range = build_cell_range(&fx.doc, fx.cell(from.0, from.1), fx.cell(to.0, to.1)).unwrap();
    assert_eq!(range.columns, ColumnBounds::Range { first, last });
    assert_eq!(range.segments().len(), segments);
    assert_eq!(range.table, fx.table);
}

#[test]
fn test_selection_leaving_the_table_selects_whole_rows() {
    let fx = TableBuilder::grid(3, 2).build();
    let outside = fx.in_after_paragraph();

    let Some(ClassifiedRange::CrossTable(segment)) = build_range(&fx.doc, fx.inside(1, 1), outside)
    else {
        panic!("expected a cross-table segment");
    };
    let row_start = fx.doc.element_start(fx.row(1)).unwrap();
    assert_eq!(segment.start().offset(), row_start);
    assert_eq!(segment.end(), outside);
}

#[test]
fn test_selection_around_a_table_is_plain_text() {
    let fx = TableBuilder::grid(2, 2).build();
    let start = fx.in_before_paragraph();
    let end = fx.in_after_paragraph();

    assert!(classify(&fx.doc, start, end).is_none());
    assert_eq!(build_range(&fx.doc, start, end), None);
    assert_eq!(boundary_cells(&fx.doc, start, end), None);
}

#[test]
fn test_stale_layout_falls_back_to_whole_rows() {
    let fx = TableBuilder::grid(3, 4).without_layout().build();
    let Some(ClassifiedRange::Cells(range)) = build_range(&fx.doc, fx.inside(0, 1), fx.inside(1, 2))
    else {
        panic!("expected a cell range");
    };
    assert_eq!(range.columns, ColumnBounds::All);
    assert_eq!(
        range.segments(),
        &[
            cell_segment(&fx.doc, fx.cell(0, 0), fx.cell(0, 3)).unwrap(),
            cell_segment(&fx.doc, fx.cell(1, 0), fx.cell(1, 3)).unwrap(),
        ]
    );
}

#[test]
fn test_edits_refresh_stale_layout_first() {
    let mut fx = TableBuilder::grid(2, 3).without_layout().build();
    let selection = fx.select_in_row(0, 1, 2);

    merge_cells(&mut fx.doc, selection).unwrap().unwrap();

    assert_eq!(common::cell_spans(&fx.doc, fx.table)[0], vec![(1, 1), (2, 1)]);
    common::assert_grid_consistent(&mut fx.doc, fx.table);
}
