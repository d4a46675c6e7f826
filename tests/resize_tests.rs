//! Interactive column resize sessions.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;
mod fixtures;

use docgrid::doc::ColumnWidth;
use docgrid::editor::{insert_column, start_column_resize};
use docgrid::layout::TableColumnLayout;
use docgrid::{EditorConfig, TableEditor, TableSpec};
use fixtures::TableBuilder;
use test_case::test_case;

const AUTOFIT: f64 = 600.0;
const TOLERANCE: f64 = 4.0;

fn fixed(widths: &[f64]) -> Vec<ColumnWidth> {
    widths.iter().map(|&w| ColumnWidth::Fixed(w)).collect()
}

fn column_widths(fx: &fixtures::TableFixture) -> Vec<ColumnWidth> {
    let props = fx.doc.table_props(fx.table).unwrap();
    props.columns.iter().map(|c| c.width).collect()
}

#[test_case(0.0, 350.0 ; "collapsed borders")]
#[test_case(5.0, 335.0 ; "with cell spacing")]
fn test_rightmost_column_drags_into_unused_width(spacing: f64, expected: f64) {
    let fx = TableBuilder::grid(2, 2)
        .columns(fixed(&[100.0, 150.0]))
        .cell_spacing(spacing)
        .build();
    let layout = TableColumnLayout::compute(&fx.doc, fx.table, AUTOFIT).unwrap();
    let rect = layout.column_rect(1).unwrap();

    let session =
        start_column_resize(&fx.doc, fx.table, rect.x + rect.width, AUTOFIT, TOLERANCE).unwrap();

    assert_eq!(session.column(), 1);
    assert_eq!(session.right_drag_max(), expected);
    assert_eq!(session.left_drag_max(), 150.0);
}

#[test]
fn test_overfull_table_cannot_grow() {
    let fx = TableBuilder::grid(1, 2).columns(fixed(&[400.0, 400.0])).build();

    let session = start_column_resize(&fx.doc, fx.table, 800.0, AUTOFIT, TOLERANCE).unwrap();

    assert_eq!(session.right_drag_max(), 0.0);
}

#[test]
fn test_pointer_away_from_borders_starts_nothing() {
    let fx = TableBuilder::grid(1, 3).build();
    // Auto columns of 200 each: borders at 200, 400 and 600
    assert!(start_column_resize(&fx.doc, fx.table, 300.0, AUTOFIT, TOLERANCE).is_none());
    assert!(start_column_resize(&fx.doc, fx.table, 197.0, AUTOFIT, TOLERANCE).is_some());
}

#[test]
fn test_preview_clamps_to_neighbour() {
    let fx = TableBuilder::grid(1, 3).columns(fixed(&[100.0, 100.0, 100.0])).build();
    let mut session = start_column_resize(&fx.doc, fx.table, 100.0, AUTOFIT, TOLERANCE).unwrap();

    assert_eq!(session.update_drag(130.0), 30.0);
    assert_eq!(session.rect().width, 130.0);
    assert_eq!(session.update_drag(500.0), 100.0);
    assert_eq!(session.update_drag(-500.0), -100.0);
    assert_eq!(session.rect().width, 0.0);
    session.dispose();
}

#[test]
fn test_commit_pins_every_column() {
    let mut fx = TableBuilder::grid(1, 3).build();
    let session = start_column_resize(&fx.doc, fx.table, 400.0, AUTOFIT, TOLERANCE).unwrap();

    assert!(session.commit(&mut fx.doc, 350.0).unwrap());

    assert_eq!(column_widths(&fx), fixed(&[200.0, 150.0, 250.0]));
}

#[test]
fn test_dispose_leaves_the_table_alone() {
    let fx = TableBuilder::grid(1, 2).build();
    let session = start_column_resize(&fx.doc, fx.table, 300.0, AUTOFIT, TOLERANCE).unwrap();

    session.dispose();

    assert!(column_widths(&fx).is_empty());
}

#[test]
fn test_commit_refused_after_structure_change() {
    let mut fx = TableBuilder::grid(1, 2).build();
    let session = start_column_resize(&fx.doc, fx.table, 300.0, AUTOFIT, TOLERANCE).unwrap();
    insert_column(&mut fx.doc, fx.table, Some(1)).unwrap();
    let before = column_widths(&fx);

    assert!(!session.commit(&mut fx.doc, 320.0).unwrap());
    assert_eq!(column_widths(&fx), before);
}

#[test]
fn test_editor_commit_counts_as_one_action() {
    let mut editor = TableEditor::new(EditorConfig::default());
    let table = editor.insert_table(&TableSpec::grid(2, 2)).unwrap();
    editor.clear_dirty();
    let revision = editor.revision();

    let session = editor.start_column_resize(table, 301.0).unwrap();
    assert!(editor.commit_column_resize(session, 250.0).unwrap());

    assert_eq!(editor.revision(), revision + 1);
    assert!(editor.dirty_tables().contains(&table));
    let widths: Vec<ColumnWidth> = editor
        .document()
        .table_props(table)
        .unwrap()
        .columns
        .iter()
        .map(|c| c.width)
        .collect();
    assert_eq!(widths, fixed(&[249.0, 351.0]));
}
