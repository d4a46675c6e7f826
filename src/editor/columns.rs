//! Column insertion and deletion.
//!
//! Columns only exist implicitly, as the union of cell spans. Every
//! primitive edits the cells stored in each row; cells that span down from
//! an earlier row are handled once, in the row that stores them.

use super::InsertSide;
use crate::doc::{Document, NodeId, TextSegment};
use crate::error::Result;
use crate::layout::{check_grid, validate_structure};
use crate::selection::{boundary_cells, column_bounds};
use crate::table::{
    cells, column_count, column_range, copy_cell_structure, correct_group_borders, row_groups,
    rows, table_of_cell,
};

/// Cell stored in `row` that occupies `column`
fn stored_cell_at(doc: &Document, row: NodeId, column: usize) -> Option<NodeId> {
    cells(doc, row).iter().copied().find(|&c| {
        column_range(doc, c).is_some_and(|(first, last)| first <= column && column <= last)
    })
}

/// Insert one column after grid column `after` (`None`: before the first
/// column).
///
/// In every row the cell occupying that column grows by one when it already
/// spans several columns; otherwise a structural copy is placed next to it.
///
/// # Errors
/// Fails if `table` is not a table.
pub fn insert_column(doc: &mut Document, table: NodeId, after: Option<usize>) -> Result<()> {
    let count = validate_structure(doc, table)?;
    let target = after.map_or(0, |c| c.min(count.saturating_sub(1)));

    for group in row_groups(doc, table).to_vec() {
        for row in rows(doc, group).to_vec() {
            let Some(cell) = stored_cell_at(doc, row, target) else {
                continue;
            };
            let props = doc.require_cell_mut(cell)?;
            if props.column_span > 1 {
                props.column_span += 1;
                continue;
            }
            let copy = copy_cell_structure(doc, cell)?;
            let index = doc.child_index(cell).unwrap_or(0);
            let at = if after.is_some() { index + 1 } else { index };
            doc.insert_child(row, at, copy)?;
        }
    }

    if let Some(props) = doc.table_props_mut(table) {
        let position = after.map_or(0, |c| c + 1);
        if position <= props.columns.len() && !props.columns.is_empty() {
            let neighbour = after.unwrap_or(0).min(props.columns.len() - 1);
            let def = props.columns.get(neighbour).copied().unwrap_or_default();
            props.columns.insert(position, def);
        }
    }

    validate_structure(doc, table)?;
    check_grid(doc, table)?;
    for group in row_groups(doc, table).to_vec() {
        correct_group_borders(doc, table, group)?;
    }
    Ok(())
}

/// Delete grid column `column`: single-column cells are removed and wider
/// cells shrink by one.
///
/// Returns `false` for the table's only column or a column past the end.
///
/// # Errors
/// Fails if `table` is not a table.
pub fn delete_column(doc: &mut Document, table: NodeId, column: usize) -> Result<bool> {
    let count = validate_structure(doc, table)?;
    if count <= 1 || column >= count {
        log::debug!("delete_column: refusing column {column} of {count}");
        return Ok(false);
    }

    for group in row_groups(doc, table).to_vec() {
        for row in rows(doc, group).to_vec() {
            let Some(cell) = stored_cell_at(doc, row, column) else {
                continue;
            };
            let props = doc.require_cell_mut(cell)?;
            if props.column_span > 1 {
                props.column_span -= 1;
            } else {
                doc.detach(cell);
            }
        }
    }

    if let Some(props) = doc.table_props_mut(table) {
        if column < props.columns.len() {
            props.columns.remove(column);
        }
    }

    validate_structure(doc, table)?;
    check_grid(doc, table)?;
    for group in row_groups(doc, table).to_vec() {
        correct_group_borders(doc, table, group)?;
    }
    Ok(true)
}

/// Selected table and grid columns, with layout refreshed
fn selected_columns(
    doc: &mut Document,
    selection: TextSegment,
) -> Result<Option<(NodeId, usize, usize)>> {
    let Some((a, b)) = boundary_cells(doc, selection.start(), selection.end()) else {
        return Ok(None);
    };
    let Some(table) = table_of_cell(doc, a) else {
        return Ok(None);
    };
    validate_structure(doc, table)?;
    Ok(column_bounds(doc, a, b).map(|(first, last)| (table, first, last)))
}

/// Insert `count` columns beside the selected columns
///
/// # Errors
/// Fails on a malformed table.
pub fn insert_columns(
    doc: &mut Document,
    selection: TextSegment,
    count: usize,
    side: InsertSide,
) -> Result<bool> {
    if count == 0 {
        return Ok(false);
    }
    let Some((table, first, last)) = selected_columns(doc, selection)? else {
        log::debug!("insert_columns: selection is not in table cells");
        return Ok(false);
    };
    let after = match side {
        InsertSide::Before => first.checked_sub(1),
        InsertSide::After => Some(last),
    };
    for _ in 0..count {
        insert_column(doc, table, after)?;
    }
    Ok(true)
}

/// Delete `count` columns starting at the first selected column.
///
/// Refuses to delete nothing or every column.
///
/// # Errors
/// Fails on a malformed table.
pub fn delete_columns(doc: &mut Document, selection: TextSegment, count: usize) -> Result<bool> {
    let Some((table, first, _)) = selected_columns(doc, selection)? else {
        log::debug!("delete_columns: selection is not in table cells");
        return Ok(false);
    };
    let total = column_count(doc, table);
    if count == 0 || count >= total || first + count > total {
        log::debug!("delete_columns: refusing {count} of {total} columns at {first}");
        return Ok(false);
    }
    for _ in 0..count {
        if !delete_column(doc, table, first)? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::doc::ColumnWidth;
    use crate::error::TableError;
    use crate::selection::cell_segment;
    use crate::table::{is_regular, table_rows, CellSpec, TableSpec};

    fn build(spec: &TableSpec) -> (Document, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let table = spec.build(&mut doc, root, &EditorConfig::default()).unwrap();
        validate_structure(&mut doc, table).unwrap();
        (doc, table)
    }

    fn texts(doc: &Document, table: NodeId) -> Vec<Vec<String>> {
        table_rows(doc, table)
            .into_iter()
            .map(|row| cells(doc, row).iter().map(|&c| doc.plain_text(c)).collect())
            .collect()
    }

    fn select(doc: &Document, table: NodeId, row: usize, from: usize, to: usize) -> TextSegment {
        let row = table_rows(doc, table)[row];
        let row_cells = cells(doc, row);
        cell_segment(doc, row_cells[from], row_cells[to]).unwrap()
    }

    #[test]
    fn test_delete_first_of_two_columns() {
        let (mut doc, table) = build(&TableSpec::grid(3, 2));
        assert!(delete_column(&mut doc, table, 0).unwrap());

        assert_eq!(column_count(&doc, table), 1);
        for row in table_rows(&doc, table) {
            for &cell in cells(&doc, row) {
                assert_eq!(doc.cell_props(cell).unwrap().column_index, Some(0));
            }
        }
        assert_eq!(texts(&doc, table)[2], vec!["r2c1"]);
        // The surviving column is now the table's left edge
        let cell = cells(&doc, table_rows(&doc, table)[1])[0];
        assert_eq!(doc.cell_props(cell).unwrap().borders.left, 1.0);
    }

    #[test]
    fn test_refuses_only_column() {
        let (mut doc, table) = build(&TableSpec::grid(2, 1));
        assert!(!delete_column(&mut doc, table, 0).unwrap());
        assert!(!delete_column(&mut doc, table, 5).unwrap());
    }

    #[test]
    fn test_insert_grows_wide_cells() {
        // | wide      |
        // | a | b     |
        let (mut doc, table) = build(&TableSpec::from_rows(vec![
            vec![CellSpec::spanning("wide", 2, 1)],
            vec![CellSpec::new("a"), CellSpec::new("b")],
        ]));
        insert_column(&mut doc, table, Some(0)).unwrap();

        assert_eq!(column_count(&doc, table), 3);
        assert_eq!(texts(&doc, table), vec![vec!["wide"], vec!["a", "", "b"]]);
        let wide = cells(&doc, table_rows(&doc, table)[0])[0];
        assert_eq!(doc.cell_props(wide).unwrap().column_span, 3);
        assert!(is_regular(&doc, table));
    }

    #[test]
    fn test_insert_at_leading_edge() {
        let (mut doc, table) = build(
            &TableSpec::grid(2, 2).with_columns(vec![ColumnWidth::Fixed(40.0), ColumnWidth::Auto]),
        );
        insert_column(&mut doc, table, None).unwrap();
        assert_eq!(texts(&doc, table)[0], vec!["", "r0c0", "r0c1"]);
        let columns = &doc.table_props(table).unwrap().columns;
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].width, ColumnWidth::Fixed(40.0));
    }

    #[test]
    fn test_insert_copies_keep_row_span() {
        // | A (2 rows) | B |
        // |            | C |
        let (mut doc, table) = build(&TableSpec::from_rows(vec![
            vec![CellSpec::spanning("A", 1, 2), CellSpec::new("B")],
            vec![CellSpec::new("C")],
        ]));
        insert_column(&mut doc, table, Some(0)).unwrap();
        let copy = cells(&doc, table_rows(&doc, table)[0])[1];
        assert_eq!(doc.cell_props(copy).unwrap().row_span, 2);
        assert_eq!(texts(&doc, table)[1], vec!["C"]);
        assert!(is_regular(&doc, table));
    }

    #[test]
    fn test_insert_columns_from_selection() {
        let (mut doc, table) = build(&TableSpec::grid(2, 3));
        let selection = select(&doc, table, 0, 1, 1);
        assert!(insert_columns(&mut doc, selection, 2, InsertSide::Before).unwrap());
        assert_eq!(texts(&doc, table)[1], vec!["r1c0", "", "", "r1c1", "r1c2"]);
        assert!(!insert_columns(&mut doc, selection, 0, InsertSide::After).unwrap());
    }

    #[test]
    fn test_delete_columns_from_selection() {
        let (mut doc, table) = build(&TableSpec::grid(2, 3));
        let selection = select(&doc, table, 1, 0, 1);
        assert!(!delete_columns(&mut doc, selection, 3).unwrap());
        assert!(!delete_columns(&mut doc, selection, 0).unwrap());
        assert!(delete_columns(&mut doc, selection, 2).unwrap());
        assert_eq!(texts(&doc, table), vec![vec!["r0c2"], vec!["r1c2"]]);
    }

    #[test]
    fn test_delete_column_shrinks_wide_cells() {
        let (mut doc, table) = build(&TableSpec::from_rows(vec![
            vec![CellSpec::spanning("wide", 2, 1), CellSpec::new("x")],
            vec![CellSpec::new("a"), CellSpec::new("b"), CellSpec::new("c")],
        ]));
        assert!(delete_column(&mut doc, table, 1).unwrap());
        assert_eq!(texts(&doc, table), vec![vec!["wide", "x"], vec!["a", "c"]]);
        assert!(is_regular(&doc, table));
    }

    #[test]
    fn test_insert_column_into_short_row_table_reports_invariant() {
        let (mut doc, table) = build(&TableSpec::from_rows(vec![
            vec![CellSpec::new("a"), CellSpec::new("b")],
            vec![CellSpec::new("c")],
        ]));
        let err = insert_column(&mut doc, table, Some(1)).unwrap_err();
        assert!(matches!(err, TableError::Invariant(_)), "got {err}");
    }
}
