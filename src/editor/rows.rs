//! Row insertion and deletion.

use super::InsertSide;
use crate::doc::{Document, ElementType, NodeId, NodeKind, TextSegment};
use crate::error::{Result, TableError};
use crate::layout::{check_grid, validate_structure};
use crate::selection::{boundary_cells, TableCellRange};
use crate::table::{
    cells, copy_cell_structure, correct_borders, effective_row_span, origin_row_index,
    row_groups, row_index, rows, spanned_cells,
};

/// Rewrite every nominal row span in `group` to its effective value, so
/// rows added at the end of the group are not swallowed by a span that
/// already ran past the last row
pub(crate) fn clamp_row_spans(doc: &mut Document, group: NodeId) -> Result<()> {
    for row in rows(doc, group).to_vec() {
        for cell in cells(doc, row).to_vec() {
            let span = effective_row_span(doc, cell);
            doc.require_cell_mut(cell)?.row_span = span.max(1);
        }
    }
    Ok(())
}

/// Whether `cell` occupies `row` (both in the same row group)
fn covers_row(doc: &Document, cell: NodeId, row: NodeId) -> bool {
    let (Some(origin), Some(index)) = (origin_row_index(doc, cell), row_index(doc, row)) else {
        return false;
    };
    origin <= index && index < origin + effective_row_span(doc, cell)
}

/// Insert `count` rows next to `reference`, each a structural copy of it.
///
/// Cells that already span across the gap grow by `count` instead of being
/// copied; every other cell occupying the reference row is copied
/// unspanned. Returns a whole-row range over the new rows.
///
/// # Errors
/// Fails if `reference` is not a row of a table.
pub fn insert_rows(
    doc: &mut Document,
    reference: NodeId,
    count: usize,
    side: InsertSide,
) -> Result<Option<TableCellRange>> {
    if count == 0 {
        log::debug!("insert_rows: nothing to insert");
        return Ok(None);
    }
    let group = doc.require_parent(reference, ElementType::RowGroup)?;
    let table = doc.require_parent(group, ElementType::Table)?;
    validate_structure(doc, table)?;
    clamp_row_spans(doc, group)?;

    let index = row_index(doc, reference).ok_or(TableError::UnknownNode(reference))?;
    let neighbor = match side {
        InsertSide::Before => index
            .checked_sub(1)
            .and_then(|i| rows(doc, group).get(i).copied()),
        InsertSide::After => rows(doc, group).get(index + 1).copied(),
    };

    let mut occupying: Vec<NodeId> = cells(doc, reference)
        .iter()
        .copied()
        .chain(spanned_cells(doc, reference))
        .collect();
    occupying.sort_by_key(|&c| doc.cell_props(c).and_then(|p| p.column_index));

    let mut templates = Vec::new();
    for cell in occupying {
        if neighbor.is_some_and(|n| covers_row(doc, cell, n)) {
            doc.require_cell_mut(cell)?.row_span += count;
        } else {
            templates.push(cell);
        }
    }

    let at = match side {
        InsertSide::Before => index,
        InsertSide::After => index + 1,
    };
    let mut inserted = Vec::with_capacity(count);
    for offset in 0..count {
        let row = doc.create(NodeKind::Row);
        for &template in &templates {
            let copy = copy_cell_structure(doc, template)?;
            doc.require_cell_mut(copy)?.row_span = 1;
            doc.append_child(row, copy)?;
        }
        doc.insert_child(group, at + offset, row)?;
        inserted.push(row);
    }

    correct_borders(doc, table)?;
    validate_structure(doc, table)?;
    check_grid(doc, table)?;
    Ok(Some(TableCellRange::whole_rows(doc, table, &inserted)))
}

/// Delete the rows the selection touches. On success the selection is
/// collapsed to its start.
///
/// Returns `false` when the selection does not resolve to cells, or its
/// ends lie in different row groups.
///
/// # Errors
/// Fails on a malformed table.
pub fn delete_rows(doc: &mut Document, selection: &mut TextSegment) -> Result<bool> {
    let Some((first_cell, last_cell)) = boundary_cells(doc, selection.start(), selection.end())
    else {
        log::debug!("delete_rows: selection is not in table cells");
        return Ok(false);
    };
    let first_row = doc.require_parent(first_cell, ElementType::Row)?;
    let last_row = doc.require_parent(last_cell, ElementType::Row)?;
    let group = doc.require_parent(first_row, ElementType::RowGroup)?;
    if doc.parent(last_row) != Some(group) {
        log::debug!("delete_rows: selection spans row groups");
        return Ok(false);
    }

    let (Some(a), Some(b)) = (row_index(doc, first_row), row_index(doc, last_row)) else {
        return Ok(false);
    };
    let top = a.min(b);
    let bottom = (a + effective_row_span(doc, first_cell).max(1) - 1)
        .max(b + effective_row_span(doc, last_cell).max(1) - 1);

    let deleted = delete_row_interval(doc, group, top, bottom)?;
    if deleted {
        *selection = TextSegment::collapsed(selection.start());
    }
    Ok(deleted)
}

/// Delete rows `first..=last` of a row group.
///
/// Deleting every row of the table removes the table; deleting every row
/// of one group removes the group. Cells that span into the interval from
/// above lose the deleted rows from their span; cells that start inside the
/// interval and reach past it are recreated, empty, in the following row.
///
/// # Errors
/// Fails if `group` is not a row group of a table.
pub fn delete_row_interval(
    doc: &mut Document,
    group: NodeId,
    first: usize,
    last: usize,
) -> Result<bool> {
    let table = doc.require_parent(group, ElementType::Table)?;
    let group_rows = rows(doc, group).to_vec();
    if first > last || last >= group_rows.len() {
        log::debug!("delete_rows: rows {first}..={last} out of range");
        return Ok(false);
    }

    if first == 0 && last + 1 == group_rows.len() {
        if row_groups(doc, table).len() == 1 {
            log::debug!("delete_rows: removing table {table}");
            doc.detach(table);
            return Ok(true);
        }
        doc.detach(group);
        correct_borders(doc, table)?;
        validate_structure(doc, table)?;
        check_grid(doc, table)?;
        return Ok(true);
    }

    validate_structure(doc, table)?;
    clamp_row_spans(doc, group)?;
    let next_row = group_rows.get(last + 1).copied();

    let mut survivors = Vec::new();
    for (r, &row) in group_rows.iter().enumerate().take(last + 1) {
        for cell in cells(doc, row).to_vec() {
            let span = effective_row_span(doc, cell).max(1);
            let end = r + span - 1;
            if end < first {
                continue;
            }
            if r < first {
                let overlap = end.min(last) - first + 1;
                doc.require_cell_mut(cell)?.row_span = span - overlap;
            } else if end > last {
                survivors.push((cell, end - last));
            }
        }
    }

    if let Some(next) = next_row {
        for (cell, remaining) in survivors {
            let column = doc.require_cell(cell)?.column_index;
            let copy = copy_cell_structure(doc, cell)?;
            let props = doc.require_cell_mut(copy)?;
            props.row_span = remaining;
            // Kept only to order the copy among its new siblings
            props.column_index = column;
            let at = cells(doc, next)
                .iter()
                .take_while(|&&c| doc.cell_props(c).and_then(|p| p.column_index) < column)
                .count();
            doc.insert_child(next, at, copy)?;
        }
    }

    for &row in group_rows.iter().take(last + 1).skip(first) {
        doc.detach(row);
    }

    correct_borders(doc, table)?;
    validate_structure(doc, table)?;
    check_grid(doc, table)?;
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
    use crate::table::{is_regular, table_rows, CellSpec, TableSpec};

    fn build(spec: &TableSpec) -> (Document, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let table = spec.build(&mut doc, root, &EditorConfig::default()).unwrap();
        validate_structure(&mut doc, table).unwrap();
        (doc, table)
    }

    fn spans(doc: &Document, table: NodeId) -> Vec<Vec<(usize, usize)>> {
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

    #[test]
    fn test_insert_after_last_row_keeps_span_above() {
        // | A (2 rows) | B |
        // |            | C |
        let (mut doc, table) = build(&TableSpec::from_rows(vec![
            vec![CellSpec::spanning("A", 1, 2), CellSpec::new("B")],
            vec![CellSpec::new("C")],
        ]));
        let last = table_rows(&doc, table)[1];
        let range = insert_rows(&mut doc, last, 1, InsertSide::After)
            .unwrap()
            .unwrap();

        assert_eq!(table_rows(&doc, table).len(), 3);
        assert_eq!(range.segments().len(), 1);
        assert_eq!(spans(&doc, table), vec![vec![(1, 2), (1, 1)], vec![(1, 1)], vec![(1, 1), (1, 1)]]);
        assert!(is_regular(&doc, table));
    }

    #[test]
    fn test_insert_before_grows_spans_across_gap() {
        let (mut doc, table) = build(&TableSpec::from_rows(vec![
            vec![CellSpec::spanning("A", 1, 2), CellSpec::new("B")],
            vec![CellSpec::new("C")],
        ]));
        let second = table_rows(&doc, table)[1];
        insert_rows(&mut doc, second, 2, InsertSide::Before).unwrap();

        assert_eq!(
            spans(&doc, table),
            vec![vec![(1, 4), (1, 1)], vec![(1, 1)], vec![(1, 1)], vec![(1, 1)]]
        );
        assert!(is_regular(&doc, table));
    }

    #[test]
    fn test_insert_copies_column_spans_and_format() {
        let mut spec = TableSpec::from_rows(vec![vec![CellSpec::spanning("wide", 2, 1)]]);
        spec.groups[0][0][0].background = Some("#ffcc00".to_string());
        let (mut doc, table) = build(&spec);
        let row = table_rows(&doc, table)[0];
        insert_rows(&mut doc, row, 1, InsertSide::Before).unwrap();

        let new_row = table_rows(&doc, table)[0];
        let copy = cells(&doc, new_row)[0];
        let props = doc.cell_props(copy).unwrap();
        assert_eq!(props.column_span, 2);
        assert_eq!(props.background.as_deref(), Some("#ffcc00"));
        assert_eq!(doc.plain_text(copy), "");
        // The original row is no longer on the top edge
        let original = cells(&doc, table_rows(&doc, table)[1])[0];
        assert_eq!(doc.cell_props(original).unwrap().borders.top, 0.0);
    }

    #[test]
    fn test_insert_zero_rows() {
        let (mut doc, table) = build(&TableSpec::grid(1, 1));
        let row = table_rows(&doc, table)[0];
        assert!(insert_rows(&mut doc, row, 0, InsertSide::After).unwrap().is_none());
    }

    #[test]
    fn test_delete_interval_recreates_surviving_span() {
        // | A (3 rows) | B |
        // |            | C |
        // |            | D |
        // | E          | F |
        let (mut doc, table) = build(&TableSpec::from_rows(vec![
            vec![CellSpec::new("X"), CellSpec::new("Y")],
            vec![CellSpec::spanning("A", 1, 3), CellSpec::new("B")],
            vec![CellSpec::new("C")],
            vec![CellSpec::new("D")],
            vec![CellSpec::new("E"), CellSpec::new("F")],
        ]));
        let group = row_groups(&doc, table)[0];
        assert!(delete_row_interval(&mut doc, group, 1, 1).unwrap());

        let rows_after = table_rows(&doc, table);
        assert_eq!(rows_after.len(), 4);
        // A was recreated at column 0 of the next row with two rows left
        let recreated = cells(&doc, rows_after[1])[0];
        assert_eq!(doc.plain_text(recreated), "");
        assert_eq!(doc.cell_props(recreated).unwrap().row_span, 2);
        assert_eq!(doc.cell_props(recreated).unwrap().column_index, Some(0));
        assert_eq!(doc.plain_text(cells(&doc, rows_after[1])[1]), "C");
        assert!(is_regular(&doc, table));
    }

    #[test]
    fn test_delete_interval_shortens_span_from_above() {
        let (mut doc, table) = build(&TableSpec::from_rows(vec![
            vec![CellSpec::spanning("A", 1, 3), CellSpec::new("B")],
            vec![CellSpec::new("C")],
            vec![CellSpec::new("D")],
        ]));
        let group = row_groups(&doc, table)[0];
        assert!(delete_row_interval(&mut doc, group, 1, 1).unwrap());
        assert_eq!(spans(&doc, table), vec![vec![(1, 2), (1, 1)], vec![(1, 1)]]);
        assert!(is_regular(&doc, table));
    }

    #[test]
    fn test_delete_all_rows_removes_table() {
        let (mut doc, table) = build(&TableSpec::grid(2, 2));
        let group = row_groups(&doc, table)[0];
        assert!(delete_row_interval(&mut doc, group, 0, 1).unwrap());
        assert!(!doc.is_attached(table));
        assert!(!delete_row_interval(&mut doc, group, 3, 4).unwrap());
    }

    #[test]
    fn test_delete_rows_collapses_selection() {
        let (mut doc, table) = build(&TableSpec::grid(3, 2));
        let rows_before = table_rows(&doc, table);
        let start = doc.first_insertion_in(cells(&doc, rows_before[1])[0]).unwrap();
        let end = doc.last_insertion_in(cells(&doc, rows_before[1])[1]).unwrap();
        let mut selection = TextSegment::new(start, end);

        assert!(delete_rows(&mut doc, &mut selection).unwrap());
        assert!(selection.is_empty());
        assert_eq!(selection.start(), start);
        let texts: Vec<String> = table_rows(&doc, table)
            .into_iter()
            .map(|r| doc.plain_text(r))
            .collect();
        assert_eq!(texts, vec!["r0c0\nr0c1", "r2c0\nr2c1"]);
    }

    #[test]
    fn test_delete_rows_outside_table() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_paragraph(root, "text").unwrap();
        let p = doc.first_insertion_in(root).unwrap();
        let mut selection = TextSegment::collapsed(p);
        assert!(!delete_rows(&mut doc, &mut selection).unwrap());
    }

    #[test]
    fn test_insert_into_short_row_table_reports_invariant() {
        // | a | b |
        // | c |
        let (mut doc, table) = build(&TableSpec::from_rows(vec![
            vec![CellSpec::new("a"), CellSpec::new("b")],
            vec![CellSpec::new("c")],
        ]));
        let first = table_rows(&doc, table)[0];
        let err = insert_rows(&mut doc, first, 1, InsertSide::Before).unwrap_err();
        assert!(matches!(err, TableError::Invariant(_)), "got {err}");
    }
}
