//! Cell merge and split.

use crate::doc::{Document, ElementType, NodeId, TextSegment};
use crate::error::{Result, TableError};
use crate::layout::{check_grid, validate_structure};
use crate::selection::{boundary_cells, column_bounds};
use crate::table::{
    cells, column_count, column_range, copy_cell_structure, correct_group_borders, covering_cell,
    effective_row_span, origin_row_index, row_width, rows, spanned_cells,
};

/// Merge the rectangle `top..=bottom` × `left..=right` of one row group
/// into its top-left cell.
///
/// Returns `None` (leaving the table untouched) when the rectangle is out
/// of range, the boundary rows differ in width, or a cell reaches partly
/// into the rectangle. Otherwise returns a collapsed selection inside the
/// merged cell.
///
/// # Errors
/// Fails if `group` is not a row group of a table, or the grid turns out to
/// be inconsistent mid-merge.
pub fn merge_cell_range(
    doc: &mut Document,
    group: NodeId,
    top: usize,
    bottom: usize,
    left: usize,
    right: usize,
) -> Result<Option<TextSegment>> {
    let table = doc.require_parent(group, ElementType::Table)?;
    validate_structure(doc, table)?;

    let group_rows = rows(doc, group).to_vec();
    let (Some(&top_row), Some(&bottom_row)) = (group_rows.get(top), group_rows.get(bottom)) else {
        log::debug!("merge: rows {top}..={bottom} out of range");
        return Ok(None);
    };
    if top > bottom || left > right || right >= column_count(doc, table) {
        log::debug!("merge: bad rectangle {top}..={bottom} x {left}..={right}");
        return Ok(None);
    }
    if row_width(doc, top_row) != row_width(doc, bottom_row) {
        log::debug!("merge: boundary rows differ in width");
        return Ok(None);
    }
    let overlaps = |cell: NodeId| {
        column_range(doc, cell).is_some_and(|(first, last)| first <= right && left <= last)
    };
    if spanned_cells(doc, top_row).into_iter().any(overlaps) {
        log::debug!("merge: a cell from above reaches into the rectangle");
        return Ok(None);
    }

    // Probe: every column of every row must be covered by a cell lying
    // wholly inside the rectangle
    let mut covered: Vec<NodeId> = Vec::new();
    for (r, &row) in group_rows.iter().enumerate().take(bottom + 1).skip(top) {
        for column in left..=right {
            let Some(cell) = covering_cell(doc, row, column) else {
                log::debug!("merge: hole at row {r}, column {column}");
                return Ok(None);
            };
            let inside = column_range(doc, cell)
                .is_some_and(|(first, last)| left <= first && last <= right);
            let rows_inside = origin_row_index(doc, cell)
                .is_some_and(|o| top <= o && o + effective_row_span(doc, cell) - 1 <= bottom);
            if !inside || !rows_inside {
                log::debug!("merge: cell {cell} reaches partly into the rectangle");
                return Ok(None);
            }
            if !covered.contains(&cell) {
                covered.push(cell);
            }
        }
    }

    let survivor = cells(doc, top_row)
        .iter()
        .copied()
        .find(|&c| column_range(doc, c).is_some_and(|(first, _)| first == left))
        .ok_or_else(|| TableError::Invariant(format!("no cell at column {left} of merge")))?;

    absorb_content(doc, survivor, &covered)?;

    let props = doc.require_cell_mut(survivor)?;
    props.row_span = bottom - top + 1;
    props.column_span = right - left + 1;

    let mut deleted_rows = 0;
    for &row in group_rows.iter().take(bottom + 1).skip(top + 1).rev() {
        let stored = cells(doc, row).to_vec();
        let inner: Vec<NodeId> = stored.iter().copied().filter(|c| covered.contains(c)).collect();
        if inner.len() == stored.len() {
            for outside in spanned_cells(doc, row) {
                if covered.contains(&outside) || outside == survivor {
                    continue;
                }
                let props = doc.require_cell_mut(outside)?;
                props.row_span = props.row_span.saturating_sub(1).max(1);
            }
            doc.detach(row);
            deleted_rows += 1;
        } else {
            for cell in inner {
                doc.detach(cell);
            }
        }
    }
    for cell in covered.iter().copied().filter(|&c| c != survivor) {
        doc.detach(cell);
    }

    if deleted_rows > 0 && bottom + 1 < group_rows.len() {
        let props = doc.require_cell_mut(survivor)?;
        props.row_span -= deleted_rows;
    }

    validate_structure(doc, table)?;
    check_grid(doc, table)?;
    correct_group_borders(doc, table, group)?;
    Ok(doc.first_insertion_in(survivor).map(TextSegment::collapsed))
}

/// Move the content of `absorbed` cells (reading order) into `survivor`,
/// dropping the survivor's placeholder paragraph when it has no content
fn absorb_content(doc: &mut Document, survivor: NodeId, absorbed: &[NodeId]) -> Result<()> {
    let donors: Vec<NodeId> = absorbed
        .iter()
        .copied()
        .filter(|&c| c != survivor && doc.has_content(c))
        .collect();
    if donors.is_empty() {
        return Ok(());
    }
    if !doc.has_content(survivor) {
        for child in doc.children(survivor).to_vec() {
            doc.detach(child);
        }
    }
    for donor in donors {
        for child in doc.children(donor).to_vec() {
            if !doc.has_content(child) {
                continue;
            }
            doc.detach(child);
            doc.append_child(survivor, child)?;
        }
    }
    Ok(())
}

/// Merge the rectangle spanned by the selection's boundary cells
///
/// # Errors
/// Fails on a malformed table.
pub fn merge_cells(doc: &mut Document, selection: TextSegment) -> Result<Option<TextSegment>> {
    let Some((a, b)) = boundary_cells(doc, selection.start(), selection.end()) else {
        log::debug!("merge: selection is not in table cells");
        return Ok(None);
    };
    let group = doc
        .require_parent(a, ElementType::Row)
        .and_then(|row| doc.require_parent(row, ElementType::RowGroup))?;
    let other_group = doc
        .require_parent(b, ElementType::Row)
        .and_then(|row| doc.require_parent(row, ElementType::RowGroup))?;
    if group != other_group {
        log::debug!("merge: selection spans row groups");
        return Ok(None);
    }
    let table = doc.require_parent(group, ElementType::Table)?;
    validate_structure(doc, table)?;

    let (Some(ra), Some(rb)) = (origin_row_index(doc, a), origin_row_index(doc, b)) else {
        return Ok(None);
    };
    let Some((left, right)) = column_bounds(doc, a, b) else {
        return Ok(None);
    };
    let top = ra.min(rb);
    let bottom = (ra + effective_row_span(doc, a) - 1).max(rb + effective_row_span(doc, b) - 1);
    merge_cell_range(doc, group, top, bottom, left, right)
}

/// Split the single selected merged cell.
///
/// `horizontal` extra cells are carved off its right edge (at most
/// `column_span - 1`). Vertical splitting is not supported; a vertical
/// count is ignored. Returns `None` when the selection is not one merged
/// cell or nothing was split.
///
/// # Errors
/// Fails on a malformed table.
pub fn split_cell(
    doc: &mut Document,
    selection: TextSegment,
    horizontal: usize,
    vertical: usize,
) -> Result<Option<TextSegment>> {
    let Some((cell, other)) = boundary_cells(doc, selection.start(), selection.end()) else {
        return Ok(None);
    };
    if cell != other {
        log::debug!("split: more than one cell selected");
        return Ok(None);
    }
    let props = doc.require_cell(cell)?;
    let (column_span, row_span) = (props.column_span, props.row_span);
    if column_span <= 1 && row_span <= 1 {
        log::debug!("split: cell {cell} is not merged");
        return Ok(None);
    }
    if vertical > 0 {
        log::warn!("split: vertical split of {cell} is not supported, ignoring {vertical}");
    }
    let carve = horizontal.min(column_span.saturating_sub(1));
    if carve == 0 {
        return Ok(None);
    }

    let row = doc.require_parent(cell, ElementType::Row)?;
    let group = doc.require_parent(row, ElementType::RowGroup)?;
    let table = doc.require_parent(group, ElementType::Table)?;
    for _ in 0..carve {
        let copy = copy_cell_structure(doc, cell)?;
        doc.require_cell_mut(copy)?.column_span = 1;
        let at = doc.child_index(cell).map_or(0, |i| i + 1);
        doc.insert_child(row, at, copy)?;
        let props = doc.require_cell_mut(cell)?;
        props.column_span = props.column_span.saturating_sub(1).max(1);
    }

    validate_structure(doc, table)?;
    check_grid(doc, table)?;
    correct_group_borders(doc, table, group)?;
    Ok(doc.first_insertion_in(cell).map(TextSegment::collapsed))
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
    use crate::selection::cell_segment;
    use crate::table::{is_regular, row_groups, table_rows, CellSpec, TableSpec};

    fn build(spec: &TableSpec) -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let table = spec.build(&mut doc, root, &EditorConfig::default()).unwrap();
        validate_structure(&mut doc, table).unwrap();
        let group = row_groups(&doc, table)[0];
        (doc, table, group)
    }

    fn cell(doc: &Document, table: NodeId, row: usize, index: usize) -> NodeId {
        cells(doc, table_rows(doc, table)[row])[index]
    }

    #[test]
    fn test_merge_whole_two_by_two() {
        let (mut doc, table, group) = build(&TableSpec::grid(2, 2));
        let caret = merge_cell_range(&mut doc, group, 0, 1, 0, 1).unwrap().unwrap();

        assert!(caret.is_empty());
        let rows_after = rows(&doc, group);
        assert_eq!(rows_after.len(), 1);
        assert_eq!(cells(&doc, rows_after[0]).len(), 1);
        let merged = cell(&doc, table, 0, 0);
        let props = doc.cell_props(merged).unwrap();
        assert_eq!((props.row_span, props.column_span), (2, 2));
        assert_eq!(doc.plain_text(merged), "r0c0\nr0c1\nr1c0\nr1c1");
    }

    #[test]
    fn test_merge_then_split_restores_cells() {
        let (mut doc, table, group) = build(&TableSpec::grid(2, 2));
        let caret = merge_cell_range(&mut doc, group, 0, 0, 0, 1).unwrap().unwrap();
        assert_eq!(cells(&doc, table_rows(&doc, table)[0]).len(), 1);

        split_cell(&mut doc, caret, 1, 0).unwrap().unwrap();
        let first_row = table_rows(&doc, table)[0];
        let spans: Vec<usize> = cells(&doc, first_row)
            .iter()
            .map(|&c| doc.cell_props(c).unwrap().column_span)
            .collect();
        assert_eq!(spans, vec![1, 1]);
        assert!(is_regular(&doc, table));
    }

    #[test]
    fn test_merge_keeps_rows_with_outside_cells() {
        let (mut doc, table, group) = build(&TableSpec::grid(3, 3));
        merge_cell_range(&mut doc, group, 0, 1, 0, 1).unwrap().unwrap();

        assert_eq!(rows(&doc, group).len(), 3);
        assert_eq!(cells(&doc, table_rows(&doc, table)[1]).len(), 1);
        let merged = cell(&doc, table, 0, 0);
        assert_eq!(doc.cell_props(merged).unwrap().row_span, 2);
        assert!(is_regular(&doc, table));
    }

    #[test]
    fn test_merge_deletes_filled_rows_and_shortens_spans() {
        // | a | b | X (3 rows) |
        // | c | d |            |
        // | e | f |            |
        let (mut doc, table, group) = build(&TableSpec::from_rows(vec![
            vec![CellSpec::new("a"), CellSpec::new("b"), CellSpec::spanning("X", 1, 3)],
            vec![CellSpec::new("c"), CellSpec::new("d")],
            vec![CellSpec::new("e"), CellSpec::new("f")],
        ]));
        merge_cell_range(&mut doc, group, 0, 1, 0, 1).unwrap().unwrap();

        assert_eq!(rows(&doc, group).len(), 2);
        let merged = cell(&doc, table, 0, 0);
        let x = cell(&doc, table, 0, 1);
        assert_eq!(doc.cell_props(merged).unwrap().row_span, 1);
        assert_eq!(doc.cell_props(x).unwrap().row_span, 2);
        assert!(is_regular(&doc, table));
    }

    #[test]
    fn test_merge_rejects_partial_overlap() {
        // | wide      | x |
        // | a | b     | c |
        let (mut doc, table, group) = build(&TableSpec::from_rows(vec![
            vec![CellSpec::spanning("wide", 2, 1), CellSpec::new("x")],
            vec![CellSpec::new("a"), CellSpec::new("b"), CellSpec::new("c")],
        ]));
        let before = crate::table::TableSpec::snapshot(&doc, table);
        assert!(merge_cell_range(&mut doc, group, 0, 1, 1, 2).unwrap().is_none());
        assert!(merge_cell_range(&mut doc, group, 0, 1, 0, 5).unwrap().is_none());
        assert!(merge_cell_range(&mut doc, group, 1, 4, 0, 0).unwrap().is_none());
        assert_eq!(crate::table::TableSpec::snapshot(&doc, table), before);
    }

    #[test]
    fn test_merge_rejects_span_from_above() {
        let (mut doc, _, group) = build(&TableSpec::from_rows(vec![
            vec![CellSpec::spanning("A", 1, 2), CellSpec::new("B")],
            vec![CellSpec::new("C")],
        ]));
        assert!(merge_cell_range(&mut doc, group, 1, 1, 0, 1).unwrap().is_none());
    }

    #[test]
    fn test_merge_cells_from_selection() {
        let (mut doc, table, _) = build(&TableSpec::grid(2, 3));
        let selection = TextSegment::new(
            doc.first_insertion_in(cell(&doc, table, 0, 1)).unwrap(),
            doc.last_insertion_in(cell(&doc, table, 1, 2)).unwrap(),
        );
        assert!(merge_cells(&mut doc, selection).unwrap().is_some());
        let merged = cell(&doc, table, 0, 1);
        let props = doc.cell_props(merged).unwrap();
        assert_eq!((props.column_span, props.row_span), (2, 2));
        assert!(is_regular(&doc, table));
    }

    #[test]
    fn test_split_requires_merged_cell() {
        let (mut doc, table, _) = build(&TableSpec::grid(1, 2));
        let single = cell_segment(&doc, cell(&doc, table, 0, 0), cell(&doc, table, 0, 0)).unwrap();
        assert!(split_cell(&mut doc, single, 1, 0).unwrap().is_none());
        let both = cell_segment(&doc, cell(&doc, table, 0, 0), cell(&doc, table, 0, 1)).unwrap();
        assert!(split_cell(&mut doc, both, 1, 0).unwrap().is_none());
    }

    #[test]
    fn test_split_clamps_and_ignores_vertical() {
        let (mut doc, table, _) = build(&TableSpec::from_rows(vec![
            vec![CellSpec::spanning("big", 3, 2)],
            vec![],
        ]));
        let selection = cell_segment(&doc, cell(&doc, table, 0, 0), cell(&doc, table, 0, 0)).unwrap();
        split_cell(&mut doc, selection, 10, 1).unwrap().unwrap();

        let first_row = table_rows(&doc, table)[0];
        let spans: Vec<(usize, usize)> = cells(&doc, first_row)
            .iter()
            .map(|&c| {
                let p = doc.cell_props(c).unwrap();
                (p.column_span, p.row_span)
            })
            .collect();
        assert_eq!(spans, vec![(1, 2), (1, 2), (1, 2)]);
        assert_eq!(doc.plain_text(cells(&doc, first_row)[0]), "big");
    }
}
