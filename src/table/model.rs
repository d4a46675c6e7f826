//! Queries over the Table → RowGroup → Row → Cell structure.
//!
//! Column-based queries read `CellProps::column_index`, which layout owns;
//! callers that need exact answers run `validate_structure` first.

use crate::doc::{CellProps, Document, ElementType, NodeId, NodeKind};
use crate::error::Result;

pub fn row_groups(doc: &Document, table: NodeId) -> &[NodeId] {
    doc.children(table)
}

pub fn rows(doc: &Document, group: NodeId) -> &[NodeId] {
    doc.children(group)
}

pub fn cells(doc: &Document, row: NodeId) -> &[NodeId] {
    doc.children(row)
}

/// Every row of the table, group by group
pub fn table_rows(doc: &Document, table: NodeId) -> Vec<NodeId> {
    row_groups(doc, table)
        .iter()
        .flat_map(|&g| rows(doc, g).iter().copied())
        .collect()
}

/// Index of a row within its row group
pub fn row_index(doc: &Document, row: NodeId) -> Option<usize> {
    doc.child_index(row)
}

pub fn row_of(doc: &Document, cell: NodeId) -> Option<NodeId> {
    doc.parent(cell).filter(|&r| doc.is(r, ElementType::Row))
}

pub fn group_of(doc: &Document, row: NodeId) -> Option<NodeId> {
    doc.parent(row).filter(|&g| doc.is(g, ElementType::RowGroup))
}

pub fn table_of(doc: &Document, group: NodeId) -> Option<NodeId> {
    doc.parent(group).filter(|&t| doc.is(t, ElementType::Table))
}

pub fn table_of_cell(doc: &Document, cell: NodeId) -> Option<NodeId> {
    let row = row_of(doc, cell)?;
    table_of(doc, group_of(doc, row)?)
}

/// Row index of the row a cell is stored in
pub fn origin_row_index(doc: &Document, cell: NodeId) -> Option<usize> {
    row_index(doc, row_of(doc, cell)?)
}

/// Column count as of the last layout pass
pub fn column_count(doc: &Document, table: NodeId) -> usize {
    doc.table_props(table).map_or(0, |p| p.column_count)
}

/// First and last grid column of a cell, when layout has placed it
pub fn column_range(doc: &Document, cell: NodeId) -> Option<(usize, usize)> {
    let props = doc.cell_props(cell)?;
    let first = props.column_index?;
    Some((first, first + props.column_span.max(1) - 1))
}

/// Row span clamped to the rows remaining in the cell's group
pub fn effective_row_span(doc: &Document, cell: NodeId) -> usize {
    let Some(props) = doc.cell_props(cell) else {
        return 0;
    };
    let span = props.row_span.max(1);
    let remaining = row_of(doc, cell)
        .and_then(|row| {
            let index = row_index(doc, row)?;
            Some(rows(doc, group_of(doc, row)?).len().saturating_sub(index))
        })
        .unwrap_or(span);
    span.min(remaining.max(1))
}

/// Cells stored in earlier rows of the group whose row span reaches `row`,
/// in column order
pub fn spanned_cells(doc: &Document, row: NodeId) -> Vec<NodeId> {
    let (Some(group), Some(index)) = (group_of(doc, row), row_index(doc, row)) else {
        return Vec::new();
    };
    let mut spanned: Vec<NodeId> = rows(doc, group)
        .iter()
        .take(index)
        .enumerate()
        .flat_map(|(r, &above)| {
            cells(doc, above).iter().copied().filter(move |&cell| {
                doc.cell_props(cell)
                    .is_some_and(|p| r + p.row_span.max(1) > index)
            })
        })
        .collect();
    spanned.sort_by_key(|&c| doc.cell_props(c).and_then(|p| p.column_index));
    spanned
}

/// The cell occupying `column` in `row`, whether stored there or spanning
/// down from above
pub fn covering_cell(doc: &Document, row: NodeId, column: usize) -> Option<NodeId> {
    let covers = |&cell: &NodeId| {
        column_range(doc, cell).is_some_and(|(first, last)| first <= column && column <= last)
    };
    cells(doc, row)
        .iter()
        .copied()
        .find(covers)
        .or_else(|| spanned_cells(doc, row).into_iter().find(covers))
}

/// Number of grid columns occupied in `row`, counting spans from above
pub fn row_width(doc: &Document, row: NodeId) -> usize {
    cells(doc, row)
        .iter()
        .copied()
        .chain(spanned_cells(doc, row))
        .filter_map(|c| column_range(doc, c))
        .map(|(_, last)| last + 1)
        .max()
        .unwrap_or(0)
}

/// Whether every row tiles columns `0..column_count` exactly once
pub fn is_regular(doc: &Document, table: NodeId) -> bool {
    let count = column_count(doc, table);
    table_rows(doc, table).into_iter().all(|row| {
        let mut ranges: Vec<(usize, usize)> = cells(doc, row)
            .iter()
            .copied()
            .chain(spanned_cells(doc, row))
            .filter_map(|c| column_range(doc, c))
            .collect();
        ranges.sort_unstable();
        let mut next = 0;
        for (first, last) in ranges {
            if first != next {
                return false;
            }
            next = last + 1;
        }
        next == count
    })
}

/// Create a detached cell with `source`'s formatting and spans, holding a
/// single empty paragraph. Layout data is not copied.
pub(crate) fn copy_cell_structure(doc: &mut Document, source: NodeId) -> Result<NodeId> {
    let props = CellProps {
        column_index: None,
        ..doc.require_cell(source)?.clone()
    };
    let cell = doc.create(NodeKind::Cell(props));
    doc.append_paragraph(cell, "")?;
    Ok(cell)
}

/// Previous cell in reading order within the row group
pub fn previous_cell(doc: &Document, cell: NodeId) -> Option<NodeId> {
    let row = row_of(doc, cell)?;
    let index = doc.child_index(cell)?;
    if index > 0 {
        return cells(doc, row).get(index - 1).copied();
    }
    let group = group_of(doc, row)?;
    let r = row_index(doc, row)?;
    rows(doc, group)
        .iter()
        .take(r)
        .rev()
        .find_map(|&above| cells(doc, above).last().copied())
}

/// Next cell in reading order within the row group
pub fn next_cell(doc: &Document, cell: NodeId) -> Option<NodeId> {
    let row = row_of(doc, cell)?;
    let index = doc.child_index(cell)?;
    if let Some(&next) = cells(doc, row).get(index + 1) {
        return Some(next);
    }
    let group = group_of(doc, row)?;
    let r = row_index(doc, row)?;
    rows(doc, group)
        .iter()
        .skip(r + 1)
        .find_map(|&below| cells(doc, below).first().copied())
}
