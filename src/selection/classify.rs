//! Boundary classification of position pairs.
//!
//! Given an anchor and a moving position, finds their nearest common
//! ancestor and records which cell, row, row group and table boundaries
//! each side crosses on its way up to it.

use std::cmp::Ordering;

use crate::doc::{Document, ElementType, NodeId, TextPosition};
use crate::table::{next_cell, previous_cell};

/// Structural elements crossed by one side of a position pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundarySide {
    /// The side's position after normalization and edge folding
    pub position: TextPosition,
    pub cell: Option<NodeId>,
    pub row: Option<NodeId>,
    pub row_group: Option<NodeId>,
    pub table: Option<NodeId>,
}

impl BoundarySide {
    fn new(position: TextPosition) -> Self {
        Self {
            position,
            cell: None,
            row: None,
            row_group: None,
            table: None,
        }
    }

    /// True when no table structure was crossed
    pub fn is_empty(&self) -> bool {
        self.cell.is_none() && self.row.is_none() && self.row_group.is_none() && self.table.is_none()
    }

    fn record(&mut self, element_type: ElementType, element: NodeId) {
        match element_type {
            // Anything recorded so far was nested inside this cell
            ElementType::Cell => {
                self.cell = Some(element);
                self.row = None;
                self.row_group = None;
                self.table = None;
            }
            ElementType::Row => self.row = Some(element),
            ElementType::RowGroup => self.row_group = Some(element),
            ElementType::Table => self.table = Some(element),
            ElementType::Block | ElementType::Inline | ElementType::Other => {}
        }
    }
}

/// Result of classifying a position pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableBoundaries {
    pub anchor: BoundarySide,
    pub moving: BoundarySide,
    pub common_ancestor: NodeId,
}

impl TableBoundaries {
    /// Neither side crossed a table-structure boundary
    pub fn is_none(&self) -> bool {
        self.anchor.is_empty() && self.moving.is_empty()
    }

    /// Either side left a table
    pub fn crosses_table(&self) -> bool {
        self.anchor.table.is_some() || self.moving.table.is_some()
    }

    /// Anchor and moving cells, when both sides sit in cells of one table
    pub fn cells(&self) -> Option<(NodeId, NodeId)> {
        if self.crosses_table() {
            return None;
        }
        Some((self.anchor.cell?, self.moving.cell?))
    }
}

/// Classify the boundaries between `anchor` and `moving`.
///
/// Both positions are normalized to insertion positions in their own
/// logical direction. The later position is folded back into the previous
/// cell when normalization pushed it forward into a cell it was before;
/// the earlier one is folded forward symmetrically.
pub fn classify(doc: &Document, anchor: TextPosition, moving: TextPosition) -> TableBoundaries {
    let mut a = doc.insertion_position(anchor, anchor.direction());
    let mut m = doc.insertion_position(moving, moving.direction());
    match doc.compare_positions(anchor, moving) {
        Ordering::Less => {
            a = fold_forward(doc, anchor, a);
            m = fold_backward(doc, moving, m);
        }
        Ordering::Greater => {
            m = fold_forward(doc, moving, m);
            a = fold_backward(doc, anchor, a);
        }
        Ordering::Equal => {}
    }

    let anchor_parent = doc.position_parent(a);
    let moving_parent = doc.position_parent(m);
    let mut result = TableBoundaries {
        anchor: BoundarySide::new(a),
        moving: BoundarySide::new(m),
        common_ancestor: anchor_parent,
    };
    if anchor_parent == moving_parent {
        return result;
    }

    let common = doc
        .ancestors(anchor_parent)
        .find(|&n| contains(doc, n, m))
        .unwrap_or_else(|| doc.root());
    result.common_ancestor = common;
    walk(doc, anchor_parent, common, &mut result.anchor);
    walk(doc, moving_parent, common, &mut result.moving);
    if result.crosses_table() {
        result.anchor.cell = None;
        result.moving.cell = None;
    }

    log::trace!(
        "classified {}..{}: common {}, anchor {:?}, moving {:?}",
        anchor.offset(),
        moving.offset(),
        common,
        result.anchor,
        result.moving
    );
    result
}

/// Cells at the two ends of a range, at the same table level. A range that
/// stays inside one cell yields that cell twice; a range that leaves a
/// table yields `None`.
pub fn boundary_cells(
    doc: &Document,
    start: TextPosition,
    end: TextPosition,
) -> Option<(NodeId, NodeId)> {
    let boundaries = classify(doc, start, end);
    if boundaries.crosses_table() {
        return None;
    }
    if let Some(pair) = boundaries.cells() {
        return Some(pair);
    }
    if boundaries.anchor.cell.is_none() && boundaries.moving.cell.is_none() {
        let parent = doc.position_parent(boundaries.anchor.position);
        let cell = doc.enclosing(parent, ElementType::Cell)?;
        return Some((cell, cell));
    }
    None
}

fn contains(doc: &Document, element: NodeId, position: TextPosition) -> bool {
    if element == doc.root() {
        return true;
    }
    match (doc.content_start(element), doc.content_end(element)) {
        (Some(start), Some(end)) => start <= position.offset() && position.offset() <= end,
        _ => false,
    }
}

fn walk(doc: &Document, from: NodeId, common: NodeId, side: &mut BoundarySide) {
    for element in doc.ancestors(from).take_while(|&n| n != common) {
        if let Some(ty) = doc.element_type(element) {
            side.record(ty, element);
        }
    }
}

/// Later side: undo a forward normalization into a cell the raw position
/// was in front of
fn fold_backward(doc: &Document, raw: TextPosition, normalized: TextPosition) -> TextPosition {
    let mut entered = None;
    for n in doc.ancestors(doc.position_parent(normalized)) {
        if !doc.is(n, ElementType::Cell) {
            continue;
        }
        match doc.element_start(n) {
            Some(start) if start >= raw.offset() => entered = Some(n),
            _ => break,
        }
    }
    entered
        .and_then(|cell| previous_cell(doc, cell))
        .and_then(|cell| doc.last_insertion_in(cell))
        .unwrap_or(normalized)
}

/// Earlier side: undo a backward normalization into a cell the raw
/// position was behind
fn fold_forward(doc: &Document, raw: TextPosition, normalized: TextPosition) -> TextPosition {
    let mut exited = None;
    for n in doc.ancestors(doc.position_parent(normalized)) {
        if !doc.is(n, ElementType::Cell) {
            continue;
        }
        match doc.element_end(n) {
            Some(end) if end <= raw.offset() => exited = Some(n),
            _ => break,
        }
    }
    exited
        .and_then(|cell| next_cell(doc, cell))
        .and_then(|cell| doc.first_insertion_in(cell))
        .unwrap_or(normalized)
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
    use crate::doc::{ElementEdge, LogicalDirection};
    use crate::table::{cells, group_of, table_rows, TableSpec};

    /// "before" paragraph, a grid, "after" paragraph
    fn setup(rows: usize, columns: usize) -> (Document, NodeId, Vec<Vec<NodeId>>) {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_paragraph(root, "before").unwrap();
        let table = TableSpec::grid(rows, columns)
            .build(&mut doc, root, &EditorConfig::default())
            .unwrap();
        doc.append_paragraph(root, "after").unwrap();
        let grid = table_rows(&doc, table)
            .into_iter()
            .map(|row| cells(&doc, row).to_vec())
            .collect();
        (doc, table, grid)
    }

    fn inside(doc: &Document, cell: NodeId) -> TextPosition {
        doc.first_insertion_in(cell).unwrap()
    }

    #[test]
    fn test_same_position_crosses_nothing() {
        let (doc, _, grid) = setup(2, 2);
        let p = inside(&doc, grid[1][0]);
        let boundaries = classify(&doc, p, p);
        assert!(boundaries.is_none());
        assert_eq!(boundaries.anchor.position, p);

        let edge = doc.element_position(grid[0][1], ElementEdge::BeforeStart).unwrap();
        assert!(classify(&doc, edge, edge).is_none());
    }

    #[test]
    fn test_cells_in_different_rows() {
        let (doc, _, grid) = setup(2, 2);
        let boundaries = classify(&doc, inside(&doc, grid[0][0]), inside(&doc, grid[1][1]));
        assert!(!boundaries.crosses_table());
        assert_eq!(boundaries.cells(), Some((grid[0][0], grid[1][1])));
        let row = doc.parent(grid[0][0]).unwrap();
        assert_eq!(boundaries.common_ancestor, group_of(&doc, row).unwrap());
    }

    #[test]
    fn test_leaving_the_table_clears_cells() {
        let (doc, table, grid) = setup(2, 2);
        let after = doc.last_insertion_in(doc.root()).unwrap();
        let boundaries = classify(&doc, inside(&doc, grid[1][1]), after);

        assert!(boundaries.crosses_table());
        assert_eq!(boundaries.anchor.cell, None);
        assert_eq!(boundaries.anchor.table, Some(table));
        assert_eq!(boundaries.anchor.row, doc.parent(grid[1][1]));
        assert!(boundaries.moving.is_empty());
        assert_eq!(boundaries.cells(), None);
        assert_eq!(boundaries.common_ancestor, doc.root());
    }

    #[test]
    fn test_later_side_folds_into_previous_cell() {
        let (doc, _, grid) = setup(2, 2);
        let anchor = inside(&doc, grid[0][0]);
        // Just in front of the second cell: normalizes forward into it
        let moving = doc.element_position(grid[0][1], ElementEdge::BeforeStart).unwrap();
        let boundaries = classify(&doc, anchor, moving);
        assert!(boundaries.is_none());
        assert_eq!(
            boundaries.moving.position,
            doc.last_insertion_in(grid[0][0]).unwrap()
        );
        assert_eq!(boundary_cells(&doc, anchor, moving), Some((grid[0][0], grid[0][0])));
    }

    #[test]
    fn test_row_start_folds_to_end_of_previous_row() {
        let (doc, _, grid) = setup(2, 2);
        let row = doc.parent(grid[1][0]).unwrap();
        let moving = doc.element_position(row, ElementEdge::BeforeStart).unwrap();
        let boundaries = classify(&doc, inside(&doc, grid[0][0]), moving);
        assert_eq!(boundaries.cells(), Some((grid[0][0], grid[0][1])));
    }

    #[test]
    fn test_earlier_side_folds_into_next_cell() {
        let (doc, _, grid) = setup(1, 3);
        // One past the first cell: normalizes backward into it
        let anchor = doc.element_position(grid[0][0], ElementEdge::AfterEnd).unwrap();
        assert_eq!(anchor.direction(), LogicalDirection::Backward);
        let moving = inside(&doc, grid[0][2]);
        assert_eq!(boundary_cells(&doc, anchor, moving), Some((grid[0][1], grid[0][2])));
    }

    #[test]
    fn test_nested_table_reports_outer_cell() {
        let (mut doc, _, grid) = setup(2, 2);
        let nested = TableSpec::grid(1, 1)
            .build(&mut doc, grid[0][0], &EditorConfig::default())
            .unwrap();
        let inner_cell = cells(&doc, table_rows(&doc, nested)[0])[0];

        let boundaries = classify(&doc, inside(&doc, inner_cell), inside(&doc, grid[1][1]));
        assert_eq!(boundaries.anchor.cell, Some(grid[0][0]));
        assert_eq!(boundaries.anchor.table, None);
        assert!(!boundaries.crosses_table());
        assert_eq!(boundaries.cells(), Some((grid[0][0], grid[1][1])));
    }

    #[test]
    fn test_boundary_cells_within_one_cell() {
        let (mut doc, _, grid) = setup(1, 2);
        doc.append_paragraph(grid[0][1], "second line").unwrap();
        let start = inside(&doc, grid[0][1]);
        let end = doc.last_insertion_in(grid[0][1]).unwrap();
        assert!(classify(&doc, start, end).is_none());
        assert_eq!(boundary_cells(&doc, start, end), Some((grid[0][1], grid[0][1])));
    }

    #[test]
    fn test_boundary_cells_outside_tables() {
        let (doc, _, grid) = setup(1, 1);
        let before = doc.first_insertion_in(doc.root()).unwrap();
        assert_eq!(boundary_cells(&doc, before, before), None);
        assert_eq!(boundary_cells(&doc, before, inside(&doc, grid[0][0])), None);
    }
}
