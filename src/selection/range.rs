//! Cell ranges and cross-table segments.

use super::classify::{classify, BoundarySide};
use crate::doc::{Document, ElementEdge, NodeId, TextPosition, TextSegment};
use crate::table::{cells, column_range, effective_row_span, row_of, table_of_cell, table_rows};

/// Grid columns a cell range covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnBounds {
    /// Column lookup was unavailable; whole rows are selected
    All,
    Range { first: usize, last: usize },
}

impl ColumnBounds {
    fn admits(self, doc: &Document, cell: NodeId) -> bool {
        match self {
            ColumnBounds::All => true,
            ColumnBounds::Range { first, last } => column_range(doc, cell)
                .is_some_and(|(from, to)| first <= from && to <= last),
        }
    }
}

/// A rectangular cell selection: one segment per row that has selected
/// cells, top to bottom
#[derive(Debug, Clone, PartialEq)]
pub struct TableCellRange {
    pub table: NodeId,
    pub columns: ColumnBounds,
    segments: Vec<TextSegment>,
}

impl TableCellRange {
    pub fn segments(&self) -> &[TextSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whole-row selection over `rows` of `table`
    pub(crate) fn whole_rows(doc: &Document, table: NodeId, rows: &[NodeId]) -> Self {
        let segments = rows
            .iter()
            .filter_map(|&row| {
                let row_cells = cells(doc, row);
                cell_segment(doc, *row_cells.first()?, *row_cells.last()?)
            })
            .collect();
        Self {
            table,
            columns: ColumnBounds::All,
            segments,
        }
    }

    /// From the start of the first segment to the end of the last
    pub fn bounds(&self) -> Option<TextSegment> {
        let first = self.segments.first()?;
        let last = self.segments.last()?;
        Some(TextSegment::new(first.start(), last.end()))
    }
}

/// What a position pair selects
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedRange {
    Cells(TableCellRange),
    /// The selection leaves a table; rows on the crossed side are selected
    /// whole
    CrossTable(TextSegment),
}

/// Grid columns spanned by two cells together; `None` when either has no
/// computed column
pub fn column_bounds(doc: &Document, a: NodeId, b: NodeId) -> Option<(usize, usize)> {
    let (a_first, a_last) = column_range(doc, a)?;
    let (b_first, b_last) = column_range(doc, b)?;
    Some((a_first.min(b_first), a_last.max(b_last)))
}

/// Segment from the first content position of `first` to just past `last`
pub fn cell_segment(doc: &Document, first: NodeId, last: NodeId) -> Option<TextSegment> {
    let start = doc
        .first_insertion_in(first)
        .or_else(|| doc.element_position(first, ElementEdge::AfterStart))?;
    let end = doc.element_position(last, ElementEdge::AfterEnd)?;
    Some(TextSegment::new(start, end))
}

/// Build the rectangular selection spanned by two cells of one table.
///
/// Rows run from the higher cell's row to the lowest row either cell spans
/// into; columns from the leftmost to the rightmost grid column of the two.
/// In each row the maximal run of cells lying wholly inside the columns
/// becomes one segment. Without layout data whole rows are selected.
pub fn build_cell_range(
    doc: &Document,
    anchor_cell: NodeId,
    moving_cell: NodeId,
) -> Option<TableCellRange> {
    let table = table_of_cell(doc, anchor_cell)?;
    if table_of_cell(doc, moving_cell)? != table {
        return None;
    }
    let all_rows = table_rows(doc, table);
    let ordinal = |cell: NodeId| {
        let row = row_of(doc, cell)?;
        all_rows.iter().position(|&r| r == row)
    };
    let anchor_row = ordinal(anchor_cell)?;
    let moving_row = ordinal(moving_cell)?;
    let first_row = anchor_row.min(moving_row);
    let last_row = (anchor_row + effective_row_span(doc, anchor_cell).max(1) - 1)
        .max(moving_row + effective_row_span(doc, moving_cell).max(1) - 1);

    let columns = match column_bounds(doc, anchor_cell, moving_cell) {
        Some((first, last)) => ColumnBounds::Range { first, last },
        None => {
            log::debug!("no column layout for {anchor_cell}/{moving_cell}, selecting whole rows");
            ColumnBounds::All
        }
    };

    let mut segments = Vec::new();
    for &row in all_rows.iter().take(last_row + 1).skip(first_row) {
        let run: Vec<NodeId> = cells(doc, row)
            .iter()
            .copied()
            .skip_while(|&c| !columns.admits(doc, c))
            .take_while(|&c| columns.admits(doc, c))
            .collect();
        if let (Some(&first), Some(&last)) = (run.first(), run.last()) {
            if let Some(segment) = cell_segment(doc, first, last) {
                segments.push(segment);
            }
        }
    }

    Some(TableCellRange {
        table,
        columns,
        segments,
    })
}

/// Collapse a table-crossing selection to one segment. The side that sits
/// in `row` (if any) is widened to the whole row.
pub fn build_cross_table_segment(
    doc: &Document,
    anchor: TextPosition,
    moving: TextPosition,
    anchor_row: Option<NodeId>,
    moving_row: Option<NodeId>,
) -> TextSegment {
    let widen = |position: TextPosition, row: Option<NodeId>, edge: ElementEdge| {
        row.and_then(|r| doc.element_position(r, edge))
            .unwrap_or(position)
    };
    if doc.compare_positions(anchor, moving).is_le() {
        TextSegment::new(
            widen(anchor, anchor_row, ElementEdge::BeforeStart),
            widen(moving, moving_row, ElementEdge::AfterEnd),
        )
    } else {
        TextSegment::new(
            widen(moving, moving_row, ElementEdge::BeforeStart),
            widen(anchor, anchor_row, ElementEdge::AfterEnd),
        )
    }
}

/// Classify `anchor`/`moving` and build the matching range. `None` means
/// plain text behaviour: no table structure is involved.
pub fn build_range(
    doc: &Document,
    anchor: TextPosition,
    moving: TextPosition,
) -> Option<ClassifiedRange> {
    let boundaries = classify(doc, anchor, moving);
    if boundaries.is_none() {
        return None;
    }
    if boundaries.crosses_table() {
        // Only a side that actually left its table is widened to its row
        let crossed_row = |side: &BoundarySide| side.table.and(side.row);
        return Some(ClassifiedRange::CrossTable(build_cross_table_segment(
            doc,
            boundaries.anchor.position,
            boundaries.moving.position,
            crossed_row(&boundaries.anchor),
            crossed_row(&boundaries.moving),
        )));
    }
    let (anchor_cell, moving_cell) = boundaries.cells()?;
    build_cell_range(doc, anchor_cell, moving_cell).map(ClassifiedRange::Cells)
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
    use crate::doc::LogicalDirection;
    use crate::layout::validate_structure;
    use crate::table::{CellSpec, TableSpec};

    struct Fixture {
        doc: Document,
        before: NodeId,
        table: NodeId,
    }

    impl Fixture {
        fn new(spec: &TableSpec, layout: bool) -> Self {
            let mut doc = Document::new();
            let root = doc.root();
            let before = doc.append_paragraph(root, "before").unwrap();
            let table = spec.build(&mut doc, root, &EditorConfig::default()).unwrap();
            doc.append_paragraph(root, "after").unwrap();
            if layout {
                validate_structure(&mut doc, table).unwrap();
            }
            Fixture { doc, before, table }
        }

        fn cell(&self, row: usize, index: usize) -> NodeId {
            cells(&self.doc, table_rows(&self.doc, self.table)[row])[index]
        }

        fn inside(&self, row: usize, index: usize) -> TextPosition {
            self.doc.first_insertion_in(self.cell(row, index)).unwrap()
        }

        fn segment(&self, row: usize, first: usize, last: usize) -> TextSegment {
            cell_segment(&self.doc, self.cell(row, first), self.cell(row, last)).unwrap()
        }
    }

    #[test]
    fn test_segment_ends_one_past_last_cell() {
        let f = Fixture::new(&TableSpec::grid(1, 2), true);
        let segment = f.segment(0, 0, 1);
        assert_eq!(segment.start(), f.inside(0, 0));
        assert_eq!(
            segment.end(),
            TextPosition::new(
                f.doc.element_end(f.cell(0, 1)).unwrap(),
                LogicalDirection::Backward
            )
        );
    }

    #[test]
    fn test_rectangle_in_grid() {
        let f = Fixture::new(&TableSpec::grid(3, 3), true);
        let range = build_cell_range(&f.doc, f.cell(2, 2), f.cell(1, 1)).unwrap();
        assert_eq!(range.columns, ColumnBounds::Range { first: 1, last: 2 });
        assert_eq!(range.segments(), &[f.segment(1, 1, 2), f.segment(2, 1, 2)]);
        assert_eq!(
            range.bounds(),
            Some(TextSegment::new(f.inside(1, 1), f.segment(2, 1, 2).end()))
        );
    }

    #[test]
    fn test_row_span_extends_rows() {
        // | A (2 rows) | B |
        // |            | C |
        // | D          | E |
        let f = Fixture::new(
            &TableSpec::from_rows(vec![
                vec![CellSpec::spanning("A", 1, 2), CellSpec::new("B")],
                vec![CellSpec::new("C")],
                vec![CellSpec::new("D"), CellSpec::new("E")],
            ]),
            true,
        );
        let range = build_cell_range(&f.doc, f.cell(0, 0), f.cell(0, 1)).unwrap();
        assert_eq!(range.segments(), &[f.segment(0, 0, 1), f.segment(1, 0, 0)]);
    }

    #[test]
    fn test_partially_covered_cells_are_left_out() {
        // | wide      | x |
        // | a | b     | c |
        let f = Fixture::new(
            &TableSpec::from_rows(vec![
                vec![CellSpec::spanning("wide", 2, 1), CellSpec::new("x")],
                vec![CellSpec::new("a"), CellSpec::new("b"), CellSpec::new("c")],
            ]),
            true,
        );
        let range = build_cell_range(&f.doc, f.cell(1, 1), f.cell(1, 2)).unwrap();
        assert_eq!(range.columns, ColumnBounds::Range { first: 1, last: 2 });
        assert_eq!(range.segments(), &[f.segment(1, 1, 2)]);
    }

    #[test]
    fn test_without_layout_selects_whole_rows() {
        let f = Fixture::new(&TableSpec::grid(3, 3), false);
        let range = build_cell_range(&f.doc, f.cell(0, 1), f.cell(1, 1)).unwrap();
        assert_eq!(range.columns, ColumnBounds::All);
        assert_eq!(range.segments(), &[f.segment(0, 0, 2), f.segment(1, 0, 2)]);
    }

    #[test]
    fn test_build_range_inside_table() {
        let f = Fixture::new(&TableSpec::grid(2, 2), true);
        let Some(ClassifiedRange::Cells(range)) = build_range(&f.doc, f.inside(0, 0), f.inside(1, 0))
        else {
            panic!("expected a cell range");
        };
        assert_eq!(range.table, f.table);
        assert_eq!(range.segments(), &[f.segment(0, 0, 0), f.segment(1, 0, 0)]);
    }

    #[test]
    fn test_build_range_plain_text() {
        let f = Fixture::new(&TableSpec::grid(2, 2), true);
        let start = f.doc.first_insertion_in(f.before).unwrap();
        let end = f.doc.last_insertion_in(f.before).unwrap();
        assert_eq!(build_range(&f.doc, start, end), None);
        assert_eq!(build_range(&f.doc, f.inside(1, 1), f.inside(1, 1)), None);
    }

    #[test]
    fn test_cross_table_widens_crossed_row() {
        let f = Fixture::new(&TableSpec::grid(2, 2), true);
        let outside = f.doc.first_insertion_in(f.before).unwrap();
        let row = table_rows(&f.doc, f.table)[1];

        let expected = TextSegment::new(
            outside,
            f.doc.element_position(row, ElementEdge::AfterEnd).unwrap(),
        );
        assert_eq!(
            build_range(&f.doc, f.inside(1, 0), outside),
            Some(ClassifiedRange::CrossTable(expected))
        );
        assert_eq!(
            build_range(&f.doc, outside, f.inside(1, 0)),
            Some(ClassifiedRange::CrossTable(expected))
        );
    }

    #[test]
    fn test_cross_table_segment_without_rows() {
        let f = Fixture::new(&TableSpec::grid(1, 1), true);
        let a = f.doc.first_insertion_in(f.before).unwrap();
        let b = f.inside(0, 0);
        assert_eq!(
            build_cross_table_segment(&f.doc, b, a, None, None),
            TextSegment::new(a, b)
        );
    }

    #[test]
    fn test_cells_of_different_tables() {
        let mut f = Fixture::new(&TableSpec::grid(1, 1), true);
        let root = f.doc.root();
        let other = TableSpec::grid(1, 1)
            .build(&mut f.doc, root, &EditorConfig::default())
            .unwrap();
        let foreign = cells(&f.doc, table_rows(&f.doc, other)[0])[0];
        assert!(build_cell_range(&f.doc, f.cell(0, 0), foreign).is_none());
    }
}
