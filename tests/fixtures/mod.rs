//! Test fixtures for building documents with tables in memory.
//!
//! # Example
//!
//! ```rust,ignore
//! use fixtures::TableBuilder;
//!
//! let fx = TableBuilder::new()
//!     .row(&["a", "b"])
//!     .spanning_row(&[("tall", 1, 2), ("c", 1, 1)])
//!     .row(&["d"])
//!     .build();
//! let cell = fx.cell(1, 0);
//! ```
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use docgrid::doc::{ColumnWidth, Document, ElementEdge, NodeId, TextPosition, TextSegment};
use docgrid::layout::validate_structure;
use docgrid::table::{cells, table_rows, CellSpec, TableSpec};
use docgrid::EditorConfig;

// ============================================================================
// Table Builder
// ============================================================================

/// Builder for a document holding one table between two paragraphs.
#[derive(Debug, Clone, Default)]
pub struct TableBuilder {
    groups: Vec<Vec<Vec<CellSpec>>>,
    columns: Vec<ColumnWidth>,
    cell_spacing: Option<f64>,
    skip_layout: bool,
    config: EditorConfig,
}

impl TableBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            groups: vec![Vec::new()],
            ..Self::default()
        }
    }

    /// A `rows` × `columns` grid of cells named `r{row}c{col}`.
    #[must_use]
    pub fn grid(rows: usize, columns: usize) -> Self {
        let mut builder = Self::new();
        builder.groups = TableSpec::grid(rows, columns).groups;
        builder
    }

    /// Append a row of unspanned cells to the current row group.
    #[must_use]
    pub fn row(self, texts: &[&str]) -> Self {
        self.push_row(texts.iter().map(|t| CellSpec::new(t)).collect())
    }

    /// Append a row of `(text, column_span, row_span)` cells.
    #[must_use]
    pub fn spanning_row(self, specs: &[(&str, usize, usize)]) -> Self {
        self.push_row(
            specs
                .iter()
                .map(|&(t, cs, rs)| CellSpec::spanning(t, cs, rs))
                .collect(),
        )
    }

    fn push_row(mut self, row: Vec<CellSpec>) -> Self {
        if self.groups.is_empty() {
            self.groups.push(Vec::new());
        }
        self.groups.last_mut().unwrap().push(row);
        self
    }

    /// Start a new row group.
    #[must_use]
    pub fn group(mut self) -> Self {
        self.groups.push(Vec::new());
        self
    }

    #[must_use]
    pub fn columns(mut self, columns: Vec<ColumnWidth>) -> Self {
        self.columns = columns;
        self
    }

    #[must_use]
    pub fn cell_spacing(mut self, spacing: f64) -> Self {
        self.cell_spacing = Some(spacing);
        self
    }

    /// Leave column indices uncomputed, as before the first layout pass.
    #[must_use]
    pub fn without_layout(mut self) -> Self {
        self.skip_layout = true;
        self
    }

    pub fn spec(&self) -> TableSpec {
        TableSpec {
            cell_spacing: self.cell_spacing,
            columns: self.columns.clone(),
            groups: self.groups.clone(),
        }
    }

    pub fn build(&self) -> TableFixture {
        let mut doc = Document::new();
        let root = doc.root();
        let before = doc.append_paragraph(root, "before").unwrap();
        let table = self.spec().build(&mut doc, root, &self.config).unwrap();
        let after = doc.append_paragraph(root, "after").unwrap();
        if !self.skip_layout {
            validate_structure(&mut doc, table).unwrap();
        }
        TableFixture {
            doc,
            table,
            before,
            after,
        }
    }
}

// ============================================================================
// Table Fixture
// ============================================================================

/// A built document plus handles to its parts.
#[derive(Debug, Clone)]
pub struct TableFixture {
    pub doc: Document,
    pub table: NodeId,
    pub before: NodeId,
    pub after: NodeId,
}

impl TableFixture {
    /// Table rows across all groups.
    pub fn rows(&self) -> Vec<NodeId> {
        table_rows(&self.doc, self.table)
    }

    pub fn row(&self, row: usize) -> NodeId {
        self.rows()[row]
    }

    /// The `index`-th cell stored in table row `row`.
    pub fn cell(&self, row: usize, index: usize) -> NodeId {
        cells(&self.doc, self.row(row))[index]
    }

    /// First caret position inside a cell.
    pub fn inside(&self, row: usize, index: usize) -> TextPosition {
        self.doc.first_insertion_in(self.cell(row, index)).unwrap()
    }

    /// Position just in front of a cell's start tag.
    pub fn before_cell(&self, row: usize, index: usize) -> TextPosition {
        self.doc
            .element_position(self.cell(row, index), ElementEdge::BeforeStart)
            .unwrap()
    }

    /// Position just past a cell's end tag.
    pub fn after_cell(&self, row: usize, index: usize) -> TextPosition {
        self.doc
            .element_position(self.cell(row, index), ElementEdge::AfterEnd)
            .unwrap()
    }

    /// Selection covering cells `from..=to` (stored indices) of one row.
    pub fn select_in_row(&self, row: usize, from: usize, to: usize) -> TextSegment {
        TextSegment::new(self.inside(row, from), self.after_cell(row, to))
    }

    /// Selection from the first position of one cell to past another.
    pub fn select(&self, from: (usize, usize), to: (usize, usize)) -> TextSegment {
        TextSegment::new(self.inside(from.0, from.1), self.after_cell(to.0, to.1))
    }

    pub fn in_before_paragraph(&self) -> TextPosition {
        self.doc.first_insertion_in(self.before).unwrap()
    }

    pub fn in_after_paragraph(&self) -> TextPosition {
        self.doc.last_insertion_in(self.after).unwrap()
    }
}
