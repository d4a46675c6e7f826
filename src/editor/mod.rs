//! Structural table editing.
//!
//! The free functions in the submodules edit a `Document` directly.
//! `TableEditor` wraps them for a host editor, adding:
//! - Ownership of the document and the editor configuration
//! - Dirty tracking for edited tables
//! - A revision counter bumped once per successful user action, so a host
//!   never observes a half-applied edit

mod columns;
mod merge;
mod resize;
mod rows;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::doc::{Document, ElementEdge, NodeId, TextPosition, TextSegment};
use crate::error::Result;
use crate::layout::{validate_structure, TableColumnLayout};
use crate::selection::{boundary_cells, build_range, ClassifiedRange, TableCellRange};
use crate::table::{
    covering_cell, effective_row_span, row_groups, row_of, rows, table_of_cell, table_rows,
    TableSpec,
};

pub use columns::{delete_column, delete_columns, insert_column, insert_columns};
pub use merge::{merge_cell_range, merge_cells, split_cell};
pub use resize::{start_column_resize, ColumnResizeSession};
pub use rows::{delete_row_interval, delete_rows, insert_rows};

/// Which side of the selection new rows or columns go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InsertSide {
    Before,
    After,
}

/// Editor state around one document
#[derive(Debug, Clone, Default)]
pub struct TableEditor {
    doc: Document,
    config: EditorConfig,
    /// Tables changed since the last `clear_dirty`
    dirty_tables: HashSet<NodeId>,
    revision: u64,
}

impl TableEditor {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_document(Document::new(), config)
    }

    pub fn with_document(doc: Document, config: EditorConfig) -> Self {
        Self {
            doc,
            config,
            dirty_tables: HashSet::new(),
            revision: 0,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Number of successful structural actions so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty_tables.is_empty()
    }

    pub fn dirty_tables(&self) -> &HashSet<NodeId> {
        &self.dirty_tables
    }

    pub fn clear_dirty(&mut self) {
        self.dirty_tables.clear();
    }

    fn touch(&mut self, table: NodeId) {
        self.dirty_tables.insert(table);
        self.revision += 1;
    }

    /// Append a table to the end of the document and lay it out
    ///
    /// # Errors
    /// Fails if the description cannot be built.
    pub fn insert_table(&mut self, spec: &TableSpec) -> Result<NodeId> {
        let root = self.doc.root();
        let table = spec.build(&mut self.doc, root, &self.config)?;
        validate_structure(&mut self.doc, table)?;
        crate::table::correct_borders(&mut self.doc, table)?;
        self.touch(table);
        Ok(table)
    }

    /// Describe a table as it currently stands
    pub fn snapshot(&self, table: NodeId) -> Option<TableSpec> {
        TableSpec::snapshot(&self.doc, table)
    }

    /// What a selection from `anchor` to `moving` covers
    pub fn select(&self, anchor: TextPosition, moving: TextPosition) -> Option<ClassifiedRange> {
        build_range(&self.doc, anchor, moving)
    }

    fn selected_table(&self, selection: TextSegment) -> Option<NodeId> {
        let (cell, _) = boundary_cells(&self.doc, selection.start(), selection.end())?;
        table_of_cell(&self.doc, cell)
    }

    /// Insert `count` rows above the selection's first row or below its
    /// last row
    ///
    /// # Errors
    /// Fails on a malformed table.
    pub fn insert_rows(
        &mut self,
        selection: TextSegment,
        count: usize,
        side: InsertSide,
    ) -> Result<Option<TableCellRange>> {
        let Some((first, last)) = boundary_cells(&self.doc, selection.start(), selection.end())
        else {
            return Ok(None);
        };
        // The boundary pair comes in selection order, not document order
        let reference = match side {
            InsertSide::Before => [row_of(&self.doc, first), row_of(&self.doc, last)]
                .into_iter()
                .flatten()
                .min_by_key(|&r| self.doc.element_start(r)),
            InsertSide::After => [self.bottom_row(first), self.bottom_row(last)]
                .into_iter()
                .flatten()
                .max_by_key(|&r| self.doc.element_start(r)),
        };
        let Some(reference) = reference else {
            return Ok(None);
        };
        let Some(table) = table_of_cell(&self.doc, first) else {
            return Ok(None);
        };
        let range = insert_rows(&mut self.doc, reference, count, side)?;
        if range.is_some() {
            self.touch(table);
        }
        Ok(range)
    }

    /// Last row `cell` occupies
    fn bottom_row(&self, cell: NodeId) -> Option<NodeId> {
        let row = row_of(&self.doc, cell)?;
        let group = self.doc.parent(row)?;
        let index = self.doc.child_index(row)?;
        let span = effective_row_span(&self.doc, cell).max(1);
        rows(&self.doc, group).get(index + span - 1).copied()
    }

    /// # Errors
    /// Fails on a malformed table.
    pub fn delete_rows(&mut self, selection: &mut TextSegment) -> Result<bool> {
        let table = self.selected_table(*selection);
        let deleted = delete_rows(&mut self.doc, selection)?;
        if let (true, Some(table)) = (deleted, table) {
            self.touch(table);
        }
        Ok(deleted)
    }

    /// # Errors
    /// Fails on a malformed table.
    pub fn insert_columns(
        &mut self,
        selection: TextSegment,
        count: usize,
        side: InsertSide,
    ) -> Result<bool> {
        let table = self.selected_table(selection);
        let inserted = insert_columns(&mut self.doc, selection, count, side)?;
        if let (true, Some(table)) = (inserted, table) {
            self.touch(table);
        }
        Ok(inserted)
    }

    /// Delete every column the selection touches
    ///
    /// # Errors
    /// Fails on a malformed table.
    pub fn delete_columns(&mut self, selection: TextSegment) -> Result<bool> {
        let Some((a, b)) = boundary_cells(&self.doc, selection.start(), selection.end()) else {
            return Ok(false);
        };
        let Some(table) = table_of_cell(&self.doc, a) else {
            return Ok(false);
        };
        validate_structure(&mut self.doc, table)?;
        let Some((first, last)) = crate::selection::column_bounds(&self.doc, a, b) else {
            return Ok(false);
        };
        let deleted = delete_columns(&mut self.doc, selection, last - first + 1)?;
        if deleted {
            self.touch(table);
        }
        Ok(deleted)
    }

    /// # Errors
    /// Fails on a malformed table.
    pub fn merge_cells(&mut self, selection: TextSegment) -> Result<Option<TextSegment>> {
        let table = self.selected_table(selection);
        let caret = merge_cells(&mut self.doc, selection)?;
        if let (Some(_), Some(table)) = (caret, table) {
            self.touch(table);
        }
        Ok(caret)
    }

    /// # Errors
    /// Fails on a malformed table.
    pub fn split_cell(
        &mut self,
        selection: TextSegment,
        horizontal: usize,
        vertical: usize,
    ) -> Result<Option<TextSegment>> {
        let table = self.selected_table(selection);
        let caret = split_cell(&mut self.doc, selection, horizontal, vertical)?;
        if let (Some(_), Some(table)) = (caret, table) {
            self.touch(table);
        }
        Ok(caret)
    }

    /// Start dragging the column border of `table` nearest to `x`
    pub fn start_column_resize(&self, table: NodeId, x: f64) -> Option<ColumnResizeSession> {
        start_column_resize(
            &self.doc,
            table,
            x,
            self.config.autofit_width,
            self.config.resize_tolerance,
        )
    }

    /// Finish a drag started with `start_column_resize`
    ///
    /// # Errors
    /// Fails on a malformed table.
    pub fn commit_column_resize(&mut self, session: ColumnResizeSession, x: f64) -> Result<bool> {
        let table = session.table();
        let committed = session.commit(&mut self.doc, x)?;
        if committed {
            self.touch(table);
        }
        Ok(committed)
    }

    // ---- Grid-coordinate entry points (scripts, the wasm binding) ----

    /// Cell occupying grid position (`row`, `column`); rows are counted
    /// across all row groups
    pub fn cell_at(&self, table: NodeId, row: usize, column: usize) -> Option<NodeId> {
        let row = *table_rows(&self.doc, table).get(row)?;
        covering_cell(&self.doc, row, column)
    }

    /// Selection from the cell at `from` to the cell at `to`
    pub fn select_cells(
        &self,
        table: NodeId,
        from: (usize, usize),
        to: (usize, usize),
    ) -> Option<TextSegment> {
        let a = self.cell_at(table, from.0, from.1)?;
        let b = self.cell_at(table, to.0, to.1)?;
        let (first, last) = if self.doc.element_start(a)? <= self.doc.element_start(b)? {
            (a, b)
        } else {
            (b, a)
        };
        let start = self.doc.first_insertion_in(first)?;
        let end = self.doc.element_position(last, ElementEdge::AfterEnd)?;
        Some(TextSegment::new(start, end))
    }

    /// Row group holding table rows `first..=last`, with the rows' indices
    /// inside it
    fn locate_rows(&self, table: NodeId, first: usize, last: usize) -> Option<(NodeId, usize, usize)> {
        if first > last {
            return None;
        }
        let mut offset = 0;
        for &group in row_groups(&self.doc, table) {
            let len = rows(&self.doc, group).len();
            if first < offset + len {
                return (last < offset + len).then_some((group, first - offset, last - offset));
            }
            offset += len;
        }
        None
    }

    /// Insert `count` rows next to table row `row`
    ///
    /// # Errors
    /// Fails on a malformed table.
    pub fn insert_rows_at(
        &mut self,
        table: NodeId,
        row: usize,
        count: usize,
        side: InsertSide,
    ) -> Result<Option<TableCellRange>> {
        let Some(&reference) = table_rows(&self.doc, table).get(row) else {
            return Ok(None);
        };
        let range = insert_rows(&mut self.doc, reference, count, side)?;
        if range.is_some() {
            self.touch(table);
        }
        Ok(range)
    }

    /// Delete table rows `first..=last`, which must share a row group
    ///
    /// # Errors
    /// Fails on a malformed table.
    pub fn delete_row_range(&mut self, table: NodeId, first: usize, last: usize) -> Result<bool> {
        let Some((group, first, last)) = self.locate_rows(table, first, last) else {
            return Ok(false);
        };
        let deleted = delete_row_interval(&mut self.doc, group, first, last)?;
        if deleted {
            self.touch(table);
        }
        Ok(deleted)
    }

    /// Merge table rows `top..=bottom` × grid columns `left..=right`
    ///
    /// # Errors
    /// Fails on a malformed table.
    pub fn merge_rectangle(
        &mut self,
        table: NodeId,
        top: usize,
        bottom: usize,
        left: usize,
        right: usize,
    ) -> Result<Option<TextSegment>> {
        let Some((group, top, bottom)) = self.locate_rows(table, top, bottom) else {
            return Ok(None);
        };
        let caret = merge_cell_range(&mut self.doc, group, top, bottom, left, right)?;
        if caret.is_some() {
            self.touch(table);
        }
        Ok(caret)
    }

    /// Move the right border of `column` by `delta` pixels, as a drag would
    ///
    /// # Errors
    /// Fails on a malformed table.
    pub fn resize_column(&mut self, table: NodeId, column: usize, delta: f64) -> Result<bool> {
        let Some(layout) = TableColumnLayout::compute(&self.doc, table, self.config.autofit_width)
        else {
            return Ok(false);
        };
        let Some(rect) = layout.column_rect(column) else {
            return Ok(false);
        };
        let border = rect.x + rect.width;
        let Some(session) = ColumnResizeSession::new(table, column, &layout, border) else {
            return Ok(false);
        };
        self.commit_column_resize(session, border + delta)
    }
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
    use crate::selection::cell_segment;
    use crate::table::{cells, table_rows};

    fn editor_with_grid(rows: usize, columns: usize) -> (TableEditor, NodeId) {
        let mut editor = TableEditor::new(EditorConfig::default());
        let table = editor.insert_table(&TableSpec::grid(rows, columns)).unwrap();
        editor.clear_dirty();
        (editor, table)
    }

    fn cell_selection(editor: &TableEditor, table: NodeId, row: usize, index: usize) -> TextSegment {
        let doc = editor.document();
        let cell = cells(doc, table_rows(doc, table)[row])[index];
        cell_segment(doc, cell, cell).unwrap()
    }

    #[test]
    fn test_revision_counts_successful_actions() {
        let (mut editor, table) = editor_with_grid(2, 2);
        let start = editor.revision();
        assert!(!editor.is_dirty());

        let selection = cell_selection(&editor, table, 0, 0);
        assert!(editor.split_cell(selection, 1, 0).unwrap().is_none());
        assert_eq!(editor.revision(), start);
        assert!(!editor.is_dirty());

        editor.insert_rows(selection, 1, InsertSide::After).unwrap().unwrap();
        assert_eq!(editor.revision(), start + 1);
        assert!(editor.dirty_tables().contains(&table));
    }

    #[test]
    fn test_insert_after_spanning_cell_uses_its_last_row() {
        let mut editor = TableEditor::new(EditorConfig::default());
        let table = editor
            .insert_table(&TableSpec::from_rows(vec![
                vec![
                    crate::table::CellSpec::spanning("A", 1, 2),
                    crate::table::CellSpec::new("B"),
                ],
                vec![crate::table::CellSpec::new("C")],
            ]))
            .unwrap();
        let selection = cell_selection(&editor, table, 0, 0);
        editor.insert_rows(selection, 1, InsertSide::After).unwrap().unwrap();

        let spec = editor.snapshot(table).unwrap();
        let texts: Vec<Vec<&str>> = spec
            .rows()
            .map(|r| r.iter().map(|c| c.text.as_str()).collect())
            .collect();
        assert_eq!(texts, vec![vec!["A", "B"], vec!["C"], vec!["", ""]]);
    }

    #[test]
    fn test_delete_columns_uses_selection_width() {
        let (mut editor, table) = editor_with_grid(2, 3);
        let doc = editor.document();
        let row = table_rows(doc, table)[0];
        let selection = cell_segment(doc, cells(doc, row)[1], cells(doc, row)[2]).unwrap();

        assert!(editor.delete_columns(selection).unwrap());
        assert_eq!(crate::table::column_count(editor.document(), table), 1);
        assert_eq!(editor.revision(), 2);
    }

    #[test]
    fn test_resize_through_editor() {
        let (mut editor, table) = editor_with_grid(1, 2);
        // Two auto columns share the 600px autofit width
        let session = editor.start_column_resize(table, 302.0).unwrap();
        assert_eq!(session.column(), 0);
        assert!(editor.commit_column_resize(session, 352.0).unwrap());
        assert!(editor.is_dirty());
    }

    #[test]
    fn test_grid_coordinates_cross_groups() {
        let mut editor = TableEditor::new(EditorConfig::default());
        let spec = TableSpec {
            cell_spacing: None,
            columns: Vec::new(),
            groups: vec![
                TableSpec::grid(2, 2).groups[0].clone(),
                TableSpec::grid(2, 2).groups[0].clone(),
            ],
        };
        let table = editor.insert_table(&spec).unwrap();

        assert!(!editor.delete_row_range(table, 1, 2).unwrap());
        assert!(editor.merge_rectangle(table, 2, 3, 0, 1).unwrap().is_some());
        let merged = editor.cell_at(table, 2, 1).unwrap();
        assert_eq!(editor.cell_at(table, 2, 0), Some(merged));
        assert!(editor.delete_row_range(table, 0, 0).unwrap());
        assert_eq!(table_rows(editor.document(), table).len(), 2);
    }

    #[test]
    fn test_select_cells_in_either_order() {
        let (editor, table) = editor_with_grid(2, 2);
        let forward = editor.select_cells(table, (0, 0), (1, 1)).unwrap();
        let backward = editor.select_cells(table, (1, 1), (0, 0)).unwrap();
        assert_eq!(forward, backward);
        assert!(editor.select_cells(table, (5, 0), (0, 0)).is_none());
    }

    #[test]
    fn test_resize_column_by_delta() {
        let (mut editor, table) = editor_with_grid(1, 3);
        assert!(editor.resize_column(table, 0, 50.0).unwrap());
        let widths: Vec<_> = editor
            .document()
            .table_props(table)
            .unwrap()
            .columns
            .iter()
            .map(|c| c.width)
            .collect();
        assert_eq!(
            widths,
            vec![
                crate::doc::ColumnWidth::Fixed(250.0),
                crate::doc::ColumnWidth::Fixed(150.0),
                crate::doc::ColumnWidth::Fixed(200.0)
            ]
        );
        assert!(!editor.resize_column(table, 7, 5.0).unwrap());
    }

    #[test]
    fn test_select_reports_cells() {
        let (editor, table) = editor_with_grid(2, 2);
        let doc = editor.document();
        let anchor = doc
            .first_insertion_in(cells(doc, table_rows(doc, table)[0])[0])
            .unwrap();
        let moving = doc
            .first_insertion_in(cells(doc, table_rows(doc, table)[1])[1])
            .unwrap();
        let Some(ClassifiedRange::Cells(range)) = editor.select(anchor, moving) else {
            panic!("expected cells");
        };
        assert_eq!(range.segments().len(), 2);
    }
}
