//! Interactive column resize.
//!
//! A drag is an explicit session: `start_column_resize` hit-tests a column
//! border and captures the column geometry, `update_drag` previews,
//! `commit` writes every column width at once and `dispose` abandons the
//! drag without touching the document.

use crate::doc::{ColumnDef, ColumnWidth, Document, NodeId};
use crate::error::Result;
use crate::layout::{ColumnRect, TableColumnLayout};
use crate::table::column_count;

/// State of one column-border drag
#[derive(Debug, Clone)]
pub struct ColumnResizeSession {
    table: NodeId,
    column: usize,
    /// Column geometry when the drag started
    initial: ColumnRect,
    /// Dragged column as currently previewed
    rect: ColumnRect,
    widths: Vec<f64>,
    slack: f64,
    origin_x: f64,
}

/// Begin dragging the column border nearest to `x`, if one lies within
/// `tolerance`. Returns `None` before layout has run.
pub fn start_column_resize(
    doc: &Document,
    table: NodeId,
    x: f64,
    autofit_width: f64,
    tolerance: f64,
) -> Option<ColumnResizeSession> {
    let layout = TableColumnLayout::compute(doc, table, autofit_width)?;
    let column = layout.border_at_x(x, tolerance)?;
    ColumnResizeSession::new(table, column, &layout, x)
}

impl ColumnResizeSession {
    /// Session on `column` of an already computed layout
    pub fn new(
        table: NodeId,
        column: usize,
        layout: &TableColumnLayout,
        origin_x: f64,
    ) -> Option<Self> {
        let rect = layout.column_rect(column)?;
        Some(Self {
            table,
            column,
            initial: rect,
            rect,
            widths: layout.widths.clone(),
            slack: layout.slack(),
            origin_x,
        })
    }

    pub fn table(&self) -> NodeId {
        self.table
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn rect(&self) -> ColumnRect {
        self.rect
    }

    /// How far the border may move left: the whole column width
    pub fn left_drag_max(&self) -> f64 {
        self.initial.width
    }

    /// How far the border may move right: the next column's width, or the
    /// table's unused width for the last column
    pub fn right_drag_max(&self) -> f64 {
        match self.widths.get(self.column + 1) {
            Some(&next) => next,
            None => self.slack.max(0.0),
        }
    }

    fn delta(&self, x: f64) -> f64 {
        (x - self.origin_x).clamp(-self.left_drag_max(), self.right_drag_max())
    }

    /// Preview the drag at `x`; returns the clamped border offset
    pub fn update_drag(&mut self, x: f64) -> f64 {
        let delta = self.delta(x);
        self.rect.width = self.initial.width + delta;
        delta
    }

    /// Column widths after dropping the border at `x`
    pub fn widths_at(&self, x: f64) -> Vec<f64> {
        let delta = self.delta(x);
        let mut widths = self.widths.clone();
        if let Some(w) = widths.get_mut(self.column) {
            *w += delta;
        }
        if let Some(w) = widths.get_mut(self.column + 1) {
            *w -= delta;
        }
        widths
    }

    /// Apply the drag: every column is pinned to a fixed width in one step.
    ///
    /// Returns `false` without changes if the table's column count changed
    /// since the drag started.
    ///
    /// # Errors
    /// Currently infallible; kept fallible alongside the other edits.
    pub fn commit(self, doc: &mut Document, x: f64) -> Result<bool> {
        if column_count(doc, self.table) != self.widths.len() {
            log::debug!("resize: table {} changed during the drag", self.table);
            return Ok(false);
        }
        let widths = self.widths_at(x);
        let Some(props) = doc.table_props_mut(self.table) else {
            return Ok(false);
        };
        props.columns = widths
            .into_iter()
            .map(|w| ColumnDef {
                width: ColumnWidth::Fixed(w.max(0.0)),
            })
            .collect();
        Ok(true)
    }

    /// Abandon the drag
    pub fn dispose(self) {
        log::trace!("resize: drag on column {} abandoned", self.column);
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
    use crate::config::EditorConfig;
    use crate::layout::validate_structure;
    use crate::table::TableSpec;

    fn fixed_table(widths: &[f64], spacing: f64) -> (Document, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let table = TableSpec::grid(2, widths.len())
            .with_columns(widths.iter().map(|&w| ColumnWidth::Fixed(w)).collect())
            .with_cell_spacing(spacing)
            .build(&mut doc, root, &EditorConfig::default())
            .unwrap();
        validate_structure(&mut doc, table).unwrap();
        (doc, table)
    }

    fn fixed_widths(doc: &Document, table: NodeId) -> Vec<f64> {
        doc.table_props(table)
            .unwrap()
            .columns
            .iter()
            .map(|c| match c.width {
                ColumnWidth::Fixed(w) => w,
                ColumnWidth::Auto => panic!("column left on auto"),
            })
            .collect()
    }

    #[test]
    fn test_last_column_drags_into_slack() {
        let (doc, table) = fixed_table(&[100.0, 150.0], 5.0);
        // Right border of the last column: 5 + 100 + 5 + 150 = 260
        let session = start_column_resize(&doc, table, 260.0, 400.0, 4.0).unwrap();
        assert_eq!(session.column(), 1);
        assert_eq!(session.left_drag_max(), 150.0);
        // 400 - 250 - 3 * 5
        assert_eq!(session.right_drag_max(), 135.0);
    }

    #[test]
    fn test_slack_never_negative() {
        let (doc, table) = fixed_table(&[300.0, 300.0], 0.0);
        let session = start_column_resize(&doc, table, 600.0, 500.0, 4.0).unwrap();
        assert_eq!(session.right_drag_max(), 0.0);
    }

    #[test]
    fn test_drag_transfers_width_to_neighbour() {
        let (mut doc, table) = fixed_table(&[100.0, 100.0, 100.0], 0.0);
        let mut session = start_column_resize(&doc, table, 101.0, 300.0, 4.0).unwrap();
        assert_eq!(session.column(), 0);
        assert_eq!(session.right_drag_max(), 100.0);

        assert_eq!(session.update_drag(131.0), 30.0);
        assert_eq!(session.rect().width, 130.0);
        // Clamped to the neighbour's width
        assert_eq!(session.update_drag(500.0), 100.0);

        assert!(session.commit(&mut doc, 81.0).unwrap());
        assert_eq!(fixed_widths(&doc, table), vec![80.0, 120.0, 100.0]);
    }

    #[test]
    fn test_commit_pins_auto_columns() {
        let mut doc = Document::new();
        let root = doc.root();
        let table = TableSpec::grid(1, 2)
            .build(&mut doc, root, &EditorConfig::default())
            .unwrap();
        validate_structure(&mut doc, table).unwrap();
        let session = start_column_resize(&doc, table, 300.0, 600.0, 4.0).unwrap();
        assert!(session.commit(&mut doc, 250.0).unwrap());
        assert_eq!(fixed_widths(&doc, table), vec![250.0, 350.0]);
    }

    #[test]
    fn test_commit_after_structure_change() {
        let (mut doc, table) = fixed_table(&[100.0, 100.0], 0.0);
        let session = start_column_resize(&doc, table, 100.0, 300.0, 4.0).unwrap();
        crate::editor::insert_column(&mut doc, table, Some(1)).unwrap();
        assert!(!session.commit(&mut doc, 120.0).unwrap());
        assert_eq!(doc.table_props(table).unwrap().columns.len(), 3);
    }

    #[test]
    fn test_no_border_near_pointer() {
        let (doc, table) = fixed_table(&[100.0, 100.0], 0.0);
        assert!(start_column_resize(&doc, table, 50.0, 300.0, 4.0).is_none());
        let session = start_column_resize(&doc, table, 199.0, 300.0, 4.0).unwrap();
        session.dispose();
    }
}
