//! Pre-computed column geometry for a table.
//!
//! Computes column widths and left edges once for a given autofit width,
//! enabling O(log n) hit testing of column borders.

use crate::doc::{ColumnWidth, Document, NodeId};
use crate::table::column_count;

/// Column positions and widths of one table
#[derive(Debug, Clone)]
pub struct TableColumnLayout {
    /// Left edge of each column (`positions[i]` = x of column i)
    pub positions: Vec<f64>,
    /// Width of each column
    pub widths: Vec<f64>,
    /// Gap between columns and around the outer edge
    pub cell_spacing: f64,
    /// Width the table may occupy
    pub autofit_width: f64,
}

/// Horizontal extent of a column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnRect {
    pub x: f64,
    pub width: f64,
}

impl TableColumnLayout {
    /// Lay out the columns of `table` within `autofit_width`.
    ///
    /// Fixed columns keep their width; auto columns split whatever remains
    /// after fixed widths and spacing. Returns `None` before the table's
    /// structure has been validated.
    pub fn compute(doc: &Document, table: NodeId, autofit_width: f64) -> Option<Self> {
        let props = doc.table_props(table)?;
        let count = column_count(doc, table);
        if count == 0 {
            return None;
        }
        let spacing = props.cell_spacing.max(0.0);
        let defs: Vec<ColumnWidth> = (0..count)
            .map(|i| props.columns.get(i).map(|c| c.width).unwrap_or_default())
            .collect();

        let fixed_total: f64 = defs
            .iter()
            .map(|w| match w {
                ColumnWidth::Fixed(px) => px.max(0.0),
                ColumnWidth::Auto => 0.0,
            })
            .sum();
        let auto_count = defs.iter().filter(|w| **w == ColumnWidth::Auto).count();
        let gaps = spacing * (count + 1) as f64;
        let auto_width = if auto_count > 0 {
            (autofit_width - fixed_total - gaps).max(0.0) / auto_count as f64
        } else {
            0.0
        };

        let widths: Vec<f64> = defs
            .iter()
            .map(|w| match w {
                ColumnWidth::Fixed(px) => px.max(0.0),
                ColumnWidth::Auto => auto_width,
            })
            .collect();

        let mut positions = Vec::with_capacity(count);
        let mut x = spacing;
        for w in &widths {
            positions.push(x);
            x += w + spacing;
        }

        Some(TableColumnLayout {
            positions,
            widths,
            cell_spacing: spacing,
            autofit_width,
        })
    }

    pub fn column_count(&self) -> usize {
        self.widths.len()
    }

    /// Total width used by columns and spacing
    pub fn total_width(&self) -> f64 {
        self.widths.iter().sum::<f64>() + self.total_spacing()
    }

    /// Spacing before, between and after the columns
    pub fn total_spacing(&self) -> f64 {
        self.cell_spacing * (self.widths.len() + 1) as f64
    }

    /// Width the table could still grow by, never negative
    pub fn slack(&self) -> f64 {
        (self.autofit_width - self.total_width()).max(0.0)
    }

    pub fn column_rect(&self, column: usize) -> Option<ColumnRect> {
        Some(ColumnRect {
            x: *self.positions.get(column)?,
            width: *self.widths.get(column)?,
        })
    }

    /// Find column at x position (binary search)
    pub fn column_at_x(&self, x: f64) -> Option<usize> {
        if self.positions.is_empty() {
            return None;
        }
        match self
            .positions
            .binary_search_by(|pos| pos.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal))
        {
            Ok(i) => Some(i),
            Err(i) => Some(i.saturating_sub(1)),
        }
    }

    /// Column whose right border lies within `tolerance` of `x`
    pub fn border_at_x(&self, x: f64, tolerance: f64) -> Option<usize> {
        let near = self.column_at_x(x)?;
        // The closest border is the right edge of this column or of the one
        // to its left
        [near.checked_sub(1), Some(near)]
            .into_iter()
            .flatten()
            .filter_map(|c| {
                let rect = self.column_rect(c)?;
                let distance = (rect.x + rect.width - x).abs();
                (distance <= tolerance).then_some((c, distance))
            })
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(c, _)| c)
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

    fn layout_for(spec: &TableSpec, autofit: f64) -> TableColumnLayout {
        let mut doc = Document::new();
        let root = doc.root();
        let table = spec.build(&mut doc, root, &EditorConfig::default()).unwrap();
        validate_structure(&mut doc, table).unwrap();
        TableColumnLayout::compute(&doc, table, autofit).unwrap()
    }

    #[test]
    fn test_auto_columns_share_width() {
        let layout = layout_for(&TableSpec::grid(1, 4), 400.0);
        assert_eq!(layout.widths, vec![100.0; 4]);
        assert_eq!(layout.positions, vec![0.0, 100.0, 200.0, 300.0]);
        assert_eq!(layout.slack(), 0.0);
    }

    #[test]
    fn test_fixed_and_auto_with_spacing() {
        let spec = TableSpec::grid(1, 3)
            .with_columns(vec![ColumnWidth::Fixed(50.0), ColumnWidth::Auto])
            .with_cell_spacing(2.0);
        let layout = layout_for(&spec, 258.0);
        // 258 - 50 - 4 * 2 = 200 shared by two auto columns
        assert_eq!(layout.widths, vec![50.0, 100.0, 100.0]);
        assert_eq!(layout.positions, vec![2.0, 54.0, 156.0]);
        assert_eq!(layout.total_width(), 258.0);
    }

    #[test]
    fn test_column_at_x() {
        let layout = layout_for(&TableSpec::grid(1, 4), 400.0);
        assert_eq!(layout.column_at_x(0.0), Some(0));
        assert_eq!(layout.column_at_x(99.0), Some(0));
        assert_eq!(layout.column_at_x(100.0), Some(1));
        assert_eq!(layout.column_at_x(350.0), Some(3));
    }

    #[test]
    fn test_border_hit_testing() {
        let layout = layout_for(&TableSpec::grid(1, 4), 400.0);
        assert_eq!(layout.border_at_x(98.0, 4.0), Some(0));
        assert_eq!(layout.border_at_x(102.0, 4.0), Some(0));
        assert_eq!(layout.border_at_x(150.0, 4.0), None);
        assert_eq!(layout.border_at_x(399.0, 4.0), Some(3));
    }

    #[test]
    fn test_needs_validated_structure() {
        let mut doc = Document::new();
        let root = doc.root();
        let table = TableSpec::grid(2, 2)
            .build(&mut doc, root, &EditorConfig::default())
            .unwrap();
        assert!(TableColumnLayout::compute(&doc, table, 100.0).is_none());
    }
}
