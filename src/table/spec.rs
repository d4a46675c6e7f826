//! Serializable table descriptions.
//!
//! A `TableSpec` builds a table into a document and can be read back out of
//! one, which is what the CLI, the wasm binding and most tests use.

use serde::{Deserialize, Serialize};

use super::model::{cells, row_groups, rows};
use crate::config::EditorConfig;
use crate::doc::{
    CellProps, ColumnDef, ColumnWidth, Document, NodeId, NodeKind, TableProps, Thickness,
};
use crate::error::Result;

fn one() -> usize {
    1
}

fn is_one(value: &usize) -> bool {
    *value == 1
}

/// One cell of a table description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellSpec {
    #[serde(default = "one", skip_serializing_if = "is_one")]
    pub column_span: usize,
    #[serde(default = "one", skip_serializing_if = "is_one")]
    pub row_span: usize,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Layout column, filled in by snapshots; ignored when building
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_index: Option<usize>,
}

impl CellSpec {
    pub fn new(text: &str) -> Self {
        Self::spanning(text, 1, 1)
    }

    pub fn spanning(text: &str, column_span: usize, row_span: usize) -> Self {
        Self {
            column_span,
            row_span,
            text: text.to_string(),
            background: None,
            column_index: None,
        }
    }
}

/// A table: row groups of rows of cells
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSpec {
    /// Cell spacing; `None` uses the editor configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_spacing: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnWidth>,
    pub groups: Vec<Vec<Vec<CellSpec>>>,
}

impl TableSpec {
    /// A single-group `rows` × `columns` grid of unspanned cells named
    /// `r{row}c{col}`
    pub fn grid(rows: usize, columns: usize) -> Self {
        let body = (0..rows)
            .map(|r| {
                (0..columns)
                    .map(|c| CellSpec::new(&format!("r{r}c{c}")))
                    .collect()
            })
            .collect();
        Self::from_rows(body)
    }

    /// A single-group table from explicit rows
    pub fn from_rows(rows: Vec<Vec<CellSpec>>) -> Self {
        Self {
            cell_spacing: None,
            columns: Vec::new(),
            groups: vec![rows],
        }
    }

    #[must_use]
    pub fn with_columns(mut self, columns: Vec<ColumnWidth>) -> Self {
        self.columns = columns;
        self
    }

    #[must_use]
    pub fn with_cell_spacing(mut self, spacing: f64) -> Self {
        self.cell_spacing = Some(spacing);
        self
    }

    /// Create the table as the last child of `parent`. Column indices are
    /// left uncomputed; run `validate_structure` before column queries.
    ///
    /// # Errors
    /// Fails if `parent` cannot hold a table.
    pub fn build(&self, doc: &mut Document, parent: NodeId, config: &EditorConfig) -> Result<NodeId> {
        let table = doc.create(NodeKind::Table(TableProps {
            cell_spacing: self.cell_spacing.unwrap_or(config.cell_spacing),
            columns: self
                .columns
                .iter()
                .map(|&width| ColumnDef { width })
                .collect(),
            column_count: 0,
        }));
        for group_spec in &self.groups {
            let group = doc.create(NodeKind::RowGroup);
            for row_spec in group_spec {
                let row = doc.create(NodeKind::Row);
                for cell_spec in row_spec {
                    let cell = doc.create(NodeKind::Cell(CellProps {
                        column_span: cell_spec.column_span.max(1),
                        row_span: cell_spec.row_span.max(1),
                        column_index: None,
                        borders: Thickness::uniform(config.border_thickness),
                        background: cell_spec.background.clone(),
                    }));
                    doc.append_paragraph(cell, &cell_spec.text)?;
                    doc.append_child(row, cell)?;
                }
                doc.append_child(group, row)?;
            }
            doc.append_child(table, group)?;
        }
        doc.append_child(parent, table)?;
        Ok(table)
    }

    /// Describe an existing table
    pub fn snapshot(doc: &Document, table: NodeId) -> Option<TableSpec> {
        let props = doc.table_props(table)?;
        let groups = row_groups(doc, table)
            .iter()
            .map(|&group| {
                rows(doc, group)
                    .iter()
                    .map(|&row| {
                        cells(doc, row)
                            .iter()
                            .filter_map(|&cell| {
                                let p = doc.cell_props(cell)?;
                                Some(CellSpec {
                                    column_span: p.column_span,
                                    row_span: p.row_span,
                                    text: doc.plain_text(cell),
                                    background: p.background.clone(),
                                    column_index: p.column_index,
                                })
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect();
        Some(TableSpec {
            cell_spacing: Some(props.cell_spacing),
            columns: props.columns.iter().map(|c| c.width).collect(),
            groups,
        })
    }

    /// Rows of every group, in order
    pub fn rows(&self) -> impl Iterator<Item = &Vec<CellSpec>> {
        self.groups.iter().flatten()
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

    #[test]
    fn test_build_and_snapshot() {
        let mut doc = Document::new();
        let root = doc.root();
        let spec = TableSpec::from_rows(vec![
            vec![CellSpec::spanning("wide", 2, 1)],
            vec![CellSpec::new("a"), CellSpec::new("b")],
        ]);
        let table = spec.build(&mut doc, root, &EditorConfig::default()).unwrap();

        let back = TableSpec::snapshot(&doc, table).unwrap();
        assert_eq!(back.groups.len(), 1);
        assert_eq!(back.groups[0][0][0].column_span, 2);
        assert_eq!(back.groups[0][0][0].text, "wide");
        assert_eq!(back.groups[0][1][1].text, "b");
        assert_eq!(back.groups[0][1][1].column_index, None);
    }

    #[test]
    fn test_spec_from_json() {
        let json = r#"{"groups": [[[{"text": "x", "rowSpan": 2}], []]]}"#;
        let spec: TableSpec = serde_json::from_str(json).unwrap();
        let cell = &spec.groups[0][0][0];
        assert_eq!(cell.row_span, 2);
        assert_eq!(cell.column_span, 1);
        assert!(spec.groups[0][1].is_empty());
    }

    #[test]
    fn test_grid_names_cells() {
        let spec = TableSpec::grid(2, 3);
        assert_eq!(spec.rows().count(), 2);
        assert_eq!(spec.groups[0][1][2].text, "r1c2");
    }
}
