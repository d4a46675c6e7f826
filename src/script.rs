//! Batches of table edits described in JSON.
//!
//! A script holds a table description and a list of operations addressed
//! by grid coordinates. Running it builds the table, applies each operation
//! in order and snapshots the result. Infeasible operations are recorded as
//! not applied and do not stop the script.

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::doc::NodeId;
use crate::editor::{InsertSide, TableEditor};
use crate::error::Result;
use crate::table::TableSpec;

fn one() -> usize {
    1
}

/// One structural edit. Rows are counted across all row groups; columns
/// are grid columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum EditOp {
    InsertRows {
        row: usize,
        #[serde(default = "one")]
        count: usize,
        side: InsertSide,
    },
    DeleteRows {
        first: usize,
        last: usize,
    },
    /// Insert beside the cell occupying `column` in the first row
    InsertColumns {
        column: usize,
        #[serde(default = "one")]
        count: usize,
        side: InsertSide,
    },
    DeleteColumns {
        first: usize,
        last: usize,
    },
    Merge {
        top: usize,
        bottom: usize,
        left: usize,
        right: usize,
    },
    Split {
        row: usize,
        column: usize,
        #[serde(default)]
        horizontal: usize,
        #[serde(default)]
        vertical: usize,
    },
    ResizeColumn {
        column: usize,
        delta: f64,
    },
}

/// A table and the edits to apply to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditScript {
    #[serde(default)]
    pub config: EditorConfig,
    pub table: TableSpec,
    #[serde(default)]
    pub ops: Vec<EditOp>,
}

/// Result of running a script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptOutcome {
    /// Whether each operation took effect
    pub applied: Vec<bool>,
    /// Successful actions, table creation included
    pub revision: u64,
    /// The final table; `None` once every row was deleted
    pub table: Option<TableSpec>,
}

impl EditScript {
    /// # Errors
    /// Returns an error if the JSON does not describe a script.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    /// Fails if the table cannot be built or an edit finds it malformed.
    pub fn run(&self) -> Result<ScriptOutcome> {
        let mut editor = TableEditor::new(self.config.clone());
        let table = editor.insert_table(&self.table)?;
        let mut applied = Vec::with_capacity(self.ops.len());
        for op in &self.ops {
            let done = apply_op(&mut editor, table, op)?;
            log::debug!("{op:?}: {}", if done { "applied" } else { "skipped" });
            applied.push(done);
        }
        let table = editor
            .document()
            .is_attached(table)
            .then(|| editor.snapshot(table))
            .flatten();
        Ok(ScriptOutcome {
            applied,
            revision: editor.revision(),
            table,
        })
    }
}

/// Apply one operation to `table`; `Ok(false)` when it was infeasible
///
/// # Errors
/// Fails on a malformed table.
pub fn apply_op(editor: &mut TableEditor, table: NodeId, op: &EditOp) -> Result<bool> {
    match *op {
        EditOp::InsertRows { row, count, side } => {
            Ok(editor.insert_rows_at(table, row, count, side)?.is_some())
        }
        EditOp::DeleteRows { first, last } => editor.delete_row_range(table, first, last),
        EditOp::InsertColumns {
            column,
            count,
            side,
        } => match editor.select_cells(table, (0, column), (0, column)) {
            Some(selection) => editor.insert_columns(selection, count, side),
            None => Ok(false),
        },
        EditOp::DeleteColumns { first, last } => {
            match editor.select_cells(table, (0, first), (0, last)) {
                Some(selection) => editor.delete_columns(selection),
                None => Ok(false),
            }
        }
        EditOp::Merge {
            top,
            bottom,
            left,
            right,
        } => Ok(editor
            .merge_rectangle(table, top, bottom, left, right)?
            .is_some()),
        EditOp::Split {
            row,
            column,
            horizontal,
            vertical,
        } => match editor.select_cells(table, (row, column), (row, column)) {
            Some(selection) => Ok(editor
                .split_cell(selection, horizontal, vertical)?
                .is_some()),
            None => Ok(false),
        },
        EditOp::ResizeColumn { column, delta } => editor.resize_column(table, column, delta),
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
    fn test_parse_ops() {
        let json = r#"{
            "table": {"groups": [[[{"text": "a"}, {"text": "b"}]]]},
            "ops": [
                {"op": "insertRows", "row": 0, "side": "after"},
                {"op": "split", "row": 0, "column": 0, "horizontal": 1},
                {"op": "resizeColumn", "column": 0, "delta": -20.5}
            ]
        }"#;
        let script = EditScript::from_json(json).unwrap();
        assert_eq!(script.config, EditorConfig::default());
        assert_eq!(
            script.ops[0],
            EditOp::InsertRows {
                row: 0,
                count: 1,
                side: InsertSide::After
            }
        );
        assert_eq!(
            script.ops[1],
            EditOp::Split {
                row: 0,
                column: 0,
                horizontal: 1,
                vertical: 0
            }
        );
    }

    #[test]
    fn test_unknown_op_is_an_error() {
        let json = r#"{"table": {"groups": []}, "ops": [{"op": "explode"}]}"#;
        assert!(EditScript::from_json(json).is_err());
    }

    #[test]
    fn test_run_records_skipped_ops() {
        let script = EditScript {
            config: EditorConfig::default(),
            table: TableSpec::grid(2, 2),
            ops: vec![
                EditOp::Merge {
                    top: 0,
                    bottom: 0,
                    left: 0,
                    right: 1,
                },
                EditOp::Split {
                    row: 1,
                    column: 0,
                    horizontal: 1,
                    vertical: 0,
                },
                EditOp::DeleteColumns { first: 0, last: 1 },
            ],
        };
        let outcome = script.run().unwrap();
        assert_eq!(outcome.applied, vec![true, false, false]);
        assert_eq!(outcome.revision, 2);
        let table = outcome.table.unwrap();
        assert_eq!(table.groups[0][0].len(), 1);
        assert_eq!(table.groups[0][0][0].column_span, 2);
    }

    #[test]
    fn test_deleting_everything_drops_the_table() {
        let script = EditScript {
            config: EditorConfig::default(),
            table: TableSpec::grid(2, 1),
            ops: vec![EditOp::DeleteRows { first: 0, last: 1 }],
        };
        let outcome = script.run().unwrap();
        assert_eq!(outcome.applied, vec![true]);
        assert!(outcome.table.is_none());
    }
}
