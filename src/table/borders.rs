//! Border correction after structural edits.
//!
//! With zero cell spacing neighbouring borders would draw twice. Each cell
//! keeps its right and bottom edge; left and top edges are only kept on the
//! table's outer edge.

use super::model::{cells, row_groups, rows, table_rows};
use crate::doc::{Document, ElementType, NodeId, Thickness};
use crate::error::{Result, TableError};

/// Recompute borders for every row group of the table
///
/// # Errors
/// Fails if `table` is not a table.
pub fn correct_borders(doc: &mut Document, table: NodeId) -> Result<()> {
    for group in row_groups(doc, table).to_vec() {
        correct_group_borders(doc, table, group)?;
    }
    Ok(())
}

/// Recompute borders of the cells stored in one row group
///
/// # Errors
/// Fails if `table` is not a table or the group holds non-cell children.
pub fn correct_group_borders(doc: &mut Document, table: NodeId, group: NodeId) -> Result<()> {
    let spacing = doc
        .table_props(table)
        .ok_or(TableError::UnexpectedElement {
            node: table,
            expected: ElementType::Table,
        })?
        .cell_spacing;
    let first_row = table_rows(doc, table).first().copied();

    for row in rows(doc, group).to_vec() {
        let top_edge = Some(row) == first_row;
        for cell in cells(doc, row).to_vec() {
            let props = doc.require_cell_mut(cell)?;
            let nominal = props.borders.max_side();
            props.borders = if spacing > 0.0 {
                Thickness::uniform(nominal)
            } else {
                Thickness {
                    left: if props.column_index == Some(0) {
                        nominal
                    } else {
                        0.0
                    },
                    top: if top_edge { nominal } else { 0.0 },
                    right: nominal,
                    bottom: nominal,
                }
            };
        }
    }
    Ok(())
}
