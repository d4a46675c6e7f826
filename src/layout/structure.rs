//! Grid placement of cells.
//!
//! Walks each row group top to bottom, skipping columns still occupied by
//! row spans from above, and records every cell's first column. Row spans
//! never leave their row group.

use crate::doc::{Document, ElementType, NodeId};
use crate::error::{Result, TableError};
use crate::table::{cells, column_count, column_range, row_groups, rows, spanned_cells};

/// Recompute `column_index` for every cell and the table's column count
///
/// # Errors
/// Fails if `table` is not a table or a row holds something other than cells.
pub fn validate_structure(doc: &mut Document, table: NodeId) -> Result<usize> {
    if !doc.is(table, ElementType::Table) {
        return Err(TableError::UnexpectedElement {
            node: table,
            expected: ElementType::Table,
        });
    }

    let mut column_count = 0;
    for group in row_groups(doc, table).to_vec() {
        // Rows still covered by spans from above, per column, counting the
        // row being placed
        let mut covered: Vec<usize> = Vec::new();
        for row in rows(doc, group).to_vec() {
            let mut col = 0;
            let mut placed = Vec::new();
            for cell in cells(doc, row).to_vec() {
                while covered.get(col).is_some_and(|&n| n > 0) {
                    col += 1;
                }
                let props = doc.require_cell_mut(cell)?;
                props.column_index = Some(col);
                let span = props.column_span.max(1);
                placed.push((col, span, props.row_span.max(1)));
                col += span;
            }

            let spanned_width = covered.iter().rposition(|&n| n > 0).map_or(0, |i| i + 1);
            column_count = column_count.max(col).max(spanned_width);

            for n in &mut covered {
                *n = n.saturating_sub(1);
            }
            for (start, span, row_span) in placed {
                if covered.len() < start + span {
                    covered.resize(start + span, 0);
                }
                for slot in covered.iter_mut().skip(start).take(span) {
                    *slot = row_span - 1;
                }
            }
        }
    }

    if let Some(props) = doc.table_props_mut(table) {
        props.column_count = column_count;
    }
    Ok(column_count)
}

/// Check the grid left behind by a structural edit: every row, together
/// with the cells spanning into it from above, covers each of the table's
/// columns exactly once.
///
/// Expects `validate_structure` to have run since the last edit.
///
/// # Errors
/// Returns [`TableError::Invariant`] naming the first row that does not tile.
pub fn check_grid(doc: &Document, table: NodeId) -> Result<()> {
    let count = column_count(doc, table);
    for (g, &group) in row_groups(doc, table).iter().enumerate() {
        for (r, &row) in rows(doc, group).iter().enumerate() {
            let mut ranges = Vec::new();
            for cell in cells(doc, row).iter().copied().chain(spanned_cells(doc, row)) {
                let range = column_range(doc, cell).ok_or_else(|| {
                    TableError::Invariant(format!("cell {cell} in row {r} of group {g} is unplaced"))
                })?;
                ranges.push(range);
            }
            ranges.sort_unstable();

            let mut next = 0;
            for (first, last) in ranges {
                if first != next {
                    let problem = if first < next { "overlaps" } else { "is empty" };
                    return Err(TableError::Invariant(format!(
                        "row {r} of group {g}: column {} {problem}",
                        first.min(next)
                    )));
                }
                next = last + 1;
            }
            if next != count {
                return Err(TableError::Invariant(format!(
                    "row {r} of group {g} covers {next} of {count} columns"
                )));
            }
        }
    }
    Ok(())
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
    use crate::table::{column_count, is_regular, table_rows, CellSpec, TableSpec};

    fn column_indices(doc: &Document, table: NodeId) -> Vec<Vec<Option<usize>>> {
        table_rows(doc, table)
            .into_iter()
            .map(|row| {
                cells(doc, row)
                    .iter()
                    .map(|&c| doc.cell_props(c).unwrap().column_index)
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_unspanned_grid() {
        let mut doc = Document::new();
        let root = doc.root();
        let table = TableSpec::grid(2, 3)
            .build(&mut doc, root, &EditorConfig::default())
            .unwrap();
        assert_eq!(column_count(&doc, table), 0);

        assert_eq!(validate_structure(&mut doc, table).unwrap(), 3);
        assert_eq!(column_count(&doc, table), 3);
        assert_eq!(
            column_indices(&doc, table),
            vec![vec![Some(0), Some(1), Some(2)]; 2]
        );
        assert!(is_regular(&doc, table));
        assert!(check_grid(&doc, table).is_ok());
    }

    #[test]
    fn test_short_row_fails_grid_check() {
        let mut doc = Document::new();
        let root = doc.root();
        let table = TableSpec::from_rows(vec![
            vec![CellSpec::new("a"), CellSpec::new("b")],
            vec![CellSpec::new("c")],
        ])
        .build(&mut doc, root, &EditorConfig::default())
        .unwrap();
        validate_structure(&mut doc, table).unwrap();

        let err = check_grid(&doc, table).unwrap_err();
        assert!(matches!(&err, TableError::Invariant(msg) if msg.contains("row 1 of group 0")));
    }

    #[test]
    fn test_grid_check_before_placement_fails() {
        let mut doc = Document::new();
        let root = doc.root();
        let table = TableSpec::grid(1, 2)
            .build(&mut doc, root, &EditorConfig::default())
            .unwrap();
        // Column indices are only assigned by validate_structure
        assert!(matches!(check_grid(&doc, table), Err(TableError::Invariant(_))));
    }

    #[test]
    fn test_row_span_shifts_cells_below() {
        // | A (2 rows) | B |
        // |            | C |
        // | D | E          |
        let mut doc = Document::new();
        let root = doc.root();
        let table = TableSpec::from_rows(vec![
            vec![CellSpec::spanning("A", 1, 2), CellSpec::new("B")],
            vec![CellSpec::new("C")],
            vec![CellSpec::new("D"), CellSpec::new("E")],
        ])
        .build(&mut doc, root, &EditorConfig::default())
        .unwrap();

        assert_eq!(validate_structure(&mut doc, table).unwrap(), 2);
        assert_eq!(
            column_indices(&doc, table),
            vec![
                vec![Some(0), Some(1)],
                vec![Some(1)],
                vec![Some(0), Some(1)]
            ]
        );
        assert!(is_regular(&doc, table));
    }

    #[test]
    fn test_spans_do_not_leave_their_group() {
        let mut doc = Document::new();
        let root = doc.root();
        let spec = TableSpec {
            cell_spacing: None,
            columns: Vec::new(),
            groups: vec![
                vec![vec![CellSpec::spanning("tall", 1, 3), CellSpec::new("x")]],
                vec![vec![CellSpec::new("y"), CellSpec::new("z")]],
            ],
        };
        let table = spec.build(&mut doc, root, &EditorConfig::default()).unwrap();
        validate_structure(&mut doc, table).unwrap();
        assert_eq!(column_indices(&doc, table)[1], vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_rejects_non_table() {
        let mut doc = Document::new();
        let root = doc.root();
        assert!(validate_structure(&mut doc, root).is_err());
    }
}
