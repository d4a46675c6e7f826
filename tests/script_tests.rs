//! JSON edit scripts, as run by the CLI and the wasm binding.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use docgrid::doc::ColumnWidth;
use docgrid::{run_script, EditScript, ScriptOutcome, TableSpec};
use test_case::test_case;

fn run(json: &str) -> ScriptOutcome {
    EditScript::from_json(json).unwrap().run().unwrap()
}

fn texts(table: &TableSpec) -> Vec<Vec<String>> {
    table
        .rows()
        .map(|row| row.iter().map(|c| c.text.clone()).collect())
        .collect()
}

#[test]
fn test_script_applies_ops_in_order() {
    let outcome = run(r#"{
        "table": {"groups": [[
            [{"text": "a"}, {"text": "b"}],
            [{"text": "c"}, {"text": "d"}]
        ]]},
        "ops": [
            {"op": "insertRows", "row": 1, "side": "after"},
            {"op": "insertColumns", "column": 0, "side": "before", "count": 1},
            {"op": "merge", "top": 0, "bottom": 0, "left": 1, "right": 2}
        ]
    }"#);

    assert_eq!(outcome.applied, vec![true, true, true]);
    assert_eq!(outcome.revision, 4);
    let table = outcome.table.unwrap();
    assert_eq!(
        texts(&table),
        vec![vec!["", "a\nb"], vec!["", "c", "d"], vec!["", "", ""]]
    );
    assert_eq!(table.groups[0][0][1].column_span, 2);
}

#[test_case(r#"{"op": "deleteRows", "first": 3, "last": 4}"# ; "rows out of range")]
#[test_case(r#"{"op": "deleteColumns", "first": 0, "last": 1}"# ; "every column")]
#[test_case(r#"{"op": "split", "row": 0, "column": 0, "horizontal": 1}"# ; "unmerged cell")]
#[test_case(r#"{"op": "merge", "top": 0, "bottom": 0, "left": 0, "right": 4}"# ; "merge past the grid")]
#[test_case(r#"{"op": "insertRows", "row": 0, "count": 0, "side": "before"}"# ; "zero rows")]
fn test_infeasible_op_is_skipped(op: &str) {
    let json = format!(
        r#"{{"table": {{"groups": [[[{{"text": "a"}}, {{"text": "b"}}]]]}}, "ops": [{op}]}}"#
    );
    let outcome = run(&json);

    assert_eq!(outcome.applied, vec![false]);
    assert_eq!(outcome.revision, 1);
    assert_eq!(texts(&outcome.table.unwrap()), vec![vec!["a", "b"]]);
}

#[test]
fn test_resize_op_pins_widths() {
    let outcome = run(r#"{
        "config": {"autofitWidth": 400},
        "table": {"groups": [[[{"text": "a"}, {"text": "b"}]]]},
        "ops": [{"op": "resizeColumn", "column": 0, "delta": 50}]
    }"#);

    assert_eq!(outcome.applied, vec![true]);
    assert_eq!(
        outcome.table.unwrap().columns,
        vec![ColumnWidth::Fixed(250.0), ColumnWidth::Fixed(150.0)]
    );
}

#[test]
fn test_snapshot_reports_layout_columns() {
    let outcome = run(r#"{
        "table": {"groups": [[
            [{"text": "A", "rowSpan": 2}, {"text": "b"}],
            [{"text": "c"}]
        ]]}
    }"#);

    let table = outcome.table.unwrap();
    assert_eq!(table.groups[0][1][0].column_index, Some(1));
    assert_eq!(table.groups[0][0][0].row_span, 2);
}

#[test]
fn test_run_script_returns_json() {
    let json = run_script(
        r#"{"table": {"groups": [[[{"text": "x"}]]]}, "ops": [{"op": "deleteRows", "first": 0, "last": 0}]}"#,
    )
    .unwrap();
    let outcome: ScriptOutcome = serde_json::from_str(&json).unwrap();

    assert_eq!(outcome.applied, vec![true]);
    assert!(outcome.table.is_none());
}
