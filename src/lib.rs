//! docgrid - structural table editing for rich-text documents
//!
//! Tables live inside a hierarchical document tree (Table → RowGroup → Row →
//! Cell → paragraphs) and are edited as a grid with row and column spans:
//! - Classify any position pair against cell, row and table boundaries
//! - Rectangular cell selections, one segment per row
//! - Insert/delete rows and columns, merge/split cells
//! - Interactive column resize as an explicit drag session
//!
//! # Usage (Rust)
//!
//! ```
//! use docgrid::{EditorConfig, TableEditor, TableSpec};
//!
//! let mut editor = TableEditor::new(EditorConfig::default());
//! let table = editor.insert_table(&TableSpec::grid(2, 2)).unwrap();
//! editor.merge_rectangle(table, 0, 1, 0, 1).unwrap();
//! ```
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { TableSession } from 'docgrid';
//! await init();
//! const session = new TableSession();
//! session.loadTable({ groups: [[[{ text: "a" }, { text: "b" }]]] });
//! session.apply({ op: "insertRows", row: 0, side: "after" });
//! ```

pub mod config;
pub mod doc;
pub mod editor;
pub mod error;
pub mod layout;
pub mod script;
pub mod selection;
pub mod table;
pub mod wasm;

use wasm_bindgen::prelude::*;

pub use config::EditorConfig;
pub use doc::{Document, LogicalDirection, NodeId, TextPosition, TextSegment};
pub use editor::{ColumnResizeSession, InsertSide, TableEditor};
pub use error::{Result, TableError};
pub use script::{EditOp, EditScript, ScriptOutcome};
pub use selection::{ClassifiedRange, TableCellRange};
pub use table::{CellSpec, TableSpec};
pub use wasm::TableSession;

/// Run a JSON edit script and return the outcome as JSON
///
/// # Arguments
/// * `json` - An `EditScript`: a table description and a list of operations
///
/// # Errors
/// Returns an error if the script is invalid or the table is malformed.
#[wasm_bindgen]
pub fn run_script(json: &str) -> std::result::Result<String, JsValue> {
    let script = EditScript::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let outcome = script.run().map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_json::to_string(&outcome)
        .map_err(|e| JsValue::from_str(&format!("JSON serialization error: {e}")))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
