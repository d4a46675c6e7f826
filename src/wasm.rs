//! JavaScript binding.
//!
//! `TableSession` owns an editor with a single table. Operations and table
//! descriptions cross the boundary as plain JS objects in the same shape as
//! the JSON scripts (`EditOp`, `TableSpec`).

use wasm_bindgen::prelude::*;

use crate::config::EditorConfig;
use crate::doc::NodeId;
use crate::editor::TableEditor;
use crate::error::Result;
use crate::script::{apply_op, EditOp};
use crate::table::TableSpec;

/// An editing session exported to JavaScript
#[wasm_bindgen]
pub struct TableSession {
    editor: TableEditor,
    table: Option<NodeId>,
}

#[wasm_bindgen]
impl TableSession {
    /// Create a session; `config_json` overrides individual settings.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> std::result::Result<TableSession, JsValue> {
        console_error_panic_hook::set_once();
        let config = match config_json {
            Some(json) => {
                EditorConfig::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?
            }
            None => EditorConfig::default(),
        };
        Ok(Self::with_config(config))
    }

    /// Replace the session's table with one built from a `TableSpec` object.
    #[wasm_bindgen(js_name = loadTable)]
    pub fn load_table(&mut self, spec: JsValue) -> std::result::Result<(), JsValue> {
        let spec: TableSpec = serde_wasm_bindgen::from_value(spec)
            .map_err(|e| JsValue::from_str(&format!("Invalid table: {e}")))?;
        self.load_spec(&spec)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Apply one `EditOp` object; returns whether it took effect.
    #[wasm_bindgen]
    pub fn apply(&mut self, op: JsValue) -> std::result::Result<bool, JsValue> {
        let op: EditOp = serde_wasm_bindgen::from_value(op)
            .map_err(|e| JsValue::from_str(&format!("Invalid operation: {e}")))?;
        self.apply_edit(&op)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// The current table as a `TableSpec` object, or `undefined`.
    #[wasm_bindgen]
    pub fn snapshot(&self) -> std::result::Result<JsValue, JsValue> {
        match self.current_spec() {
            Some(spec) => serde_wasm_bindgen::to_value(&spec)
                .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}"))),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    #[wasm_bindgen]
    pub fn revision(&self) -> u64 {
        self.editor.revision()
    }

    #[wasm_bindgen(js_name = isDirty)]
    pub fn is_dirty(&self) -> bool {
        self.editor.is_dirty()
    }

    #[wasm_bindgen(js_name = clearDirty)]
    pub fn clear_dirty(&mut self) {
        self.editor.clear_dirty();
    }
}

impl TableSession {
    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            editor: TableEditor::new(config),
            table: None,
        }
    }

    /// Build `spec` into a fresh document
    ///
    /// # Errors
    /// Fails if the description cannot be built.
    pub fn load_spec(&mut self, spec: &TableSpec) -> Result<()> {
        let config = self.editor.config().clone();
        self.editor = TableEditor::new(config);
        self.table = Some(self.editor.insert_table(spec)?);
        self.editor.clear_dirty();
        Ok(())
    }

    /// # Errors
    /// Fails on a malformed table.
    pub fn apply_edit(&mut self, op: &EditOp) -> Result<bool> {
        match self.live_table() {
            Some(table) => apply_op(&mut self.editor, table, op),
            None => Ok(false),
        }
    }

    pub fn current_spec(&self) -> Option<TableSpec> {
        self.live_table().and_then(|t| self.editor.snapshot(t))
    }

    fn live_table(&self) -> Option<NodeId> {
        self.table.filter(|&t| self.editor.document().is_attached(t))
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
    use crate::editor::InsertSide;

    #[test]
    fn test_session_lifecycle() {
        let mut session = TableSession::with_config(EditorConfig::default());
        assert!(session.current_spec().is_none());
        assert!(!session.apply_edit(&EditOp::DeleteRows { first: 0, last: 0 }).unwrap());

        session.load_spec(&TableSpec::grid(1, 2)).unwrap();
        assert!(!session.is_dirty());
        assert!(session
            .apply_edit(&EditOp::InsertRows {
                row: 0,
                count: 2,
                side: InsertSide::Before
            })
            .unwrap());
        assert!(session.is_dirty());
        assert_eq!(session.current_spec().unwrap().rows().count(), 3);

        assert!(session.apply_edit(&EditOp::DeleteRows { first: 0, last: 2 }).unwrap());
        assert!(session.current_spec().is_none());
    }
}
