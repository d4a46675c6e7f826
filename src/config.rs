//! Editor configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunables shared by table construction, border correction, layout and
/// interactive column resize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Border thickness given to new cells (pixels)
    pub border_thickness: f64,
    /// Cell spacing given to new tables (pixels, 0 = collapsed borders)
    pub cell_spacing: f64,
    /// Width a table may grow to when laying out auto-sized columns
    pub autofit_width: f64,
    /// Distance from a column border that still starts a resize drag
    pub resize_tolerance: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            border_thickness: 1.0,
            cell_spacing: 0.0,
            autofit_width: 600.0,
            resize_tolerance: 4.0,
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from JSON. Missing fields keep their defaults.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or a field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
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
    fn test_partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{"cellSpacing": 2.5}"#).unwrap();
        assert_eq!(config.cell_spacing, 2.5);
        assert_eq!(config.border_thickness, 1.0);
        assert_eq!(config.resize_tolerance, 4.0);
    }

    #[test]
    fn test_malformed_json() {
        assert!(EditorConfig::from_json("{\"autofitWidth\": \"wide\"}").is_err());
    }
}
