//! Editor configuration
//!
//! All knobs are plain data so a host can ship them as JSON next to its own
//! settings. Missing fields fall back to [`EditorConfig::default`].
//!
//! # Example
//!
//! ```rust
//! use synckit_editor::config::{EditorConfig, RemoteCaretPolicy};
//!
//! let config = EditorConfig::from_json(r#"{ "remote_caret": "shift" }"#).unwrap();
//! assert_eq!(config.remote_caret, RemoteCaretPolicy::Shift);
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// What happens to a locally held range when another replica edits the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteCaretPolicy {
    /// Keep the flat index as-is (clamped to the new document length)
    #[default]
    Keep,
    /// Transform the range through the remote operations
    Shift,
}

/// Unit removed by a collapsed backward delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackspaceUnit {
    /// One Unicode scalar value (never half of a surrogate pair)
    #[default]
    Scalar,
    /// One extended grapheme cluster
    Grapheme,
}

/// Geometry used by the headless layout
///
/// Every text cell advances by `cell_width` times its display width, and lines
/// are stacked `line_height` apart. Only the proximity fallback of the
/// view→model mapping looks at these numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutMetrics {
    pub cell_width: f32,
    pub line_height: f32,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            cell_width: 8.0,
            line_height: 20.0,
        }
    }
}

/// Per-editor configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub remote_caret: RemoteCaretPolicy,
    pub backspace: BackspaceUnit,
    pub metrics: LayoutMetrics,
}

impl EditorConfig {
    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
