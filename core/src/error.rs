//! Error types for the editor core
//!
//! Rendering vocabulary mismatches and malformed model operations are hard
//! errors. Selections that cannot be mapped into a view are not errors at all:
//! the mapper returns `None` for those.

use thiserror::Error;

/// Errors produced by the editor core and its reference text model
#[derive(Debug, Error)]
pub enum EditorError {
    /// A run carries an attribute tag no registered renderer understands
    #[error("Unknown attribute tag: {0}")]
    UnknownAttributeTag(String),

    /// A run that must never be rendered as an inline reached the renderer
    #[error("Run of kind {0} cannot be rendered as an inline")]
    UnrenderableRun(&'static str),

    /// Position is out of bounds
    #[error("Position {position} out of bounds (length: {length})")]
    PositionOutOfBounds { position: usize, length: usize },

    /// Range is out of bounds
    #[error("Range {start}..{end} out of bounds (length: {length})")]
    RangeOutOfBounds {
        start: usize,
        end: usize,
        length: usize,
    },

    /// UTF-16 offset falls between the two halves of a surrogate pair
    #[error("Offset {position} splits a code point")]
    SplitsCodePoint { position: usize },

    /// Line-break runs may only contain `\n`
    #[error("Invalid line-break content: {0:?}")]
    InvalidLineBreak(String),

    /// Configuration could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for editor operations
pub type Result<T> = std::result::Result<T, EditorError>;
