//! SyncKit Editor - headless sync engine for editable text views
//!
//! Keeps one or more editable views in step with a shared, attributed text
//! model. It implements:
//! - Line chunking and full view rebuilds from the model's run sequence
//! - Pluggable inline renderers keyed by attribute tag
//! - Mapping between flat document ranges and per-view node positions,
//!   including selections spanning several stacked views
//! - Input reconciliation (typing, paragraphs, backspace, IME composition)
//! - Selection synchronization without programmatic feedback loops
//!
//! # Examples
//!
//! ```rust
//! use synckit_editor::{EditIntent, Editor, ModelHandle, SharedText, StaticRange, Surface};
//! use synckit_editor::view::Point;
//!
//! let text = SharedText::new();
//! let model: ModelHandle = text.clone();
//! let mut surface = Surface::new();
//!
//! let mut left = Editor::new(surface.create_view(Point::new(0.0, 0.0)), model.clone()).unwrap();
//! let mut right = Editor::new(surface.create_view(Point::new(0.0, 200.0)), model).unwrap();
//!
//! left.set_range(Some(StaticRange::caret(0)), &mut surface).unwrap();
//! left.handle_intent(EditIntent::InsertText("shared".into()), &mut surface).unwrap();
//! right.refresh(&mut surface).unwrap();
//!
//! assert_eq!(right.view().text_content(), "shared");
//! ```

pub mod chunk;
pub mod config;
pub mod editor;
pub mod error;
pub mod input;
pub mod mapping;
pub mod model;
pub mod range;
pub mod render;
pub mod selection;
pub mod surface;
pub mod view;

#[cfg(feature = "playground")]
pub mod logging;

// Re-exports for convenience
pub use config::EditorConfig;
pub use editor::{Editor, EditorEvent, ListenerId};
pub use error::{EditorError, Result};
pub use input::EditIntent;
pub use model::{AttributedRun, ModelHandle, SharedText, TextAttributes, TextModel, TextStyle};
pub use range::StaticRange;
pub use selection::{RangeOrigin, RangeUpdate};
pub use surface::{SelectionHost, Surface};
