//! Input Reconciler
//!
//! Turns raw edit intents into model operations plus a caret move. The
//! reconciler is a pure transition function over `(state, range, intent)`:
//! it reads the current delta but never touches the model itself. The editor
//! runs the returned effects in order.
//!
//! Every intent yields at most one [`InputEffect::Transact`], so a
//! delete-then-insert reaches observers as a single change notification.

use crate::config::BackspaceUnit;
use crate::model::{attributes_at, utf16_len, AttributedRun, TextAttributes, TextOp};
use crate::range::StaticRange;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputState {
    #[default]
    Idle,
    /// An IME composition is in progress; the platform buffers its events
    Composing,
}

/// Edit intent reported by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditIntent {
    InsertText(String),
    InsertParagraph,
    DeleteBackward,
    CompositionStart,
    /// Composition committed with its final text, possibly empty
    CompositionEnd(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEffect {
    /// Apply these ops to the model as one transaction
    Transact(Vec<TextOp>),
    /// Move the caret, origin input
    MoveCaret(StaticRange),
}

/// Result of one reconciler step
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reconciled {
    pub state: InputState,
    pub effects: Vec<InputEffect>,
}

impl Reconciled {
    fn unchanged(state: InputState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }
}

/// Advance the reconciler by one intent
///
/// `doc` is the model's delta before the edit. Without a current range only
/// the composition state can change.
pub fn reconcile(
    state: InputState,
    range: Option<StaticRange>,
    intent: &EditIntent,
    doc: &[AttributedRun],
    unit: BackspaceUnit,
) -> Reconciled {
    match (state, intent) {
        (_, EditIntent::CompositionStart) => Reconciled::unchanged(InputState::Composing),
        (_, EditIntent::CompositionEnd(data)) => Reconciled {
            state: InputState::Idle,
            effects: range
                .map(|range| insert_text(range, data, doc))
                .unwrap_or_default(),
        },
        (InputState::Composing, _) => {
            tracing::trace!(?intent, "intent buffered by composition");
            Reconciled::unchanged(state)
        }
        (InputState::Idle, intent) => {
            let Some(range) = range else {
                return Reconciled::unchanged(state);
            };
            let effects = match intent {
                EditIntent::InsertText(data) => insert_text(range, data, doc),
                EditIntent::InsertParagraph => insert_paragraph(range),
                EditIntent::DeleteBackward => delete_backward(range, doc, unit),
                EditIntent::CompositionStart | EditIntent::CompositionEnd(_) => Vec::new(),
            };
            Reconciled { state, effects }
        }
    }
}

/// Attributes inherited by text typed at `index`
///
/// The run occupying `index` donates its attributes; a line break, or no run
/// at all, yields the base attributes.
pub fn inherited_attributes(doc: &[AttributedRun], index: usize) -> TextAttributes {
    match attributes_at(doc, index) {
        Some(attributes) if !attributes.is_line_break() => attributes.clone(),
        _ => TextAttributes::base(),
    }
}

fn delete_selection(range: StaticRange, ops: &mut Vec<TextOp>) {
    if !range.is_collapsed() {
        ops.push(TextOp::Delete {
            index: range.index,
            length: range.length,
        });
    }
}

fn insert_text(range: StaticRange, data: &str, doc: &[AttributedRun]) -> Vec<InputEffect> {
    if data.is_empty() {
        return Vec::new();
    }
    let attributes = inherited_attributes(doc, range.index);
    let mut ops = Vec::with_capacity(2);
    delete_selection(range, &mut ops);
    ops.push(TextOp::Insert {
        index: range.index,
        text: data.to_string(),
        attributes,
    });
    vec![
        InputEffect::Transact(ops),
        InputEffect::MoveCaret(StaticRange::caret(range.index + utf16_len(data))),
    ]
}

fn insert_paragraph(range: StaticRange) -> Vec<InputEffect> {
    let mut ops = Vec::with_capacity(2);
    delete_selection(range, &mut ops);
    ops.push(TextOp::Insert {
        index: range.index,
        text: "\n".to_string(),
        attributes: TextAttributes::LineBreak,
    });
    vec![
        InputEffect::Transact(ops),
        InputEffect::MoveCaret(StaticRange::caret(range.index + 1)),
    ]
}

fn delete_backward(range: StaticRange, doc: &[AttributedRun], unit: BackspaceUnit) -> Vec<InputEffect> {
    if !range.is_collapsed() {
        return vec![
            InputEffect::Transact(vec![TextOp::Delete {
                index: range.index,
                length: range.length,
            }]),
            InputEffect::MoveCaret(StaticRange::caret(range.index)),
        ];
    }
    if range.index == 0 {
        return Vec::new();
    }

    let before = text_before(doc, range.index);
    let last = match unit {
        BackspaceUnit::Scalar => before.char_indices().next_back().map(|(i, _)| &before[i..]),
        BackspaceUnit::Grapheme => before.graphemes(true).next_back(),
    };
    let length = last.map(utf16_len).unwrap_or(0);
    if length == 0 {
        return Vec::new();
    }

    let index = range.index - length;
    vec![
        InputEffect::Transact(vec![TextOp::Delete { index, length }]),
        InputEffect::MoveCaret(StaticRange::caret(index)),
    ]
}

/// Document text preceding the flat position `index`
fn text_before(doc: &[AttributedRun], index: usize) -> String {
    let mut out = String::new();
    let mut units = 0;
    for ch in doc.iter().flat_map(|run| run.text.chars()) {
        units += ch.len_utf16();
        if units > index {
            break;
        }
        out.push(ch);
    }
    out
}
