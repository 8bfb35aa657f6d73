//! SharedText: in-process attributed text model
//!
//! A complete implementation of the [`TextModel`] contract without the
//! replication machinery of a CRDT. It backs tests, benchmarks and the
//! playground, and any host that only needs several views over one local
//! document.
//!
//! # Architecture
//!
//! ```text
//! SharedText {
//!     rope:  "ab\ncd"                 // Actual text (ropey::Rope)
//!     spans: [                         // Attribute runs, UTF-16 lengths
//!         Span { len: 2, Base{bold} }
//!         Span { len: 1, LineBreak }
//!         Span { len: 2, Base{} }
//!     ]
//! }
//! ```
//!
//! Spans always cover the rope exactly. Adjacent spans with equal attributes
//! are merged, except line breaks, which stay one span per `\n` so each break
//! is its own run in [`to_delta`](TextModel::to_delta).
//!
//! # Example
//!
//! ```rust
//! use synckit_editor::model::{ModelHandle, SharedText, TextAttributes, TextModel};
//!
//! let text: ModelHandle = SharedText::new();
//! text.insert("client1", 0, "Hello", TextAttributes::base()).unwrap();
//! text.insert("client1", 5, "\n", TextAttributes::LineBreak).unwrap();
//!
//! assert_eq!(text.len(), 6);
//! assert_eq!(text.to_delta().len(), 2);
//! ```

use super::attributes::TextAttributes;
use super::run::{utf16_len, AttributedRun};
use super::text::{ChangeCallback, FormatMode, ObserverId, TextChange, TextModel, TextOp};
use crate::error::{EditorError, Result};
use ropey::Rope;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
struct Span {
    /// Length in UTF-16 code units
    len: usize,
    attributes: TextAttributes,
}

#[derive(Debug, Clone)]
struct TextState {
    rope: Rope,
    spans: Vec<Span>,
}

impl TextState {
    fn new() -> Self {
        Self {
            rope: Rope::new(),
            spans: Vec::new(),
        }
    }

    fn len(&self) -> usize {
        self.rope.len_utf16_cu()
    }

    /// Char index of a UTF-16 offset that must fall on a code point boundary
    fn char_index(&self, position: usize) -> Result<usize> {
        let length = self.len();
        if position > length {
            return Err(EditorError::PositionOutOfBounds { position, length });
        }
        let char_idx = self.rope.utf16_cu_to_char(position);
        if self.rope.char_to_utf16_cu(char_idx) != position {
            return Err(EditorError::SplitsCodePoint { position });
        }
        Ok(char_idx)
    }

    fn check_range(&self, index: usize, length: usize) -> Result<(usize, usize)> {
        let doc_len = self.len();
        let end = match index.checked_add(length) {
            Some(end) if end <= doc_len => end,
            _ => {
                return Err(EditorError::RangeOutOfBounds {
                    start: index,
                    end: index.saturating_add(length),
                    length: doc_len,
                })
            }
        };
        Ok((self.char_index(index)?, self.char_index(end)?))
    }

    /// Split spans so one starts exactly at `position`; returns its index
    fn split_at(&mut self, position: usize) -> usize {
        let mut start = 0;
        for i in 0..self.spans.len() {
            if start == position {
                return i;
            }
            let end = start + self.spans[i].len;
            if position < end {
                let left = position - start;
                let right = Span {
                    len: self.spans[i].len - left,
                    attributes: self.spans[i].attributes.clone(),
                };
                self.spans[i].len = left;
                self.spans.insert(i + 1, right);
                return i + 1;
            }
            start = end;
        }
        self.spans.len()
    }

    fn normalize(&mut self) {
        let mut merged: Vec<Span> = Vec::with_capacity(self.spans.len());
        for span in self.spans.drain(..) {
            if span.len == 0 {
                continue;
            }
            match merged.last_mut() {
                Some(last)
                    if !span.attributes.is_line_break() && last.attributes == span.attributes =>
                {
                    last.len += span.len;
                }
                _ => merged.push(span),
            }
        }
        self.spans = merged;
    }

    fn apply(&mut self, op: &TextOp) -> Result<()> {
        match op {
            TextOp::Insert {
                index,
                text,
                attributes,
            } => self.insert(*index, text, attributes),
            TextOp::Delete { index, length } => self.delete(*index, *length),
            TextOp::Format {
                index,
                length,
                attributes,
                mode,
            } => self.format(*index, *length, attributes, *mode),
        }
    }

    fn insert(&mut self, index: usize, text: &str, attributes: &TextAttributes) -> Result<()> {
        let char_idx = self.char_index(index)?;
        if text.is_empty() {
            return Ok(());
        }

        let new_spans: Vec<Span> = if attributes.is_line_break() {
            if text.chars().any(|c| c != '\n') {
                return Err(EditorError::InvalidLineBreak(text.to_string()));
            }
            text.chars()
                .map(|_| Span {
                    len: 1,
                    attributes: TextAttributes::LineBreak,
                })
                .collect()
        } else {
            // Embedded newlines become line-break spans of their own
            let mut spans = Vec::new();
            for (i, part) in text.split('\n').enumerate() {
                if i > 0 {
                    spans.push(Span {
                        len: 1,
                        attributes: TextAttributes::LineBreak,
                    });
                }
                if !part.is_empty() {
                    spans.push(Span {
                        len: utf16_len(part),
                        attributes: attributes.clone(),
                    });
                }
            }
            spans
        };

        self.rope.insert(char_idx, text);
        let at = self.split_at(index);
        self.spans.splice(at..at, new_spans);
        self.normalize();
        Ok(())
    }

    fn delete(&mut self, index: usize, length: usize) -> Result<()> {
        let (start, end) = self.check_range(index, length)?;
        if length == 0 {
            return Ok(());
        }

        self.rope.remove(start..end);
        let from = self.split_at(index);
        let to = self.split_at(index + length);
        self.spans.drain(from..to);
        self.normalize();
        Ok(())
    }

    fn format(
        &mut self,
        index: usize,
        length: usize,
        attributes: &TextAttributes,
        mode: FormatMode,
    ) -> Result<()> {
        if attributes.is_line_break() {
            return Err(EditorError::InvalidLineBreak(
                "line-break is not a formatting attribute".to_string(),
            ));
        }
        self.check_range(index, length)?;
        if length == 0 {
            return Ok(());
        }

        let from = self.split_at(index);
        let to = self.split_at(index + length);
        for span in &mut self.spans[from..to] {
            if span.attributes.is_line_break() {
                continue;
            }
            span.attributes = match mode {
                FormatMode::Replace => attributes.clone(),
                FormatMode::Merge => span.attributes.merged(attributes),
            };
        }
        self.normalize();
        Ok(())
    }

    fn to_delta(&self) -> Vec<AttributedRun> {
        let mut runs = Vec::with_capacity(self.spans.len());
        let mut start = 0;
        for span in &self.spans {
            let end = start + span.len;
            let from = self.rope.utf16_cu_to_char(start);
            let to = self.rope.utf16_cu_to_char(end);
            runs.push(AttributedRun::new(
                self.rope.slice(from..to).to_string(),
                span.attributes.clone(),
            ));
            start = end;
        }
        runs
    }
}

struct Observer {
    id: ObserverId,
    callback: Rc<RefCell<ChangeCallback>>,
}

/// In-process attributed text shared by any number of editors
pub struct SharedText {
    state: RefCell<TextState>,
    observers: RefCell<Vec<Observer>>,
    next_observer: Cell<u64>,
}

impl SharedText {
    /// Create an empty document
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            state: RefCell::new(TextState::new()),
            observers: RefCell::new(Vec::new()),
            next_observer: Cell::new(0),
        })
    }

    /// Create a document seeded with `runs`
    ///
    /// Seeding does not notify anyone; there are no observers yet.
    pub fn from_delta(runs: &[AttributedRun]) -> Result<Rc<Self>> {
        let text = Self::new();
        {
            let mut state = text.state.borrow_mut();
            for run in runs {
                let index = state.len();
                state.insert(index, &run.text, &run.attributes)?;
            }
        }
        Ok(text)
    }

    /// Seed from a JSON delta array (`[{"insert": ..., "attributes": ...}]`)
    pub fn from_json(json: &str) -> Result<Rc<Self>> {
        let runs: Vec<AttributedRun> = serde_json::from_str(json)?;
        Self::from_delta(&runs)
    }

    /// Plain text content, line breaks included
    pub fn text(&self) -> String {
        self.state.borrow().rope.to_string()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    fn notify(&self, change: &TextChange) {
        let callbacks: Vec<(ObserverId, Rc<RefCell<ChangeCallback>>)> = self
            .observers
            .borrow()
            .iter()
            .map(|observer| (observer.id, Rc::clone(&observer.callback)))
            .collect();

        for (id, callback) in callbacks {
            match callback.try_borrow_mut() {
                Ok(mut callback) => (&mut **callback)(change),
                Err(_) => {
                    tracing::warn!(observer = id.0, "skipping re-entrant text observer");
                }
            }
        }
    }
}

impl TextModel for SharedText {
    fn transact(&self, origin: &str, ops: Vec<TextOp>) -> Result<()> {
        if ops.is_empty() {
            return Ok(());
        }

        {
            let mut state = self.state.borrow_mut();
            let mut next = state.clone();
            for op in &ops {
                next.apply(op)?;
            }
            *state = next;
        }

        tracing::trace!(origin, ops = ops.len(), "text transaction committed");
        self.notify(&TextChange {
            origin: origin.to_string(),
            ops,
        });
        Ok(())
    }

    fn observe(&self, callback: ChangeCallback) -> ObserverId {
        let id = ObserverId(self.next_observer.get());
        self.next_observer.set(id.0 + 1);
        self.observers.borrow_mut().push(Observer {
            id,
            callback: Rc::new(RefCell::new(callback)),
        });
        id
    }

    fn unobserve(&self, id: ObserverId) {
        self.observers.borrow_mut().retain(|observer| observer.id != id);
    }

    fn to_delta(&self) -> Vec<AttributedRun> {
        self.state.borrow().to_delta()
    }

    fn len(&self) -> usize {
        self.state.borrow().len()
    }
}

impl std::fmt::Debug for SharedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedText")
            .field("text", &self.text())
            .field("observers", &self.observer_count())
            .finish()
    }
}
