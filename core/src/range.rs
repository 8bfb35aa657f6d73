//! StaticRange: the document-relative address shared by every view
//!
//! A `StaticRange` is a `{ index, length }` pair over the flattened document,
//! measured in UTF-16 code units, where every line break counts as exactly one
//! unit. It is the only address that survives a re-render; node/offset pairs
//! in a view are recomputed from it.

use crate::model::TextOp;
use serde::{Deserialize, Serialize};

/// Flat `{ index, length }` range over the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StaticRange {
    pub index: usize,
    pub length: usize,
}

impl StaticRange {
    pub fn new(index: usize, length: usize) -> Self {
        Self { index, length }
    }

    /// Collapsed range (caret) at `index`
    pub fn caret(index: usize) -> Self {
        Self { index, length: 0 }
    }

    /// Range spanning two flat positions in either order
    pub fn between(a: usize, b: usize) -> Self {
        Self {
            index: a.min(b),
            length: a.abs_diff(b),
        }
    }

    /// Exclusive end position, saturating at `usize::MAX`
    pub fn end(&self) -> usize {
        self.index.saturating_add(self.length)
    }

    /// Exclusive end position, `None` on overflow
    pub fn checked_end(&self) -> Option<usize> {
        self.index.checked_add(self.length)
    }

    pub fn is_collapsed(&self) -> bool {
        self.length == 0
    }

    /// Clamp both ends into `0..=len`
    pub fn clamp_to(self, len: usize) -> Self {
        let start = self.index.min(len);
        let end = self.end().min(len);
        Self::new(start, end - start)
    }

    /// Map this range through a sequence of model operations applied by
    /// another replica
    ///
    /// Inserts strictly before the start push the whole range right, inserts
    /// strictly inside it grow it. Deletes collapse whatever part of the range
    /// they cover. Formatting never moves anything.
    pub fn transform(self, ops: &[TextOp]) -> Self {
        let mut start = self.index;
        let mut end = self.end();

        for op in ops {
            match op {
                TextOp::Insert { index, text, .. } => {
                    let n = text.encode_utf16().count();
                    if *index < start {
                        start = start.saturating_add(n);
                        end = end.saturating_add(n);
                    } else if *index < end {
                        end = end.saturating_add(n);
                    }
                }
                TextOp::Delete { index, length } => {
                    let shift = |pos: usize| {
                        if pos <= *index {
                            pos
                        } else if pos >= index.saturating_add(*length) {
                            pos - length
                        } else {
                            *index
                        }
                    };
                    start = shift(start);
                    end = shift(end);
                }
                TextOp::Format { .. } => {}
            }
        }

        Self::new(start, end - start)
    }
}

impl std::fmt::Display for StaticRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{index: {}, length: {}}}", self.index, self.length)
    }
}
