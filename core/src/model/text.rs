//! The text model collaborator contract
//!
//! The editor never owns the text. It holds a shared [`ModelHandle`] to
//! something implementing [`TextModel`] (a CRDT text in production, or
//! [`SharedText`](super::SharedText) in-process) and talks to it only through
//! this trait. Several editors may hold handles to the same model.
//!
//! Mutations are grouped into transactions. A transaction fires exactly one
//! [`TextChange`] notification, so a delete-then-insert issued for a single
//! keystroke produces a single rebuild in every observing editor.

use super::attributes::TextAttributes;
use super::run::AttributedRun;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::rc::{Rc, Weak};

/// Shared, single-threaded handle to a text model
pub type ModelHandle = Rc<dyn TextModel>;

/// Callback invoked after every committed transaction
pub type ChangeCallback = Box<dyn FnMut(&TextChange)>;

/// How `format` combines the new attributes with the existing ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatMode {
    /// Overwrite the attributes of every covered run
    Replace,
    /// Set only the keys present in the new attributes
    Merge,
}

/// A single model mutation; indices are UTF-16 code units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TextOp {
    Insert {
        index: usize,
        text: String,
        attributes: TextAttributes,
    },
    Delete {
        index: usize,
        length: usize,
    },
    Format {
        index: usize,
        length: usize,
        attributes: TextAttributes,
        mode: FormatMode,
    },
}

/// Notification describing one committed transaction
#[derive(Debug, Clone, PartialEq)]
pub struct TextChange {
    /// Identifier of the party that issued the transaction
    pub origin: String,
    pub ops: Vec<TextOp>,
}

/// Registration token returned by [`TextModel::observe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u64);

/// Attributed text model contract
///
/// Implementations use interior mutability: every method takes `&self` so one
/// model can be shared through an `Rc` by several editors.
pub trait TextModel {
    /// Apply `ops` in order as one atomic transaction
    ///
    /// Either every op applies and observers are notified once, or the model
    /// is left untouched and an error is returned.
    fn transact(&self, origin: &str, ops: Vec<TextOp>) -> Result<()>;

    /// Register a callback fired after every transaction, local or remote
    fn observe(&self, callback: ChangeCallback) -> ObserverId;

    /// Remove a callback registered with [`observe`](TextModel::observe)
    fn unobserve(&self, id: ObserverId);

    /// Current run sequence in document order
    fn to_delta(&self) -> Vec<AttributedRun>;

    /// Document length in UTF-16 code units
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(
        &self,
        origin: &str,
        index: usize,
        text: &str,
        attributes: TextAttributes,
    ) -> Result<()> {
        self.transact(
            origin,
            vec![TextOp::Insert {
                index,
                text: text.to_string(),
                attributes,
            }],
        )
    }

    fn delete(&self, origin: &str, index: usize, length: usize) -> Result<()> {
        self.transact(origin, vec![TextOp::Delete { index, length }])
    }

    fn format(
        &self,
        origin: &str,
        index: usize,
        length: usize,
        attributes: TextAttributes,
        mode: FormatMode,
    ) -> Result<()> {
        self.transact(
            origin,
            vec![TextOp::Format {
                index,
                length,
                attributes,
                mode,
            }],
        )
    }
}

/// RAII guard for an observer registration
///
/// Dropping the guard unregisters the callback. The guard holds the model
/// weakly, so it never keeps a model alive on its own.
pub struct Subscription {
    model: Weak<dyn TextModel>,
    id: ObserverId,
}

impl Subscription {
    /// Register `callback` on `model` and tie its lifetime to the guard
    pub fn new(model: &ModelHandle, callback: ChangeCallback) -> Self {
        let id = model.observe(callback);
        Self {
            model: Rc::downgrade(model),
            id,
        }
    }

    pub fn id(&self) -> ObserverId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(model) = self.model.upgrade() {
            model.unobserve(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
