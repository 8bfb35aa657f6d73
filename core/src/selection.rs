//! Selection Synchronizer
//!
//! Owns the authoritative range of one editor. Every update goes through
//! [`SelectionSync::apply`], which decides whether the platform selection must
//! be rewritten and whether listeners hear about it. Like the reconciler it
//! only returns effects; the editor performs them.

use crate::range::StaticRange;
use serde::{Deserialize, Serialize};

/// Where a range update came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeOrigin {
    /// Read back from the platform's own selection
    PlatformNative,
    /// Set through the editor's API
    Programmatic,
    /// Caret placed by the input reconciler
    Input,
    /// Adjusted after another replica edited the text
    Remote,
}

/// Range-change notification delivered to listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeUpdate {
    pub range: Option<StaticRange>,
    pub origin: RangeOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEffect {
    /// Write this range onto the platform selection
    PushNative(StaticRange),
    /// Tell listeners the range changed
    Notify(RangeUpdate),
}

#[derive(Debug, Clone, Default)]
pub struct SelectionSync {
    current: Option<StaticRange>,
}

impl SelectionSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<StaticRange> {
        self.current
    }

    /// Store `range` and report what has to follow
    ///
    /// An update equal to the current range does nothing. A native update is
    /// never pushed back to the platform it came from, and an empty range has
    /// nothing to push.
    pub fn apply(&mut self, range: Option<StaticRange>, origin: RangeOrigin) -> Vec<SyncEffect> {
        if self.current == range {
            return Vec::new();
        }
        tracing::debug!(?range, ?origin, "range updated");
        self.current = range;

        let mut effects = Vec::with_capacity(2);
        match range {
            Some(range) if origin != RangeOrigin::PlatformNative => {
                effects.push(SyncEffect::PushNative(range));
            }
            _ => {}
        }
        effects.push(SyncEffect::Notify(RangeUpdate { range, origin }));
        effects
    }

    /// Push the current range again, for when the view under it was rebuilt
    pub fn resync(&self) -> Option<SyncEffect> {
        self.current.map(SyncEffect::PushNative)
    }
}
