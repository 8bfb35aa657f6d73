//! Platform selection boundary
//!
//! The core reads and writes a live selection owned by the platform. That
//! boundary is the [`SelectionHost`] trait. [`Surface`] is the headless
//! implementation: an ordered stack of view roots (document order) with one
//! live selection and a queue of selection-change notifications.
//!
//! Every notification carries the [`SelectionSource`] that caused it. An
//! editor that pushes a selection tags it with its own view id and discards
//! the echo when the notification comes back, so programmatic corrections
//! never loop.

use crate::view::{Point, ViewId, ViewPoint, ViewRange, ViewTree};
use std::cmp::Ordering;
use std::collections::VecDeque;

/// Anchor/focus pair of the platform's live selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeSelection {
    pub anchor: ViewPoint,
    pub focus: ViewPoint,
}

impl NativeSelection {
    pub fn new(anchor: ViewPoint, focus: ViewPoint) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: ViewPoint) -> Self {
        Self::new(point, point)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

impl From<ViewRange> for NativeSelection {
    fn from(range: ViewRange) -> Self {
        Self::new(range.start, range.end)
    }
}

/// Who caused a selection change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionSource {
    /// Pointer, keyboard or any other user gesture
    User,
    /// Pushed by the editor bound to the given view
    Programmatic(ViewId),
}

/// Selection-change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChange {
    pub selection: Option<NativeSelection>,
    pub source: SelectionSource,
}

/// Platform side of the selection
pub trait SelectionHost {
    /// Current live selection, if any
    fn selection(&self) -> Option<NativeSelection>;

    /// Replace the live selection and notify listeners with `source`
    fn set_selection(&mut self, selection: Option<NativeSelection>, source: SelectionSource);

    /// True when `focus` precedes `anchor` in document order
    fn is_backward(&self, selection: &NativeSelection) -> bool;

    /// True when `view`'s root lies entirely inside `selection`
    fn contains_view(&self, selection: &NativeSelection, view: ViewId) -> bool;
}

/// Headless platform: stacked views and one live selection
#[derive(Debug, Default)]
pub struct Surface {
    views: Vec<ViewId>,
    selection: Option<NativeSelection>,
    changes: VecDeque<SelectionChange>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty view root stacked below the existing ones
    pub fn create_view(&mut self, origin: Point) -> ViewTree {
        let tree = ViewTree::new(origin);
        self.views.push(tree.view_id());
        tree
    }

    /// Remove a view; a selection touching it is dropped
    pub fn remove_view(&mut self, view: ViewId) {
        self.views.retain(|candidate| *candidate != view);
        let touches = self
            .selection
            .map(|sel| sel.anchor.node.view == view || sel.focus.node.view == view)
            .unwrap_or(false);
        if touches {
            self.set_selection(None, SelectionSource::User);
        }
    }

    /// Views in document order
    pub fn views(&self) -> &[ViewId] {
        &self.views
    }

    /// User gesture selecting from `anchor` to `focus`
    pub fn select(&mut self, anchor: ViewPoint, focus: ViewPoint) {
        self.set_selection(Some(NativeSelection::new(anchor, focus)), SelectionSource::User);
    }

    /// User gesture placing a caret
    pub fn place_caret(&mut self, point: ViewPoint) {
        self.select(point, point);
    }

    /// Drain pending notifications in the order they happened
    pub fn take_changes(&mut self) -> Vec<SelectionChange> {
        self.changes.drain(..).collect()
    }

    pub fn pending_changes(&self) -> usize {
        self.changes.len()
    }

    fn order_key(&self, point: &ViewPoint) -> Option<(usize, usize, usize)> {
        let view = self.views.iter().position(|v| *v == point.node.view)?;
        Some((view, point.node.index, point.offset))
    }

    fn compare(&self, a: &ViewPoint, b: &ViewPoint) -> Option<Ordering> {
        Some(self.order_key(a)?.cmp(&self.order_key(b)?))
    }
}

impl SelectionHost for Surface {
    fn selection(&self) -> Option<NativeSelection> {
        self.selection
    }

    fn set_selection(&mut self, selection: Option<NativeSelection>, source: SelectionSource) {
        self.selection = selection;
        self.changes.push_back(SelectionChange { selection, source });
    }

    fn is_backward(&self, selection: &NativeSelection) -> bool {
        matches!(
            self.compare(&selection.anchor, &selection.focus),
            Some(Ordering::Greater)
        )
    }

    fn contains_view(&self, selection: &NativeSelection, view: ViewId) -> bool {
        let position = |id: ViewId| self.views.iter().position(|v| *v == id);
        match (
            position(selection.anchor.node.view),
            position(selection.focus.node.view),
            position(view),
        ) {
            (Some(a), Some(f), Some(v)) => a.min(f) < v && v < a.max(f),
            _ => false,
        }
    }
}
