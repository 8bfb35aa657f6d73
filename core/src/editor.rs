//! Editor: one view root bound to a shared text model
//!
//! An `Editor` ties together the pieces of the sync engine for a single
//! editable root:
//!
//! ```text
//!  intents ──► input::reconcile ──► model.transact ──► observer ──► inbox
//!                                                                    │
//!  platform selection ◄── selection::SelectionSync ◄── refresh ◄─────┘
//!          │                                             (rebuild view)
//!          └──► mapping::to_static_range ──► SelectionSync (native)
//! ```
//!
//! The model observer only queues the change. Nothing is rebuilt from inside
//! the model's notification; the editor drains its inbox right after its own
//! transactions, and the host calls [`Editor::refresh`] after another party
//! edited the shared model.
//!
//! # Example
//!
//! ```rust
//! use synckit_editor::editor::Editor;
//! use synckit_editor::input::EditIntent;
//! use synckit_editor::model::{ModelHandle, SharedText};
//! use synckit_editor::range::StaticRange;
//! use synckit_editor::surface::Surface;
//! use synckit_editor::view::Point;
//!
//! let mut surface = Surface::new();
//! let model: ModelHandle = SharedText::new();
//! let mut editor = Editor::new(surface.create_view(Point::default()), model.clone()).unwrap();
//!
//! editor.focus();
//! editor.set_range(Some(StaticRange::caret(0)), &mut surface).unwrap();
//! editor.handle_intent(EditIntent::InsertText("hi".into()), &mut surface).unwrap();
//!
//! assert_eq!(model.len(), 2);
//! assert_eq!(editor.range(), Some(StaticRange::caret(2)));
//! ```

use crate::chunk::chunk_lines;
use crate::config::{EditorConfig, RemoteCaretPolicy};
use crate::error::{EditorError, Result};
use crate::input::{reconcile, EditIntent, InputEffect, InputState};
use crate::mapping::{self, SelectionContext};
use crate::model::{
    FormatMode, ModelHandle, Subscription, TextAttributes, TextChange, TextOp,
};
use crate::range::StaticRange;
use crate::render::RendererRegistry;
use crate::selection::{RangeOrigin, RangeUpdate, SelectionSync, SyncEffect};
use crate::surface::{NativeSelection, SelectionChange, SelectionHost, SelectionSource};
use crate::view::builder::build;
use crate::view::{ViewId, ViewRange, ViewTree};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Notification delivered to editor listeners (toolbars, snapshots)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    RangeChanged(RangeUpdate),
    FocusChanged(bool),
}

pub type EditorListener = Box<dyn FnMut(&EditorEvent)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Copy, Default)]
struct Drained {
    rebuilt: bool,
    pushed: bool,
}

pub struct Editor {
    tree: ViewTree,
    model: ModelHandle,
    /// Origin tag of this editor's transactions
    origin: String,
    config: EditorConfig,
    renderers: Rc<RendererRegistry>,
    sync: SelectionSync,
    input: InputState,
    focused: bool,
    inbox: Rc<RefCell<VecDeque<TextChange>>>,
    _subscription: Subscription,
    listeners: Vec<(ListenerId, EditorListener)>,
    next_listener: u64,
    rebuilds: u64,
}

impl Editor {
    /// Bind `tree` to `model` with the stock renderers and default config
    pub fn new(tree: ViewTree, model: ModelHandle) -> Result<Self> {
        Self::bind(
            tree,
            model,
            Rc::new(RendererRegistry::with_defaults()),
            EditorConfig::default(),
        )
    }

    /// Bind `tree` to `model` and render the current document into it
    pub fn bind(
        tree: ViewTree,
        model: ModelHandle,
        renderers: Rc<RendererRegistry>,
        config: EditorConfig,
    ) -> Result<Self> {
        let inbox: Rc<RefCell<VecDeque<TextChange>>> = Rc::new(RefCell::new(VecDeque::new()));
        let queue = Rc::clone(&inbox);
        let subscription = Subscription::new(
            &model,
            Box::new(move |change: &TextChange| queue.borrow_mut().push_back(change.clone())),
        );

        let mut editor = Self {
            origin: tree.view_id().to_string(),
            tree,
            model,
            config,
            renderers,
            sync: SelectionSync::new(),
            input: InputState::Idle,
            focused: false,
            inbox,
            _subscription: subscription,
            listeners: Vec::new(),
            next_listener: 0,
            rebuilds: 0,
        };
        editor.rebuild()?;
        tracing::debug!(view = %editor.id(), "editor bound");
        Ok(editor)
    }

    /// Stop observing the model and hand the view root back
    pub fn unbind(self) -> ViewTree {
        tracing::debug!(view = %self.id(), "editor unbound");
        let Editor { tree, .. } = self;
        tree
    }

    pub fn id(&self) -> ViewId {
        self.tree.view_id()
    }

    /// Origin tag attached to this editor's model transactions
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn range(&self) -> Option<StaticRange> {
        self.sync.current()
    }

    pub fn is_composing(&self) -> bool {
        self.input == InputState::Composing
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn view(&self) -> &ViewTree {
        &self.tree
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Number of full view rebuilds so far, the initial render included
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    pub fn subscribe(&mut self, listener: EditorListener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Returns false if `id` was not registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(candidate, _)| *candidate != id);
        self.listeners.len() != before
    }

    /// Run one edit intent from the platform
    pub fn handle_intent(&mut self, intent: EditIntent, host: &mut dyn SelectionHost) -> Result<()> {
        let doc = self.model.to_delta();
        let step = reconcile(
            self.input,
            self.sync.current(),
            &intent,
            &doc,
            self.config.backspace,
        );
        self.input = step.state;

        let mut drained = Drained::default();
        for effect in step.effects {
            match effect {
                InputEffect::Transact(ops) => {
                    self.model.transact(&self.origin, ops)?;
                    let batch = self.drain_inbox(host, true)?;
                    drained.rebuilt |= batch.rebuilt;
                    drained.pushed |= batch.pushed;
                }
                InputEffect::MoveCaret(range) => {
                    drained.pushed |= self.apply_range(Some(range), RangeOrigin::Input, host);
                }
            }
        }

        if drained.rebuilt && !drained.pushed {
            self.sync_range(host);
        }
        Ok(())
    }

    /// React to a platform selection change
    pub fn handle_selection_change(&mut self, change: &SelectionChange, host: &mut dyn SelectionHost) {
        if self.is_composing() {
            tracing::trace!(view = %self.id(), "selection change ignored while composing");
            return;
        }
        if change.source == SelectionSource::Programmatic(self.id()) {
            tracing::trace!(view = %self.id(), "discarding selection echo");
            return;
        }
        let Some(selection) = change.selection else {
            return;
        };

        match self.to_static_range(&selection, host) {
            Some(range) => {
                self.apply_range(Some(range), RangeOrigin::PlatformNative, host);
            }
            None => tracing::trace!(view = %self.id(), "selection outside this view"),
        }
    }

    pub fn focus(&mut self) {
        if !self.focused {
            self.focused = true;
            self.emit(EditorEvent::FocusChanged(true));
        }
    }

    /// Lose focus; the range is cleared
    pub fn blur(&mut self, host: &mut dyn SelectionHost) {
        if self.focused {
            self.focused = false;
            self.emit(EditorEvent::FocusChanged(false));
        }
        self.apply_range(None, RangeOrigin::PlatformNative, host);
    }

    /// Set the range programmatically and move the platform selection to it
    pub fn set_range(&mut self, range: Option<StaticRange>, host: &mut dyn SelectionHost) -> Result<()> {
        if let Some(range) = range {
            let length = self.model.len();
            if range.checked_end().map_or(true, |end| end > length) {
                return Err(EditorError::RangeOutOfBounds {
                    start: range.index,
                    end: range.end(),
                    length,
                });
            }
        }
        self.apply_range(range, RangeOrigin::Programmatic, host);
        Ok(())
    }

    /// Push the current range onto the platform again, even if unchanged
    pub fn sync_range(&mut self, host: &mut dyn SelectionHost) -> bool {
        match self.sync.resync() {
            Some(SyncEffect::PushNative(range)) => self.push_native(range, host),
            _ => false,
        }
    }

    /// Process model changes made by other parties
    ///
    /// The model observer only queues changes, so this view is rebuilt when
    /// `refresh` runs, not when the transaction fires. Hosts must call it
    /// after every transaction made through another editor or replica.
    ///
    /// The platform selection is rewritten only while this editor owns it:
    /// when it is focused or the live selection touches this view.
    pub fn refresh(&mut self, host: &mut dyn SelectionHost) -> Result<()> {
        let drained = self.drain_inbox(host, false)?;
        if drained.rebuilt && !drained.pushed && self.owns_selection(host) {
            self.sync_range(host);
        }
        Ok(())
    }

    /// Apply `attributes` to the current range
    pub fn format_text(
        &mut self,
        attributes: TextAttributes,
        mode: FormatMode,
        host: &mut dyn SelectionHost,
    ) -> Result<()> {
        let Some(range) = self.sync.current().filter(|range| !range.is_collapsed()) else {
            return Ok(());
        };
        self.model.transact(
            &self.origin,
            vec![TextOp::Format {
                index: range.index,
                length: range.length,
                attributes,
                mode,
            }],
        )?;
        self.drain_inbox(host, true)?;
        self.sync_range(host);
        Ok(())
    }

    /// Revert the current range to unstyled base text
    pub fn reset_text(&mut self, host: &mut dyn SelectionHost) -> Result<()> {
        self.format_text(TextAttributes::base(), FormatMode::Replace, host)
    }

    /// Replace `range` with unstyled `text`; the range is left where it is
    pub fn insert_text(&mut self, range: StaticRange, text: &str, host: &mut dyn SelectionHost) -> Result<()> {
        self.replace(range, text, TextAttributes::base(), host)
    }

    pub fn insert_line_break(&mut self, range: StaticRange, host: &mut dyn SelectionHost) -> Result<()> {
        self.replace(range, "\n", TextAttributes::LineBreak, host)
    }

    pub fn delete_text(&mut self, range: StaticRange, host: &mut dyn SelectionHost) -> Result<()> {
        self.transact_and_refresh(
            vec![TextOp::Delete {
                index: range.index,
                length: range.length,
            }],
            host,
        )
    }

    pub fn to_view_range(&self, range: StaticRange) -> Option<ViewRange> {
        mapping::to_view_range(&self.tree, range)
    }

    /// This view's share of a platform selection
    pub fn to_static_range(&self, selection: &NativeSelection, host: &dyn SelectionHost) -> Option<StaticRange> {
        let context = SelectionContext {
            backward: host.is_backward(selection),
            contains_root: host.contains_view(selection, self.id()),
            doc_len: self.model.len(),
        };
        mapping::to_static_range(&self.tree, selection, context)
    }

    fn replace(
        &mut self,
        range: StaticRange,
        text: &str,
        attributes: TextAttributes,
        host: &mut dyn SelectionHost,
    ) -> Result<()> {
        let mut ops = Vec::with_capacity(2);
        if !range.is_collapsed() {
            ops.push(TextOp::Delete {
                index: range.index,
                length: range.length,
            });
        }
        ops.push(TextOp::Insert {
            index: range.index,
            text: text.to_string(),
            attributes,
        });
        self.transact_and_refresh(ops, host)
    }

    fn transact_and_refresh(&mut self, ops: Vec<TextOp>, host: &mut dyn SelectionHost) -> Result<()> {
        self.model.transact(&self.origin, ops)?;
        let drained = self.drain_inbox(host, true)?;
        if drained.rebuilt && !drained.pushed {
            self.sync_range(host);
        }
        Ok(())
    }

    /// Whether the platform selection currently belongs to this editor
    fn owns_selection(&self, host: &dyn SelectionHost) -> bool {
        self.focused
            || host.selection().map_or(false, |selection| {
                selection.anchor.node.view == self.id() || selection.focus.node.view == self.id()
            })
    }

    fn rebuild(&mut self) -> Result<()> {
        let lines = chunk_lines(&self.model.to_delta());
        build(&mut self.tree, &lines, &self.renderers, &self.config.metrics)?;
        self.rebuilds += 1;
        Ok(())
    }

    /// Rebuild once for everything queued and adjust the range for edits
    /// made by other parties
    ///
    /// `local` is set when this editor just made its own transaction; otherwise
    /// an adjusted range only reaches the platform if this editor owns it.
    fn drain_inbox(&mut self, host: &mut dyn SelectionHost, local: bool) -> Result<Drained> {
        let changes: Vec<TextChange> = self.inbox.borrow_mut().drain(..).collect();
        if changes.is_empty() {
            return Ok(Drained::default());
        }
        self.rebuild()?;

        let remote: Vec<TextOp> = changes
            .iter()
            .filter(|change| change.origin != self.origin)
            .flat_map(|change| change.ops.iter().cloned())
            .collect();
        let mut drained = Drained {
            rebuilt: true,
            pushed: false,
        };
        if remote.is_empty() {
            return Ok(drained);
        }

        if let Some(current) = self.sync.current() {
            let adjusted = match self.config.remote_caret {
                RemoteCaretPolicy::Keep => current,
                RemoteCaretPolicy::Shift => current.transform(&remote),
            }
            .clamp_to(self.model.len());
            if adjusted != current {
                let push = local || self.owns_selection(host);
                drained.pushed = self.route_range(Some(adjusted), RangeOrigin::Remote, push, host);
            }
        }
        Ok(drained)
    }

    /// Route a range update through the synchronizer; true if the platform
    /// selection was rewritten
    fn apply_range(
        &mut self,
        range: Option<StaticRange>,
        origin: RangeOrigin,
        host: &mut dyn SelectionHost,
    ) -> bool {
        self.route_range(range, origin, true, host)
    }

    /// Like `apply_range`, but a push is skipped unless `push` is set
    fn route_range(
        &mut self,
        range: Option<StaticRange>,
        origin: RangeOrigin,
        push: bool,
        host: &mut dyn SelectionHost,
    ) -> bool {
        let mut pushed = false;
        for effect in self.sync.apply(range, origin) {
            match effect {
                SyncEffect::PushNative(range) if push => pushed = self.push_native(range, host),
                SyncEffect::PushNative(_) => {}
                SyncEffect::Notify(update) => self.emit(EditorEvent::RangeChanged(update)),
            }
        }
        pushed
    }

    fn push_native(&self, range: StaticRange, host: &mut dyn SelectionHost) -> bool {
        match mapping::to_view_range(&self.tree, range) {
            Some(view_range) => {
                host.set_selection(
                    Some(NativeSelection::from(view_range)),
                    SelectionSource::Programmatic(self.id()),
                );
                true
            }
            None => {
                tracing::debug!(view = %self.id(), %range, "range not representable in view");
                false
            }
        }
    }

    fn emit(&mut self, event: EditorEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("view", &self.id())
            .field("range", &self.range())
            .field("input", &self.input)
            .field("focused", &self.focused)
            .field("rebuilds", &self.rebuilds)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
