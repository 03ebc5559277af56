//! Single-threaded driver that owns the state.
//!
//! The store applies one action at a time, notifies subscribers of what
//! changed, and turns an edit session (entering edit mode on a cell until
//! leaving it) into a single commit.

use std::sync::Arc;

use gridstate_core::{Matrix, Point};

use crate::actions;
use crate::bindings::BindingExtractor;
use crate::cell::CellBase;
use crate::clipboard::{clip, ClipboardTracker, PasteSource};
use crate::events::{diff_states, SheetEvent};
use crate::hooks::ValueAccessor;
use crate::state::{CellChange, Mode, State, StatePatch};

pub type Subscriber<C> = Box<dyn FnMut(&SheetEvent<C>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// The cell under edit and its value when the session started.
struct EditSession<C> {
    point: Point,
    before: Option<C>,
}

pub struct Store<C: CellBase> {
    state: State<C>,
    subscribers: Vec<(SubscriptionId, Subscriber<C>)>,
    next_id: u64,
    /// Last matrix supplied through `replace_data`.
    external_data: Option<Matrix<C>>,
    session: Option<EditSession<C>>,
    clipboard: ClipboardTracker,
}

impl<C: CellBase> Store<C> {
    pub fn new(data: Matrix<C>) -> Self {
        Self {
            external_data: Some(data.clone()),
            state: State::new(data),
            subscribers: Vec::new(),
            next_id: 0,
            session: None,
            clipboard: ClipboardTracker::new(true),
        }
    }

    pub fn with_clipboard(mut self, clipboard: ClipboardTracker) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn state(&self) -> &State<C> {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn clipboard(&self) -> &ClipboardTracker {
        &self.clipboard
    }

    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&SheetEvent<C>) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Run `action` against the current state and apply its patch.
    ///
    /// Returns `false` without notifying anyone when the action produced no
    /// patch.
    pub fn dispatch<F>(&mut self, action: F) -> bool
    where
        F: FnOnce(&State<C>) -> Option<StatePatch<C>>,
    {
        let Some(patch) = action(&self.state) else {
            return false;
        };

        let prev = self.state.clone();
        self.state.apply(patch);
        self.track_edit_session(&prev);

        let events = diff_states(&prev, &self.state, self.external_data.as_ref());
        for (_, subscriber) in self.subscribers.iter_mut() {
            for event in &events {
                subscriber(event);
            }
        }
        true
    }

    /// Swap in data from outside. References are re-validated and no
    /// `DataChanged` is echoed for it.
    ///
    /// An open edit session is rebased onto the new data so the replaced
    /// value is never reported as a user commit.
    pub fn replace_data(&mut self, data: Matrix<C>) -> bool {
        if let Some(session) = self.session.as_mut() {
            session.before = data.get(session.point).cloned();
        }
        self.external_data = Some(data.clone());
        self.dispatch(|state| actions::set_data(state, data))
    }

    /// Write a cell from the editor, recording what its formula references.
    pub fn set_cell<E>(&mut self, point: Point, cell: C, extractor: &E) -> bool
    where
        E: BindingExtractor<C> + ?Sized,
    {
        let dependents = extractor.references(&cell);
        self.dispatch(|state| actions::set_cell_data(state, point, cell, dependents))
    }

    /// Copy the selection. Returns the text to put on the system clipboard.
    pub fn copy_to_clipboard<A>(&mut self, accessor: &A) -> Option<String>
    where
        A: ValueAccessor<C> + ?Sized,
    {
        let text = clip(&self.state, accessor)?;
        self.dispatch(actions::copy);
        self.clipboard.record(text.clone());
        Some(text)
    }

    pub fn cut_to_clipboard<A>(&mut self, accessor: &A) -> Option<String>
    where
        A: ValueAccessor<C> + ?Sized,
    {
        let text = clip(&self.state, accessor)?;
        self.dispatch(actions::cut);
        self.clipboard.record(text.clone());
        Some(text)
    }

    /// Paste `system_text`. Text this grid wrote pastes the structured copy;
    /// anything else is handed back for the embedder to import.
    pub fn paste_from_clipboard(&mut self, system_text: &str) -> PasteSource {
        let source = self.clipboard.classify(system_text);
        if source == PasteSource::Internal {
            self.dispatch(actions::paste);
        }
        source
    }

    fn track_edit_session(&mut self, prev: &State<C>) {
        let entered = !prev.mode.is_editing() && self.state.mode.is_editing();

        if let Some(session) = &self.session {
            let left = !self.state.mode.is_editing() || self.state.active != Some(session.point);
            if left || entered {
                if let Some(session) = self.session.take() {
                    self.finish_session(session, prev);
                }
            }
        }

        if entered {
            if let Some(point) = self.state.active {
                self.session = Some(EditSession {
                    point,
                    before: prev.data.get(point).cloned(),
                });
            }
        }
    }

    /// Publish the session's change, merged ahead of any commit the same
    /// action produced.
    fn finish_session(&mut self, session: EditSession<C>, prev: &State<C>) {
        let after = self.state.data.get(session.point).cloned();
        if after == session.before {
            return;
        }

        let mut changes = vec![CellChange::new(session.before, after)];
        if let Some(commit) = &self.state.last_commit {
            let is_new = prev
                .last_commit
                .as_ref()
                .map_or(true, |old| !Arc::ptr_eq(old, commit));
            if is_new {
                changes.extend(commit.iter().cloned());
            }
        }
        log::debug!("edit session on {} committed", session.point);
        self.state.last_commit = Some(Arc::new(changes));
    }
}
