//! Change notifications derived from consecutive states.
//!
//! Containers are persistent, so "did X change" is an identity check on the
//! shared structure rather than a deep comparison.

use std::sync::Arc;

use gridstate_core::{Matrix, Point};

use crate::cell::CellBase;
use crate::state::{Mode, State};

#[derive(Debug, Clone, PartialEq)]
pub enum SheetEvent<C: Clone> {
    /// One entry of a new commit, with the active cell at the time.
    CellCommitted {
        prev_cell: Option<C>,
        next_cell: Option<C>,
        active: Option<Point>,
    },
    /// Cell data changed through an action. Data handed in from outside is
    /// not echoed back.
    DataChanged(Matrix<C>),
    ModeChanged(Mode),
    SelectionChanged(Vec<Point>),
    Activated(Point),
}

/// Events describing the step from `prev` to `next`, in notification order.
///
/// `external_data` is the last matrix the embedder supplied; if `next.data`
/// is that very matrix no `DataChanged` is emitted.
pub fn diff_states<C: CellBase>(
    prev: &State<C>,
    next: &State<C>,
    external_data: Option<&Matrix<C>>,
) -> Vec<SheetEvent<C>> {
    let mut events = Vec::new();

    if let Some(commit) = &next.last_commit {
        let is_new = match &prev.last_commit {
            Some(old) => !Arc::ptr_eq(old, commit),
            None => true,
        };
        if is_new {
            events.extend(commit.iter().map(|change| SheetEvent::CellCommitted {
                prev_cell: change.prev_cell.clone(),
                next_cell: change.next_cell.clone(),
                active: next.active,
            }));
        }
    }

    let from_outside = external_data.is_some_and(|data| data.ptr_eq(&next.data));
    if !next.data.ptr_eq(&prev.data) && !from_outside {
        events.push(SheetEvent::DataChanged(next.data.clone()));
    }

    if next.mode != prev.mode {
        events.push(SheetEvent::ModeChanged(next.mode));
    }

    if next.selected != prev.selected {
        events.push(SheetEvent::SelectionChanged(next.selected.to_vec()));
    }

    if next.active != prev.active {
        if let Some(active) = next.active {
            events.push(SheetEvent::Activated(active));
        }
    }

    events
}

/// Simple event collector for testing.
#[derive(Debug)]
pub struct EventCollector<C: Clone> {
    events: Vec<SheetEvent<C>>,
}

impl<C: Clone> Default for EventCollector<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clone> EventCollector<C> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: SheetEvent<C>) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[SheetEvent<C>] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// (prev, next) of every committed cell.
    pub fn commits(&self) -> Vec<(Option<&C>, Option<&C>)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SheetEvent::CellCommitted {
                    prev_cell,
                    next_cell,
                    ..
                } => Some((prev_cell.as_ref(), next_cell.as_ref())),
                _ => None,
            })
            .collect()
    }

    pub fn data_changes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SheetEvent::DataChanged(_)))
            .count()
    }

    pub fn modes(&self) -> Vec<Mode> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SheetEvent::ModeChanged(mode) => Some(*mode),
                _ => None,
            })
            .collect()
    }

    pub fn selections(&self) -> Vec<&[Point]> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SheetEvent::SelectionChanged(points) => Some(points.as_slice()),
                _ => None,
            })
            .collect()
    }

    pub fn activations(&self) -> Vec<Point> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SheetEvent::Activated(point) => Some(*point),
                _ => None,
            })
            .collect()
    }
}
