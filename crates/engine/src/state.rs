//! The composite editor state and the patches actions produce.
//!
//! # Invariants
//!
//! 1. `active`, when set, resolves inside `data` (`set_data` enforces it).
//! 2. `selected` is an axis-aligned rectangle.
//! 3. `mode == Edit` implies an active cell that is not read-only.
//! 4. `bindings` only reference points inside `data`.
//! 5. `last_commit` lists every change made by the action that produced it.

use std::sync::Arc;

use im::OrdMap;
use serde::{Deserialize, Serialize};

use gridstate_core::{Matrix, Point, PointMap, PointSet};

use crate::cell::CellBase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    View,
    Edit,
}

impl Mode {
    pub fn is_editing(self) -> bool {
        self == Mode::Edit
    }
}

/// Measured geometry of a rendered cell.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
    pub top: f32,
    pub left: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RowDimensions {
    pub top: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColumnDimensions {
    pub left: f32,
    pub width: f32,
}

/// One cell transition. `None` means "no cell" on that side.
#[derive(Debug, Clone, PartialEq)]
pub struct CellChange<C> {
    pub prev_cell: Option<C>,
    pub next_cell: Option<C>,
}

impl<C> CellChange<C> {
    pub fn new(prev_cell: Option<C>, next_cell: Option<C>) -> Self {
        Self { prev_cell, next_cell }
    }
}

/// Shared so subscribers can detect a new commit by identity.
pub type Commit<C> = Arc<Vec<CellChange<C>>>;

#[derive(Debug, Clone)]
pub struct State<C: Clone> {
    pub data: Matrix<C>,
    pub selected: PointSet,
    /// Snapshot taken by copy/cut. `None` values are copied holes.
    pub copied: PointMap<Option<C>>,
    pub cut: bool,
    pub has_pasted: bool,
    pub active: Option<Point>,
    pub mode: Mode,
    pub row_dimensions: OrdMap<usize, RowDimensions>,
    pub column_dimensions: OrdMap<usize, ColumnDimensions>,
    pub dragging: bool,
    pub last_changed: Option<Point>,
    /// Formula cell -> points whose value depends on it.
    pub bindings: PointMap<PointSet>,
    pub last_commit: Option<Commit<C>>,
}

impl<C: CellBase> State<C> {
    pub fn new(data: Matrix<C>) -> Self {
        Self {
            data,
            selected: PointSet::new(),
            copied: PointMap::new(),
            cut: false,
            has_pasted: false,
            active: None,
            mode: Mode::View,
            row_dimensions: OrdMap::new(),
            column_dimensions: OrdMap::new(),
            dragging: false,
            last_changed: None,
            bindings: PointMap::new(),
            last_commit: None,
        }
    }

    /// The cell under the active point, if any.
    pub fn active_cell(&self) -> Option<&C> {
        self.active.and_then(|point| self.data.get(point))
    }

    pub fn is_active_read_only(&self) -> bool {
        self.active_cell().is_some_and(|cell| cell.is_read_only())
    }

    /// Shallow-merge `patch` into this state.
    pub fn apply(&mut self, patch: StatePatch<C>) {
        let StatePatch {
            data,
            selected,
            copied,
            cut,
            has_pasted,
            active,
            mode,
            row_dimensions,
            column_dimensions,
            dragging,
            last_changed,
            bindings,
            last_commit,
        } = patch;

        if let Some(data) = data {
            self.data = data;
        }
        if let Some(selected) = selected {
            self.selected = selected;
        }
        if let Some(copied) = copied {
            self.copied = copied;
        }
        if let Some(cut) = cut {
            self.cut = cut;
        }
        if let Some(has_pasted) = has_pasted {
            self.has_pasted = has_pasted;
        }
        if let Some(active) = active {
            self.active = active;
        }
        if let Some(mode) = mode {
            self.mode = mode;
        }
        if let Some(row_dimensions) = row_dimensions {
            self.row_dimensions = row_dimensions;
        }
        if let Some(column_dimensions) = column_dimensions {
            self.column_dimensions = column_dimensions;
        }
        if let Some(dragging) = dragging {
            self.dragging = dragging;
        }
        if let Some(last_changed) = last_changed {
            self.last_changed = last_changed;
        }
        if let Some(bindings) = bindings {
            self.bindings = bindings;
        }
        if let Some(last_commit) = last_commit {
            self.last_commit = last_commit;
        }
    }

    /// A new state with `patch` merged in; `self` is left untouched.
    pub fn merged(&self, patch: StatePatch<C>) -> Self {
        let mut next = self.clone();
        next.apply(patch);
        next
    }
}

/// Partial state produced by an action. Unset fields keep their value.
/// Nullable fields use a nested `Option`: `Some(None)` clears them.
#[derive(Debug, Clone)]
pub struct StatePatch<C: Clone> {
    pub data: Option<Matrix<C>>,
    pub selected: Option<PointSet>,
    pub copied: Option<PointMap<Option<C>>>,
    pub cut: Option<bool>,
    pub has_pasted: Option<bool>,
    pub active: Option<Option<Point>>,
    pub mode: Option<Mode>,
    pub row_dimensions: Option<OrdMap<usize, RowDimensions>>,
    pub column_dimensions: Option<OrdMap<usize, ColumnDimensions>>,
    pub dragging: Option<bool>,
    pub last_changed: Option<Option<Point>>,
    pub bindings: Option<PointMap<PointSet>>,
    pub last_commit: Option<Option<Commit<C>>>,
}

impl<C: Clone> Default for StatePatch<C> {
    fn default() -> Self {
        Self {
            data: None,
            selected: None,
            copied: None,
            cut: None,
            has_pasted: None,
            active: None,
            mode: None,
            row_dimensions: None,
            column_dimensions: None,
            dragging: None,
            last_changed: None,
            bindings: None,
            last_commit: None,
        }
    }
}

impl<C: Clone> StatePatch<C> {
    pub fn mode(mode: Mode) -> Self {
        Self {
            mode: Some(mode),
            ..Self::default()
        }
    }
}
