//! Reducer actions.
//!
//! Every action reads the current [`State`] and returns the fields it
//! changes as a [`StatePatch`], or `None` when the input does not apply to
//! the current state. Actions never mutate their input and never fail.

use std::sync::Arc;

use gridstate_core::{Field, Matrix, Point, PointSet};

use crate::cell::CellBase;
use crate::state::{
    CellChange, ColumnDimensions, Dimensions, Mode, RowDimensions, State, StatePatch,
};

fn is_active<C: CellBase>(state: &State<C>, point: Point) -> bool {
    state.active == Some(point)
}

/// Replace `data` and drop every reference that no longer resolves in it.
pub fn set_data<C: CellBase>(state: &State<C>, data: Matrix<C>) -> Option<StatePatch<C>> {
    let active = state.active.filter(|&point| data.has(point));
    let selected = state.selected.filter(|point| data.has(point));
    let bindings = state
        .bindings
        .filter(|_, point| data.has(point))
        .map(|dependents, _| dependents.filter(|point| data.has(point)));

    if active != state.active {
        log::debug!("active cell no longer in data, clearing it");
    }

    // Edit mode needs an active cell.
    let mode = if active.is_none() { Mode::View } else { state.mode };

    Some(StatePatch {
        data: Some(data),
        active: Some(active),
        selected: Some(selected),
        bindings: Some(bindings),
        mode: Some(mode),
        ..StatePatch::default()
    })
}

/// Extend the selection from the active cell to `point`.
pub fn select<C: CellBase>(state: &State<C>, point: Point) -> Option<StatePatch<C>> {
    let active = state.active?;
    if active == point {
        return None;
    }
    let selected = PointSet::inclusive_range(point, active).filter(|p| state.data.has(p));
    Some(StatePatch {
        selected: Some(selected),
        mode: Some(Mode::View),
        ..StatePatch::default()
    })
}

/// Focus `point`. Activating the cell that is already active enters edit
/// mode unless it is read-only.
pub fn activate<C: CellBase>(state: &State<C>, point: Point) -> Option<StatePatch<C>> {
    if !state.data.has(point) {
        log::debug!("ignoring activation outside data at {}", point);
        return None;
    }

    let read_only = state.data.get(point).is_some_and(|cell| cell.is_read_only());
    let mode = if is_active(state, point) && !read_only {
        Mode::Edit
    } else {
        Mode::View
    };

    Some(StatePatch {
        selected: Some(PointSet::single(point)),
        active: Some(Some(point)),
        mode: Some(mode),
        ..StatePatch::default()
    })
}

/// Write `cell` at `point` from the editor. `dependents` become the binding
/// set of `point`, restricted to points inside the resulting data.
///
/// Enters edit mode when `point` is the active cell and the written cell is
/// not read-only; any other write leaves the mode alone.
pub fn set_cell_data<C, I>(
    state: &State<C>,
    point: Point,
    cell: C,
    dependents: I,
) -> Option<StatePatch<C>>
where
    C: CellBase,
    I: IntoIterator<Item = Point>,
{
    let data = state.data.set(point, cell);
    let dependents: PointSet = dependents
        .into_iter()
        .filter(|&p| {
            let inside = data.has(p);
            if !inside {
                log::debug!("dropping binding {} -> {}: outside data", point, p);
            }
            inside
        })
        .collect();

    // Only the active, writable cell may be under edit.
    let editable = is_active(state, point) && !data.get(point).is_some_and(|c| c.is_read_only());

    Some(StatePatch {
        mode: editable.then_some(Mode::Edit),
        bindings: Some(state.bindings.set(point, dependents)),
        data: Some(data),
        last_changed: Some(Some(point)),
        ..StatePatch::default()
    })
}

/// Record measured geometry. `None` when the row and column already carry
/// exactly these measurements.
pub fn set_cell_dimensions<C: CellBase>(
    state: &State<C>,
    point: Point,
    dimensions: Dimensions,
) -> Option<StatePatch<C>> {
    let row = RowDimensions {
        top: dimensions.top,
        height: dimensions.height,
    };
    let column = ColumnDimensions {
        left: dimensions.left,
        width: dimensions.width,
    };

    if state.row_dimensions.get(&point.row) == Some(&row)
        && state.column_dimensions.get(&point.column) == Some(&column)
    {
        return None;
    }

    Some(StatePatch {
        row_dimensions: Some(state.row_dimensions.update(point.row, row)),
        column_dimensions: Some(state.column_dimensions.update(point.column, column)),
        ..StatePatch::default()
    })
}

/// Geometry of `point`, once both its row and column have been measured.
pub fn get_cell_dimensions<C: CellBase>(state: &State<C>, point: Point) -> Option<Dimensions> {
    let row = state.row_dimensions.get(&point.row)?;
    let column = state.column_dimensions.get(&point.column)?;
    Some(Dimensions {
        width: column.width,
        height: row.height,
        top: row.top,
        left: column.left,
    })
}

/// Snapshot the selected cells into `copied`.
pub fn copy<C: CellBase>(state: &State<C>) -> Option<StatePatch<C>> {
    let copied = state
        .selected
        .iter()
        .map(|point| (point, state.data.get(point).cloned()))
        .collect();

    Some(StatePatch {
        copied: Some(copied),
        cut: Some(false),
        has_pasted: Some(false),
        ..StatePatch::default()
    })
}

/// Like [`copy`], but the sources are removed when pasted.
pub fn cut<C: CellBase>(state: &State<C>) -> Option<StatePatch<C>> {
    let mut patch = copy(state)?;
    patch.cut = Some(true);
    Some(patch)
}

/// Write `copied` anchored at the active cell, keeping relative offsets.
///
/// After a cut every source is emptied before any target is written, so
/// overlapping source and target regions move intact. The commit log still
/// lists each entry's deletion followed by its write. Deletions are always
/// logged; targets outside the current data bounds are dropped.
pub fn paste<C: CellBase>(state: &State<C>) -> Option<StatePatch<C>> {
    let active = state.active?;
    let anchor = state.copied.min_point()?;

    let mut data = state.data.clone();
    let mut commit = Vec::new();

    if state.cut {
        for (point, _) in state.copied.iter() {
            data = data.clear(point);
        }
    }

    let mut selected = PointSet::new();
    for (point, value) in state.copied.iter() {
        let target = Point::new(
            point.row - anchor.row + active.row,
            point.column - anchor.column + active.column,
        );
        if state.cut {
            commit.push(CellChange::new(value.clone(), None));
        }
        if !state.data.has(target) {
            log::debug!("paste target {} outside data, dropped", target);
            continue;
        }

        commit.push(CellChange::new(data.get(target).cloned(), value.clone()));
        data = match value {
            Some(cell) => data.set(target, cell.clone()),
            None => data.clear(target),
        };
        selected = selected.add(target);
    }

    Some(StatePatch {
        data: Some(data),
        selected: Some(selected),
        cut: Some(false),
        has_pasted: Some(true),
        mode: Some(Mode::View),
        last_commit: Some(Some(Arc::new(commit))),
        ..StatePatch::default()
    })
}

/// Enter edit mode on the active cell.
pub fn edit<C: CellBase>(state: &State<C>) -> Option<StatePatch<C>> {
    if state.active.is_none() || state.is_active_read_only() {
        return None;
    }
    Some(StatePatch::mode(Mode::Edit))
}

pub fn view<C: CellBase>(_state: &State<C>) -> Option<StatePatch<C>> {
    Some(StatePatch::mode(Mode::View))
}

/// Empty the value of every selected cell, keeping its other attributes.
/// Undefined cells are left alone.
pub fn clear<C: CellBase>(state: &State<C>) -> Option<StatePatch<C>> {
    state.active?;

    let mut data = state.data.clone();
    let mut changes = Vec::new();
    for point in state.selected.iter() {
        let Some(cell) = state.data.get(point) else {
            continue;
        };
        let cleared = cell.cleared();
        changes.push(CellChange::new(Some(cell.clone()), Some(cleared.clone())));
        data = data.set(point, cleared);
    }

    if changes.is_empty() {
        return None;
    }

    Some(StatePatch {
        data: Some(data),
        ..commit(state, changes)?
    })
}

/// Move the active cell by a delta. Moving off the grid only leaves edit
/// mode.
pub fn go<C: CellBase>(state: &State<C>, d_row: isize, d_col: isize) -> Option<StatePatch<C>> {
    let active = state.active?;
    match active.offset(d_row, d_col).filter(|&p| state.data.has(p)) {
        Some(next) => Some(StatePatch {
            active: Some(Some(next)),
            selected: Some(PointSet::single(next)),
            mode: Some(Mode::View),
            ..StatePatch::default()
        }),
        None => Some(StatePatch::mode(Mode::View)),
    }
}

/// Grow or shrink the selection by one rank along `field`.
///
/// When the selection already reaches one step behind the active cell (in
/// the `-delta` direction), the far edge on that side moves back toward the
/// active cell. Otherwise the edge in the `delta` direction moves outward.
pub fn modify_edge<C: CellBase>(
    state: &State<C>,
    field: Field,
    delta: isize,
) -> Option<StatePatch<C>> {
    let active = state.active?;
    if state.selected.is_empty() {
        return None;
    }

    let shrink = active
        .offset_field(field, -delta)
        .is_some_and(|behind| state.selected.has(behind));

    let next = if shrink {
        state.selected.shrink_edge(field, -delta)
    } else {
        state.selected.extend_edge(field, delta)
    };
    let next = match next {
        Ok(next) => next,
        Err(err) => {
            log::warn!("{}", err);
            return None;
        }
    };

    Some(StatePatch {
        selected: Some(next.filter(|point| state.data.has(point))),
        ..StatePatch::default()
    })
}

/// Drop focus.
pub fn blur<C: CellBase>(_state: &State<C>) -> Option<StatePatch<C>> {
    Some(StatePatch {
        active: Some(None),
        mode: Some(Mode::View),
        ..StatePatch::default()
    })
}

/// Typing a character in view mode starts editing the active cell.
pub fn key_press<C: CellBase>(state: &State<C>) -> Option<StatePatch<C>> {
    if state.mode == Mode::View && state.active.is_some() && !state.is_active_read_only() {
        return Some(StatePatch::mode(Mode::Edit));
    }
    None
}

pub fn drag_start<C: CellBase>(_state: &State<C>) -> Option<StatePatch<C>> {
    Some(StatePatch {
        dragging: Some(true),
        ..StatePatch::default()
    })
}

pub fn drag_end<C: CellBase>(_state: &State<C>) -> Option<StatePatch<C>> {
    Some(StatePatch {
        dragging: Some(false),
        ..StatePatch::default()
    })
}

/// Publish changes made outside the reducer, such as an edit session.
pub fn commit<C: CellBase>(_state: &State<C>, changes: Vec<CellChange<C>>) -> Option<StatePatch<C>> {
    Some(StatePatch {
        last_commit: Some(Some(Arc::new(changes))),
        ..StatePatch::default()
    })
}
