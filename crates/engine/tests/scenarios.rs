// End-to-end editing scenarios driven through the store and keymap.

use std::cell::RefCell;
use std::rc::Rc;

use gridstate_core::{create_empty_matrix, Matrix, Point, PointSet};
use gridstate_engine::{
    actions, key_down, Cell, CellChange, EventCollector, Key, KeyEvent, Keymap, Mode, State, Store,
};

fn p(row: usize, column: usize) -> Point {
    Point::new(row, column)
}

fn press(store: &mut Store<String>, keymap: &Keymap, event: KeyEvent) -> bool {
    store.dispatch(|state| key_down(state, &event, keymap))
}

fn blank(rows: usize, columns: usize) -> Matrix<String> {
    Matrix::from_rows((0..rows).map(|_| vec![String::new(); columns]))
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[test]
fn arrow_right_is_blocked_at_last_column() {
    let keymap = Keymap::default();
    let mut store = Store::new(blank(3, 3));
    store.dispatch(|s| actions::activate(s, p(1, 1)));

    press(&mut store, &keymap, KeyEvent::new(Key::ArrowRight));
    assert_eq!(store.state().active, Some(p(1, 2)));
    assert_eq!(store.mode(), Mode::View);

    press(&mut store, &keymap, KeyEvent::new(Key::ArrowRight));
    assert_eq!(store.state().active, Some(p(1, 2)));
    assert_eq!(store.state().selected, PointSet::single(p(1, 2)));
}

#[test]
fn shift_arrows_grow_and_shrink_selection() {
    let keymap = Keymap::default();
    let mut store = Store::new(blank(3, 3));
    store.dispatch(|s| actions::activate(s, p(0, 0)));

    press(&mut store, &keymap, KeyEvent::new(Key::ArrowDown).shift());
    press(&mut store, &keymap, KeyEvent::new(Key::ArrowDown).shift());
    assert_eq!(
        store.state().selected.to_vec(),
        vec![p(0, 0), p(1, 0), p(2, 0)]
    );

    press(&mut store, &keymap, KeyEvent::new(Key::ArrowUp).shift());
    assert_eq!(store.state().selected.to_vec(), vec![p(0, 0), p(1, 0)]);
    assert_eq!(store.state().active, Some(p(0, 0)));
}

#[test]
fn enter_edits_then_moves_down() {
    let keymap = Keymap::default();
    let mut store = Store::new(blank(3, 3));
    store.dispatch(|s| actions::activate(s, p(0, 0)));

    press(&mut store, &keymap, KeyEvent::new(Key::Enter));
    assert_eq!(store.mode(), Mode::Edit);

    // Shift is ignored in edit mode.
    press(&mut store, &keymap, KeyEvent::new(Key::Enter).shift());
    assert_eq!(store.state().active, Some(p(1, 0)));
    assert_eq!(store.mode(), Mode::View);
}

#[test]
fn unbound_key_leaves_state_alone() {
    let keymap = Keymap::default();
    let mut store = Store::new(blank(2, 2));
    store.dispatch(|s| actions::activate(s, p(0, 0)));
    assert!(!press(&mut store, &keymap, KeyEvent::new(Key::Char('q')).meta()));
}

// ---------------------------------------------------------------------------
// Clipboard
// ---------------------------------------------------------------------------

fn numbered(rows: usize, columns: usize) -> Matrix<String> {
    Matrix::from_rows((0..rows).map(|row| (0..columns).map(move |column| format!("{row}{column}"))))
}

#[test]
fn paste_preserves_offsets() {
    let mut state = State::new(numbered(8, 8));
    state.active = Some(p(2, 2));
    state.selected = PointSet::inclusive_range(p(2, 2), p(3, 3));
    let state = state.merged(actions::copy(&state).unwrap_or_default());
    let state = state.merged(actions::activate(&state, p(5, 5)).unwrap_or_default());
    let state = state.merged(actions::paste(&state).unwrap_or_default());

    for (dr, dc) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
        assert_eq!(
            state.data.get(p(5 + dr, 5 + dc)),
            Some(&format!("{}{}", 2 + dr, 2 + dc))
        );
    }
    assert_eq!(state.selected, PointSet::inclusive_range(p(5, 5), p(6, 6)));
}

#[test]
fn cut_paste_round_trip_with_commit_log() {
    let original = numbered(12, 12);
    let mut state = State::new(original.clone());
    state.active = Some(p(0, 0));
    state.selected = PointSet::inclusive_range(p(0, 0), p(1, 1));
    let state = state.merged(actions::cut(&state).unwrap_or_default());
    let state = state.merged(actions::activate(&state, p(10, 10)).unwrap_or_default());
    let state = state.merged(actions::paste(&state).unwrap_or_default());

    for (r, c) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
        assert_eq!(state.data.get(p(r, c)), None);
        assert_eq!(state.data.get(p(10 + r, 10 + c)), original.get(p(r, c)));
    }

    let commit = state.last_commit.clone().unwrap_or_default();
    let deletions: Vec<&CellChange<String>> =
        commit.iter().filter(|c| c.next_cell.is_none()).collect();
    let writes: Vec<&CellChange<String>> =
        commit.iter().filter(|c| c.next_cell.is_some()).collect();
    assert_eq!(deletions.len(), 4);
    assert_eq!(writes.len(), 4);
    assert_eq!(writes[0].prev_cell.as_deref(), Some("1010"));
    assert_eq!(writes[0].next_cell.as_deref(), Some("00"));
    assert!(!state.cut);
    assert!(state.has_pasted);
}

#[test]
fn store_reports_cut_paste_commits() {
    let mut store = Store::new(numbered(12, 12));
    let events = Rc::new(RefCell::new(EventCollector::new()));
    let sink = Rc::clone(&events);
    store.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    store.dispatch(|s| actions::activate(s, p(0, 0)));
    store.dispatch(|s| actions::select(s, p(1, 1)));
    let text = store
        .cut_to_clipboard(&gridstate_engine::DefaultAccessor)
        .unwrap_or_default();
    assert_eq!(text, "00\t01\n10\t11");

    store.dispatch(|s| actions::activate(s, p(10, 10)));
    store.paste_from_clipboard(&text);

    let collected = events.borrow();
    assert_eq!(collected.commits().len(), 8);
    assert_eq!(collected.data_changes(), 1);
}

// ---------------------------------------------------------------------------
// Data replacement
// ---------------------------------------------------------------------------

#[test]
fn set_data_shrinks_references() {
    let mut store = Store::new(blank(5, 5));
    store.dispatch(|s| actions::activate(s, p(4, 4)));
    store.dispatch(|s| actions::select(s, p(2, 2)));
    assert_eq!(store.state().selected.len(), 9);

    store.replace_data(blank(3, 3));
    assert_eq!(store.state().active, None);
    assert_eq!(store.state().selected, PointSet::single(p(2, 2)));
}

#[test]
fn empty_grid_fills_through_editor() {
    let mut store: Store<Cell> = Store::new(create_empty_matrix(2, 2));
    store.dispatch(|s| actions::activate(s, p(0, 1)));
    store.dispatch(actions::key_press);
    store.set_cell(
        p(0, 1),
        Cell::from_input("=A1*2"),
        &gridstate_engine::FormulaReferences,
    );
    store.dispatch(actions::view);

    assert_eq!(store.state().data.get(p(0, 1)).map(|c| c.to_string()).as_deref(), Some("=A1*2"));
    assert_eq!(store.state().bindings.get(p(0, 1)), Some(&PointSet::single(p(0, 0))));
    assert_eq!(store.state().last_changed, Some(p(0, 1)));
    assert_eq!(store.state().last_commit.as_ref().map(|c| c.len()), Some(1));
}
