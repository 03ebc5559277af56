// Replay scripts: recorded mouse, keyboard and clipboard input applied to a
// grid through the store, the same way an interactive front end drives it.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use gridstate_config::Settings;
use gridstate_core::{create_empty_matrix, Matrix, Point};
use gridstate_engine::{
    actions, key_down, Cell, ClipboardTracker, DefaultAccessor, EventCollector, FormulaReferences,
    Key, KeyEvent, Keymap, Mode, PasteSource, SheetEvent, Store,
};

use crate::CliError;

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Defaults to `grid.defaultRows`.
    pub rows: Option<usize>,
    /// Defaults to `grid.defaultColumns`.
    pub columns: Option<usize>,
    /// Initial contents as tab/newline separated text, starting at A1.
    #[serde(default)]
    pub data: Option<String>,
    pub events: Vec<ScriptEvent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ScriptEvent {
    /// Mouse down without shift.
    Click { cell: String },
    /// Mouse down with shift held.
    ShiftClick { cell: String },
    /// Mouse down that starts a drag selection.
    DragStart { cell: String },
    /// Mouse over a cell; extends the selection while dragging.
    Hover { cell: String },
    DragEnd,
    Key {
        key: String,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        meta: bool,
    },
    /// A printable key in view mode, which opens the editor.
    KeyPress,
    /// Editor content for the active cell.
    Type { text: String },
    Copy,
    Cut,
    /// Paste `text`, or what the last copy wrote when omitted.
    Paste { text: Option<String> },
    /// Replace the whole grid with tab/newline separated text.
    SetData { data: String },
}

#[derive(Debug, Serialize)]
pub struct CommitSummary {
    pub prev: Option<String>,
    pub next: Option<String>,
    pub active: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StateSummary {
    pub rows: usize,
    pub columns: usize,
    pub active: Option<String>,
    pub mode: Mode,
    pub selected: Vec<String>,
    pub commits: Vec<CommitSummary>,
    pub clipboard: Option<String>,
    /// Events that found no handler or did not apply.
    pub ignored: usize,
}

pub struct ReplayOutcome {
    pub grid: String,
    pub summary: StateSummary,
}

pub fn parse_script(json: &str) -> Result<Script, CliError> {
    serde_json::from_str(json).map_err(|e| CliError::parse(format!("invalid script: {}", e)))
}

/// Parse tab/newline separated text into cells.
pub fn grid_from_text(text: &str) -> Matrix<Cell> {
    let raw = Matrix::split(text);
    raw.iter().fold(Matrix::new(), |grid, (point, value)| {
        grid.set(point, Cell::from_input(value))
    })
}

fn cell_ref(index: usize, cell: &str) -> Result<Point, CliError> {
    Point::from_a1(cell).ok_or_else(|| {
        CliError::usage(format!("event {}: invalid cell reference {:?}", index, cell))
            .with_hint("use A1 notation, e.g. \"B3\"")
    })
}

/// Largest grid a script may ask for. Every cell of the initial grid is
/// stored, even when empty.
pub const MAX_GRID_CELLS: usize = 1_000_000;

fn check_grid_size(rows: usize, columns: usize) -> Result<(), CliError> {
    match rows.checked_mul(columns) {
        Some(cells) if cells <= MAX_GRID_CELLS => Ok(()),
        _ => Err(CliError::usage(format!(
            "grid of {} x {} exceeds the {} cell limit",
            rows, columns, MAX_GRID_CELLS
        ))
        .with_hint("lower \"rows\"/\"columns\" in the script or grid.default* in settings")),
    }
}

pub fn run(script: &Script, settings: &Settings, keymap: &Keymap) -> Result<ReplayOutcome, CliError> {
    let rows = script.rows.unwrap_or(settings.default_rows);
    let columns = script.columns.unwrap_or(settings.default_columns);
    check_grid_size(rows, columns)?;

    let mut data = create_empty_matrix(rows, columns);
    if let Some(text) = &script.data {
        for (point, cell) in grid_from_text(text).iter() {
            data = data.set(point, cell.clone());
        }
    }

    let mut store = Store::new(data)
        .with_clipboard(ClipboardTracker::new(settings.normalize_line_endings));
    let collector = Rc::new(RefCell::new(EventCollector::new()));
    let sink = Rc::clone(&collector);
    store.subscribe(move |event: &SheetEvent<Cell>| sink.borrow_mut().push(event.clone()));

    let mut ignored = 0;
    for (index, event) in script.events.iter().enumerate() {
        let applied = apply_event(&mut store, keymap, index, event)?;
        if !applied {
            log::debug!("event {} ({:?}) had no effect", index, event);
            ignored += 1;
        }
    }

    let state = store.state();
    let size = state.data.size();
    let commits = collector
        .borrow()
        .events()
        .iter()
        .filter_map(|event| match event {
            SheetEvent::CellCommitted {
                prev_cell,
                next_cell,
                active,
            } => Some(CommitSummary {
                prev: prev_cell.as_ref().map(|c| c.to_string()),
                next: next_cell.as_ref().map(|c| c.to_string()),
                active: active.map(|p| p.to_string()),
            }),
            _ => None,
        })
        .collect();

    Ok(ReplayOutcome {
        grid: state.data.join(),
        summary: StateSummary {
            rows: size.rows,
            columns: size.columns,
            active: state.active.map(|p| p.to_string()),
            mode: state.mode,
            selected: state.selected.iter().map(|p| p.to_string()).collect(),
            commits,
            clipboard: store.clipboard().clipped().map(str::to_string),
            ignored,
        },
    })
}

/// Returns whether the event changed anything.
fn apply_event(
    store: &mut Store<Cell>,
    keymap: &Keymap,
    index: usize,
    event: &ScriptEvent,
) -> Result<bool, CliError> {
    let applied = match event {
        ScriptEvent::Click { cell } => {
            let point = cell_ref(index, cell)?;
            store.dispatch(|s| actions::activate(s, point))
        }
        ScriptEvent::ShiftClick { cell } => {
            let point = cell_ref(index, cell)?;
            store.dispatch(|s| actions::select(s, point))
        }
        ScriptEvent::DragStart { cell } => {
            let point = cell_ref(index, cell)?;
            let activated = store.dispatch(|s| actions::activate(s, point));
            store.dispatch(actions::drag_start) || activated
        }
        ScriptEvent::Hover { cell } => {
            let point = cell_ref(index, cell)?;
            store.state().dragging && store.dispatch(|s| actions::select(s, point))
        }
        ScriptEvent::DragEnd => store.dispatch(actions::drag_end),
        ScriptEvent::Key { key, shift, meta } => {
            let event = KeyEvent {
                key: Key::parse(key),
                shift: *shift,
                meta: *meta,
            };
            store.dispatch(|s| key_down(s, &event, keymap))
        }
        ScriptEvent::KeyPress => store.dispatch(actions::key_press),
        ScriptEvent::Type { text } => {
            let active = store.state().active;
            match active {
                Some(point) if store.mode() == Mode::Edit => {
                    store.set_cell(point, Cell::from_input(text), &FormulaReferences)
                }
                _ => false,
            }
        }
        ScriptEvent::Copy => store.copy_to_clipboard(&DefaultAccessor).is_some(),
        ScriptEvent::Cut => store.cut_to_clipboard(&DefaultAccessor).is_some(),
        ScriptEvent::Paste { text } => {
            let text = match text {
                Some(text) => text.clone(),
                None => store.clipboard().clipped().unwrap_or_default().to_string(),
            };
            match store.paste_from_clipboard(&text) {
                PasteSource::Internal => true,
                PasteSource::External(text) => {
                    log::info!(
                        "event {}: external clipboard text ({} bytes) not imported",
                        index,
                        text.len()
                    );
                    false
                }
            }
        }
        ScriptEvent::SetData { data } => store.replace_data(grid_from_text(data)),
    };
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replay(json: &str) -> ReplayOutcome {
        let script = parse_script(json).unwrap();
        run(&script, &Settings::default(), &Keymap::default()).unwrap()
    }

    #[test]
    fn test_parse_events() {
        let script = parse_script(
            r#"{"rows": 2, "columns": 2, "events": [
                {"type": "click", "cell": "A1"},
                {"type": "key", "key": "ArrowDown", "shift": true},
                {"type": "paste"},
                {"type": "setData", "data": "x"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(script.events.len(), 4);
        assert!(matches!(script.events[1], ScriptEvent::Key { shift: true, meta: false, .. }));
        assert!(matches!(script.events[2], ScriptEvent::Paste { text: None }));
    }

    #[test]
    fn test_unknown_event_type_is_parse_error() {
        let err = parse_script(r#"{"events": [{"type": "scroll"}]}"#).err();
        assert_eq!(err.map(|e| e.code), Some(crate::exit_codes::EXIT_PARSE));
    }

    #[test]
    fn test_typing_and_navigation() {
        let outcome = replay(
            r#"{"rows": 2, "columns": 2, "events": [
                {"type": "click", "cell": "A1"},
                {"type": "keyPress"},
                {"type": "type", "text": "7"},
                {"type": "key", "key": "Enter"},
                {"type": "keyPress"},
                {"type": "type", "text": "=A1*2"},
                {"type": "key", "key": "Tab"}
            ]}"#,
        );
        assert_eq!(outcome.grid, "7\t\n=A1*2\t");
        assert_eq!(outcome.summary.active.as_deref(), Some("B2"));
        assert_eq!(outcome.summary.mode, Mode::View);
        assert_eq!(outcome.summary.commits.len(), 2);
        assert_eq!(outcome.summary.commits[1].next.as_deref(), Some("=A1*2"));
    }

    #[test]
    fn test_drag_selects_and_copy_pastes() {
        let outcome = replay(
            r#"{"rows": 3, "columns": 3, "data": "a\tb\nc\td", "events": [
                {"type": "dragStart", "cell": "A1"},
                {"type": "hover", "cell": "B2"},
                {"type": "dragEnd"},
                {"type": "hover", "cell": "C3"},
                {"type": "copy"},
                {"type": "click", "cell": "B2"},
                {"type": "paste"}
            ]}"#,
        );
        assert_eq!(outcome.grid, "a\tb\t\nc\ta\tb\n\tc\td");
        assert_eq!(outcome.summary.clipboard.as_deref(), Some("a\tb\nc\td"));
        assert_eq!(outcome.summary.selected, vec!["B2", "C2", "B3", "C3"]);
        assert_eq!(outcome.summary.ignored, 1);
    }

    #[test]
    fn test_external_paste_is_ignored() {
        let outcome = replay(
            r#"{"rows": 1, "columns": 1, "events": [
                {"type": "click", "cell": "A1"},
                {"type": "paste", "text": "from elsewhere"}
            ]}"#,
        );
        assert_eq!(outcome.summary.ignored, 1);
        assert_eq!(outcome.grid, "");
    }

    #[test]
    fn test_bad_cell_reference() {
        let script = parse_script(r#"{"events": [{"type": "click", "cell": "1A"}]}"#).unwrap();
        let err = run(&script, &Settings::default(), &Keymap::default()).err();
        assert_eq!(err.map(|e| e.code), Some(crate::exit_codes::EXIT_USAGE));
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let script = parse_script(r#"{"rows": 100000, "columns": 100000, "events": []}"#).unwrap();
        let err = run(&script, &Settings::default(), &Keymap::default()).err();
        assert_eq!(err.as_ref().map(|e| e.code), Some(crate::exit_codes::EXIT_USAGE));
        assert!(err.and_then(|e| e.hint).is_some());

        let overflow = Script {
            rows: Some(usize::MAX),
            columns: Some(2),
            data: None,
            events: Vec::new(),
        };
        assert!(run(&overflow, &Settings::default(), &Keymap::default()).is_err());
    }

    #[test]
    fn test_default_size_from_settings() {
        let script = parse_script(r#"{"events": []}"#).unwrap();
        let settings = Settings {
            default_rows: 2,
            default_columns: 3,
            ..Settings::default()
        };
        let outcome = run(&script, &settings, &Keymap::default()).unwrap();
        assert_eq!((outcome.summary.rows, outcome.summary.columns), (2, 3));
        assert_eq!(outcome.grid, "\t\t\n\t\t");
    }
}
