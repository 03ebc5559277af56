//! Clipboard text interchange.
//!
//! Copy and cut write the selection as tab/newline separated display values.
//! On paste the system clipboard text is compared with the last text written
//! here: a match pastes the structured `copied` snapshot, anything else is
//! external content and left to the embedder.

use gridstate_core::Point;

use crate::cell::CellBase;
use crate::hooks::{resolve_value, CellDescriptor, ValueAccessor};
use crate::state::State;

/// Clipboard text for the current selection, or `None` when nothing is
/// selected. Undefined cells become empty fields.
pub fn clip<C, A>(state: &State<C>, accessor: &A) -> Option<String>
where
    C: CellBase,
    A: ValueAccessor<C> + ?Sized,
{
    let start = state.selected.min()?;
    let end = state.selected.max()?;

    let values = state.data.slice(start, end).map(|cell, offset| {
        let point = Point::new(start.row + offset.row, start.column + offset.column);
        resolve_value(accessor, CellDescriptor { point, cell })
    });
    Some(values.join())
}

/// Normalize clipboard text for comparison (handles line ending differences)
pub fn normalize_clipboard_text(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n").trim().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteSource {
    /// The clipboard still holds what this grid wrote; paste `copied`.
    Internal,
    /// Someone else wrote the clipboard.
    External(String),
}

/// Remembers the last clipboard text this grid produced.
#[derive(Debug, Clone, Default)]
pub struct ClipboardTracker {
    clipped: Option<String>,
    normalize_line_endings: bool,
}

impl ClipboardTracker {
    pub fn new(normalize_line_endings: bool) -> Self {
        Self {
            clipped: None,
            normalize_line_endings,
        }
    }

    pub fn record(&mut self, text: String) {
        self.clipped = Some(text);
    }

    /// Forget the recorded text.
    pub fn unclip(&mut self) {
        self.clipped = None;
    }

    pub fn clipped(&self) -> Option<&str> {
        self.clipped.as_deref()
    }

    pub fn is_internal_paste(&self, system_text: &str) -> bool {
        let Some(clipped) = self.clipped.as_deref() else {
            return false;
        };
        if self.normalize_line_endings {
            normalize_clipboard_text(system_text) == normalize_clipboard_text(clipped)
        } else {
            system_text == clipped
        }
    }

    /// Decide where pasted `system_text` came from. External text clears the
    /// recorded text so a later paste of the old copy is not mistaken for ours.
    pub fn classify(&mut self, system_text: &str) -> PasteSource {
        if self.is_internal_paste(system_text) {
            PasteSource::Internal
        } else {
            self.unclip();
            PasteSource::External(system_text.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::hooks::{AccessError, DefaultAccessor, Value};
    use gridstate_core::{Matrix, PointSet};

    fn state() -> State<Cell> {
        let data = Matrix::from_rows(vec![
            vec![Cell::from_input("1"), Cell::from_input("x"), Cell::from_input("y")],
            vec![Cell::from_input("2"), Cell::from_input("=A1"), Cell::from_input("z")],
        ])
        .clear(Point::new(0, 2));
        State::new(data)
    }

    #[test]
    fn test_clip_selection() {
        let mut s = state();
        assert_eq!(clip(&s, &DefaultAccessor), None);

        s.selected = PointSet::inclusive_range(Point::new(0, 1), Point::new(1, 2));
        assert_eq!(clip(&s, &DefaultAccessor).as_deref(), Some("x\t\n=A1\tz"));
    }

    #[test]
    fn test_clip_uses_accessor_positions() {
        let mut s = state();
        s.selected = PointSet::inclusive_range(Point::new(1, 0), Point::new(1, 1));
        let coords = |d: CellDescriptor<'_, Cell>| -> Result<Value, AccessError> {
            Ok(Value::Text(d.point.to_string()))
        };
        assert_eq!(clip(&s, &coords).as_deref(), Some("A2\tB2"));
    }

    #[test]
    fn test_tracker_classify() {
        let mut tracker = ClipboardTracker::new(true);
        assert_eq!(tracker.classify("a"), PasteSource::External("a".into()));

        tracker.record("a\tb\nc\td".into());
        assert_eq!(tracker.classify("a\tb\r\nc\td\r\n"), PasteSource::Internal);
        assert_eq!(tracker.classify("other"), PasteSource::External("other".into()));
        // Unclipped after external content.
        assert_eq!(tracker.clipped(), None);
        assert!(!tracker.is_internal_paste("a\tb\nc\td"));
    }

    #[test]
    fn test_tracker_exact_compare() {
        let mut tracker = ClipboardTracker::new(false);
        tracker.record("a\nb".into());
        assert!(tracker.is_internal_paste("a\nb"));
        assert!(!tracker.is_internal_paste("a\r\nb"));
    }
}
