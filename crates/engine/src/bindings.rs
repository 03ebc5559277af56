//! Reference extraction for `set_cell_data` bindings.

use std::collections::BTreeSet;

use gridstate_core::Point;

use crate::cell::Cell;

/// Ranges larger than this are not expanded into bindings.
pub const MAX_BINDING_RANGE_CELLS: usize = 65_536;

/// Produces the points a cell's value depends on.
pub trait BindingExtractor<C> {
    fn references(&self, cell: &C) -> Vec<Point>;
}

impl<C, F> BindingExtractor<C> for F
where
    F: Fn(&C) -> Vec<Point>,
{
    fn references(&self, cell: &C) -> Vec<Point> {
        self(cell)
    }
}

/// Reads A1 references out of formula cells. Non-formula cells have none.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormulaReferences;

impl BindingExtractor<Cell> for FormulaReferences {
    fn references(&self, cell: &Cell) -> Vec<Point> {
        cell.value
            .formula_source()
            .map(extract_references)
            .unwrap_or_default()
    }
}

impl BindingExtractor<String> for FormulaReferences {
    fn references(&self, cell: &String) -> Vec<Point> {
        if cell.trim_start().starts_with('=') {
            extract_references(cell)
        } else {
            Vec::new()
        }
    }
}

/// Every cell referenced by `source`, deduplicated and row-major.
///
/// Handles `A1`, `$B$2`, `AA10` and ranges like `A1:B3`. Function names,
/// sheet prefixes and string literals are ignored.
pub fn extract_references(source: &str) -> Vec<Point> {
    let mut refs = BTreeSet::new();
    let mut chars = source.chars().peekable();
    // Start of a pending `X:` range.
    let mut range_start: Option<Point> = None;

    while let Some(&c) = chars.peek() {
        match c {
            '"' => {
                chars.next();
                for ch in chars.by_ref() {
                    if ch == '"' {
                        break;
                    }
                }
                range_start = None;
            }
            'A'..='Z' | 'a'..='z' | '$' => {
                let mut ident = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' || ch == '.' {
                        ident.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }

                // SUM( or Sheet1!
                if matches!(chars.peek(), Some('(') | Some('!')) {
                    range_start = None;
                    continue;
                }

                let Some(point) = Point::from_a1(&ident) else {
                    range_start = None;
                    continue;
                };

                match range_start.take() {
                    Some(start) => add_range(&mut refs, start, point),
                    None => {
                        if chars.peek() == Some(&':') {
                            chars.next();
                            range_start = Some(point);
                        } else {
                            refs.insert(point);
                        }
                    }
                }
            }
            _ => {
                chars.next();
                // A dangling `A1:` still references A1.
                if let Some(start) = range_start.take() {
                    refs.insert(start);
                }
            }
        }
    }

    if let Some(start) = range_start {
        refs.insert(start);
    }

    refs.into_iter().collect()
}

fn add_range(refs: &mut BTreeSet<Point>, a: Point, b: Point) {
    let rows = a.row.abs_diff(b.row) + 1;
    let columns = a.column.abs_diff(b.column) + 1;
    if rows.saturating_mul(columns) > MAX_BINDING_RANGE_CELLS {
        log::warn!(
            "range {}:{} spans {} cells, not tracking it as a binding",
            a,
            b,
            rows.saturating_mul(columns)
        );
        return;
    }
    for row in a.row.min(b.row)..=a.row.max(b.row) {
        for column in a.column.min(b.column)..=a.column.max(b.column) {
            refs.insert(Point::new(row, column));
        }
    }
}
