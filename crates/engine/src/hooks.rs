//! Boundary to the display-value accessor and the formula engine.
//!
//! The reducer never interprets cell payloads. Clipboard text and formula
//! lookups go through a [`ValueAccessor`]; a failing accessor is logged and
//! read as [`Value::Empty`] so a bad cell can never abort an action.

use std::fmt;

use serde::Serialize;

use gridstate_core::{Matrix, Point};

use crate::cell::{format_number, Cell, CellValue};

/// A displayable value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Boolean(bool),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Boolean(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

/// A cell together with its position. `cell` is `None` for holes.
#[derive(Debug)]
pub struct CellDescriptor<'a, C> {
    pub point: Point,
    pub cell: Option<&'a C>,
}

impl<C> Clone for CellDescriptor<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for CellDescriptor<'_, C> {}

#[derive(Debug, Clone, PartialEq)]
pub struct AccessError {
    pub point: Point,
    pub message: String,
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot read value of {}: {}", self.point, self.message)
    }
}

impl std::error::Error for AccessError {}

/// Resolves the display value of a cell.
pub trait ValueAccessor<C> {
    fn value(&self, descriptor: CellDescriptor<'_, C>) -> Result<Value, AccessError>;
}

impl<C, F> ValueAccessor<C> for F
where
    F: Fn(CellDescriptor<'_, C>) -> Result<Value, AccessError>,
{
    fn value(&self, descriptor: CellDescriptor<'_, C>) -> Result<Value, AccessError> {
        self(descriptor)
    }
}

/// Reads the stored value as-is. Formulas come back as their source text;
/// evaluated results need an accessor backed by a formula engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAccessor;

impl ValueAccessor<Cell> for DefaultAccessor {
    fn value(&self, descriptor: CellDescriptor<'_, Cell>) -> Result<Value, AccessError> {
        Ok(match descriptor.cell.map(|cell| &cell.value) {
            None | Some(CellValue::Empty) => Value::Empty,
            Some(CellValue::Text(s)) => Value::Text(s.clone()),
            Some(CellValue::Number(n)) => Value::Number(*n),
            Some(CellValue::Boolean(b)) => Value::Boolean(*b),
            Some(CellValue::Formula(source)) => Value::Text(source.clone()),
        })
    }
}

impl ValueAccessor<String> for DefaultAccessor {
    fn value(&self, descriptor: CellDescriptor<'_, String>) -> Result<Value, AccessError> {
        Ok(match descriptor.cell {
            Some(s) if !s.is_empty() => Value::Text(s.clone()),
            _ => Value::Empty,
        })
    }
}

/// Resolve a value, swallowing accessor failures.
pub fn resolve_value<C, A>(accessor: &A, descriptor: CellDescriptor<'_, C>) -> Value
where
    A: ValueAccessor<C> + ?Sized,
{
    accessor.value(descriptor).unwrap_or_else(|err| {
        log::warn!("{}", err);
        Value::Empty
    })
}

/// Lookups a formula engine calls back into while evaluating.
///
/// Both read the live `data` handed in at call time; nothing is cached.
pub struct FormulaHooks<'a, A: ?Sized> {
    accessor: &'a A,
}

impl<'a, A: ?Sized> FormulaHooks<'a, A> {
    pub fn new(accessor: &'a A) -> Self {
        Self { accessor }
    }

    /// Value of a single cell.
    pub fn resolve_cell<C>(&self, data: &Matrix<C>, point: Point) -> Value
    where
        C: Clone,
        A: ValueAccessor<C>,
    {
        resolve_value(
            self.accessor,
            CellDescriptor {
                point,
                cell: data.get(point),
            },
        )
    }

    /// Values of every defined cell between two corners, row-major.
    pub fn resolve_range<C>(&self, data: &Matrix<C>, start: Point, end: Point) -> Vec<Value>
    where
        C: Clone,
        A: ValueAccessor<C>,
    {
        let origin = Point::new(start.row.min(end.row), start.column.min(end.column));
        data.slice(start, end)
            .iter()
            .map(|(offset, cell)| {
                let point = Point::new(origin.row + offset.row, origin.column + offset.column);
                resolve_value(
                    self.accessor,
                    CellDescriptor {
                        point,
                        cell: Some(cell),
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> Matrix<Cell> {
        Matrix::from_rows(vec![
            vec![Cell::from_input("1"), Cell::from_input("two")],
            vec![Cell::from_input("=A1*2"), Cell::from_input("TRUE")],
        ])
    }

    #[test]
    fn test_resolve_cell() {
        let hooks = FormulaHooks::new(&DefaultAccessor);
        let data = sheet();
        assert_eq!(hooks.resolve_cell(&data, Point::new(0, 0)), Value::Number(1.0));
        assert_eq!(hooks.resolve_cell(&data, Point::new(0, 1)), Value::Text("two".into()));
        assert_eq!(hooks.resolve_cell(&data, Point::new(9, 9)), Value::Empty);
    }

    #[test]
    fn test_resolve_range_skips_undefined() {
        let hooks = FormulaHooks::new(&DefaultAccessor);
        let data = sheet().unset(Point::new(0, 1));
        let values = hooks.resolve_range(&data, Point::new(1, 1), Point::new(0, 0));
        assert_eq!(
            values,
            vec![
                Value::Number(1.0),
                Value::Text("=A1*2".into()),
                Value::Boolean(true),
            ]
        );
    }

    #[test]
    fn test_accessor_failure_resolves_empty() {
        let failing = |d: CellDescriptor<'_, Cell>| -> Result<Value, AccessError> {
            if d.point.row == 1 {
                Err(AccessError {
                    point: d.point,
                    message: "boom".into(),
                })
            } else {
                DefaultAccessor.value(d)
            }
        };
        let hooks = FormulaHooks::new(&failing);
        let data = sheet();
        assert_eq!(hooks.resolve_cell(&data, Point::new(1, 0)), Value::Empty);
        assert_eq!(
            hooks.resolve_range(&data, Point::new(0, 0), Point::new(1, 0)),
            vec![Value::Number(1.0), Value::Empty]
        );
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Number(4.0).to_string(), "4");
        assert_eq!(Value::Empty.to_string(), "");
        assert_eq!(Value::Boolean(true).to_string(), "TRUE");
    }
}
