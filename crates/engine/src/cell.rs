use std::fmt;

use serde::{Deserialize, Serialize};

/// What the state machine needs to know about a cell payload.
///
/// Everything else about a cell is opaque to the reducer.
pub trait CellBase: Clone + PartialEq {
    /// Read-only cells never enter edit mode.
    fn is_read_only(&self) -> bool {
        false
    }

    /// The same cell with its value emptied and every other attribute kept.
    fn cleared(&self) -> Self;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Boolean(bool),
    /// Formula source including the leading `=`.
    Formula(String),
}

impl CellValue {
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        if trimmed.starts_with('=') {
            return CellValue::Formula(trimmed.to_string());
        }

        if let Ok(num) = trimmed.parse::<f64>() {
            return CellValue::Number(num);
        }

        match trimmed.to_ascii_uppercase().as_str() {
            "TRUE" => CellValue::Boolean(true),
            "FALSE" => CellValue::Boolean(false),
            _ => CellValue::Text(trimmed.to_string()),
        }
    }

    pub fn raw_display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Boolean(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
            CellValue::Formula(source) => source.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn formula_source(&self) -> Option<&str> {
        match self {
            CellValue::Formula(source) => Some(source),
            _ => None,
        }
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Custom viewer/editor names, resolved by the rendering layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RendererOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub value: CellValue,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<RendererOverride>,
}

impl Cell {
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            read_only: false,
            renderer: None,
        }
    }

    pub fn from_input(input: &str) -> Self {
        Self::new(CellValue::from_input(input))
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn with_renderer(mut self, renderer: RendererOverride) -> Self {
        self.renderer = Some(renderer);
        self
    }
}

impl CellBase for Cell {
    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn cleared(&self) -> Self {
        Self {
            value: CellValue::Empty,
            ..self.clone()
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value.raw_display())
    }
}

/// Plain text cells, handy for grids that carry no attributes.
impl CellBase for String {
    fn cleared(&self) -> Self {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_input() {
        assert_eq!(CellValue::from_input("  "), CellValue::Empty);
        assert_eq!(CellValue::from_input("42"), CellValue::Number(42.0));
        assert_eq!(CellValue::from_input("true"), CellValue::Boolean(true));
        assert_eq!(CellValue::from_input("=A1+1"), CellValue::Formula("=A1+1".into()));
        assert_eq!(CellValue::from_input(" hi "), CellValue::Text("hi".into()));
    }

    #[test]
    fn test_raw_display() {
        assert_eq!(CellValue::Number(3.0).raw_display(), "3");
        assert_eq!(CellValue::Number(2.5).raw_display(), "2.5");
        assert_eq!(CellValue::Boolean(false).raw_display(), "FALSE");
        assert_eq!(Cell::from_input("=SUM(A1:A3)").to_string(), "=SUM(A1:A3)");
    }

    #[test]
    fn test_cleared_keeps_attributes() {
        let cell = Cell::from_input("hello").read_only().with_renderer(RendererOverride {
            viewer: Some("badge".into()),
            editor: None,
        });
        let cleared = cell.cleared();
        assert!(cleared.value.is_empty());
        assert!(cleared.is_read_only());
        assert_eq!(cleared.renderer, cell.renderer);
    }

    #[test]
    fn test_cell_serde() {
        let cell = Cell::from_input("7");
        let json = serde_json::to_string(&cell).unwrap();
        assert_eq!(json, r#"{"value":{"type":"number","value":7.0}}"#);
        let back: Cell = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cell);
    }
}
