//! Grid coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A cell coordinate, both axes 0-based.
///
/// Ordering is row-major: `(0, 5) < (1, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub row: usize,
    pub column: usize,
}

/// One of the two axes of a [`Point`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Row,
    Column,
}

impl Field {
    /// The other axis.
    pub fn opposite(self) -> Self {
        match self {
            Field::Row => Field::Column,
            Field::Column => Field::Row,
        }
    }
}

impl Point {
    #[inline]
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Coordinate along `field`.
    #[inline]
    pub fn get(&self, field: Field) -> usize {
        match field {
            Field::Row => self.row,
            Field::Column => self.column,
        }
    }

    /// Same point with the `field` coordinate replaced.
    #[inline]
    pub fn with(self, field: Field, value: usize) -> Self {
        match field {
            Field::Row => Self { row: value, ..self },
            Field::Column => Self { column: value, ..self },
        }
    }

    /// Move by a signed delta. Returns `None` if either coordinate would go
    /// below zero.
    pub fn offset(self, d_row: isize, d_col: isize) -> Option<Self> {
        Some(Self {
            row: self.row.checked_add_signed(d_row)?,
            column: self.column.checked_add_signed(d_col)?,
        })
    }

    /// Move along a single axis.
    pub fn offset_field(self, field: Field, delta: isize) -> Option<Self> {
        let value = self.get(field).checked_add_signed(delta)?;
        Some(self.with(field, value))
    }

    /// Parse an A1-style reference (`B3`, `$AA$10`). Case-insensitive.
    pub fn from_a1(s: &str) -> Option<Self> {
        let s = s.to_ascii_uppercase();
        let mut chars = s.chars().peekable();

        if chars.peek() == Some(&'$') {
            chars.next();
        }

        let mut col_str = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_uppercase() {
                col_str.push(c);
                chars.next();
            } else {
                break;
            }
        }
        if col_str.is_empty() || col_str.len() > 3 {
            return None;
        }

        if chars.peek() == Some(&'$') {
            chars.next();
        }

        let row_str: String = chars.collect();
        if row_str.is_empty() || !row_str.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let row: usize = row_str.parse().ok()?;
        if row == 0 {
            return None;
        }

        // A=0, B=1, ..., Z=25, AA=26
        let column = col_str
            .chars()
            .fold(0usize, |acc, c| acc * 26 + (c as usize - 'A' as usize + 1))
            - 1;

        Some(Self::new(row - 1, column))
    }
}

impl From<(usize, usize)> for Point {
    fn from((row, column): (usize, usize)) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", col_to_letters(self.column), self.row + 1)
    }
}

/// Convert 0-based column index to letter(s): 0 -> A, 25 -> Z, 26 -> AA.
pub fn col_to_letters(col: usize) -> String {
    let mut result = String::new();
    let mut n = col + 1;
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_blocks_negative() {
        let p = Point::new(0, 3);
        assert_eq!(p.offset(-1, 0), None);
        assert_eq!(p.offset(0, -1), Some(Point::new(0, 2)));
        assert_eq!(p.offset(2, 1), Some(Point::new(2, 4)));
    }

    #[test]
    fn test_field_access() {
        let p = Point::new(4, 7);
        assert_eq!(p.get(Field::Row), 4);
        assert_eq!(p.get(Field::Column), 7);
        assert_eq!(p.with(Field::Row, 1), Point::new(1, 7));
        assert_eq!(p.offset_field(Field::Column, -7), Some(Point::new(4, 0)));
        assert_eq!(p.offset_field(Field::Column, -8), None);
        assert_eq!(Field::Row.opposite(), Field::Column);
    }

    #[test]
    fn test_col_to_letters() {
        assert_eq!(col_to_letters(0), "A");
        assert_eq!(col_to_letters(25), "Z");
        assert_eq!(col_to_letters(26), "AA");
        assert_eq!(col_to_letters(701), "ZZ");
        assert_eq!(col_to_letters(702), "AAA");
    }

    #[test]
    fn test_a1_round_trip() {
        assert_eq!(Point::from_a1("A1"), Some(Point::new(0, 0)));
        assert_eq!(Point::from_a1("b3"), Some(Point::new(2, 1)));
        assert_eq!(Point::from_a1("$AA$10"), Some(Point::new(9, 26)));
        assert_eq!(Point::new(9, 26).to_string(), "AA10");
    }

    #[test]
    fn test_a1_rejects_garbage() {
        assert_eq!(Point::from_a1("A0"), None);
        assert_eq!(Point::from_a1("12"), None);
        assert_eq!(Point::from_a1("SUM"), None);
        assert_eq!(Point::from_a1("A1B"), None);
        assert_eq!(Point::from_a1(""), None);
    }

    #[test]
    fn test_row_major_ordering() {
        assert!(Point::new(0, 5) < Point::new(1, 0));
        assert!(Point::new(1, 0) < Point::new(1, 1));
    }
}
