//! Sparse 2-D cell store.
//!
//! A slot is either a cell or a *hole*: a position that belongs to the grid
//! but holds nothing (what [`create_empty_matrix`] produces, and what
//! [`Matrix::slice`] yields for undefined source cells). The reported
//! [`Size`] is the bounding box of all slots, holes included, so it is always
//! derived from content: removing the last slot in a row or column shrinks it.

use std::fmt;

use crate::point::Point;
use crate::point_map::PointMap;

/// Bounding size: exclusive maximum row and column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub rows: usize,
    pub columns: usize,
}

impl Size {
    pub fn contains(&self, point: Point) -> bool {
        point.row < self.rows && point.column < self.columns
    }
}

pub struct Matrix<C> {
    slots: PointMap<Option<C>>,
    size: Size,
}

/// An all-hole matrix of the given size, used to seed a new sheet.
pub fn create_empty_matrix<C: Clone>(rows: usize, columns: usize) -> Matrix<C> {
    Matrix::create_empty(rows, columns)
}

impl<C: Clone> Matrix<C> {
    pub fn new() -> Self {
        Self {
            slots: PointMap::new(),
            size: Size::default(),
        }
    }

    pub fn create_empty(rows: usize, columns: usize) -> Self {
        let slots = (0..rows)
            .flat_map(|row| (0..columns).map(move |column| (Point::new(row, column), None)))
            .collect();
        Self {
            slots,
            size: Size { rows, columns },
        }
    }

    /// Build from dense rows. Short rows leave the remaining slots undefined.
    pub fn from_rows<R>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = C>,
    {
        let mut matrix = Self::new();
        for (row, cells) in rows.into_iter().enumerate() {
            for (column, cell) in cells.into_iter().enumerate() {
                matrix = matrix.set(Point::new(row, column), cell);
            }
        }
        matrix
    }

    /// The cell at `point`, or `None` for holes and undefined points.
    pub fn get(&self, point: Point) -> Option<&C> {
        self.slots.get(point)?.as_ref()
    }

    /// Whether `point` resolves inside the matrix bounds.
    pub fn has(&self, point: Point) -> bool {
        self.size.contains(point)
    }

    pub fn set(&self, point: Point, cell: C) -> Self {
        Self {
            slots: self.slots.set(point, Some(cell)),
            size: Size {
                rows: self.size.rows.max(point.row + 1),
                columns: self.size.columns.max(point.column + 1),
            },
        }
    }

    /// Remove the slot at `point` entirely. The size is recomputed when the
    /// removed slot sat on the outer boundary.
    pub fn unset(&self, point: Point) -> Self {
        if !self.slots.has(point) {
            return self.clone();
        }
        let slots = self.slots.unset(point);
        let on_boundary =
            point.row + 1 == self.size.rows || point.column + 1 == self.size.columns;
        let size = if on_boundary {
            bounding_size(&slots)
        } else {
            self.size
        };
        Self { slots, size }
    }

    /// Leave a hole at `point`. Unlike [`Matrix::unset`] the bounds never
    /// shrink.
    pub fn clear(&self, point: Point) -> Self {
        if !self.size.contains(point) {
            return self.clone();
        }
        Self {
            slots: self.slots.set(point, None),
            size: self.size,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Sub-rectangle between two corners (inclusive, either order), rebased to
    /// start at (0, 0). Undefined source cells become holes.
    pub fn slice(&self, start: Point, end: Point) -> Self {
        let (start_row, end_row) = (start.row.min(end.row), start.row.max(end.row));
        let (start_col, end_col) = (start.column.min(end.column), start.column.max(end.column));

        let slots = (start_row..=end_row)
            .flat_map(|row| (start_col..=end_col).map(move |column| Point::new(row, column)))
            .map(|point| {
                let target = Point::new(point.row - start_row, point.column - start_col);
                (target, self.get(point).cloned())
            })
            .collect();

        Self {
            slots,
            size: Size {
                rows: end_row - start_row + 1,
                columns: end_col - start_col + 1,
            },
        }
    }

    /// Map every slot, holes included. `f` receives `None` for a hole.
    pub fn map<U, F>(&self, mut f: F) -> Matrix<U>
    where
        U: Clone,
        F: FnMut(Option<&C>, Point) -> U,
    {
        Matrix {
            slots: self.slots.map(|slot, point| Some(f(slot.as_ref(), point))),
            size: self.size,
        }
    }

    /// Defined cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Point, &C)> + '_ {
        self.slots
            .iter()
            .filter_map(|(point, slot)| slot.as_ref().map(|cell| (point, cell)))
    }

    /// Defined cells flattened row-major. Holes are skipped.
    pub fn to_vec(&self) -> Vec<C> {
        self.iter().map(|(_, cell)| cell.clone()).collect()
    }

    /// Dense rows covering the whole bounding box.
    pub fn rows(&self) -> Vec<Vec<Option<&C>>> {
        (0..self.size.rows)
            .map(|row| {
                (0..self.size.columns)
                    .map(|column| self.get(Point::new(row, column)))
                    .collect()
            })
            .collect()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.slots.ptr_eq(&other.slots)
    }
}

impl<C: Clone + fmt::Display> Matrix<C> {
    /// Serialize as clipboard text: rows joined by `\n`, fields by `\t`,
    /// missing cells as empty fields.
    pub fn join(&self) -> String {
        self.rows()
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| cell.map(|c| c.to_string()).unwrap_or_default())
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Matrix<String> {
    /// Parse clipboard text (the inverse of [`Matrix::join`]). `\r\n` line
    /// endings are accepted.
    pub fn split(text: &str) -> Self {
        Self::from_rows(
            text.lines()
                .map(|line| line.split('\t').map(str::to_string).collect::<Vec<_>>()),
        )
    }
}

fn bounding_size<C: Clone>(slots: &PointMap<Option<C>>) -> Size {
    match slots.max_point() {
        Some(max) => Size {
            rows: max.row + 1,
            columns: max.column + 1,
        },
        None => Size::default(),
    }
}

impl<C: Clone> Clone for Matrix<C> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            size: self.size,
        }
    }
}

impl<C: Clone> Default for Matrix<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clone + PartialEq> PartialEq for Matrix<C> {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.slots == other.slots
    }
}

impl<C: Clone + fmt::Debug> fmt::Debug for Matrix<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("size", &self.size)
            .field("cells", &self.slots)
            .finish()
    }
}
