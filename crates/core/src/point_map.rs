//! Persistent mapping from [`Point`] to arbitrary values.
//!
//! Stored as two levels of `im::OrdMap`: row -> (column -> value).
//!
//! # Invariants
//!
//! 1. **One entry per point.** The nested layout makes duplicates unrepresentable.
//! 2. **No empty rows.** A row map is removed as soon as its last column goes.
//! 3. **Path copying.** `set`/`unset` rebuild only the touched row and leaf; every
//!    other row is shared with the previous version.

use std::fmt;

use im::OrdMap;

use crate::point::Point;

pub struct PointMap<V> {
    rows: OrdMap<usize, OrdMap<usize, V>>,
}

impl<V: Clone> PointMap<V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self { rows: OrdMap::new() }
    }

    /// Build a map from `(point, value)` pairs. Later pairs win.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Point, V)>,
    {
        entries
            .into_iter()
            .fold(Self::new(), |acc, (point, value)| acc.set(point, value))
    }

    pub fn get(&self, point: Point) -> Option<&V> {
        self.rows.get(&point.row)?.get(&point.column)
    }

    pub fn has(&self, point: Point) -> bool {
        self.get(point).is_some()
    }

    /// Return a new map with `value` stored at `point`.
    pub fn set(&self, point: Point, value: V) -> Self {
        let row = self.rows.get(&point.row).cloned().unwrap_or_default();
        Self {
            rows: self.rows.update(point.row, row.update(point.column, value)),
        }
    }

    /// Return a new map without `point`. Unsetting an absent point returns a
    /// map sharing the same root.
    pub fn unset(&self, point: Point) -> Self {
        let Some(row) = self.rows.get(&point.row) else {
            return self.clone();
        };
        if !row.contains_key(&point.column) {
            return self.clone();
        }

        let row = row.without(&point.column);
        let rows = if row.is_empty() {
            self.rows.without(&point.row)
        } else {
            self.rows.update(point.row, row)
        };
        Self { rows }
    }

    /// Number of entries. Walks the row index.
    pub fn len(&self) -> usize {
        self.rows.values().map(|row| row.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Point, &V)> + '_ {
        self.rows.iter().flat_map(|(&row, columns)| {
            columns
                .iter()
                .map(move |(&column, value)| (Point::new(row, column), value))
        })
    }

    /// Points in row-major order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.iter().map(|(point, _)| point)
    }

    /// Transform every value, keeping keys.
    pub fn map<U, F>(&self, mut f: F) -> PointMap<U>
    where
        U: Clone,
        F: FnMut(&V, Point) -> U,
    {
        let mut rows = OrdMap::new();
        for (&row, columns) in self.rows.iter() {
            let mapped: OrdMap<usize, U> = columns
                .iter()
                .map(|(&column, value)| (column, f(value, Point::new(row, column))))
                .collect();
            rows.insert(row, mapped);
        }
        PointMap { rows }
    }

    /// Keep entries for which `predicate` holds. Rows that keep every entry
    /// are shared with `self`.
    pub fn filter<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&V, Point) -> bool,
    {
        let mut rows = OrdMap::new();
        for (&row, columns) in self.rows.iter() {
            let kept: OrdMap<usize, V> = columns
                .iter()
                .filter(|&(&column, value)| predicate(value, Point::new(row, column)))
                .map(|(&column, value)| (column, value.clone()))
                .collect();
            if kept.len() == columns.len() {
                rows.insert(row, columns.clone());
            } else if !kept.is_empty() {
                rows.insert(row, kept);
            }
        }
        Self { rows }
    }

    /// Fold entries in row-major order.
    pub fn reduce<A, F>(&self, init: A, mut f: F) -> A
    where
        F: FnMut(A, &V, Point) -> A,
    {
        self.iter().fold(init, |acc, (point, value)| f(acc, value, point))
    }

    /// Minimal row and, independently, minimal column across all entries.
    pub fn min_point(&self) -> Option<Point> {
        let &(row, _) = self.rows.get_min()?;
        let column = self
            .rows
            .values()
            .filter_map(|columns| columns.get_min().map(|(c, _)| *c))
            .min()?;
        Some(Point::new(row, column))
    }

    /// Maximal row and, independently, maximal column across all entries.
    pub fn max_point(&self) -> Option<Point> {
        let &(row, _) = self.rows.get_max()?;
        let column = self
            .rows
            .values()
            .filter_map(|columns| columns.get_max().map(|(c, _)| *c))
            .max()?;
        Some(Point::new(row, column))
    }

    /// True when both maps are the same version (no copy happened in between).
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.rows.ptr_eq(&other.rows)
    }
}

impl<V> Clone for PointMap<V>
where
    V: Clone,
{
    fn clone(&self) -> Self {
        Self {
            rows: self.rows.clone(),
        }
    }
}

impl<V: Clone> Default for PointMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + PartialEq> PartialEq for PointMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.iter().eq(other.iter())
    }
}

impl<V: Clone + Eq> Eq for PointMap<V> {}

impl<V: Clone + fmt::Debug> fmt::Debug for PointMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V: Clone> FromIterator<(Point, V)> for PointMap<V> {
    fn from_iter<I: IntoIterator<Item = (Point, V)>>(iter: I) -> Self {
        Self::from_entries(iter)
    }
}
