//! Immutable set of points, built on [`PointMap`].
//!
//! Selections and copy regions are always produced by [`PointSet::single`] or
//! [`PointSet::inclusive_range`], so in practice every set the editor holds is
//! an axis-aligned rectangle. `min`/`max` rely on that.

use std::fmt;

use crate::error::CoreError;
use crate::point::{Field, Point};
use crate::point_map::PointMap;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct PointSet(PointMap<()>);

/// Which sides of a point have no neighbour in the set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OnEdge {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl PointSet {
    pub fn new() -> Self {
        Self(PointMap::new())
    }

    /// A set holding exactly one point.
    pub fn single(point: Point) -> Self {
        Self::new().add(point)
    }

    /// Every point with row between `a.row` and `b.row` and column between
    /// `a.column` and `b.column`, both ends inclusive, in either order.
    pub fn inclusive_range(a: Point, b: Point) -> Self {
        let (start_row, end_row) = (a.row.min(b.row), a.row.max(b.row));
        let (start_col, end_col) = (a.column.min(b.column), a.column.max(b.column));
        (start_row..=end_row)
            .flat_map(|row| (start_col..=end_col).map(move |column| Point::new(row, column)))
            .collect()
    }

    pub fn add(&self, point: Point) -> Self {
        Self(self.0.set(point, ()))
    }

    pub fn remove(&self, point: Point) -> Self {
        Self(self.0.unset(point))
    }

    pub fn has(&self, point: Point) -> bool {
        self.0.has(point)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Points in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        self.0.points()
    }

    pub fn to_vec(&self) -> Vec<Point> {
        self.iter().collect()
    }

    pub fn map<F>(&self, f: F) -> Self
    where
        F: FnMut(Point) -> Point,
    {
        self.iter().map(f).collect()
    }

    pub fn filter<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(Point) -> bool,
    {
        Self(self.0.filter(|_, point| predicate(point)))
    }

    pub fn reduce<A, F>(&self, init: A, mut f: F) -> A
    where
        F: FnMut(A, Point) -> A,
    {
        self.iter().fold(init, |acc, point| f(acc, point))
    }

    /// Minimal row and minimal column of the set. For a rectangle this is its
    /// top-left corner.
    pub fn min(&self) -> Option<Point> {
        self.0.min_point()
    }

    /// Maximal row and maximal column of the set. For a rectangle this is its
    /// bottom-right corner.
    pub fn max(&self) -> Option<Point> {
        self.0.max_point()
    }

    pub fn on_edge(&self, point: Point) -> OnEdge {
        if !self.has(point) {
            return OnEdge::default();
        }

        let has_not = |d_row: isize, d_col: isize| match point.offset(d_row, d_col) {
            Some(neighbour) => !self.has(neighbour),
            None => true,
        };

        OnEdge {
            left: has_not(0, -1),
            right: has_not(0, 1),
            top: has_not(-1, 0),
            bottom: has_not(1, 0),
        }
    }

    /// Extreme value of `field`: the minimum when `delta` is negative, the
    /// maximum otherwise.
    pub fn get_edge_value(&self, field: Field, delta: isize) -> Result<usize, CoreError> {
        let values = self.iter().map(|point| point.get(field));
        let edge = if delta < 0 { values.min() } else { values.max() };
        edge.ok_or(CoreError::EmptySet {
            operation: "get_edge_value",
        })
    }

    /// Grow by one rank: every point on the edge gets a neighbour `delta`
    /// further along `field`. Neighbours below zero are not added.
    pub fn extend_edge(&self, field: Field, delta: isize) -> Result<Self, CoreError> {
        let edge = self.get_edge_value(field, delta)?;
        Ok(self
            .iter()
            .filter(|point| point.get(field) == edge)
            .filter_map(|point| point.offset_field(field, delta))
            .fold(self.clone(), |acc, point| acc.add(point)))
    }

    /// Shrink by one rank: drop every point on the edge.
    pub fn shrink_edge(&self, field: Field, delta: isize) -> Result<Self, CoreError> {
        let edge = self.get_edge_value(field, delta)?;
        Ok(self.filter(|point| point.get(field) != edge))
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

impl FromIterator<Point> for PointSet {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self(iter.into_iter().map(|point| (point, ())).collect())
    }
}

impl fmt::Debug for PointSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
