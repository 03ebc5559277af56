//! Persistent grid containers.
//!
//! Everything in this crate is immutable: every "mutation" returns a new
//! value that shares unchanged rows with the one it was derived from.

pub mod error;
pub mod matrix;
pub mod point;
pub mod point_map;
pub mod point_set;

pub use error::CoreError;
pub use matrix::{create_empty_matrix, Matrix, Size};
pub use point::{col_to_letters, Field, Point};
pub use point_map::PointMap;
pub use point_set::{OnEdge, PointSet};
