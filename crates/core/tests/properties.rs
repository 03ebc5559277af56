// Property-based tests for the persistent grid containers.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::BTreeMap;

use gridstate_core::{Field, Matrix, Point, PointMap, PointSet};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn arb_point() -> impl Strategy<Value = Point> {
    (0usize..40, 0usize..40).prop_map(|(row, column)| Point::new(row, column))
}

/// Points at least one step away from both axes so edges can grow either way.
fn arb_interior_point() -> impl Strategy<Value = Point> {
    (1usize..40, 1usize..40).prop_map(|(row, column)| Point::new(row, column))
}

fn arb_matrix() -> impl Strategy<Value = Matrix<i32>> {
    prop::collection::vec((arb_point(), any::<i32>()), 0..60)
        .prop_map(|cells| {
            cells
                .into_iter()
                .fold(Matrix::new(), |m, (point, value)| m.set(point, value))
        })
}

fn arb_field() -> impl Strategy<Value = Field> {
    prop_oneof![Just(Field::Row), Just(Field::Column)]
}

fn arb_delta() -> impl Strategy<Value = isize> {
    prop_oneof![Just(-1isize), Just(1isize)]
}

// ---------------------------------------------------------------------------
// Matrix
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn set_then_get_returns_value(m in arb_matrix(), p in arb_point(), v in any::<i32>()) {
        let next = m.set(p, v);
        prop_assert!(next.has(p));
        prop_assert_eq!(next.get(p), Some(&v));
    }

    #[test]
    fn unset_after_set_restricts_to_other_points(m in arb_matrix(), p in arb_point(), v in any::<i32>()) {
        let round_trip = m.set(p, v).unset(p);

        let expected: BTreeMap<Point, i32> = m
            .iter()
            .filter(|(point, _)| *point != p)
            .map(|(point, value)| (point, *value))
            .collect();
        let actual: BTreeMap<Point, i32> = round_trip.iter().map(|(point, value)| (point, *value)).collect();
        prop_assert_eq!(actual, expected);
        prop_assert!(round_trip.get(p).is_none());
    }

    #[test]
    fn size_tracks_bounding_box(m in arb_matrix()) {
        let size = m.size();
        let rows = m.iter().map(|(point, _)| point.row + 1).max().unwrap_or(0);
        let columns = m.iter().map(|(point, _)| point.column + 1).max().unwrap_or(0);
        prop_assert_eq!(size.rows, rows);
        prop_assert_eq!(size.columns, columns);
    }
}

// ---------------------------------------------------------------------------
// PointMap
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn point_map_is_persistent(entries in prop::collection::vec((arb_point(), any::<u8>()), 1..30), p in arb_point()) {
        let map: PointMap<u8> = entries.into_iter().collect();
        let before: Vec<(Point, u8)> = map.iter().map(|(point, v)| (point, *v)).collect();

        let _ = map.set(p, 0).unset(p);

        let after: Vec<(Point, u8)> = map.iter().map(|(point, v)| (point, *v)).collect();
        prop_assert_eq!(before, after);
    }
}

// ---------------------------------------------------------------------------
// PointSet
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn inclusive_range_bounds_and_size(a in arb_point(), b in arb_point()) {
        let set = PointSet::inclusive_range(a, b);
        prop_assert_eq!(set.min(), Some(Point::new(a.row.min(b.row), a.column.min(b.column))));
        prop_assert_eq!(set.max(), Some(Point::new(a.row.max(b.row), a.column.max(b.column))));
        prop_assert_eq!(
            set.len(),
            (a.row.abs_diff(b.row) + 1) * (a.column.abs_diff(b.column) + 1)
        );
    }

    #[test]
    fn extend_then_shrink_restores_set(
        a in arb_interior_point(),
        b in arb_interior_point(),
        field in arb_field(),
        delta in arb_delta(),
    ) {
        let set = PointSet::inclusive_range(a, b);
        let grown = set.extend_edge(field, delta).unwrap();
        prop_assert!(grown.len() > set.len());
        let restored = grown.shrink_edge(field, delta).unwrap();
        prop_assert_eq!(restored, set);
    }

    #[test]
    fn rectangles_stay_rectangles_under_edge_moves(
        a in arb_interior_point(),
        b in arb_interior_point(),
        field in arb_field(),
        delta in arb_delta(),
    ) {
        let set = PointSet::inclusive_range(a, b);
        let grown = set.extend_edge(field, delta).unwrap();
        let (min, max) = (grown.min().unwrap(), grown.max().unwrap());
        prop_assert_eq!(grown, PointSet::inclusive_range(min, max));
    }
}
