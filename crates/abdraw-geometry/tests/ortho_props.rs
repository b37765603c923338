use abdraw_geometry::{Point, Routing, orthogonal_path, segment_count};
use proptest::prelude::*;

fn waypoints() -> impl Strategy<Value = Vec<Point>> {
    prop::collection::vec((-500.0f64..500.0, -500.0f64..500.0), 2..8)
        .prop_map(|pts| pts.into_iter().map(Point::from).collect())
}

fn routing() -> impl Strategy<Value = Routing> {
    prop_oneof![Just(Routing::HorizontalFirst), Just(Routing::VerticalFirst)]
}

proptest! {
    #[test]
    fn expansion_is_deterministic(wps in waypoints(), r in routing()) {
        prop_assert_eq!(orthogonal_path(&wps, r), orthogonal_path(&wps, r));
    }

    #[test]
    fn flipping_twice_restores_the_path(wps in waypoints(), r in routing()) {
        let original = orthogonal_path(&wps, r);
        let restored = orthogonal_path(&wps, r.flipped().flipped());
        prop_assert_eq!(original, restored);
    }

    #[test]
    fn path_keeps_endpoints_and_waypoint_order(wps in waypoints(), r in routing()) {
        let path = orthogonal_path(&wps, r);
        prop_assert_eq!(path.first(), wps.first());
        prop_assert_eq!(path.last(), wps.last());

        // Every logical waypoint appears in order within the expanded path
        let mut cursor = path.iter();
        for wp in &wps {
            prop_assert!(cursor.any(|p| p == wp));
        }
    }

    #[test]
    fn at_most_one_bend_per_pair(wps in waypoints(), r in routing()) {
        let path = orthogonal_path(&wps, r);
        let pairs = wps.len() - 1;
        prop_assert!(segment_count(&path) >= pairs);
        prop_assert!(segment_count(&path) <= pairs * 2);
    }
}
