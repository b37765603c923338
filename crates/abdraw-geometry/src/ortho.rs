//! Orthogonal (elbow) path expansion.
//!
//! An ortho line stores only its logical waypoints. The drawn path is derived
//! on demand by inserting one bend between every pair of consecutive
//! waypoints that are not already axis-aligned.

use serde::{Deserialize, Serialize};

use crate::point::Point;

/// Pairs closer than this on either axis are treated as already aligned
pub const ALIGN_EPSILON: f64 = 0.5;

/// Which axis moves first between two consecutive waypoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Routing {
    /// Horizontal segment first, then vertical
    #[default]
    #[serde(rename = "h_first")]
    HorizontalFirst,
    /// Vertical segment first, then horizontal
    #[serde(rename = "v_first")]
    VerticalFirst,
}

impl Routing {
    pub fn flipped(self) -> Self {
        match self {
            Routing::HorizontalFirst => Routing::VerticalFirst,
            Routing::VerticalFirst => Routing::HorizontalFirst,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Routing::HorizontalFirst => "horizontal-first",
            Routing::VerticalFirst => "vertical-first",
        }
    }
}

/// Expand logical waypoints into the full corner sequence of an
/// axis-aligned path.
///
/// The result always starts and ends with the first and last waypoint.
/// Routing applies uniformly to every pair, so flipping it recomputes the
/// whole path from the same waypoints.
pub fn orthogonal_path(waypoints: &[Point], routing: Routing) -> Vec<Point> {
    debug_assert!(waypoints.len() >= 2, "orthogonal path needs two waypoints");
    let Some((&first, rest)) = waypoints.split_first() else {
        return Vec::new();
    };

    let mut path = Vec::with_capacity(waypoints.len() * 2);
    path.push(first);
    let mut prev = first;
    for &next in rest {
        let dx = (next.x - prev.x).abs();
        let dy = (next.y - prev.y).abs();
        if dx > ALIGN_EPSILON && dy > ALIGN_EPSILON {
            let bend = match routing {
                Routing::HorizontalFirst => Point::new(next.x, prev.y),
                Routing::VerticalFirst => Point::new(prev.x, next.y),
            };
            path.push(bend);
        }
        path.push(next);
        prev = next;
    }
    path
}

/// Number of drawn segments in an expanded path
pub fn segment_count(path: &[Point]) -> usize {
    path.len().saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_aligned_waypoints_need_no_bends() {
        let wps = [pt(0.0, 0.0), pt(50.0, 0.0), pt(50.0, 50.0)];
        let path = orthogonal_path(&wps, Routing::HorizontalFirst);
        assert_eq!(path, wps.to_vec());
        assert_eq!(path.iter().filter(|p| **p == pt(50.0, 0.0)).count(), 1);
        assert_eq!(segment_count(&path), 2);
    }

    #[test]
    fn test_horizontal_first_bend() {
        let path = orthogonal_path(&[pt(0.0, 0.0), pt(40.0, 30.0)], Routing::HorizontalFirst);
        assert_eq!(path, vec![pt(0.0, 0.0), pt(40.0, 0.0), pt(40.0, 30.0)]);
    }

    #[test]
    fn test_vertical_first_bend() {
        let path = orthogonal_path(&[pt(0.0, 0.0), pt(40.0, 30.0)], Routing::VerticalFirst);
        assert_eq!(path, vec![pt(0.0, 0.0), pt(0.0, 30.0), pt(40.0, 30.0)]);
    }

    #[test]
    fn test_near_aligned_pair_is_not_bent() {
        let path = orthogonal_path(&[pt(0.0, 0.0), pt(40.0, 0.4)], Routing::VerticalFirst);
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_every_segment_is_axis_aligned() {
        let wps = [pt(0.0, 0.0), pt(13.0, 27.0), pt(-8.0, 3.0), pt(90.0, 90.0)];
        for routing in [Routing::HorizontalFirst, Routing::VerticalFirst] {
            let path = orthogonal_path(&wps, routing);
            for w in path.windows(2) {
                assert!(w[0].x == w[1].x || w[0].y == w[1].y);
            }
        }
    }

    #[test]
    fn test_flip_is_an_involution() {
        assert_eq!(Routing::HorizontalFirst.flipped().flipped(), Routing::HorizontalFirst);
        assert_eq!(Routing::VerticalFirst.name(), "vertical-first");
    }
}
