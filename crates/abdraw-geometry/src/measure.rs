//! Distance, projection and containment tests.

use crate::bounds::Bounds;
use crate::point::Point;

const PARALLEL_EPSILON: f64 = 1e-12;

/// Samples used to seed the ellipse projection before refinement
const ELLIPSE_SAMPLES: usize = 64;
const ELLIPSE_REFINE_STEPS: usize = 40;

/// Closest point to `p` on the segment `a`-`b` (projection clamped to the segment)
pub fn nearest_point_on_segment(p: Point, a: Point, b: Point) -> Point {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq == 0.0 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a.lerp(b, t)
}

pub fn distance_point_to_segment(p: Point, a: Point, b: Point) -> f64 {
    p.distance_to(nearest_point_on_segment(p, a, b))
}

/// Closest point on an open polyline. A single point polyline returns that point.
pub fn nearest_point_on_polyline(p: Point, points: &[Point]) -> Option<Point> {
    match points {
        [] => None,
        [only] => Some(*only),
        _ => points
            .windows(2)
            .map(|w| nearest_point_on_segment(p, w[0], w[1]))
            .min_by(|a, b| p.distance_squared(*a).total_cmp(&p.distance_squared(*b))),
    }
}

pub fn distance_to_polyline(p: Point, points: &[Point]) -> f64 {
    nearest_point_on_polyline(p, points)
        .map(|q| p.distance_to(q))
        .unwrap_or(f64::INFINITY)
}

/// Even-odd point-in-polygon test over a closed vertex ring
pub fn point_in_polygon(p: Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let vi = vertices[i];
        let vj = vertices[j];
        if (vi.y > p.y) != (vj.y > p.y) {
            let x_cross = vj.x + (p.y - vj.y) * (vi.x - vj.x) / (vi.y - vj.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Whether `p` lies inside (or on) the axis-aligned ellipse
pub fn point_in_ellipse(p: Point, center: Point, rx: f64, ry: f64) -> bool {
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let nx = (p.x - center.x) / rx;
    let ny = (p.y - center.y) / ry;
    nx * nx + ny * ny <= 1.0
}

/// Closest point on the outline of an axis-aligned ellipse.
///
/// Exact for circles; ellipses are solved numerically by sampling the
/// parametric angle and refining around the best sample.
pub fn nearest_point_on_ellipse(p: Point, center: Point, rx: f64, ry: f64) -> Point {
    let rx = rx.abs();
    let ry = ry.abs();
    if rx == 0.0 || ry == 0.0 {
        let a = Point::new(center.x - rx, center.y - ry);
        let b = Point::new(center.x + rx, center.y + ry);
        return nearest_point_on_segment(p, a, b);
    }

    let at = |t: f64| Point::new(center.x + rx * t.cos(), center.y + ry * t.sin());

    if rx == ry {
        let d = p - center;
        let len = d.length();
        if len == 0.0 {
            return at(0.0);
        }
        return Point::new(center.x + d.x / len * rx, center.y + d.y / len * ry);
    }

    let step = std::f64::consts::TAU / ELLIPSE_SAMPLES as f64;
    let mut best_t = 0.0;
    let mut best_d = f64::INFINITY;
    for i in 0..ELLIPSE_SAMPLES {
        let t = i as f64 * step;
        let d = p.distance_squared(at(t));
        if d < best_d {
            best_d = d;
            best_t = t;
        }
    }

    // Ternary search inside the bracketing sample interval
    let mut lo = best_t - step;
    let mut hi = best_t + step;
    for _ in 0..ELLIPSE_REFINE_STEPS {
        let m1 = lo + (hi - lo) / 3.0;
        let m2 = hi - (hi - lo) / 3.0;
        if p.distance_squared(at(m1)) < p.distance_squared(at(m2)) {
            hi = m2;
        } else {
            lo = m1;
        }
    }
    at((lo + hi) / 2.0)
}

/// Intersection point of segments `a1`-`a2` and `b1`-`b2`.
///
/// Touching endpoints count as an intersection; parallel and collinear
/// segments report none.
pub fn segment_intersection(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Point> {
    let r = a2 - a1;
    let s = b2 - b1;
    let denom = r.cross(s);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }
    let qp = b1 - a1;
    let t = qp.cross(s) / denom;
    let u = qp.cross(r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a1.lerp(a2, t))
    } else {
        None
    }
}

/// Whether any part of segment `a`-`b` lies within `bounds`
pub fn segment_intersects_bounds(a: Point, b: Point, bounds: &Bounds) -> bool {
    if bounds.contains(a, 0.0) || bounds.contains(b, 0.0) {
        return true;
    }
    let [tl, tr, br, bl] = bounds.corners();
    [(tl, tr), (tr, br), (br, bl), (bl, tl)]
        .iter()
        .any(|&(c1, c2)| segment_intersection(a, b, c1, c2).is_some())
}
