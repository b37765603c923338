use crate::point::Point;

/// Round a point to the nearest grid intersection
pub fn snap_to_grid(p: Point, spacing: f64) -> Point {
    if spacing <= 0.0 {
        return p;
    }
    Point::new(
        (p.x / spacing).round() * spacing,
        (p.y / spacing).round() * spacing,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_to_nearest_intersection() {
        assert_eq!(snap_to_grid(Point::new(9.0, 31.0), 20.0), Point::new(0.0, 40.0));
        assert_eq!(snap_to_grid(Point::new(-11.0, 10.0), 20.0), Point::new(-20.0, 20.0));
    }

    #[test]
    fn test_zero_spacing_is_identity() {
        let p = Point::new(3.3, 4.4);
        assert_eq!(snap_to_grid(p, 0.0), p);
    }
}
