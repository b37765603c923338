use crate::point::Point;

/// Axis-aligned bounding box with `min <= max` on both axes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Normalize two arbitrary corners into a box
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Smallest box containing every point, `None` for an empty slice
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Bounds::from_corners(*first, *first);
        for p in rest {
            bounds.min.x = bounds.min.x.min(p.x);
            bounds.min.y = bounds.min.y.min(p.y);
            bounds.max.x = bounds.max.x.max(p.x);
            bounds.max.y = bounds.max.y.max(p.y);
        }
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        self.min.midpoint(self.max)
    }

    /// Corners in clockwise order starting top-left: TL, TR, BR, BL
    pub fn corners(&self) -> [Point; 4] {
        [
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ]
    }

    /// Inclusive containment, grown by `tolerance` on every side
    pub fn contains(&self, p: Point, tolerance: f64) -> bool {
        p.x >= self.min.x - tolerance
            && p.x <= self.max.x + tolerance
            && p.y >= self.min.y - tolerance
            && p.y <= self.max.y + tolerance
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Grow by `amount` on every side
    pub fn expand(&self, amount: f64) -> Bounds {
        Bounds {
            min: Point::new(self.min.x - amount, self.min.y - amount),
            max: Point::new(self.max.x + amount, self.max.y + amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_normalizes() {
        let b = Bounds::from_corners(Point::new(10.0, 0.0), Point::new(0.0, 5.0));
        assert_eq!(b.min, Point::new(0.0, 0.0));
        assert_eq!(b.max, Point::new(10.0, 5.0));
        assert_eq!(b.width(), 10.0);
        assert_eq!(b.height(), 5.0);
        assert_eq!(b.center(), Point::new(5.0, 2.5));
    }

    #[test]
    fn test_contains_with_tolerance() {
        let b = Bounds::from_corners(Point::ORIGIN, Point::new(10.0, 10.0));
        assert!(b.contains(Point::new(10.0, 10.0), 0.0));
        assert!(!b.contains(Point::new(12.0, 5.0), 1.0));
        assert!(b.contains(Point::new(12.0, 5.0), 2.0));
    }

    #[test]
    fn test_intersects_and_union() {
        let a = Bounds::from_corners(Point::ORIGIN, Point::new(10.0, 10.0));
        let b = Bounds::from_corners(Point::new(5.0, 5.0), Point::new(20.0, 20.0));
        let c = Bounds::from_corners(Point::new(30.0, 30.0), Point::new(40.0, 40.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert_eq!(a.union(&c).max, Point::new(40.0, 40.0));
    }

    #[test]
    fn test_from_points_empty() {
        assert!(Bounds::from_points(&[]).is_none());
    }
}
