//! Connection-point index.
//!
//! A read-only cache of every shape's connection points, rebuilt from the
//! document after each mutation and queried while the pointer moves.

use abdraw_geometry::Point;

use crate::document::{Document, ShapeId};

/// Default snap radius as a fraction of the grid spacing
pub const SNAP_RADIUS_FACTOR: f64 = 0.75;

/// Snap radius used when the configuration does not override it
pub fn default_snap_radius(grid_spacing: u32) -> f64 {
    f64::from(grid_spacing) * SNAP_RADIUS_FACTOR
}

/// A connection point on a particular shape
#[derive(Debug, Clone, PartialEq)]
pub struct SnapPoint {
    pub position: Point,
    pub shape_id: ShapeId,
    /// Index within the shape's connection points
    pub index: usize,
}

/// Connection points of every shape, in document z-order
#[derive(Debug, Clone, Default)]
pub struct SnapIndex {
    entries: Vec<(ShapeId, Vec<Point>)>,
}

impl SnapIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(doc: &Document) -> Self {
        let mut index = Self::new();
        index.rebuild(doc);
        index
    }

    /// Rebuild cache from document
    pub fn rebuild(&mut self, doc: &Document) {
        self.entries.clear();
        self.entries
            .extend(doc.iter().map(|shape| (shape.id.clone(), shape.snap_points())));
    }

    /// Connection points of one shape
    pub fn points_for(&self, id: &ShapeId) -> Option<&[Point]> {
        self.entries
            .iter()
            .find(|(shape_id, _)| shape_id == id)
            .map(|(_, points)| points.as_slice())
    }

    /// Every connection point, back-most shape first
    pub fn iter(&self) -> impl Iterator<Item = SnapPoint> + '_ {
        self.entries.iter().flat_map(|(shape_id, points)| {
            points.iter().enumerate().map(move |(index, &position)| SnapPoint {
                position,
                shape_id: shape_id.clone(),
                index,
            })
        })
    }

    /// Closest connection point within `radius` (inclusive), skipping the
    /// excluded shape.
    ///
    /// Equal distances resolve to the lowest z-order shape, then to the
    /// lowest point index.
    pub fn nearest_snap(
        &self,
        p: Point,
        exclude: Option<&ShapeId>,
        radius: f64,
    ) -> Option<SnapPoint> {
        let mut best: Option<(SnapPoint, f64)> = None;
        for snap in self.iter() {
            if Some(&snap.shape_id) == exclude {
                continue;
            }
            let d = snap.position.distance_to(p);
            if d > radius {
                continue;
            }
            if best.as_ref().is_none_or(|(_, best_d)| d < *best_d) {
                best = Some((snap, d));
            }
        }
        best.map(|(snap, _)| snap)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
