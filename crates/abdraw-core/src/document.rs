//! The diagram document - an ordered shape list plus grid settings.
//!
//! Sequence order is paint order: index 0 is drawn first (back-most), the
//! last shape is front-most. The document enforces id uniqueness and offers
//! the raw effects that commands invoke; it keeps no history of its own.

use std::collections::HashSet;
use std::str::FromStr;

use abdraw_geometry::{Bounds, Point};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DocumentError, EmptyShapeId};
use crate::shapes::Shape;

/// Smallest accepted grid spacing
pub const MIN_GRID_SPACING: u32 = 10;
/// Largest accepted grid spacing
pub const MAX_GRID_SPACING: u32 = 50;
/// Grid spacing of a fresh document
pub const DEFAULT_GRID_SPACING: u32 = 20;

/// Shape identifier.
///
/// Any non-empty string is accepted from a loaded document; shapes created
/// in a session get a fresh v4 UUID so pasted and loaded shapes never
/// collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(String);

impl ShapeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ShapeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ShapeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ShapeId {
    type Err = EmptyShapeId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(EmptyShapeId);
        }
        Ok(Self(s.to_string()))
    }
}

/// How the background grid is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridKind {
    #[default]
    Dot,
    Line,
}

impl GridKind {
    pub fn name(&self) -> &'static str {
        match self {
            GridKind::Dot => "dot",
            GridKind::Line => "line",
        }
    }

    pub fn next(self) -> Self {
        match self {
            GridKind::Dot => GridKind::Line,
            GridKind::Line => GridKind::Dot,
        }
    }
}

/// Grid configuration persisted with the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSettings {
    pub kind: GridKind,
    pub spacing: u32,
    pub snap: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            kind: GridKind::Dot,
            spacing: DEFAULT_GRID_SPACING,
            snap: true,
            visible: true,
        }
    }
}

impl GridSettings {
    /// Copy with the spacing clamped into the accepted range
    pub fn with_spacing(mut self, spacing: u32) -> Self {
        self.spacing = spacing.clamp(MIN_GRID_SPACING, MAX_GRID_SPACING);
        self
    }

    pub fn spacing_is_valid(&self) -> bool {
        (MIN_GRID_SPACING..=MAX_GRID_SPACING).contains(&self.spacing)
    }

    pub fn spacing_f64(&self) -> f64 {
        f64::from(self.spacing)
    }

    /// Apply grid snapping to a point when snapping is enabled
    pub fn snap(&self, p: Point) -> Point {
        if self.snap {
            abdraw_geometry::snap_to_grid(p, self.spacing_f64())
        } else {
            p
        }
    }
}

/// Ordered collection of shapes and the grid they are drawn on
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    shapes: Vec<Shape>,
    grid: GridSettings,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grid(grid: GridSettings) -> Self {
        Self {
            shapes: Vec::new(),
            grid,
        }
    }

    /// Build a document from shapes in z-order, rejecting duplicate ids
    pub fn from_shapes(
        shapes: Vec<Shape>,
        grid: GridSettings,
    ) -> Result<Self, DocumentError> {
        let mut seen = HashSet::with_capacity(shapes.len());
        for shape in &shapes {
            if !seen.insert(&shape.id) {
                return Err(DocumentError::DuplicateId {
                    id: shape.id.clone(),
                });
            }
        }
        Ok(Self { shapes, grid })
    }

    pub fn grid(&self) -> &GridSettings {
        &self.grid
    }

    pub fn set_grid(&mut self, grid: GridSettings) {
        self.grid = grid;
    }

    /// Shapes back-most first
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| &s.id == id)
    }

    pub fn contains(&self, id: &ShapeId) -> bool {
        self.index_of(id).is_some()
    }

    /// Z-order position of a shape
    pub fn index_of(&self, id: &ShapeId) -> Option<usize> {
        self.shapes.iter().position(|s| &s.id == id)
    }

    /// Append a shape as the front-most one
    pub fn insert(&mut self, shape: Shape) -> Result<(), DocumentError> {
        let index = self.shapes.len();
        self.insert_at(index, shape)
    }

    /// Insert at a z-order position (clamped to the end)
    pub fn insert_at(&mut self, index: usize, shape: Shape) -> Result<(), DocumentError> {
        if self.contains(&shape.id) {
            return Err(DocumentError::DuplicateId { id: shape.id });
        }
        let index = index.min(self.shapes.len());
        self.shapes.insert(index, shape);
        Ok(())
    }

    /// Remove a shape, returning it with the z-order position it occupied
    pub fn remove(&mut self, id: &ShapeId) -> Option<(usize, Shape)> {
        let index = self.index_of(id)?;
        Some((index, self.shapes.remove(index)))
    }

    /// Swap in a new value for the shape with the same id, returning the old one
    pub fn replace(&mut self, shape: Shape) -> Result<Shape, DocumentError> {
        let Some(slot) = self.shapes.iter_mut().find(|s| s.id == shape.id) else {
            return Err(DocumentError::NotFound { id: shape.id });
        };
        Ok(std::mem::replace(slot, shape))
    }

    /// Move a shape to the end of the sequence
    pub fn bring_to_front(&mut self, id: &ShapeId) -> bool {
        self.bring_to_front_many(std::slice::from_ref(id))
    }

    /// Move a shape to the start of the sequence
    pub fn send_to_back(&mut self, id: &ShapeId) -> bool {
        self.send_to_back_many(std::slice::from_ref(id))
    }

    /// Move several shapes to the front, keeping their relative order
    pub fn bring_to_front_many(&mut self, ids: &[ShapeId]) -> bool {
        let (mut picked, mut shapes) = self.partition_by_ids(ids);
        let moved = !picked.is_empty();
        shapes.append(&mut picked);
        self.shapes = shapes;
        moved
    }

    /// Move several shapes to the back, keeping their relative order
    pub fn send_to_back_many(&mut self, ids: &[ShapeId]) -> bool {
        let (mut shapes, mut rest) = self.partition_by_ids(ids);
        let moved = !shapes.is_empty();
        shapes.append(&mut rest);
        self.shapes = shapes;
        moved
    }

    /// Place freshly pasted shapes front-most
    pub fn reorder_after_paste(&mut self, pasted: &[ShapeId]) -> bool {
        self.bring_to_front_many(pasted)
    }

    fn partition_by_ids(&mut self, ids: &[ShapeId]) -> (Vec<Shape>, Vec<Shape>) {
        let wanted: HashSet<&ShapeId> = ids.iter().collect();
        std::mem::take(&mut self.shapes)
            .into_iter()
            .partition(|s| wanted.contains(&s.id))
    }

    /// Current z-order as ids, back-most first
    pub fn order(&self) -> Vec<ShapeId> {
        self.shapes.iter().map(|s| s.id.clone()).collect()
    }

    /// Rearrange shapes to match `order`, which must be a permutation of the
    /// current ids
    pub fn set_order(&mut self, order: &[ShapeId]) -> Result<(), DocumentError> {
        let invalid = || DocumentError::InvalidOrder {
            expected: self.shapes.len(),
            actual: order.len(),
        };
        if order.len() != self.shapes.len() {
            return Err(invalid());
        }
        let mut positions = Vec::with_capacity(order.len());
        let mut seen = HashSet::with_capacity(order.len());
        for id in order {
            if !seen.insert(id) {
                return Err(invalid());
            }
            positions.push(self.index_of(id).ok_or_else(invalid)?);
        }
        let mut slots: Vec<Option<Shape>> = std::mem::take(&mut self.shapes)
            .into_iter()
            .map(Some)
            .collect();
        self.shapes = positions
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect();
        Ok(())
    }

    /// Topmost shape under a point
    pub fn shape_at(&self, p: Point, tolerance: f64) -> Option<ShapeId> {
        self.shapes
            .iter()
            .rev()
            .find(|s| s.hit(p, tolerance))
            .map(|s| s.id.clone())
    }

    /// Shapes touching a rectangular region, in z-order
    pub fn shapes_in(&self, region: &Bounds) -> Vec<ShapeId> {
        self.shapes
            .iter()
            .filter(|s| s.intersects(region))
            .map(|s| s.id.clone())
            .collect()
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{ShapeKind, Style};

    fn rect(x: f64) -> Shape {
        Shape::new(
            ShapeKind::Rectangle {
                start: Point::new(x, 0.0),
                end: Point::new(x + 10.0, 10.0),
            },
            Style::default(),
        )
    }

    fn doc_with(n: usize) -> (Document, Vec<ShapeId>) {
        let mut doc = Document::new();
        let mut ids = Vec::new();
        for i in 0..n {
            let s = rect(i as f64 * 20.0);
            ids.push(s.id.clone());
            doc.insert(s).unwrap();
        }
        (doc, ids)
    }

    #[test]
    fn test_insert_rejects_duplicate_ids() {
        let mut doc = Document::new();
        let s = rect(0.0);
        doc.insert(s.clone()).unwrap();
        assert_eq!(
            doc.insert(s.clone()),
            Err(DocumentError::DuplicateId { id: s.id.clone() })
        );
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_remove_reports_index() {
        let (mut doc, ids) = doc_with(3);
        let (index, shape) = doc.remove(&ids[1]).unwrap();
        assert_eq!(index, 1);
        assert_eq!(shape.id, ids[1]);
        assert!(doc.remove(&ids[1]).is_none());
    }

    #[test]
    fn test_front_and_back() {
        let (mut doc, ids) = doc_with(3);
        assert!(doc.bring_to_front(&ids[0]));
        assert_eq!(doc.order(), [&ids[1], &ids[2], &ids[0]].map(Clone::clone));
        assert!(doc.send_to_back(&ids[2]));
        assert_eq!(doc.order(), [&ids[2], &ids[1], &ids[0]].map(Clone::clone));
        assert!(!doc.bring_to_front(&ShapeId::new()));
    }

    #[test]
    fn test_many_keeps_relative_order() {
        let (mut doc, ids) = doc_with(4);
        doc.reorder_after_paste(&[ids[2].clone(), ids[0].clone()]);
        assert_eq!(doc.order(), [&ids[1], &ids[3], &ids[0], &ids[2]].map(Clone::clone));
    }

    #[test]
    fn test_set_order_requires_permutation() {
        let (mut doc, ids) = doc_with(3);
        let pick = |picks: &[usize]| picks.iter().map(|&i| ids[i].clone()).collect::<Vec<_>>();
        assert!(doc.set_order(&pick(&[0, 1])).is_err());
        assert!(doc.set_order(&pick(&[0, 0, 1])).is_err());
        let mut stranger = pick(&[0, 1]);
        stranger.push(ShapeId::new());
        assert!(doc.set_order(&stranger).is_err());
        doc.set_order(&pick(&[2, 0, 1])).unwrap();
        assert_eq!(doc.order(), pick(&[2, 0, 1]));
    }

    #[test]
    fn test_shape_at_picks_topmost() {
        let mut doc = Document::new();
        let back = rect(0.0);
        let front = rect(5.0);
        let front_id = front.id.clone();
        doc.insert(back).unwrap();
        doc.insert(front).unwrap();
        assert_eq!(doc.shape_at(Point::new(7.0, 5.0), 0.0), Some(front_id));
        assert_eq!(doc.shape_at(Point::new(100.0, 100.0), 2.0), None);
    }

    #[test]
    fn test_free_form_ids() {
        let id: ShapeId = "rect-1".parse().unwrap();
        assert_eq!(id.as_str(), "rect-1");
        assert_eq!(id.to_string(), "rect-1");
        assert_eq!("  ".parse::<ShapeId>(), Err(EmptyShapeId));
        assert_ne!(ShapeId::new(), ShapeId::new());
    }

    #[test]
    fn test_grid_spacing_clamped() {
        let grid = GridSettings::default().with_spacing(400);
        assert_eq!(grid.spacing, MAX_GRID_SPACING);
        assert!(grid.spacing_is_valid());
        assert_eq!(grid.snap(Point::new(26.0, 74.0)), Point::new(50.0, 50.0));
    }
}
