//! Draggable handles and handle-driven resizing.

use abdraw_geometry::{Bounds, Point};

use crate::shapes::{Endpoint, Shape, ShapeKind};

/// Smallest circle radius a resize can produce
pub const MIN_CIRCLE_RADIUS: f64 = 5.0;

/// Corner of a normalized bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    /// Position in [`Bounds::corners`] order
    fn index(self) -> usize {
        match self {
            Corner::TopLeft => 0,
            Corner::TopRight => 1,
            Corner::BottomRight => 2,
            Corner::BottomLeft => 3,
        }
    }

    pub fn opposite(self) -> Corner {
        Corner::ALL[(self.index() + 2) % 4]
    }

    pub fn of(self, bounds: &Bounds) -> Point {
        bounds.corners()[self.index()]
    }
}

/// What a handle controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Corner(Corner),
    Endpoint(Endpoint),
    /// Interior waypoint of an ortho shape, by waypoint index
    Waypoint(usize),
    Label,
}

/// A handle and where it currently sits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub kind: HandleKind,
    pub position: Point,
}

impl Shape {
    /// Handles in a fixed order: geometry handles first, the label last
    pub fn handles(&self) -> Vec<Handle> {
        let mut handles = Vec::new();
        match &self.kind {
            ShapeKind::Rectangle { .. }
            | ShapeKind::Square { .. }
            | ShapeKind::Circle { .. }
            | ShapeKind::Ellipse { .. }
            | ShapeKind::Triangle { .. } => {
                let bounds = self.bounds();
                handles.extend(Corner::ALL.iter().map(|&c| Handle {
                    kind: HandleKind::Corner(c),
                    position: c.of(&bounds),
                }));
            }
            ShapeKind::Line { start, end } | ShapeKind::Arrow { start, end } => {
                handles.push(Handle {
                    kind: HandleKind::Endpoint(Endpoint::Start),
                    position: *start,
                });
                handles.push(Handle {
                    kind: HandleKind::Endpoint(Endpoint::End),
                    position: *end,
                });
            }
            ShapeKind::OrthoLine { waypoints, .. } | ShapeKind::OrthoArrow { waypoints, .. } => {
                let last = waypoints.len().saturating_sub(1);
                for (i, wp) in waypoints.iter().enumerate() {
                    let kind = if i == 0 {
                        HandleKind::Endpoint(Endpoint::Start)
                    } else if i == last {
                        HandleKind::Endpoint(Endpoint::End)
                    } else {
                        HandleKind::Waypoint(i)
                    };
                    handles.push(Handle {
                        kind,
                        position: *wp,
                    });
                }
            }
            ShapeKind::Text { .. } => {}
        }
        if let Some(position) = self.label_position() {
            handles.push(Handle {
                kind: HandleKind::Label,
                position,
            });
        }
        handles
    }

    /// Closest handle within `radius` of `p`; ties go to the earlier handle
    pub fn handle_at(&self, p: Point, radius: f64) -> Option<HandleKind> {
        let mut best: Option<(HandleKind, f64)> = None;
        for handle in self.handles() {
            let d = handle.position.distance_to(p);
            if d <= radius && best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((handle.kind, d));
            }
        }
        best.map(|(kind, _)| kind)
    }

    /// Move one handle to `p` and recompute the dependent geometry.
    ///
    /// Handles the shape does not expose, and drags that would collapse an
    /// area shape, return an unchanged copy.
    pub fn resize(&self, handle: HandleKind, p: Point) -> Shape {
        let resized = match handle {
            HandleKind::Label => {
                let Some(label) = &self.label else {
                    return self.clone();
                };
                let mut shape = self.clone();
                shape.label = Some(crate::shapes::Label {
                    text: label.text.clone(),
                    offset: p - self.label_anchor(),
                });
                return shape;
            }
            HandleKind::Corner(corner) => self.resize_corner(corner, p),
            HandleKind::Endpoint(which) => {
                if !self.is_line_like() {
                    return self.clone();
                }
                Some(self.with_endpoint(which, p))
            }
            HandleKind::Waypoint(index) => self.move_waypoint(index, p),
        };
        match resized {
            Some(shape) if shape.is_well_formed() => shape,
            _ => self.clone(),
        }
    }

    fn resize_corner(&self, corner: Corner, p: Point) -> Option<Shape> {
        let bounds = self.bounds();
        let anchor = corner.opposite().of(&bounds);
        let kind = match &self.kind {
            ShapeKind::Rectangle { .. } | ShapeKind::Ellipse { .. } | ShapeKind::Triangle { .. } => {
                self.kind.with_area_corners(anchor, p)
            }
            ShapeKind::Square { .. } => {
                let dx = p.x - anchor.x;
                let dy = p.y - anchor.y;
                let side = dx.abs().max(dy.abs());
                let corner = Point::new(anchor.x + side * dx.signum(), anchor.y + side * dy.signum());
                ShapeKind::Square {
                    start: anchor,
                    end: corner,
                }
            }
            ShapeKind::Circle { .. } => {
                let center = bounds.center();
                let radius = (p.x - center.x)
                    .abs()
                    .max((p.y - center.y).abs())
                    .max(MIN_CIRCLE_RADIUS);
                ShapeKind::Circle {
                    start: Point::new(center.x - radius, center.y - radius),
                    end: Point::new(center.x + radius, center.y + radius),
                }
            }
            _ => return None,
        };
        Some(Shape {
            kind,
            ..self.clone()
        })
    }

    fn move_waypoint(&self, index: usize, p: Point) -> Option<Shape> {
        let mut shape = self.clone();
        match &mut shape.kind {
            ShapeKind::OrthoLine { waypoints, .. } | ShapeKind::OrthoArrow { waypoints, .. } => {
                // Endpoints are addressed through HandleKind::Endpoint
                if index == 0 || index + 1 >= waypoints.len() {
                    return None;
                }
                waypoints[index] = p;
                Some(shape)
            }
            _ => None,
        }
    }
}
