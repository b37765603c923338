//! Shape types for abDraw.
//!
//! [`ShapeKind`] is the closed set of drawable variants and their geometry.
//! [`Shape`] wraps a kind with identity, style, an optional label and any
//! connections of its endpoints. Every operation returns a new value and
//! leaves the receiver untouched, so callers can keep before/after snapshots.

use abdraw_geometry::{
    Bounds, Point, Routing, distance_point_to_segment, distance_to_polyline,
    nearest_point_on_ellipse, nearest_point_on_polyline, nearest_point_on_segment,
    orthogonal_path, point_in_ellipse, point_in_polygon, segment_intersects_bounds,
};
use serde::{Deserialize, Serialize};

use crate::document::ShapeId;

/// Width of one character relative to the font size
const CHAR_WIDTH_FACTOR: f64 = 0.6;
/// Line height relative to the font size
const LINE_HEIGHT_FACTOR: f64 = 1.2;
/// Distance of a fresh label from its anchor
pub const DEFAULT_LABEL_DISTANCE: f64 = 20.0;
/// Relative tolerance for the width == height check on squares and circles
pub const SQUARE_TOLERANCE: f64 = 1e-6;

/// A toolkit color: a color name or `#rrggbb`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("black")
    }
}

impl From<&str> for Color {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stroke and fill of a shape. `fill: None` is transparent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub stroke: Color,
    pub fill: Option<Color>,
    pub width: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke: Color::default(),
            fill: None,
            width: 2.0,
        }
    }
}

/// Font used by text shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: "Arial".to_string(),
            size: 12.0,
            bold: false,
            italic: false,
        }
    }
}

/// Text attached to a shape, positioned relative to the shape's anchor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    pub offset: Point,
}

/// One end of a line-like shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Start,
    End,
}

/// A line endpoint locked onto a connection point of another shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub endpoint: Endpoint,
    pub target: ShapeId,
    /// Index into the target's connection points
    pub point: usize,
}

/// Variant tag, also the persisted `type` name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeType {
    Line,
    Arrow,
    Rectangle,
    Square,
    Circle,
    Ellipse,
    Triangle,
    Text,
    OrthoLine,
    OrthoArrow,
}

impl ShapeType {
    pub const ALL: [ShapeType; 10] = [
        ShapeType::Line,
        ShapeType::Arrow,
        ShapeType::Rectangle,
        ShapeType::Square,
        ShapeType::Circle,
        ShapeType::Ellipse,
        ShapeType::Triangle,
        ShapeType::Text,
        ShapeType::OrthoLine,
        ShapeType::OrthoArrow,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShapeType::Line => "line",
            ShapeType::Arrow => "arrow",
            ShapeType::Rectangle => "rectangle",
            ShapeType::Square => "square",
            ShapeType::Circle => "circle",
            ShapeType::Ellipse => "ellipse",
            ShapeType::Triangle => "triangle",
            ShapeType::Text => "text",
            ShapeType::OrthoLine => "ortholine",
            ShapeType::OrthoArrow => "orthoarrow",
        }
    }

    /// Lines, arrows and their orthogonal forms
    pub fn is_line_like(&self) -> bool {
        matches!(
            self,
            ShapeType::Line | ShapeType::Arrow | ShapeType::OrthoLine | ShapeType::OrthoArrow
        )
    }

    /// Shapes defined by a bounding box
    pub fn is_area(&self) -> bool {
        matches!(
            self,
            ShapeType::Rectangle
                | ShapeType::Square
                | ShapeType::Circle
                | ShapeType::Ellipse
                | ShapeType::Triangle
        )
    }
}

impl std::fmt::Display for ShapeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Geometry of each shape variant
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Line { start: Point, end: Point },
    Arrow { start: Point, end: Point },
    /// Area shapes store two opposite corners of their bounding box
    Rectangle { start: Point, end: Point },
    Square { start: Point, end: Point },
    Circle { start: Point, end: Point },
    Ellipse { start: Point, end: Point },
    /// Apex at the top-center of the box, base along the bottom edge
    Triangle { start: Point, end: Point },
    /// Anchored at the top-left of the first line of text
    Text {
        anchor: Point,
        content: String,
        font: Font,
    },
    /// Logical waypoints only; bends are derived with [`orthogonal_path`]
    OrthoLine { waypoints: Vec<Point>, routing: Routing },
    OrthoArrow { waypoints: Vec<Point>, routing: Routing },
}

impl ShapeKind {
    pub fn shape_type(&self) -> ShapeType {
        match self {
            ShapeKind::Line { .. } => ShapeType::Line,
            ShapeKind::Arrow { .. } => ShapeType::Arrow,
            ShapeKind::Rectangle { .. } => ShapeType::Rectangle,
            ShapeKind::Square { .. } => ShapeType::Square,
            ShapeKind::Circle { .. } => ShapeType::Circle,
            ShapeKind::Ellipse { .. } => ShapeType::Ellipse,
            ShapeKind::Triangle { .. } => ShapeType::Triangle,
            ShapeKind::Text { .. } => ShapeType::Text,
            ShapeKind::OrthoLine { .. } => ShapeType::OrthoLine,
            ShapeKind::OrthoArrow { .. } => ShapeType::OrthoArrow,
        }
    }

    /// Build an area shape of the given type from two corners
    pub fn area(shape_type: ShapeType, start: Point, end: Point) -> Option<Self> {
        let kind = match shape_type {
            ShapeType::Rectangle => ShapeKind::Rectangle { start, end },
            ShapeType::Square => ShapeKind::Square { start, end },
            ShapeType::Circle => ShapeKind::Circle { start, end },
            ShapeType::Ellipse => ShapeKind::Ellipse { start, end },
            ShapeType::Triangle => ShapeKind::Triangle { start, end },
            _ => return None,
        };
        Some(kind)
    }

    /// The two box corners of an area shape
    pub fn area_corners(&self) -> Option<(Point, Point)> {
        match self {
            ShapeKind::Rectangle { start, end }
            | ShapeKind::Square { start, end }
            | ShapeKind::Circle { start, end }
            | ShapeKind::Ellipse { start, end }
            | ShapeKind::Triangle { start, end } => Some((*start, *end)),
            _ => None,
        }
    }

    /// Same variant with new box corners; other variants are returned unchanged
    pub fn with_area_corners(&self, a: Point, b: Point) -> Self {
        match ShapeKind::area(self.shape_type(), a, b) {
            Some(kind) => kind,
            None => self.clone(),
        }
    }

    /// Translate every geometric point by `delta`
    pub fn translated(&self, delta: Point) -> Self {
        let shift = |p: &Point| *p + delta;
        match self {
            ShapeKind::Line { start, end } => ShapeKind::Line {
                start: shift(start),
                end: shift(end),
            },
            ShapeKind::Arrow { start, end } => ShapeKind::Arrow {
                start: shift(start),
                end: shift(end),
            },
            ShapeKind::Rectangle { .. }
            | ShapeKind::Square { .. }
            | ShapeKind::Circle { .. }
            | ShapeKind::Ellipse { .. }
            | ShapeKind::Triangle { .. } => match self.area_corners() {
                Some((a, b)) => self.with_area_corners(shift(&a), shift(&b)),
                None => self.clone(),
            },
            ShapeKind::Text {
                anchor,
                content,
                font,
            } => ShapeKind::Text {
                anchor: shift(anchor),
                content: content.clone(),
                font: font.clone(),
            },
            ShapeKind::OrthoLine { waypoints, routing } => ShapeKind::OrthoLine {
                waypoints: waypoints.iter().map(shift).collect(),
                routing: *routing,
            },
            ShapeKind::OrthoArrow { waypoints, routing } => ShapeKind::OrthoArrow {
                waypoints: waypoints.iter().map(shift).collect(),
                routing: *routing,
            },
        }
    }

    /// Every stored point, in storage order
    pub fn points(&self) -> Vec<Point> {
        match self {
            ShapeKind::Line { start, end } | ShapeKind::Arrow { start, end } => vec![*start, *end],
            ShapeKind::Rectangle { start, end }
            | ShapeKind::Square { start, end }
            | ShapeKind::Circle { start, end }
            | ShapeKind::Ellipse { start, end }
            | ShapeKind::Triangle { start, end } => vec![*start, *end],
            ShapeKind::Text { anchor, .. } => vec![*anchor],
            ShapeKind::OrthoLine { waypoints, .. } | ShapeKind::OrthoArrow { waypoints, .. } => {
                waypoints.clone()
            }
        }
    }
}

/// Vertices of the triangle inscribed in a box: apex, bottom-left, bottom-right
pub fn triangle_vertices(bounds: &Bounds) -> [Point; 3] {
    [
        Point::new(bounds.center().x, bounds.min.y),
        Point::new(bounds.min.x, bounds.max.y),
        bounds.max,
    ]
}

/// A shape in a document
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub style: Style,
    pub label: Option<Label>,
    /// Only meaningful on line-like shapes
    pub connections: Vec<Connection>,
}

impl Shape {
    /// A new shape with a fresh id
    pub fn new(kind: ShapeKind, style: Style) -> Self {
        Self {
            id: ShapeId::new(),
            kind,
            style,
            label: None,
            connections: Vec::new(),
        }
    }

    pub fn shape_type(&self) -> ShapeType {
        self.kind.shape_type()
    }

    pub fn is_line_like(&self) -> bool {
        self.shape_type().is_line_like()
    }

    pub fn is_area(&self) -> bool {
        self.shape_type().is_area()
    }

    /// Text shapes carry their own content and cannot have a label
    pub fn supports_label(&self) -> bool {
        !matches!(self.kind, ShapeKind::Text { .. })
    }

    /// Copy with the given label text at the default offset, or with the
    /// label removed when `text` is empty. The current offset is kept when
    /// a label already exists.
    pub fn with_label_text(&self, text: &str) -> Shape {
        let mut shape = self.clone();
        if text.is_empty() || !self.supports_label() {
            shape.label = None;
            return shape;
        }
        let offset = self
            .label
            .as_ref()
            .map(|l| l.offset)
            .unwrap_or_else(|| self.default_label_offset());
        shape.label = Some(Label {
            text: text.to_string(),
            offset,
        });
        shape
    }

    /// Axis-aligned bounding box of the drawn geometry
    pub fn bounds(&self) -> Bounds {
        match &self.kind {
            ShapeKind::Line { start, end } | ShapeKind::Arrow { start, end } => {
                Bounds::from_corners(*start, *end)
            }
            ShapeKind::Rectangle { start, end }
            | ShapeKind::Square { start, end }
            | ShapeKind::Circle { start, end }
            | ShapeKind::Ellipse { start, end }
            | ShapeKind::Triangle { start, end } => Bounds::from_corners(*start, *end),
            ShapeKind::Text {
                anchor,
                content,
                font,
            } => {
                let (w, h) = text_extent(content, font.size);
                Bounds::from_corners(*anchor, Point::new(anchor.x + w, anchor.y + h))
            }
            ShapeKind::OrthoLine { .. } | ShapeKind::OrthoArrow { .. } => {
                let path = self.path();
                Bounds::from_points(&path).unwrap_or_else(|| Bounds::from_corners(Point::ORIGIN, Point::ORIGIN))
            }
        }
    }

    /// Drawn stroke as a vertex list. Closed outlines repeat the first
    /// vertex at the end.
    pub fn path(&self) -> Vec<Point> {
        match &self.kind {
            ShapeKind::Line { start, end } | ShapeKind::Arrow { start, end } => vec![*start, *end],
            ShapeKind::OrthoLine { waypoints, routing }
            | ShapeKind::OrthoArrow { waypoints, routing } => orthogonal_path(waypoints, *routing),
            ShapeKind::Triangle { .. } => {
                let [a, b, c] = triangle_vertices(&self.bounds());
                vec![a, b, c, a]
            }
            ShapeKind::Rectangle { .. }
            | ShapeKind::Square { .. }
            | ShapeKind::Circle { .. }
            | ShapeKind::Ellipse { .. }
            | ShapeKind::Text { .. } => {
                let [a, b, c, d] = self.bounds().corners();
                vec![a, b, c, d, a]
            }
        }
    }

    /// Hit test: fill-hit for closed shapes, stroke-hit within `tolerance`
    /// for open ones
    pub fn hit(&self, p: Point, tolerance: f64) -> bool {
        let stroke_reach = tolerance + self.style.width / 2.0;
        match &self.kind {
            ShapeKind::Line { start, end } | ShapeKind::Arrow { start, end } => {
                distance_point_to_segment(p, *start, *end) <= stroke_reach
            }
            ShapeKind::OrthoLine { .. } | ShapeKind::OrthoArrow { .. } => {
                distance_to_polyline(p, &self.path()) <= stroke_reach
            }
            ShapeKind::Rectangle { .. } | ShapeKind::Square { .. } | ShapeKind::Text { .. } => {
                self.bounds().contains(p, tolerance)
            }
            ShapeKind::Circle { .. } | ShapeKind::Ellipse { .. } => {
                let b = self.bounds();
                point_in_ellipse(
                    p,
                    b.center(),
                    b.width() / 2.0 + tolerance,
                    b.height() / 2.0 + tolerance,
                )
            }
            ShapeKind::Triangle { .. } => {
                let vertices = triangle_vertices(&self.bounds());
                point_in_polygon(p, &vertices) || distance_to_polyline(p, &self.path()) <= tolerance
            }
        }
    }

    /// Whether any part of the shape lies within `region`
    pub fn intersects(&self, region: &Bounds) -> bool {
        if self.is_line_like() {
            self.path()
                .windows(2)
                .any(|w| segment_intersects_bounds(w[0], w[1], region))
        } else {
            self.bounds().intersects(region)
        }
    }

    /// Closest point on the shape's outline
    pub fn outline_nearest(&self, p: Point) -> Point {
        match &self.kind {
            ShapeKind::Line { start, end } | ShapeKind::Arrow { start, end } => {
                nearest_point_on_segment(p, *start, *end)
            }
            ShapeKind::Circle { .. } | ShapeKind::Ellipse { .. } => {
                let b = self.bounds();
                nearest_point_on_ellipse(p, b.center(), b.width() / 2.0, b.height() / 2.0)
            }
            _ => nearest_point_on_polyline(p, &self.path()).unwrap_or(p),
        }
    }

    /// Point a label offset is measured from
    pub fn label_anchor(&self) -> Point {
        match &self.kind {
            ShapeKind::Line { start, end } | ShapeKind::Arrow { start, end } => start.midpoint(*end),
            ShapeKind::OrthoLine { waypoints, .. } | ShapeKind::OrthoArrow { waypoints, .. } => {
                match (waypoints.first(), waypoints.last()) {
                    (Some(first), Some(last)) => first.midpoint(*last),
                    _ => Point::ORIGIN,
                }
            }
            _ => self.bounds().center(),
        }
    }

    /// Above the line for line-like shapes, below the body otherwise
    pub fn default_label_offset(&self) -> Point {
        if self.is_line_like() {
            Point::new(0.0, -DEFAULT_LABEL_DISTANCE)
        } else {
            Point::new(0.0, DEFAULT_LABEL_DISTANCE)
        }
    }

    /// Where the label is drawn, if there is one
    pub fn label_position(&self) -> Option<Point> {
        self.label.as_ref().map(|l| self.label_anchor() + l.offset)
    }

    /// Fixed connection points other shapes can snap onto
    pub fn snap_points(&self) -> Vec<Point> {
        match &self.kind {
            ShapeKind::Rectangle { .. } | ShapeKind::Square { .. } => {
                let b = self.bounds();
                let [tl, tr, br, bl] = b.corners();
                vec![
                    tl,
                    tr,
                    br,
                    bl,
                    tl.midpoint(tr),
                    tr.midpoint(br),
                    br.midpoint(bl),
                    bl.midpoint(tl),
                    b.center(),
                ]
            }
            ShapeKind::Circle { .. } | ShapeKind::Ellipse { .. } => {
                let b = self.bounds();
                let c = b.center();
                vec![
                    Point::new(c.x, b.min.y),
                    Point::new(b.max.x, c.y),
                    Point::new(c.x, b.max.y),
                    Point::new(b.min.x, c.y),
                    c,
                ]
            }
            ShapeKind::Line { start, end } | ShapeKind::Arrow { start, end } => {
                vec![*start, *end, start.midpoint(*end)]
            }
            ShapeKind::Triangle { .. } => {
                let [a, b, c] = triangle_vertices(&self.bounds());
                let centroid = Point::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0);
                vec![a, b, c, centroid]
            }
            ShapeKind::OrthoLine { waypoints, .. } | ShapeKind::OrthoArrow { waypoints, .. } => {
                waypoints.clone()
            }
            ShapeKind::Text { .. } => Vec::new(),
        }
    }

    /// Position of a line endpoint
    pub fn endpoint(&self, which: Endpoint) -> Option<Point> {
        match &self.kind {
            ShapeKind::Line { start, end } | ShapeKind::Arrow { start, end } => Some(match which {
                Endpoint::Start => *start,
                Endpoint::End => *end,
            }),
            ShapeKind::OrthoLine { waypoints, .. } | ShapeKind::OrthoArrow { waypoints, .. } => {
                match which {
                    Endpoint::Start => waypoints.first().copied(),
                    Endpoint::End => waypoints.last().copied(),
                }
            }
            _ => None,
        }
    }

    /// Copy with one endpoint moved; non-line shapes are returned unchanged
    pub fn with_endpoint(&self, which: Endpoint, p: Point) -> Shape {
        let mut shape = self.clone();
        match &mut shape.kind {
            ShapeKind::Line { start, end } | ShapeKind::Arrow { start, end } => match which {
                Endpoint::Start => *start = p,
                Endpoint::End => *end = p,
            },
            ShapeKind::OrthoLine { waypoints, .. } | ShapeKind::OrthoArrow { waypoints, .. } => {
                let slot = match which {
                    Endpoint::Start => waypoints.first_mut(),
                    Endpoint::End => waypoints.last_mut(),
                };
                if let Some(slot) = slot {
                    *slot = p;
                }
            }
            _ => {}
        }
        shape
    }

    pub fn connection(&self, which: Endpoint) -> Option<&Connection> {
        self.connections.iter().find(|c| c.endpoint == which)
    }

    /// Copy with `which` attached to `connection`, or detached when `None`
    pub fn with_connection(&self, which: Endpoint, connection: Option<Connection>) -> Shape {
        let mut shape = self.clone();
        shape.connections.retain(|c| c.endpoint != which);
        if let Some(conn) = connection {
            if shape.is_line_like() {
                shape.connections.push(Connection {
                    endpoint: which,
                    ..conn
                });
            }
        }
        shape
    }

    /// Whether any endpoint is attached to `target`
    pub fn is_attached_to(&self, target: &ShapeId) -> bool {
        self.connections.iter().any(|c| &c.target == target)
    }

    /// Re-place attached endpoints on their targets' connection points.
    /// Connections whose target `lookup` cannot resolve are left as they are.
    pub fn follow_connections<'a>(
        &self,
        lookup: impl Fn(&ShapeId) -> Option<&'a Shape>,
    ) -> Shape {
        let mut shape = self.clone();
        for conn in &self.connections {
            let Some(target) = lookup(&conn.target) else {
                continue;
            };
            if let Some(p) = target.snap_points().get(conn.point) {
                shape = shape.with_endpoint(conn.endpoint, *p);
            }
        }
        shape
    }

    /// Translate the whole shape. The label keeps its offset, so it travels
    /// with the anchor.
    pub fn translated(&self, delta: Point) -> Shape {
        Shape {
            kind: self.kind.translated(delta),
            ..self.clone()
        }
    }

    /// Point used to align a dragged shape with the grid
    pub fn reference_point(&self) -> Point {
        match &self.kind {
            ShapeKind::Text { anchor, .. } => *anchor,
            ShapeKind::Line { start, .. } | ShapeKind::Arrow { start, .. } => *start,
            ShapeKind::OrthoLine { waypoints, .. } | ShapeKind::OrthoArrow { waypoints, .. } => {
                waypoints.first().copied().unwrap_or(Point::ORIGIN)
            }
            _ => self.bounds().min,
        }
    }

    /// Geometry invariants: finite coordinates, non-degenerate boxes and
    /// segments, square squares and circles, at least two ortho waypoints
    pub fn is_well_formed(&self) -> bool {
        if !self.kind.points().iter().all(|p| p.is_finite()) {
            return false;
        }
        match &self.kind {
            ShapeKind::Line { start, end } | ShapeKind::Arrow { start, end } => start != end,
            ShapeKind::Rectangle { start, end }
            | ShapeKind::Ellipse { start, end }
            | ShapeKind::Triangle { start, end } => start.x != end.x && start.y != end.y,
            ShapeKind::Square { start, end } | ShapeKind::Circle { start, end } => {
                start.x != end.x && start.y != end.y && is_square(&Bounds::from_corners(*start, *end))
            }
            ShapeKind::Text { font, .. } => font.size.is_finite() && font.size > 0.0,
            ShapeKind::OrthoLine { waypoints, .. } | ShapeKind::OrthoArrow { waypoints, .. } => {
                waypoints.len() >= 2
            }
        }
    }
}

/// Width equals height up to floating point noise
pub fn is_square(bounds: &Bounds) -> bool {
    let (w, h) = (bounds.width(), bounds.height());
    (w - h).abs() <= SQUARE_TOLERANCE * w.abs().max(h.abs()).max(1.0)
}

/// Approximate rendered size of a text block
pub fn text_extent(content: &str, size: f64) -> (f64, f64) {
    let lines = content.lines().count().max(1);
    let widest = content.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    (
        widest as f64 * size * CHAR_WIDTH_FACTOR,
        lines as f64 * size * LINE_HEIGHT_FACTOR,
    )
}
