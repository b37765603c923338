//! Persisted `.abdraw` document schema.
//!
//! The record types mirror the JSON layout exactly and stay independent of
//! the in-memory model. [`DocumentRecord::into_document`] validates the whole
//! record before anything is built, so a malformed file never yields a
//! partially loaded document.

use std::collections::HashSet;

use abdraw_geometry::{Point, Routing};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::{Document, GridSettings, MAX_GRID_SPACING, MIN_GRID_SPACING, ShapeId};
use crate::error::LoadError;
use crate::shapes::{Connection, Font, Label, Shape, ShapeKind, Style, is_square};

/// Format version written by this build
pub const FORMAT_VERSION: &str = "1.0";

fn default_version() -> String {
    FORMAT_VERSION.to_string()
}

/// Top-level document body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    #[serde(default = "default_version")]
    pub version: String,
    pub grid: GridSettings,
    /// Back-most first
    pub shapes: Vec<ShapeRecord>,
}

/// One shape: id, `type` + `geometry`, style, label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    pub id: String,
    #[serde(flatten)]
    pub geometry: GeometryRecord,
    pub style: Style,
    #[serde(default)]
    pub label: Option<Label>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connections: Vec<Connection>,
}

/// Variant-specific geometry, tagged by the shape's `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "geometry", rename_all = "lowercase")]
pub enum GeometryRecord {
    Rectangle(BoxGeometry),
    Square(BoxGeometry),
    Circle(BoxGeometry),
    Ellipse(BoxGeometry),
    Triangle(BoxGeometry),
    Line(SegmentGeometry),
    Arrow(SegmentGeometry),
    OrthoLine(OrthoGeometry),
    OrthoArrow(OrthoGeometry),
    Text(TextGeometry),
}

/// Two opposite corners of a bounding box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxGeometry {
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentGeometry {
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrthoGeometry {
    pub waypoints: Vec<Point>,
    #[serde(default)]
    pub routing: Routing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextGeometry {
    pub anchor: Point,
    pub content: String,
    pub font_size: f64,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

fn default_font_family() -> String {
    Font::default().family
}

impl GeometryRecord {
    fn from_kind(kind: &ShapeKind) -> Self {
        let area = |start: &Point, end: &Point| BoxGeometry {
            start: *start,
            end: *end,
        };
        let segment = |start: &Point, end: &Point| SegmentGeometry {
            start: *start,
            end: *end,
        };
        let ortho = |waypoints: &[Point], routing: &Routing| OrthoGeometry {
            waypoints: waypoints.to_vec(),
            routing: *routing,
        };
        match kind {
            ShapeKind::Rectangle { start, end } => GeometryRecord::Rectangle(area(start, end)),
            ShapeKind::Square { start, end } => GeometryRecord::Square(area(start, end)),
            ShapeKind::Circle { start, end } => GeometryRecord::Circle(area(start, end)),
            ShapeKind::Ellipse { start, end } => GeometryRecord::Ellipse(area(start, end)),
            ShapeKind::Triangle { start, end } => GeometryRecord::Triangle(area(start, end)),
            ShapeKind::Line { start, end } => GeometryRecord::Line(segment(start, end)),
            ShapeKind::Arrow { start, end } => GeometryRecord::Arrow(segment(start, end)),
            ShapeKind::OrthoLine { waypoints, routing } => {
                GeometryRecord::OrthoLine(ortho(waypoints, routing))
            }
            ShapeKind::OrthoArrow { waypoints, routing } => {
                GeometryRecord::OrthoArrow(ortho(waypoints, routing))
            }
            ShapeKind::Text {
                anchor,
                content,
                font,
            } => GeometryRecord::Text(TextGeometry {
                anchor: *anchor,
                content: content.clone(),
                font_size: font.size,
                font_family: font.family.clone(),
                bold: font.bold,
                italic: font.italic,
            }),
        }
    }

    fn into_kind(self) -> ShapeKind {
        match self {
            GeometryRecord::Rectangle(BoxGeometry { start, end }) => ShapeKind::Rectangle { start, end },
            GeometryRecord::Square(BoxGeometry { start, end }) => ShapeKind::Square { start, end },
            GeometryRecord::Circle(BoxGeometry { start, end }) => ShapeKind::Circle { start, end },
            GeometryRecord::Ellipse(BoxGeometry { start, end }) => ShapeKind::Ellipse { start, end },
            GeometryRecord::Triangle(BoxGeometry { start, end }) => ShapeKind::Triangle { start, end },
            GeometryRecord::Line(SegmentGeometry { start, end }) => ShapeKind::Line { start, end },
            GeometryRecord::Arrow(SegmentGeometry { start, end }) => ShapeKind::Arrow { start, end },
            GeometryRecord::OrthoLine(OrthoGeometry { waypoints, routing }) => {
                ShapeKind::OrthoLine { waypoints, routing }
            }
            GeometryRecord::OrthoArrow(OrthoGeometry { waypoints, routing }) => {
                ShapeKind::OrthoArrow { waypoints, routing }
            }
            GeometryRecord::Text(text) => ShapeKind::Text {
                anchor: text.anchor,
                content: text.content,
                font: Font {
                    family: text.font_family,
                    size: text.font_size,
                    bold: text.bold,
                    italic: text.italic,
                },
            },
        }
    }
}

impl ShapeRecord {
    pub fn from_shape(shape: &Shape) -> Self {
        Self {
            id: shape.id.to_string(),
            geometry: GeometryRecord::from_kind(&shape.kind),
            style: shape.style.clone(),
            label: shape.label.clone(),
            connections: shape.connections.clone(),
        }
    }
}

impl DocumentRecord {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            grid: *doc.grid(),
            shapes: doc.iter().map(ShapeRecord::from_shape).collect(),
        }
    }

    /// Validate and convert into a document; any defect rejects the whole record
    pub fn into_document(self) -> Result<Document, LoadError> {
        if self.version != FORMAT_VERSION {
            return Err(LoadError::UnsupportedVersion {
                version: self.version,
            });
        }
        if !self.grid.spacing_is_valid() {
            return Err(LoadError::GridSpacing {
                spacing: self.grid.spacing,
                min: MIN_GRID_SPACING,
                max: MAX_GRID_SPACING,
            });
        }

        let mut shapes = Vec::with_capacity(self.shapes.len());
        let mut seen = HashSet::with_capacity(self.shapes.len());
        for (index, record) in self.shapes.into_iter().enumerate() {
            let id: ShapeId = record.id.parse().map_err(|_| LoadError::InvalidId {
                index,
                id: record.id.clone(),
            })?;
            if !seen.insert(id.clone()) {
                return Err(LoadError::DuplicateId { index, id });
            }
            let shape = Shape {
                id,
                kind: record.geometry.into_kind(),
                style: record.style,
                label: record.label,
                connections: record.connections,
            };
            validate_shape(index, &shape)?;
            shapes.push(shape);
        }
        validate_connections(&shapes)?;

        debug!(shapes = shapes.len(), "document record validated");
        Ok(Document::from_shapes(shapes, self.grid)?)
    }
}

fn validate_shape(index: usize, shape: &Shape) -> Result<(), LoadError> {
    let kind = shape.shape_type().name();
    let points = shape.kind.points();
    if !points.iter().all(|p| p.is_finite()) {
        return Err(LoadError::NonFinite { index });
    }
    if let Some(label) = &shape.label {
        if !shape.supports_label() {
            return Err(LoadError::LabelNotSupported { index, kind });
        }
        if !label.offset.is_finite() {
            return Err(LoadError::NonFinite { index });
        }
    }
    if !(shape.style.width.is_finite() && shape.style.width > 0.0) {
        return Err(LoadError::InvalidStrokeWidth {
            index,
            width: shape.style.width,
        });
    }

    match &shape.kind {
        ShapeKind::OrthoLine { waypoints, .. } | ShapeKind::OrthoArrow { waypoints, .. } => {
            if waypoints.len() < 2 {
                return Err(LoadError::TooFewWaypoints {
                    index,
                    kind,
                    count: waypoints.len(),
                });
            }
        }
        ShapeKind::Text { font, .. } => {
            if !(font.size.is_finite() && font.size > 0.0) {
                return Err(LoadError::InvalidFontSize {
                    index,
                    size: font.size,
                });
            }
        }
        ShapeKind::Square { .. } | ShapeKind::Circle { .. } => {
            let bounds = shape.bounds();
            if bounds.width() == 0.0 || bounds.height() == 0.0 {
                return Err(LoadError::Degenerate { index, kind });
            }
            if !is_square(&bounds) {
                return Err(LoadError::NotSquare {
                    index,
                    kind,
                    width: bounds.width(),
                    height: bounds.height(),
                });
            }
        }
        ShapeKind::Line { .. }
        | ShapeKind::Arrow { .. }
        | ShapeKind::Rectangle { .. }
        | ShapeKind::Ellipse { .. }
        | ShapeKind::Triangle { .. } => {
            if !shape.is_well_formed() {
                return Err(LoadError::Degenerate { index, kind });
            }
        }
    }
    Ok(())
}

fn validate_connections(shapes: &[Shape]) -> Result<(), LoadError> {
    for (index, shape) in shapes.iter().enumerate() {
        let mut endpoints = HashSet::new();
        for conn in &shape.connections {
            let invalid = |reason| LoadError::InvalidConnection {
                index,
                target: conn.target.clone(),
                reason,
            };
            if !shape.is_line_like() {
                return Err(invalid("only line endpoints can connect"));
            }
            if !endpoints.insert(conn.endpoint) {
                return Err(invalid("endpoint connected twice"));
            }
            if conn.target == shape.id {
                return Err(invalid("shape connected to itself"));
            }
            let target = shapes
                .iter()
                .find(|s| s.id == conn.target)
                .ok_or_else(|| invalid("target shape does not exist"))?;
            if conn.point >= target.snap_points().len() {
                return Err(invalid("connection point out of range"));
            }
        }
    }
    Ok(())
}

/// Serialize a document as pretty-printed JSON
pub fn to_json(doc: &Document) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&DocumentRecord::from_document(doc))
}

/// Parse and validate a JSON document body
pub fn from_json(text: &str) -> Result<Document, LoadError> {
    let record: DocumentRecord = serde_json::from_str(text)?;
    record.into_document()
}
