//! Editing-session configuration.
//!
//! Everything the session would otherwise keep as ambient state (the active
//! tool, the style of new shapes, grid settings used for snapping) lives in
//! a [`SessionConfig`] the caller owns and passes to every event.

use abdraw_core::{Font, GridSettings, ShapeType, Style, default_snap_radius};
use abdraw_geometry::Point;
use serde::{Deserialize, Serialize};

/// Distance from a shape's outline that still counts as a hit
pub const DEFAULT_HIT_TOLERANCE: f64 = 4.0;
/// Grab radius of selection handles
pub const DEFAULT_HANDLE_RADIUS: f64 = 6.0;
/// Offset applied to each successive paste
pub const DEFAULT_PASTE_OFFSET: f64 = 20.0;

/// Available drawing tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Select,
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

impl Tool {
    pub const ALL: [Tool; 11] = [
        Tool::Select,
        Tool::Line,
        Tool::Arrow,
        Tool::Rectangle,
        Tool::Square,
        Tool::Circle,
        Tool::Ellipse,
        Tool::Triangle,
        Tool::Text,
        Tool::OrthoLine,
        Tool::OrthoArrow,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::Line => "Line",
            Tool::Arrow => "Arrow",
            Tool::Rectangle => "Rectangle",
            Tool::Square => "Square",
            Tool::Circle => "Circle",
            Tool::Ellipse => "Ellipse",
            Tool::Triangle => "Triangle",
            Tool::Text => "Text",
            Tool::OrthoLine => "Ortho line",
            Tool::OrthoArrow => "Ortho arrow",
        }
    }

    /// Shape type the tool creates
    pub fn shape_type(&self) -> Option<ShapeType> {
        match self {
            Tool::Select => None,
            Tool::Line => Some(ShapeType::Line),
            Tool::Arrow => Some(ShapeType::Arrow),
            Tool::Rectangle => Some(ShapeType::Rectangle),
            Tool::Square => Some(ShapeType::Square),
            Tool::Circle => Some(ShapeType::Circle),
            Tool::Ellipse => Some(ShapeType::Ellipse),
            Tool::Triangle => Some(ShapeType::Triangle),
            Tool::Text => Some(ShapeType::Text),
            Tool::OrthoLine => Some(ShapeType::OrthoLine),
            Tool::OrthoArrow => Some(ShapeType::OrthoArrow),
        }
    }

    /// Tools that place waypoints with successive clicks
    pub fn is_ortho(&self) -> bool {
        matches!(self, Tool::OrthoLine | Tool::OrthoArrow)
    }
}

/// Explicit configuration for an editing session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub tool: Tool,
    /// Style given to new shapes
    pub style: Style,
    /// Font given to new text
    pub font: Font,
    /// Grid used for snapping; mirrored into the document on toggles
    pub grid: GridSettings,
    /// Connection-snap radius; derived from the grid spacing when unset
    pub snap_radius: Option<f64>,
    pub hit_tolerance: f64,
    pub handle_radius: f64,
    pub paste_offset: Point,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tool: Tool::default(),
            style: Style::default(),
            font: Font::default(),
            grid: GridSettings::default(),
            snap_radius: None,
            hit_tolerance: DEFAULT_HIT_TOLERANCE,
            handle_radius: DEFAULT_HANDLE_RADIUS,
            paste_offset: Point::new(DEFAULT_PASTE_OFFSET, DEFAULT_PASTE_OFFSET),
        }
    }
}

impl SessionConfig {
    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.tool = tool;
        self
    }

    /// Effective connection-snap radius
    pub fn snap_radius(&self) -> f64 {
        self.snap_radius
            .unwrap_or_else(|| default_snap_radius(self.grid.spacing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_radius_follows_grid() {
        let mut config = SessionConfig::default();
        assert_eq!(config.snap_radius(), 15.0);
        config.grid = config.grid.with_spacing(40);
        assert_eq!(config.snap_radius(), 30.0);
        config.snap_radius = Some(8.0);
        assert_eq!(config.snap_radius(), 8.0);
    }

    #[test]
    fn test_tool_serde_names() {
        assert_eq!(serde_json::to_string(&Tool::OrthoArrow).unwrap(), "\"orthoarrow\"");
        let tool: Tool = serde_json::from_str("\"circle\"").unwrap();
        assert_eq!(tool, Tool::Circle);
    }

    #[test]
    fn test_every_drawing_tool_has_a_shape_type() {
        for tool in Tool::ALL {
            assert_eq!(tool.shape_type().is_none(), tool == Tool::Select);
        }
    }
}
