//! Press-drag-release drawing of lines, arrows and area shapes.

use std::mem;

use abdraw_core::{Endpoint, Shape, ShapeKind};
use abdraw_geometry::{Bounds, Point};
use tracing::debug;

use crate::command::{Action, Command};
use crate::config::{SessionConfig, Tool};
use crate::event::InputEvent;
use crate::session::{Gesture, Outcome, Session, connection_to};

/// Shapes smaller than this on both axes are dropped on release
pub(crate) const MIN_SHAPE_SIZE: f64 = 3.0;

/// Handle pointer events for the simple drawing tools
pub(crate) fn handle_shape_event(
    session: &mut Session,
    config: &SessionConfig,
    event: &InputEvent,
) -> Outcome {
    match *event {
        InputEvent::PointerDown { position, .. } => start_shape(session, config, position),
        InputEvent::PointerMove { position, .. } => {
            if matches!(session.gesture, Gesture::DrawingShape { .. }) {
                update_shape(session, config, position)
            } else {
                update_hover_snap(session, config, position)
            }
        }
        InputEvent::PointerUp { position, .. } => {
            if !matches!(session.gesture, Gesture::DrawingShape { .. }) {
                return Outcome::Ignored;
            }
            update_shape(session, config, position);
            commit_shape(session)
        }
        _ => Outcome::Ignored,
    }
}

/// Track the connection point under an idle pointer
pub(crate) fn update_hover_snap(session: &mut Session, config: &SessionConfig, p: Point) -> Outcome {
    let snap = session.index.nearest_snap(p, None, config.snap_radius());
    if snap == session.hover_snap {
        return Outcome::Ignored;
    }
    session.hover_snap = snap;
    Outcome::Updated
}

fn start_shape(session: &mut Session, config: &SessionConfig, raw: Point) -> Outcome {
    let (start, snap) = session.snap_point(config, raw, None);
    let tool = session.tool;
    session.hover_snap = snap.clone();
    session.gesture = Gesture::DrawingShape {
        tool,
        start,
        start_snap: snap,
        end_snap: None,
        preview: build_shape(tool, start, start, config),
    };
    Outcome::Updated
}

fn update_shape(session: &mut Session, config: &SessionConfig, raw: Point) -> Outcome {
    let (end, snap) = session.snap_point(config, raw, None);
    session.hover_snap = snap.clone();
    let Gesture::DrawingShape {
        tool,
        start,
        end_snap,
        preview,
        ..
    } = &mut session.gesture
    else {
        return Outcome::Ignored;
    };
    *end_snap = snap;
    *preview = build_shape(*tool, *start, end, config);
    Outcome::Updated
}

fn commit_shape(session: &mut Session) -> Outcome {
    let gesture = mem::replace(&mut session.gesture, Gesture::Idle);
    session.hover_snap = None;
    let Gesture::DrawingShape {
        start_snap,
        end_snap,
        preview,
        ..
    } = gesture
    else {
        return Outcome::Ignored;
    };
    let Some(mut shape) = preview.filter(|s| !too_small(s)) else {
        debug!("shape too small, discarded");
        return Outcome::Cancelled;
    };
    if shape.is_line_like() {
        shape = shape
            .with_connection(Endpoint::Start, connection_to(Endpoint::Start, start_snap))
            .with_connection(Endpoint::End, connection_to(Endpoint::End, end_snap));
    }
    let action = Action::Create(shape.shape_type());
    let command = Command::insert(action, &session.document, vec![shape]);
    session.commit(command)
}

/// Shape a tool draws from a press at `start` dragged to `end`.
///
/// Circles are centered on the press point. Squares take the larger of the
/// two deltas as their side.
pub(crate) fn build_shape(tool: Tool, start: Point, end: Point, config: &SessionConfig) -> Option<Shape> {
    let kind = match tool {
        Tool::Line => ShapeKind::Line { start, end },
        Tool::Arrow => ShapeKind::Arrow { start, end },
        Tool::Circle => {
            let r = start.distance_to(end);
            ShapeKind::Circle {
                start: Point::new(start.x - r, start.y - r),
                end: Point::new(start.x + r, start.y + r),
            }
        }
        Tool::Square => {
            let dx = end.x - start.x;
            let dy = end.y - start.y;
            let side = dx.abs().max(dy.abs());
            let corner = Point::new(start.x + side * dx.signum(), start.y + side * dy.signum());
            let bounds = Bounds::from_corners(start, corner);
            ShapeKind::Square {
                start: bounds.min,
                end: bounds.max,
            }
        }
        Tool::Rectangle | Tool::Ellipse | Tool::Triangle => {
            let bounds = Bounds::from_corners(start, end);
            ShapeKind::area(tool.shape_type()?, bounds.min, bounds.max)?
        }
        Tool::Select | Tool::Text | Tool::OrthoLine | Tool::OrthoArrow => return None,
    };
    Some(Shape::new(kind, config.style.clone()))
}

/// Under [`MIN_SHAPE_SIZE`] on both axes (lines: in length), or malformed
pub(crate) fn too_small(shape: &Shape) -> bool {
    let small = match shape.kind {
        ShapeKind::Line { start, end } | ShapeKind::Arrow { start, end } => {
            start.distance_to(end) < MIN_SHAPE_SIZE
        }
        _ => {
            let bounds = shape.bounds();
            bounds.width() < MIN_SHAPE_SIZE && bounds.height() < MIN_SHAPE_SIZE
        }
    };
    small || !shape.is_well_formed()
}
