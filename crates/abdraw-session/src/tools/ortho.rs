//! Click-by-click placement of orthogonal lines and arrows.
//!
//! The first click starts the shape, each further click adds a waypoint,
//! Enter finishes, and a right click places the end point and finishes.
//! The start and end points snap to connection points; interior waypoints
//! snap to the grid only.

use std::mem;

use abdraw_core::{Endpoint, Shape, ShapeKind};
use abdraw_geometry::{Point, Routing};
use tracing::debug;

use crate::command::{Action, Command};
use crate::config::{SessionConfig, Tool};
use crate::event::InputEvent;
use crate::session::{Gesture, Outcome, Session, connection_to};
use crate::tools::shape::{too_small, update_hover_snap};

/// Handle pointer events for the ortho line and ortho arrow tools
pub(crate) fn handle_ortho_event(
    session: &mut Session,
    config: &SessionConfig,
    event: &InputEvent,
) -> Outcome {
    match *event {
        InputEvent::Click { position, .. } => place_waypoint(session, config, position),
        InputEvent::RightClick { position, .. } => {
            if !matches!(session.gesture, Gesture::PlacingOrtho { .. }) {
                return Outcome::Ignored;
            }
            place_end(session, config, position);
            finish(session)
        }
        InputEvent::PointerMove { position, .. } => track_cursor(session, config, position),
        _ => Outcome::Ignored,
    }
}

fn place_waypoint(session: &mut Session, config: &SessionConfig, raw: Point) -> Outcome {
    let candidate = session.index.nearest_snap(raw, None, config.snap_radius());
    if let Gesture::PlacingOrtho {
        waypoints,
        end_snap,
        cursor,
        ..
    } = &mut session.gesture
    {
        // Kept so the point can lock on if it turns out to be the last one
        *end_snap = candidate;
        waypoints.push(config.grid.snap(raw));
        *cursor = None;
        return Outcome::Updated;
    }

    let (start, snap) = session.snap_point(config, raw, None);
    session.gesture = Gesture::PlacingOrtho {
        arrow: session.tool == Tool::OrthoArrow,
        waypoints: vec![start],
        routing: Routing::default(),
        start_snap: snap.clone(),
        end_snap: None,
        cursor: None,
        style: config.style.clone(),
    };
    session.hover_snap = snap;
    session.set_status("Click to add waypoints, Enter or right-click to finish, r to flip");
    Outcome::Updated
}

fn place_end(session: &mut Session, config: &SessionConfig, raw: Point) {
    let (end, snap) = session.snap_point(config, raw, None);
    if let Gesture::PlacingOrtho {
        waypoints,
        end_snap,
        cursor,
        ..
    } = &mut session.gesture
    {
        waypoints.push(end);
        *end_snap = snap;
        *cursor = None;
    }
}

fn track_cursor(session: &mut Session, config: &SessionConfig, raw: Point) -> Outcome {
    if !matches!(session.gesture, Gesture::PlacingOrtho { .. }) {
        return update_hover_snap(session, config, raw);
    }
    update_hover_snap(session, config, raw);
    if let Gesture::PlacingOrtho { cursor, .. } = &mut session.gesture {
        *cursor = Some(config.grid.snap(raw));
    }
    Outcome::Updated
}

/// Commit the shape being placed. Fewer than two points, or points that all
/// fall within a few pixels of each other, cancel it.
pub(crate) fn finish(session: &mut Session) -> Outcome {
    let gesture = mem::replace(&mut session.gesture, Gesture::Idle);
    session.hover_snap = None;
    let Gesture::PlacingOrtho {
        arrow,
        mut waypoints,
        routing,
        start_snap,
        end_snap,
        style,
        ..
    } = gesture
    else {
        return Outcome::Ignored;
    };
    if waypoints.len() < 2 {
        debug!(points = waypoints.len(), "ortho placement cancelled");
        session.set_status("Ortho lines need at least two points");
        return Outcome::Cancelled;
    }
    if let (Some(snap), Some(last)) = (&end_snap, waypoints.last_mut()) {
        *last = snap.position;
    }

    let kind = if arrow {
        ShapeKind::OrthoArrow { waypoints, routing }
    } else {
        ShapeKind::OrthoLine { waypoints, routing }
    };
    let shape = Shape::new(kind, style);
    if too_small(&shape) {
        debug!("ortho placement too small, discarded");
        session.set_status("Ortho line too short");
        return Outcome::Cancelled;
    }
    let shape = shape
        .with_connection(Endpoint::Start, connection_to(Endpoint::Start, start_snap))
        .with_connection(Endpoint::End, connection_to(Endpoint::End, end_snap));
    let action = Action::Create(shape.shape_type());
    let command = Command::insert(action, &session.document, vec![shape]);
    session.commit(command)
}

/// Provisional shape for the placement in progress, running to the cursor
pub(crate) fn preview(gesture: &Gesture) -> Option<Shape> {
    let Gesture::PlacingOrtho {
        arrow,
        waypoints,
        routing,
        cursor,
        style,
        ..
    } = gesture
    else {
        return None;
    };
    let mut points = waypoints.clone();
    points.extend(cursor.filter(|c| Some(c) != waypoints.last()));
    if points.len() < 2 {
        return None;
    }
    let kind = if *arrow {
        ShapeKind::OrthoArrow {
            waypoints: points,
            routing: *routing,
        }
    } else {
        ShapeKind::OrthoLine {
            waypoints: points,
            routing: *routing,
        }
    };
    Some(Shape::new(kind, style.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Key;
    use abdraw_core::{Document, Style};

    fn config() -> SessionConfig {
        let mut config = SessionConfig::default().with_tool(Tool::OrthoLine);
        config.grid.snap = false;
        config
    }

    #[test]
    fn test_preview_runs_to_cursor() {
        let mut config = config();
        let mut session = Session::new(&config);
        session.handle_event(&mut config, InputEvent::click(0.0, 0.0));
        assert!(session.provisional_shape().is_none());

        session.handle_event(&mut config, InputEvent::moved(30.0, 40.0));
        let preview = session.provisional_shape().unwrap();
        assert_eq!(
            preview.path(),
            vec![Point::new(0.0, 0.0), Point::new(30.0, 0.0), Point::new(30.0, 40.0)]
        );
    }

    #[test]
    fn test_interior_waypoints_ignore_connection_points() {
        let mut config = config();
        config.grid.snap = true;
        let target = Shape::new(
            ShapeKind::Rectangle {
                start: Point::new(105.0, 105.0),
                end: Point::new(200.0, 200.0),
            },
            Style::default(),
        );
        let target_id = target.id.clone();
        let doc = Document::from_shapes(vec![target], config.grid).unwrap();
        let mut session = Session::open(&mut config, doc);

        session.handle_event(&mut config, InputEvent::click(0.0, 0.0));
        // Near the rectangle's top-left corner but not the last point
        session.handle_event(&mut config, InputEvent::click(103.0, 103.0));
        session.handle_event(&mut config, InputEvent::click(300.0, 300.0));
        session.handle_event(&mut config, InputEvent::key(Key::Enter));

        let shape = &session.document().shapes()[1];
        let ShapeKind::OrthoLine { waypoints, .. } = &shape.kind else {
            panic!("expected ortho line");
        };
        assert_eq!(waypoints[1], Point::new(100.0, 100.0));
        assert!(!shape.is_attached_to(&target_id));
    }

    #[test]
    fn test_end_point_locks_onto_connection() {
        let mut config = config();
        let target = Shape::new(
            ShapeKind::Ellipse {
                start: Point::new(100.0, 0.0),
                end: Point::new(200.0, 100.0),
            },
            Style::default(),
        );
        let target_id = target.id.clone();
        let doc = Document::from_shapes(vec![target], config.grid).unwrap();
        let mut session = Session::open(&mut config, doc);

        session.handle_event(&mut config, InputEvent::click(0.0, 0.0));
        session.handle_event(&mut config, InputEvent::click(96.0, 47.0));
        session.handle_event(&mut config, InputEvent::key(Key::Enter));

        let shape = &session.document().shapes()[1];
        assert_eq!(shape.endpoint(Endpoint::End), Some(Point::new(100.0, 50.0)));
        let conn = shape.connection(Endpoint::End).unwrap();
        assert_eq!(conn.target, target_id);
        assert_eq!(conn.point, 3);
    }

    #[test]
    fn test_coincident_points_are_discarded() {
        let mut config = config();
        let mut session = Session::new(&config);
        session.handle_event(&mut config, InputEvent::click(40.0, 40.0));
        session.handle_event(&mut config, InputEvent::click(40.0, 40.0));
        let outcome = session.handle_event(&mut config, InputEvent::key(Key::Enter));
        assert_eq!(outcome, Outcome::Cancelled);
        assert!(session.document().is_empty());
        assert!(!session.history().can_undo());
        assert!(session.is_idle());

        // A right click a pixel away is still too short
        session.handle_event(&mut config, InputEvent::click(10.0, 10.0));
        let outcome = session.handle_event(&mut config, InputEvent::right_click(11.0, 12.0));
        assert_eq!(outcome, Outcome::Cancelled);
        assert!(session.document().is_empty());
    }
}
