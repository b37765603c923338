//! Selection, moving, handle resizing and marquee selection.

use std::collections::HashSet;
use std::mem;

use abdraw_core::{HandleKind, Shape, ShapeId, SnapPoint};
use abdraw_geometry::{Bounds, Point};
use tracing::debug;

use crate::command::{Action, Command, ShapeEdit};
use crate::config::SessionConfig;
use crate::event::{InputEvent, Modifiers};
use crate::session::{Gesture, Outcome, Session, connection_to};
use crate::tools::shape::MIN_SHAPE_SIZE;

/// Handle pointer events for the select tool
pub(crate) fn handle_select_event(
    session: &mut Session,
    config: &SessionConfig,
    event: &InputEvent,
) -> Outcome {
    match *event {
        InputEvent::PointerDown {
            position,
            modifiers,
        } => press(session, config, position, modifiers),
        InputEvent::PointerMove { position, .. } => match session.gesture {
            Gesture::SelectingMarquee { .. } => continue_marquee(session, position),
            Gesture::ResizingHandle { .. } => continue_resize(session, config, position),
            Gesture::DraggingSelection { .. } => continue_drag(session, config, position),
            _ => Outcome::Ignored,
        },
        InputEvent::PointerUp { position, .. } => match session.gesture {
            Gesture::SelectingMarquee { .. } => {
                continue_marquee(session, position);
                finish_marquee(session)
            }
            Gesture::ResizingHandle { .. } => {
                continue_resize(session, config, position);
                finish_resize(session)
            }
            Gesture::DraggingSelection { .. } => {
                continue_drag(session, config, position);
                finish_drag(session)
            }
            _ => Outcome::Ignored,
        },
        _ => Outcome::Ignored,
    }
}

fn press(session: &mut Session, config: &SessionConfig, p: Point, mods: Modifiers) -> Outcome {
    // Handles take priority, single selection only
    if try_start_resize(session, config, p) {
        return Outcome::Updated;
    }

    let Some(id) = session.document.shape_at(p, config.hit_tolerance) else {
        if !mods.shift {
            session.selection.clear();
        }
        session.gesture = Gesture::SelectingMarquee {
            origin: p,
            current: p,
            additive: mods.shift,
        };
        return Outcome::Updated;
    };

    if mods.shift {
        if let Some(pos) = session.selection.iter().position(|s| *s == id) {
            session.selection.remove(pos);
            return Outcome::Updated;
        }
        session.selection.push(id);
    } else if !session.selection.contains(&id) {
        session.selection = vec![id];
    }
    session.gesture = Gesture::DraggingSelection {
        origin: p,
        delta: Point::ORIGIN,
    };
    Outcome::Updated
}

fn try_start_resize(session: &mut Session, config: &SessionConfig, p: Point) -> bool {
    let [id] = session.selection.as_slice() else {
        return false;
    };
    let Some(shape) = session.document.get(id) else {
        return false;
    };
    let Some(handle) = shape.handle_at(p, config.handle_radius) else {
        return false;
    };
    session.gesture = Gesture::ResizingHandle {
        id: shape.id.clone(),
        handle,
        preview: shape.clone(),
    };
    debug!(?handle, "resize started");
    true
}

fn continue_drag(session: &mut Session, config: &SessionConfig, p: Point) -> Outcome {
    let Gesture::DraggingSelection { origin, .. } = session.gesture else {
        return Outcome::Ignored;
    };
    let delta = drag_delta(session, config, p - origin);
    if let Gesture::DraggingSelection { delta: current, .. } = &mut session.gesture {
        *current = delta;
    }
    Outcome::Updated
}

/// Offset that puts the first selected shape's reference point on the grid
fn drag_delta(session: &Session, config: &SessionConfig, raw: Point) -> Point {
    if !config.grid.snap {
        return raw;
    }
    let Some(reference) = session.selected_shapes().next().map(Shape::reference_point) else {
        return raw;
    };
    config.grid.snap(reference + raw) - reference
}

fn finish_drag(session: &mut Session) -> Outcome {
    let gesture = mem::replace(&mut session.gesture, Gesture::Idle);
    let Gesture::DraggingSelection { delta, .. } = gesture else {
        return Outcome::Ignored;
    };
    if delta == Point::ORIGIN {
        return Outcome::Updated;
    }
    let edits = moved_edits(session, delta);
    session.commit(Command::edit(Action::Move, edits))
}

/// Edits moving the selection by `delta`, with attached lines following.
/// A moved line lets go of targets that are not moving with it.
pub(crate) fn moved_edits(session: &Session, delta: Point) -> Vec<ShapeEdit> {
    let moving: HashSet<&ShapeId> = session.selection.iter().collect();
    let updated = session
        .selected_shapes()
        .map(|shape| {
            let mut after = shape.translated(delta);
            after.connections.retain(|c| moving.contains(&c.target));
            after
        })
        .collect();
    session.with_followers(updated)
}

fn continue_resize(session: &mut Session, config: &SessionConfig, p: Point) -> Outcome {
    let Gesture::ResizingHandle { id, handle, .. } = &session.gesture else {
        return Outcome::Ignored;
    };
    let handle = *handle;
    let Some(original) = session.document.get(id) else {
        return session.cancel_gesture();
    };
    let (target, snap) = resize_target(session, config, original, handle, p);
    let mut resized = original.resize(handle, target);
    if let HandleKind::Endpoint(which) = handle {
        if resized.is_line_like() && resized.endpoint(which) == Some(target) {
            resized = resized.with_connection(which, connection_to(which, snap.clone()));
        }
    }
    session.hover_snap = snap;
    if let Gesture::ResizingHandle { preview, .. } = &mut session.gesture {
        *preview = resized;
    }
    Outcome::Updated
}

/// Where a handle dragged to `raw` lands
fn resize_target(
    session: &Session,
    config: &SessionConfig,
    shape: &Shape,
    handle: HandleKind,
    raw: Point,
) -> (Point, Option<SnapPoint>) {
    match handle {
        HandleKind::Endpoint(_) | HandleKind::Corner(_) => session.snap_point(config, raw, Some(&shape.id)),
        HandleKind::Waypoint(_) => (config.grid.snap(raw), None),
        HandleKind::Label => (raw, None),
    }
}

fn finish_resize(session: &mut Session) -> Outcome {
    let gesture = mem::replace(&mut session.gesture, Gesture::Idle);
    session.hover_snap = None;
    let Gesture::ResizingHandle { preview, .. } = gesture else {
        return Outcome::Ignored;
    };
    let edits = session.with_followers(vec![preview]);
    session.commit(Command::edit(Action::Resize, edits))
}

fn continue_marquee(session: &mut Session, p: Point) -> Outcome {
    let Gesture::SelectingMarquee { current, .. } = &mut session.gesture else {
        return Outcome::Ignored;
    };
    *current = p;
    Outcome::Updated
}

fn finish_marquee(session: &mut Session) -> Outcome {
    let gesture = mem::replace(&mut session.gesture, Gesture::Idle);
    let Gesture::SelectingMarquee {
        origin,
        current,
        additive,
    } = gesture
    else {
        return Outcome::Ignored;
    };
    let region = Bounds::from_corners(origin, current);
    // A click on empty canvas is not a marquee
    if region.width() < MIN_SHAPE_SIZE && region.height() < MIN_SHAPE_SIZE {
        return Outcome::Updated;
    }
    let hits = session.document.shapes_in(&region);
    if additive {
        for id in hits {
            if !session.selection.contains(&id) {
                session.selection.push(id);
            }
        }
    } else {
        session.selection = hits;
    }
    debug!(selected = session.selection.len(), "marquee selection");
    Outcome::Updated
}
