//! Text entry: new text shapes, editing text content, and shape labels.

use std::mem;

use abdraw_core::{Shape, ShapeKind, ShapeType};
use abdraw_geometry::Point;
use tracing::debug;

use crate::command::{Action, Command, ShapeEdit};
use crate::config::SessionConfig;
use crate::event::{InputEvent, Key, Modifiers};
use crate::session::{Gesture, Outcome, Session};

/// Handle pointer events for the text tool
pub(crate) fn handle_text_event(
    session: &mut Session,
    config: &SessionConfig,
    event: &InputEvent,
) -> Outcome {
    match *event {
        InputEvent::Click { position, .. } => start_text(session, config, position),
        _ => Outcome::Ignored,
    }
}

fn start_text(session: &mut Session, config: &SessionConfig, p: Point) -> Outcome {
    session.gesture = Gesture::EditingText {
        anchor: config.grid.snap(p),
        target: None,
        text: String::new(),
        font: config.font.clone(),
        style: config.style.clone(),
    };
    session.set_status("Type text, Enter to place, Escape to cancel");
    Outcome::Updated
}

/// Keys while a text or label editor is open
pub(crate) fn handle_text_key(session: &mut Session, key: Key, mods: Modifiers) -> Outcome {
    match key {
        Key::Escape => session.cancel_gesture(),
        Key::Enter => commit(session),
        Key::Backspace => {
            if let Some(text) = session.gesture.text_buffer_mut() {
                text.pop();
            }
            Outcome::Updated
        }
        Key::Char(c) if !mods.ctrl => {
            if let Some(text) = session.gesture.text_buffer_mut() {
                text.push(c);
            }
            Outcome::Updated
        }
        _ => Outcome::Ignored,
    }
}

/// Enter on a single selected shape: edit the content of a text shape,
/// otherwise the label
pub(crate) fn begin_edit_selected(session: &mut Session) -> Outcome {
    let [id] = session.selection.as_slice() else {
        return Outcome::Ignored;
    };
    let Some(shape) = session.document.get(id) else {
        return Outcome::Ignored;
    };
    let ShapeKind::Text {
        anchor,
        content,
        font,
    } = &shape.kind
    else {
        return begin_label_edit(session);
    };
    session.gesture = Gesture::EditingText {
        anchor: *anchor,
        target: Some(shape.id.clone()),
        text: content.clone(),
        font: font.clone(),
        style: shape.style.clone(),
    };
    session.set_status("Editing text, Enter to apply, Escape to cancel");
    Outcome::Updated
}

/// Open the label editor on the single selected shape
pub(crate) fn begin_label_edit(session: &mut Session) -> Outcome {
    let [id] = session.selection.as_slice() else {
        return Outcome::Ignored;
    };
    let Some(shape) = session.document.get(id) else {
        return Outcome::Ignored;
    };
    if !shape.supports_label() {
        return Outcome::Ignored;
    }
    session.gesture = Gesture::EditingLabel {
        id: shape.id.clone(),
        text: shape
            .label
            .as_ref()
            .map(|l| l.text.clone())
            .unwrap_or_default(),
    };
    session.set_status("Editing label, Enter to apply, Escape to cancel");
    Outcome::Updated
}

/// Close the open editor and record its result.
///
/// Empty new text creates nothing, emptied text content is left unchanged,
/// and an emptied label is removed.
pub(crate) fn commit(session: &mut Session) -> Outcome {
    let gesture = mem::replace(&mut session.gesture, Gesture::Idle);
    match gesture {
        Gesture::EditingText {
            anchor,
            target: None,
            text,
            font,
            style,
        } => {
            if text.is_empty() {
                debug!("empty text discarded");
                return Outcome::Cancelled;
            }
            let shape = Shape::new(
                ShapeKind::Text {
                    anchor,
                    content: text,
                    font,
                },
                style,
            );
            let command = Command::insert(Action::Create(ShapeType::Text), &session.document, vec![shape]);
            session.commit(command)
        }
        Gesture::EditingText {
            target: Some(id),
            text,
            ..
        } => {
            let Some(before) = session.document.get(&id).cloned() else {
                return Outcome::Cancelled;
            };
            if text.is_empty() {
                session.set_status("Text unchanged");
                return Outcome::Cancelled;
            }
            let after = with_content(&before, &text);
            session.commit(Command::edit(Action::EditText, vec![ShapeEdit::new(before, after)]))
        }
        Gesture::EditingLabel { id, text } => {
            let Some(before) = session.document.get(&id).cloned() else {
                return Outcome::Cancelled;
            };
            let after = before.with_label_text(&text);
            session.commit(Command::edit(Action::EditLabel, vec![ShapeEdit::new(before, after)]))
        }
        other => {
            session.gesture = other;
            Outcome::Ignored
        }
    }
}

/// Copy of a text shape with new content
pub(crate) fn with_content(shape: &Shape, text: &str) -> Shape {
    let mut shape = shape.clone();
    if let ShapeKind::Text { content, .. } = &mut shape.kind {
        *content = text.to_string();
    }
    shape
}

/// Provisional shape for new text being typed
pub(crate) fn preview(gesture: &Gesture) -> Option<Shape> {
    let Gesture::EditingText {
        anchor,
        target: None,
        text,
        font,
        style,
    } = gesture
    else {
        return None;
    };
    if text.is_empty() {
        return None;
    }
    Some(Shape::new(
        ShapeKind::Text {
            anchor: *anchor,
            content: text.clone(),
            font: font.clone(),
        },
        style.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tool;
    use crate::session::SessionState;
    use abdraw_core::{Document, Font, Style};

    fn text_shape(content: &str) -> Shape {
        Shape::new(
            ShapeKind::Text {
                anchor: Point::new(10.0, 10.0),
                content: content.to_string(),
                font: Font::default(),
            },
            Style::default(),
        )
    }

    fn open(config: &mut SessionConfig, shapes: Vec<Shape>) -> Session {
        let doc = Document::from_shapes(shapes, config.grid).unwrap();
        Session::open(config, doc)
    }

    fn type_text(session: &mut Session, config: &mut SessionConfig, text: &str) {
        for c in text.chars() {
            session.handle_event(config, InputEvent::key(Key::Char(c)));
        }
    }

    #[test]
    fn test_edit_existing_text_is_undoable() {
        let mut config = SessionConfig::default().with_tool(Tool::Select);
        let shape = text_shape("ab");
        let id = shape.id.clone();
        let original = shape.clone();
        let mut session = open(&mut config, vec![shape]);
        session.selection = vec![id.clone()];

        session.handle_event(&mut config, InputEvent::key(Key::Enter));
        assert_eq!(session.state(), SessionState::EditingText);
        assert_eq!(session.text_input(), Some("ab"));
        type_text(&mut session, &mut config, "c");
        // Live preview replaces the stored content
        assert!(session.visible_shapes().iter().any(|s| matches!(
            &s.kind,
            ShapeKind::Text { content, .. } if content == "abc"
        )));

        let outcome = session.handle_event(&mut config, InputEvent::key(Key::Enter));
        assert_eq!(outcome, Outcome::Committed(Action::EditText));
        session.undo();
        assert_eq!(session.document().get(&id), Some(&original));
    }

    #[test]
    fn test_emptied_text_is_left_unchanged() {
        let mut config = SessionConfig::default().with_tool(Tool::Select);
        let shape = text_shape("a");
        let id = shape.id.clone();
        let mut session = open(&mut config, vec![shape]);
        session.selection = vec![id.clone()];
        session.handle_event(&mut config, InputEvent::key(Key::Enter));
        session.handle_event(&mut config, InputEvent::key(Key::Backspace));
        let outcome = session.handle_event(&mut config, InputEvent::key(Key::Enter));
        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(session.document().get(&id).map(|s| s.kind.clone()), Some(text_shape("a").kind));
    }

    #[test]
    fn test_click_elsewhere_commits_open_text() {
        let mut config = SessionConfig::default().with_tool(Tool::Text);
        config.grid.snap = false;
        let mut session = Session::new(&config);
        session.handle_event(&mut config, InputEvent::click(0.0, 0.0));
        type_text(&mut session, &mut config, "one");
        session.handle_event(&mut config, InputEvent::click(100.0, 0.0));
        assert_eq!(session.document().len(), 1);
        assert_eq!(session.state(), SessionState::EditingText);
        assert_eq!(session.text_input(), Some(""));
    }

    #[test]
    fn test_text_never_takes_a_label() {
        let mut config = SessionConfig::default().with_tool(Tool::Select);
        let shape = text_shape("t");
        let id = shape.id.clone();
        let mut session = open(&mut config, vec![shape]);
        session.selection = vec![id.clone()];
        let outcome = session.handle_event(&mut config, InputEvent::ctrl('l'));
        assert_eq!(outcome, Outcome::Ignored);
        assert!(session.is_idle());
    }

    #[test]
    fn test_ctrl_chars_are_not_typed() {
        let mut config = SessionConfig::default().with_tool(Tool::Text);
        let mut session = Session::new(&config);
        session.handle_event(&mut config, InputEvent::click(0.0, 0.0));
        session.handle_event(&mut config, InputEvent::ctrl('z'));
        assert_eq!(session.text_input(), Some(""));
    }
}
