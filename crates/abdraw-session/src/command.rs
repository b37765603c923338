//! Reversible document mutations.
//!
//! Every change the session makes to a document is a [`Command`] value that
//! carries enough state to apply it and to build its exact inverse. Commands
//! are built once a gesture completes, so a whole drag or resize is a single
//! value in the history.

use std::fmt;

use abdraw_core::{Document, DocumentError, Shape, ShapeId, ShapeType};
use tracing::warn;

use crate::error::CommandError;

/// What a command does, for status display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create(ShapeType),
    Paste,
    Delete,
    Move,
    Resize,
    FlipRouting,
    EditLabel,
    EditText,
    Restyle,
    BringToFront,
    SendToBack,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Create(shape_type) => write!(f, "Create {shape_type}"),
            Action::Paste => f.write_str("Paste"),
            Action::Delete => f.write_str("Delete"),
            Action::Move => f.write_str("Move"),
            Action::Resize => f.write_str("Resize"),
            Action::FlipRouting => f.write_str("Flip routing"),
            Action::EditLabel => f.write_str("Edit label"),
            Action::EditText => f.write_str("Edit text"),
            Action::Restyle => f.write_str("Restyle"),
            Action::BringToFront => f.write_str("Bring to front"),
            Action::SendToBack => f.write_str("Send to back"),
        }
    }
}

/// One shape's value before and after an edit
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeEdit {
    pub before: Shape,
    pub after: Shape,
}

impl ShapeEdit {
    pub fn new(before: Shape, after: Shape) -> Self {
        debug_assert_eq!(before.id, after.id);
        Self { before, after }
    }

    pub fn id(&self) -> &ShapeId {
        &self.after.id
    }

    pub fn is_noop(&self) -> bool {
        self.before == self.after
    }

    fn reversed(&self) -> ShapeEdit {
        ShapeEdit {
            before: self.after.clone(),
            after: self.before.clone(),
        }
    }
}

/// A recorded document mutation
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Shapes inserted at z-order positions, ascending
    Insert {
        action: Action,
        shapes: Vec<(usize, Shape)>,
    },
    /// Shapes removed from the z-order positions they held, ascending
    Remove {
        action: Action,
        shapes: Vec<(usize, Shape)>,
    },
    /// Whole-shape snapshots swapped in place
    Edit { action: Action, edits: Vec<ShapeEdit> },
    /// A new permutation of the document's z-order
    Reorder {
        action: Action,
        before: Vec<ShapeId>,
        after: Vec<ShapeId>,
    },
    /// Children applied in order and undone in reverse
    Composite {
        action: Action,
        commands: Vec<Command>,
    },
}

impl Command {
    /// Append shapes front-most, keeping their relative order
    pub fn insert(action: Action, doc: &Document, shapes: Vec<Shape>) -> Self {
        let base = doc.len();
        Command::Insert {
            action,
            shapes: shapes
                .into_iter()
                .enumerate()
                .map(|(i, shape)| (base + i, shape))
                .collect(),
        }
    }

    /// Remove the shapes with these ids. Unknown ids are skipped.
    pub fn remove(action: Action, doc: &Document, ids: &[ShapeId]) -> Self {
        let mut shapes: Vec<(usize, Shape)> = ids
            .iter()
            .filter_map(|id| Some((doc.index_of(id)?, doc.get(id)?.clone())))
            .collect();
        shapes.sort_by_key(|(index, _)| *index);
        shapes.dedup_by_key(|(index, _)| *index);
        Command::Remove { action, shapes }
    }

    /// Edit command; edits that change nothing are dropped
    pub fn edit(action: Action, edits: Vec<ShapeEdit>) -> Self {
        Command::Edit {
            action,
            edits: edits.into_iter().filter(|e| !e.is_noop()).collect(),
        }
    }

    pub fn reorder(action: Action, before: Vec<ShapeId>, after: Vec<ShapeId>) -> Self {
        Command::Reorder {
            action,
            before,
            after,
        }
    }

    /// Composite command; children with no effect are dropped
    pub fn composite(action: Action, commands: Vec<Command>) -> Self {
        Command::Composite {
            action,
            commands: commands.into_iter().filter(|c| !c.is_empty()).collect(),
        }
    }

    pub fn action(&self) -> Action {
        match self {
            Command::Insert { action, .. }
            | Command::Remove { action, .. }
            | Command::Edit { action, .. }
            | Command::Reorder { action, .. }
            | Command::Composite { action, .. } => *action,
        }
    }

    /// Whether applying the command would leave the document unchanged
    pub fn is_empty(&self) -> bool {
        match self {
            Command::Insert { shapes, .. } | Command::Remove { shapes, .. } => shapes.is_empty(),
            Command::Edit { edits, .. } => edits.is_empty(),
            Command::Reorder { before, after, .. } => before == after,
            Command::Composite { commands, .. } => commands.iter().all(Command::is_empty),
        }
    }

    /// Apply to `doc`. On error the document is left as it was.
    pub fn apply(&self, doc: &mut Document) -> Result<(), CommandError> {
        self.check(doc)?;
        match self {
            Command::Insert { shapes, .. } => {
                for (index, shape) in shapes {
                    doc.insert_at(*index, shape.clone())?;
                }
            }
            Command::Remove { shapes, .. } => {
                for (_, shape) in shapes.iter().rev() {
                    doc.remove(&shape.id);
                }
            }
            Command::Edit { edits, .. } => {
                for edit in edits {
                    doc.replace(edit.after.clone())?;
                }
            }
            Command::Reorder { after, .. } => doc.set_order(after)?,
            Command::Composite { commands, .. } => {
                for (done, command) in commands.iter().enumerate() {
                    if let Err(err) = command.apply(doc) {
                        for applied in commands[..done].iter().rev() {
                            if let Err(rollback) = applied.inverse().apply(doc) {
                                warn!(
                                    action = %applied.action(),
                                    %rollback,
                                    "composite rollback failed"
                                );
                            }
                        }
                        return Err(err);
                    }
                }
            }
        }
        Ok(())
    }

    /// Reject commands that would fail halfway through
    fn check(&self, doc: &Document) -> Result<(), DocumentError> {
        match self {
            Command::Insert { shapes, .. } => {
                for (i, (_, shape)) in shapes.iter().enumerate() {
                    let repeated = shapes[..i].iter().any(|(_, s)| s.id == shape.id);
                    if repeated || doc.contains(&shape.id) {
                        return Err(DocumentError::DuplicateId {
                            id: shape.id.clone(),
                        });
                    }
                }
            }
            Command::Remove { shapes, .. } => {
                if let Some((_, missing)) = shapes.iter().find(|(_, s)| !doc.contains(&s.id)) {
                    return Err(DocumentError::NotFound {
                        id: missing.id.clone(),
                    });
                }
            }
            Command::Edit { edits, .. } => {
                if let Some(missing) = edits.iter().find(|e| !doc.contains(e.id())) {
                    return Err(DocumentError::NotFound {
                        id: missing.id().clone(),
                    });
                }
            }
            Command::Reorder { .. } | Command::Composite { .. } => {}
        }
        Ok(())
    }

    /// The command that exactly undoes this one
    pub fn inverse(&self) -> Command {
        match self {
            Command::Insert { action, shapes } => Command::Remove {
                action: *action,
                shapes: shapes.clone(),
            },
            Command::Remove { action, shapes } => Command::Insert {
                action: *action,
                shapes: shapes.clone(),
            },
            Command::Edit { action, edits } => Command::Edit {
                action: *action,
                edits: edits.iter().rev().map(ShapeEdit::reversed).collect(),
            },
            Command::Reorder {
                action,
                before,
                after,
            } => Command::Reorder {
                action: *action,
                before: after.clone(),
                after: before.clone(),
            },
            Command::Composite { action, commands } => Command::Composite {
                action: *action,
                commands: commands.iter().rev().map(Command::inverse).collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abdraw_core::{ShapeKind, Style};
    use abdraw_geometry::Point;

    fn rect(x: f64) -> Shape {
        Shape::new(
            ShapeKind::Rectangle {
                start: Point::new(x, 0.0),
                end: Point::new(x + 10.0, 10.0),
            },
            Style::default(),
        )
    }

    fn doc_with(n: usize) -> Document {
        let mut doc = Document::new();
        for i in 0..n {
            doc.insert(rect(i as f64 * 20.0)).unwrap();
        }
        doc
    }

    fn round_trip(command: &Command, doc: &Document) {
        let mut work = doc.clone();
        command.apply(&mut work).unwrap();
        command.inverse().apply(&mut work).unwrap();
        assert_eq!(&work, doc);
    }

    #[test]
    fn test_insert_appends_front_most() {
        let doc = doc_with(2);
        let new = rect(100.0);
        let id = new.id.clone();
        let command = Command::insert(Action::Create(ShapeType::Rectangle), &doc, vec![new]);
        let mut work = doc.clone();
        command.apply(&mut work).unwrap();
        assert_eq!(work.index_of(&id), Some(2));
        round_trip(&command, &doc);
    }

    #[test]
    fn test_remove_restores_original_positions() {
        let doc = doc_with(5);
        let ids = doc.order();
        let command = Command::remove(Action::Delete, &doc, &[ids[3].clone(), ids[1].clone()]);
        let mut work = doc.clone();
        command.apply(&mut work).unwrap();
        assert_eq!(work.order(), [&ids[0], &ids[2], &ids[4]].map(Clone::clone));
        round_trip(&command, &doc);
    }

    #[test]
    fn test_edit_swaps_snapshots() {
        let doc = doc_with(1);
        let before = doc.shapes()[0].clone();
        let after = before.translated(Point::new(5.0, 5.0));
        let command = Command::edit(Action::Move, vec![ShapeEdit::new(before, after.clone())]);
        let mut work = doc.clone();
        command.apply(&mut work).unwrap();
        assert_eq!(work.get(&after.id), Some(&after));
        round_trip(&command, &doc);
    }

    #[test]
    fn test_noop_edits_are_dropped() {
        let doc = doc_with(1);
        let shape = doc.shapes()[0].clone();
        let command = Command::edit(Action::Move, vec![ShapeEdit::new(shape.clone(), shape)]);
        assert!(command.is_empty());
    }

    #[test]
    fn test_reorder_round_trip() {
        let doc = doc_with(3);
        let before = doc.order();
        let after = vec![before[2].clone(), before[0].clone(), before[1].clone()];
        let command = Command::reorder(Action::BringToFront, before, after.clone());
        let mut work = doc.clone();
        command.apply(&mut work).unwrap();
        assert_eq!(work.order(), after);
        round_trip(&command, &doc);
    }

    #[test]
    fn test_composite_inverts_in_reverse() {
        let doc = doc_with(2);
        let target = doc.shapes()[0].clone();
        let moved = target.translated(Point::new(1.0, 0.0));
        let command = Command::composite(
            Action::Delete,
            vec![
                Command::edit(Action::Move, vec![ShapeEdit::new(target.clone(), moved)]),
                Command::remove(Action::Delete, &doc, &[target.id.clone()]),
            ],
        );
        let mut work = doc.clone();
        command.apply(&mut work).unwrap();
        assert_eq!(work.len(), 1);
        round_trip(&command, &doc);
    }

    #[test]
    fn test_failed_apply_leaves_document_untouched() {
        let doc = doc_with(2);
        let existing = doc.shapes()[1].clone();
        let command = Command::Insert {
            action: Action::Paste,
            shapes: vec![(0, rect(500.0)), (1, existing.clone())],
        };
        let mut work = doc.clone();
        let err = command.apply(&mut work).unwrap_err();
        assert_eq!(
            err,
            CommandError::Document(DocumentError::DuplicateId {
                id: existing.id.clone()
            })
        );
        assert_eq!(work, doc);
    }

    #[test]
    fn test_composite_rolls_back_on_failure() {
        let doc = doc_with(2);
        let first = doc.shapes()[0].clone();
        let stranger = rect(900.0);
        let command = Command::Composite {
            action: Action::Delete,
            commands: vec![
                Command::remove(Action::Delete, &doc, &[first.id.clone()]),
                Command::Edit {
                    action: Action::Move,
                    edits: vec![ShapeEdit::new(stranger.clone(), stranger.translated(Point::new(1.0, 1.0)))],
                },
            ],
        };
        let mut work = doc.clone();
        assert!(command.apply(&mut work).is_err());
        assert_eq!(work, doc);
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::Create(ShapeType::OrthoArrow).to_string(), "Create orthoarrow");
        assert_eq!(Action::FlipRouting.to_string(), "Flip routing");
    }
}
