use abdraw_core::{Document, GridSettings, Shape, ShapeKind, ShapeType, Style};
use abdraw_geometry::Point;
use abdraw_session::{Action, Command, History, ShapeEdit};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Create(f64, f64, f64, f64),
    Delete(usize),
    Move(usize, f64, f64),
    Front(usize),
    Back(usize),
    Label(usize, String),
}

fn coord() -> impl Strategy<Value = f64> {
    (-400i32..400).prop_map(|v| f64::from(v) / 2.0)
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (coord(), coord(), 1i32..100, 1i32..100)
            .prop_map(|(x, y, w, h)| Op::Create(x, y, x + f64::from(w), y + f64::from(h))),
        any::<usize>().prop_map(Op::Delete),
        (any::<usize>(), coord(), coord()).prop_map(|(i, dx, dy)| Op::Move(i, dx, dy)),
        any::<usize>().prop_map(Op::Front),
        any::<usize>().prop_map(Op::Back),
        (any::<usize>(), "[a-z]{0,6}").prop_map(|(i, text)| Op::Label(i, text)),
    ]
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Shape {
    Shape::new(
        ShapeKind::Rectangle {
            start: Point::new(x0, y0),
            end: Point::new(x1, y1),
        },
        Style::default(),
    )
}

fn initial_doc() -> impl Strategy<Value = Document> {
    prop::collection::vec((coord(), coord(), 1i32..80), 0..6).prop_map(|specs| {
        let shapes = specs
            .into_iter()
            .map(|(x, y, s)| rect(x, y, x + f64::from(s), y + f64::from(s)))
            .collect();
        Document::from_shapes(shapes, GridSettings::default()).unwrap()
    })
}

/// Command an op stands for against the current document
fn command_for(op: &Op, doc: &Document) -> Option<Command> {
    let pick = |i: usize| (!doc.is_empty()).then(|| doc.shapes()[i % doc.len()].clone());
    let command = match op {
        Op::Create(x0, y0, x1, y1) => Command::insert(
            Action::Create(ShapeType::Rectangle),
            doc,
            vec![rect(*x0, *y0, *x1, *y1)],
        ),
        Op::Delete(i) => Command::remove(Action::Delete, doc, &[pick(*i)?.id]),
        Op::Move(i, dx, dy) => {
            let before = pick(*i)?;
            let after = before.translated(Point::new(*dx, *dy));
            Command::edit(Action::Move, vec![ShapeEdit::new(before, after)])
        }
        Op::Front(i) | Op::Back(i) => {
            let id = pick(*i)?.id;
            let mut reordered = doc.clone();
            let action = if matches!(op, Op::Front(_)) {
                reordered.bring_to_front(&id);
                Action::BringToFront
            } else {
                reordered.send_to_back(&id);
                Action::SendToBack
            };
            Command::reorder(action, doc.order(), reordered.order())
        }
        Op::Label(i, text) => {
            let before = pick(*i)?;
            let after = before.with_label_text(text);
            Command::edit(Action::EditLabel, vec![ShapeEdit::new(before, after)])
        }
    };
    (!command.is_empty()).then_some(command)
}

proptest! {
    #[test]
    fn undo_all_restores_initial_document(
        initial in initial_doc(),
        ops in prop::collection::vec(op(), 0..30),
    ) {
        let mut doc = initial.clone();
        let mut history = History::default();
        for op in &ops {
            if let Some(command) = command_for(op, &doc) {
                history.execute(command, &mut doc).unwrap();
            }
        }
        let last = doc.clone();

        while history.undo(&mut doc).unwrap().is_some() {}
        prop_assert_eq!(&doc, &initial);

        while history.redo(&mut doc).unwrap().is_some() {}
        prop_assert_eq!(&doc, &last);
    }

    #[test]
    fn command_then_inverse_is_identity(
        initial in initial_doc(),
        op in op(),
    ) {
        let Some(command) = command_for(&op, &initial) else {
            return Ok(());
        };
        let mut doc = initial.clone();
        command.apply(&mut doc).unwrap();
        command.inverse().apply(&mut doc).unwrap();
        prop_assert_eq!(doc, initial);
    }

    #[test]
    fn stacks_stay_within_capacity(
        capacity in 1usize..8,
        ops in prop::collection::vec(op(), 0..40),
        undo_steps in 0usize..10,
    ) {
        let mut doc = Document::new();
        let mut history = History::new(capacity);
        for op in &ops {
            if let Some(command) = command_for(op, &doc) {
                history.execute(command, &mut doc).unwrap();
                prop_assert!(history.undo_len() <= capacity);
                prop_assert!(!history.can_redo());
            }
        }

        let recorded = history.undo_len();
        for _ in 0..undo_steps {
            history.undo(&mut doc).unwrap();
        }
        prop_assert!(history.redo_len() <= capacity);
        prop_assert_eq!(history.undo_len() + history.redo_len(), recorded);

        if let Some(command) = command_for(&Op::Create(0.0, 0.0, 10.0, 10.0), &doc) {
            history.execute(command, &mut doc).unwrap();
            prop_assert!(!history.can_redo());
        }
    }
}
