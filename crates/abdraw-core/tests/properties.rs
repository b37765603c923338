use abdraw_core::{
    Color, Corner, Document, Font, GridKind, GridSettings, HandleKind, Shape, ShapeKind, SnapIndex,
    Style, from_json, is_square, to_json,
};
use abdraw_geometry::{Point, Routing};
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = f64> {
    (-4000i32..4000).prop_map(|v| f64::from(v) / 4.0)
}

fn point() -> impl Strategy<Value = Point> {
    (coord(), coord()).prop_map(|(x, y)| Point::new(x, y))
}

fn area_corners() -> impl Strategy<Value = (Point, Point)> {
    (point(), 1i32..400, 1i32..400).prop_map(|(a, w, h)| {
        (a, Point::new(a.x + f64::from(w), a.y + f64::from(h)))
    })
}

fn square_corners() -> impl Strategy<Value = (Point, Point)> {
    (point(), 1i32..400).prop_map(|(a, side)| {
        (a, Point::new(a.x + f64::from(side), a.y + f64::from(side)))
    })
}

fn kind() -> impl Strategy<Value = ShapeKind> {
    let routing = prop_oneof![Just(Routing::HorizontalFirst), Just(Routing::VerticalFirst)];
    prop_oneof![
        area_corners().prop_map(|(start, end)| ShapeKind::Rectangle { start, end }),
        area_corners().prop_map(|(start, end)| ShapeKind::Ellipse { start, end }),
        area_corners().prop_map(|(start, end)| ShapeKind::Triangle { start, end }),
        square_corners().prop_map(|(start, end)| ShapeKind::Square { start, end }),
        square_corners().prop_map(|(start, end)| ShapeKind::Circle { start, end }),
        (point(), point())
            .prop_filter("distinct endpoints", |(a, b)| a != b)
            .prop_map(|(start, end)| ShapeKind::Line { start, end }),
        (point(), point())
            .prop_filter("distinct endpoints", |(a, b)| a != b)
            .prop_map(|(start, end)| ShapeKind::Arrow { start, end }),
        (prop::collection::vec(point(), 2..6), routing.clone())
            .prop_map(|(waypoints, routing)| ShapeKind::OrthoLine { waypoints, routing }),
        (prop::collection::vec(point(), 2..6), routing)
            .prop_map(|(waypoints, routing)| ShapeKind::OrthoArrow { waypoints, routing }),
        (point(), "[a-z ]{0,12}", 6u8..40).prop_map(|(anchor, content, size)| ShapeKind::Text {
            anchor,
            content,
            font: Font {
                size: f64::from(size),
                ..Font::default()
            },
        }),
    ]
}

fn shape() -> impl Strategy<Value = Shape> {
    (kind(), prop::option::of("[a-z]{1,8}"), prop::option::of(Just("red")), 1u8..6).prop_map(
        |(kind, label, fill, width)| {
            let shape = Shape::new(
                kind,
                Style {
                    stroke: Color::new("black"),
                    fill: fill.map(Color::new),
                    width: f64::from(width),
                },
            );
            match label {
                Some(text) => shape.with_label_text(&text),
                None => shape,
            }
        },
    )
}

fn document() -> impl Strategy<Value = Document> {
    (
        prop::collection::vec(shape(), 0..8),
        10u32..=50,
        any::<bool>(),
        prop_oneof![Just(GridKind::Dot), Just(GridKind::Line)],
    )
        .prop_map(|(shapes, spacing, snap, kind)| {
            let grid = GridSettings {
                kind,
                spacing,
                snap,
                visible: true,
            };
            let mut doc = Document::with_grid(grid);
            for s in shapes {
                doc.insert(s).expect("fresh ids are unique");
            }
            doc
        })
}

fn corner() -> impl Strategy<Value = Corner> {
    prop_oneof![
        Just(Corner::TopLeft),
        Just(Corner::TopRight),
        Just(Corner::BottomRight),
        Just(Corner::BottomLeft),
    ]
}

proptest! {
    #[test]
    fn load_of_save_is_identity(doc in document()) {
        let json = to_json(&doc).unwrap();
        prop_assert_eq!(from_json(&json).unwrap(), doc);
    }

    #[test]
    fn square_resize_keeps_sides_equal(
        (start, end) in square_corners(),
        corner in corner(),
        target in point(),
    ) {
        let square = Shape::new(ShapeKind::Square { start, end }, Style::default());
        let resized = square.resize(HandleKind::Corner(corner), target);
        prop_assert!(is_square(&resized.bounds()));
        prop_assert!(resized.is_well_formed());
    }

    #[test]
    fn circle_resize_keeps_sides_equal(
        (start, end) in square_corners(),
        corner in corner(),
        target in point(),
    ) {
        let circle = Shape::new(ShapeKind::Circle { start, end }, Style::default());
        let resized = circle.resize(HandleKind::Corner(corner), target);
        prop_assert!(is_square(&resized.bounds()));
        prop_assert_eq!(resized.bounds().center(), circle.bounds().center());
    }

    #[test]
    fn resize_never_breaks_well_formed_shapes(s in shape(), target in point(), pick in 0usize..8) {
        let handles = s.handles();
        if let Some(handle) = handles.get(pick % handles.len().max(1)) {
            prop_assert!(s.resize(handle.kind, target).is_well_formed());
        }
    }

    #[test]
    fn nearest_snap_stays_within_radius(doc in document(), p in point(), radius in 1.0f64..60.0) {
        let index = SnapIndex::build(&doc);
        if let Some(snap) = index.nearest_snap(p, None, radius) {
            prop_assert!(snap.position.distance_to(p) <= radius);
            let best = index
                .iter()
                .map(|s| s.position.distance_to(p))
                .fold(f64::INFINITY, f64::min);
            prop_assert_eq!(snap.position.distance_to(p), best);
        }
    }
}
