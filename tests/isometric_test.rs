use isometric_tools::{
    Axis, COS_30, Drawable, Group, IsometricError, Line, PlaneType, Point, Shape, Size,
    apply_plane, apply_plane_by_name, combined_bounds, flatten, make_plane, scale_axis, skew_y,
};

const EPS: f64 = 1e-9;

fn rect(id: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> Drawable {
    Shape::polygon(&[
        Point::new(x0, y0),
        Point::new(x1, y0),
        Point::new(x1, y1),
        Point::new(x0, y1),
    ])
    .with_id(id)
    .into()
}

fn shape(d: &Drawable) -> &Shape {
    match d {
        Drawable::Shape(s) => s,
        other => panic!("expected shape, got {other:?}"),
    }
}

fn assert_point(got: Point, x: f64, y: f64) {
    assert!(
        got.fuzzy_eq(&Point::new(x, y), 1e-6),
        "{got:?} != ({x}, {y})"
    );
}

/// Wrap `leaf` in `depth` nested groups
fn nest(leaf: Drawable, depth: usize) -> Drawable {
    (0..depth).fold(leaf, |inner, _| Group::new(vec![inner]).into())
}

mod engine_tests {
    use super::*;

    #[test]
    fn test_skew_y_is_identity_at_zero_and_fixes_anchor_column() {
        let pts = vec![
            Point::new(3.0, 1.0),
            Point::new(3.0, 9.0),
            Point::new(-2.0, 4.0),
        ];
        assert_eq!(skew_y(&pts, 0.0, 17.0), pts);

        let out = skew_y(&pts, 30.0, 3.0);
        assert_eq!(out[0], pts[0]);
        assert_eq!(out[1], pts[1]);
        assert!((out[2].y - (4.0 - 5.0 * 30f64.to_radians().tan())).abs() < EPS);
        assert_eq!(out[2].x, -2.0);
    }

    #[test]
    fn test_scale_axis_composes_multiplicatively() {
        let s = Size::new(12.0, 7.0);
        let stepwise = scale_axis(scale_axis(s, Axis::Y, 2.0), Axis::Y, COS_30);
        let direct = scale_axis(s, Axis::Y, 2.0 * COS_30);
        assert!((stepwise.height - direct.height).abs() < EPS);
        assert_eq!(stepwise.width, 12.0);
    }

    #[test]
    fn test_flatten_ignores_nesting_depth() {
        let shallow = vec![rect("a", 0.0, 0.0, 1.0, 1.0), rect("b", 2.0, 0.0, 3.0, 1.0)];
        let deep = vec![
            nest(rect("a", 0.0, 0.0, 1.0, 1.0), 50),
            Group::new(vec![nest(rect("b", 2.0, 0.0, 3.0, 1.0), 7)]).into(),
        ];

        let ids = |nodes: &[Drawable]| -> Vec<Option<String>> {
            flatten(nodes)
                .iter()
                .map(|l| l.id().map(str::to_string))
                .collect()
        };
        assert_eq!(ids(&shallow), ids(&deep));
    }

    #[test]
    fn test_flatten_handles_very_deep_nesting() {
        let deep = vec![nest(rect("deep", 0.0, 0.0, 1.0, 1.0), 1_000)];
        let leaves = flatten(&deep);
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].id(), Some("deep"));
    }

    #[test]
    fn test_combined_bounds_is_union() {
        let nodes = vec![
            rect("a", 0.0, 0.0, 10.0, 10.0),
            Group::new(vec![rect("b", 5.0, 5.0, 20.0, 20.0)]).into(),
        ];
        let b = combined_bounds(flatten(&nodes)).unwrap();
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (0.0, 0.0, 20.0, 20.0));

        let empty: Vec<Drawable> = Vec::new();
        assert!(combined_bounds(flatten(&empty)).is_none());
    }

    #[test]
    fn test_left_and_right_differ_in_skew_sign() {
        let pts = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        let origin = Point::new(0.0, 0.0);
        let left = make_plane(&pts, PlaneType::Left, origin);
        let right = make_plane(&pts, PlaneType::Right, origin);
        assert!(left[1].y > 0.0);
        assert!(right[1].y < 0.0);
        assert!((left[1].y + right[1].y).abs() < EPS);
        assert!((left[1].x - right[1].x).abs() < EPS);
    }

    #[test]
    fn test_unit_square_on_left_plane() {
        let mut selection = vec![rect("sq", 0.0, 0.0, 10.0, 10.0)];
        assert_eq!(apply_plane(&mut selection, PlaneType::Left, None), 1);

        let s = shape(&selection[0]);
        let corners: Vec<Point> = s.anchors().copied().collect();
        let w = 10.0 * COS_30;
        assert_point(corners[0], 0.0, 0.0);
        assert_point(corners[1], w, 5.0);
        assert_point(corners[2], w, 15.0);
        assert_point(corners[3], 0.0, 10.0);
        assert_eq!(s.rotation, 0.0);

        assert_point(s.geometry.origin, 0.0, 0.0);
        assert!((s.geometry.size.width - w).abs() < 1e-6);
        assert!((s.geometry.size.height - 15.0).abs() < 1e-6);
    }

    #[test]
    fn test_top_planes_adjust_rotation() {
        let mut selection = vec![rect("a", 0.0, 0.0, 4.0, 4.0), rect("b", 5.0, 0.0, 9.0, 4.0)];
        apply_plane(&mut selection, PlaneType::TopLeft, None);
        assert_eq!(shape(&selection[0]).rotation, 60.0);
        assert_eq!(shape(&selection[1]).rotation, 60.0);

        apply_plane(&mut selection, PlaneType::TopRight, None);
        assert_eq!(shape(&selection[0]).rotation, 0.0);
    }

    #[test]
    fn test_top_plane_keeps_grouped_squares_joined() {
        let mut selection: Vec<Drawable> = vec![
            Group::new(vec![
                rect("a", 0.0, 0.0, 10.0, 10.0),
                rect("b", 10.0, 0.0, 20.0, 10.0),
            ])
            .into(),
        ];
        apply_plane(&mut selection, PlaneType::TopLeft, None);

        let Drawable::Group(g) = &selection[0] else {
            panic!("expected group");
        };
        let (a, b) = (shape(&g.children[0]), shape(&g.children[1]));
        let drawn = |s: &Shape| -> Vec<Point> {
            let xf = s.rotation_xform();
            s.anchors().map(|p| xf.transform_point(*p)).collect()
        };
        let (a_drawn, b_drawn) = (drawn(a), drawn(b));

        // a's right edge is b's left edge, before and after rotation
        assert_point(a_drawn[1], b_drawn[0].x, b_drawn[0].y);
        assert_point(a_drawn[2], b_drawn[3].x, b_drawn[3].y);
        assert_eq!(a.rotation_pivot(), b.rotation_pivot());
    }

    #[test]
    fn test_invalid_plane_leaves_selection_untouched() {
        let mut selection = vec![rect("a", 0.0, 0.0, 10.0, 10.0)];
        let before = selection.clone();
        let result = apply_plane_by_name(&mut selection, "diagonal", None);
        assert!(matches!(result, Err(IsometricError::InvalidArgument(_))));
        assert_eq!(selection, before);
    }

    #[test]
    fn test_selection_shares_one_origin() {
        // A sits right of B; the shared origin is B's left edge, not A's
        let mut selection = vec![
            rect("a", 10.0, 0.0, 20.0, 10.0),
            Group::new(vec![rect("b", 0.0, 0.0, 5.0, 5.0)]).into(),
        ];
        apply_plane(&mut selection, PlaneType::Left, None);

        let a = shape(&selection[0]);
        let first = a.anchors().next().copied().unwrap();
        assert_point(first, 10.0 * COS_30, 5.0);

        let Drawable::Group(g) = &selection[1] else {
            panic!("expected group");
        };
        let b = shape(&g.children[0]);
        assert_point(b.anchors().next().copied().unwrap(), 0.0, 0.0);
    }

    #[test]
    fn test_lines_are_transformed_with_shapes() {
        let mut selection: Vec<Drawable> = vec![
            rect("a", 0.0, 0.0, 10.0, 10.0),
            Line::new(vec![Point::new(0.0, 20.0), Point::new(10.0, 20.0)])
                .with_id("l")
                .into(),
        ];
        assert_eq!(apply_plane(&mut selection, PlaneType::Right, None), 2);

        let Drawable::Line(l) = &selection[1] else {
            panic!("expected line");
        };
        assert_point(l.points[0], 0.0, 20.0);
        assert_point(l.points[1], 10.0 * COS_30, 15.0);
    }

    #[test]
    fn test_labels_follow_the_plane() {
        let mut labelled = Shape::polygon(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ]);
        labelled.label = Some(isometric_tools::Label::new("Side", 0.0));
        let mut selection: Vec<Drawable> = vec![labelled.into()];

        apply_plane(&mut selection, PlaneType::Right, None);
        let s = shape(&selection[0]);
        assert_eq!(s.label.as_ref().unwrap().rotation, -30.0);
    }
}
