use crate::config::Tolerance;
use crate::constraint::*;
use crate::document::GroupId;
use crate::geometry::{ApproxEq, CircArc3, Line3, LineSeg3, Point3, Vector3};
use std::f64::consts::{FRAC_PI_2, PI};

fn node(kind: NodeKind) -> ConstrainedGeometry {
    ConstrainedGeometry::new(NodeBase::new(NodeId(1), GroupId(1)), kind)
}

fn quarter_arc() -> ConstrainedGeometry {
    node(NodeKind::Arc(ArcNode::new(CircArc3::new(
        Point3::origin(),
        Vector3::z(),
        Vector3::x(),
        1.0,
        0.0,
        FRAC_PI_2,
    ))))
}

#[test]
fn test_tracked_captures_once_until_commit() {
    let mut t = Tracked::new(1);
    assert!(!t.has_original());

    *t.edit() = 2;
    t.replace(3);
    assert_eq!(*t.current(), 3);
    // Edits between commits are coalesced.
    assert_eq!(*t.original(), 1);

    t.commit();
    assert!(!t.has_original());
    assert_eq!(*t.original(), 3);
}

#[test]
fn test_implicit_kind_wire_parts() {
    let define = ImplicitPointKind::Define(7);
    assert_eq!(ImplicitPointKind::from_parts(define.tag(), define.define_index()), Ok(define));
    assert_eq!(ImplicitPointKind::Center.define_index(), NO_DEFINE_INDEX);
    assert!(ImplicitPointKind::from_parts(9, -1).is_err());
    assert!(ImplicitPointKind::from_parts(4, -1).is_err());
    assert_eq!(ImplicitPointKind::Start.with_ends_swapped(), ImplicitPointKind::End);
    assert_eq!(ImplicitPointKind::Mid.with_ends_swapped(), ImplicitPointKind::Mid);
}

#[test]
fn test_arc_points_agree_with_stored_angles() {
    let mut arc = quarter_arc();
    arc.set_point(ImplicitPointKind::End, &Point3::new(-3.0, 0.0, 0.0)).expect("set end");

    let circle = arc.circle_arc().expect("arc");
    let start = arc.point(ImplicitPointKind::Start).expect("start");
    let end = arc.point(ImplicitPointKind::End).expect("end");
    // The end was projected through the circle, not stored as given.
    assert!(end.approx_eq(&Point3::new(-1.0, 0.0, 0.0)));
    assert!((circle.param_of(&start) - circle.start_angle).abs() < 1e-9);
    assert!((circle.param_of(&end) - circle.end_angle).abs() < 1e-9);

    let mid = arc.point(ImplicitPointKind::Mid).expect("mid");
    assert!((circle.param_of(&mid) - 0.5 * (circle.start_angle + circle.end_angle)).abs() < 1e-9);
    assert!(mid.approx_eq(&Point3::new(0.0, 1.0, 0.0)));
}

#[test]
fn test_original_point_survives_edits() {
    let mut arc = quarter_arc();
    arc.set_point(ImplicitPointKind::Center, &Point3::new(5.0, 0.0, 0.0)).expect("move centre");
    assert!(arc.base.dirty);
    assert!(arc
        .original_point(ImplicitPointKind::Center)
        .expect("original")
        .approx_eq(&Point3::origin()));
    arc.commit();
    assert!(arc
        .original_point(ImplicitPointKind::Center)
        .expect("original")
        .approx_eq(&Point3::new(5.0, 0.0, 0.0)));
}

#[test]
fn test_unsupported_points_are_bad_obj_type() {
    let mut arc = quarter_arc();
    assert!(arc.set_point(ImplicitPointKind::Mid, &Point3::origin()).unwrap_err().is_bad_obj_type());

    let circle = node(NodeKind::Circle(CircleNode::new(Point3::origin(), 2.0)));
    assert!(circle.point(ImplicitPointKind::Start).unwrap_err().is_bad_obj_type());

    let line = node(NodeKind::Line(LineNode::new(Line3::new(Point3::origin(), Vector3::x()))));
    assert!(line.point(ImplicitPointKind::Start).unwrap_err().is_bad_obj_type());
    assert!(line.circle_arc().unwrap_err().is_bad_obj_type());
}

#[test]
fn test_bounded_line_points() {
    let mut seg = node(NodeKind::BoundedLine(BoundedLineNode::new(LineSeg3::new(
        Point3::origin(),
        Point3::new(4.0, 0.0, 0.0),
    ))));
    assert!(seg.point(ImplicitPointKind::Mid).expect("mid").approx_eq(&Point3::new(2.0, 0.0, 0.0)));
    seg.set_point(ImplicitPointKind::End, &Point3::new(4.0, 2.0, 0.0)).expect("set end");
    assert!(seg.point(ImplicitPointKind::Mid).expect("mid").approx_eq(&Point3::new(2.0, 1.0, 0.0)));

    let ray = node(NodeKind::BoundedLine(BoundedLineNode::ray(Point3::origin(), Vector3::y())));
    assert!(ray.point(ImplicitPointKind::End).is_err());
    assert_eq!(ray.kind.implicit_kinds(), vec![ImplicitPointKind::Start]);
}

#[test]
fn test_geom_eq_requires_same_kind_and_tolerance() {
    let tol = Tolerance::default();
    let a = quarter_arc();
    let mut b = quarter_arc();
    assert!(a.geom_eq(&b, &tol));

    b.set_point(ImplicitPointKind::Center, &Point3::new(1e-8, 0.0, 0.0)).expect("nudge");
    assert!(a.geom_eq(&b, &tol));
    b.set_point(ImplicitPointKind::Center, &Point3::new(1e-3, 0.0, 0.0)).expect("move");
    assert!(!a.geom_eq(&b, &tol));

    let circle = node(NodeKind::Circle(CircleNode::new(Point3::origin(), 1.0)));
    assert!(!a.geom_eq(&circle, &tol));
}

#[test]
fn test_reversed_arc_is_not_equal() {
    let tol = Tolerance::default();
    let a = quarter_arc();
    let mut b = quarter_arc();
    let reversed = b.circle_arc().expect("arc").reversed();
    b.set_circle_arc(reversed).expect("set");
    assert!(!a.geom_eq(&b, &tol));
    assert!(b
        .point(ImplicitPointKind::Start)
        .expect("start")
        .approx_eq(&a.point(ImplicitPointKind::End).expect("end")));
    assert!((reversed.sweep() - FRAC_PI_2).abs() < 1e-9);
    assert!(reversed.end_angle <= reversed.start_angle + 2.0 * PI);
}

#[test]
fn test_nodes_serialize() {
    let arc = quarter_arc();
    let json = serde_json::to_string(&arc).expect("serialize");
    let back: ConstrainedGeometry = serde_json::from_str(&json).expect("deserialize");
    assert!(arc.geom_eq(&back, &Tolerance::default()));
}
