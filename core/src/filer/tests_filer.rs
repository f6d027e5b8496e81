use super::*;
use crate::config::Tolerance;
use crate::constraint::*;
use crate::document::{DependencyId, GroupId};
use crate::error::AssocError;
use crate::geometry::{
    ApproxEq, CircArc3, EllipArc3, KnotVector, LineSeg3, Line3, Matrix4, NurbsCurve3, Point3, Vector3,
};
use crate::persist::EdgeIdentity;
use std::f64::consts::FRAC_PI_2;

fn base(id: u32, dependency: Option<u32>) -> NodeBase {
    let mut base = NodeBase::new(NodeId(id), GroupId(3));
    base.dependency = dependency.map(DependencyId);
    base
}

fn periodic_spline() -> SplineNode {
    let points = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
        Point3::new(2.0, 2.0, 0.0),
        Point3::new(0.0, 0.0, 0.0),
    ];
    // Knots sized for the three distinct points: the repeat is a wrap point.
    let knots = KnotVector::new((0..6).map(f64::from).collect());
    let mut spline = SplineNode::from_curve(NurbsCurve3::new(2, knots, points, vec![1.0, 0.5, 1.0, 1.0], true));
    spline.define_ids = vec![NodeId(20), NodeId(21), NodeId(22)];
    spline
}

/// One node of every kind.
fn sample_nodes() -> Vec<ConstrainedGeometry> {
    let kinds = vec![
        NodeKind::Line(LineNode::new(Line3::new(Point3::new(1.0, 2.0, 0.0), Vector3::new(1.0, 1.0, 0.0)))),
        NodeKind::BoundedLine(BoundedLineNode::new(LineSeg3::new(Point3::origin(), Point3::new(3.0, 4.0, 0.0)))),
        NodeKind::BoundedLine(BoundedLineNode::ray(Point3::new(1.0, 0.0, 0.0), Vector3::y())),
        NodeKind::ConstructionLine(ConstructionLineNode::two_point([NodeId(11), NodeId(12)])),
        NodeKind::ConstructionLine(ConstructionLineNode::datum(NodeId(11), Vector3::new(0.0, 1.0, 0.0))),
        NodeKind::Circle(CircleNode::new(Point3::new(5.0, 5.0, 0.0), 2.5)),
        NodeKind::Arc(ArcNode::new(CircArc3::new(
            Point3::origin(),
            Vector3::z(),
            Vector3::x(),
            1.5,
            0.25,
            FRAC_PI_2 + 1.0,
        ))),
        NodeKind::Ellipse(EllipseNode::new(EllipArc3::full(
            Point3::origin(),
            Vector3::z(),
            Vector3::x(),
            3.0,
            1.0,
        ))),
        NodeKind::BoundedEllipse(BoundedEllipseNode::new(EllipArc3::new(
            Point3::new(1.0, 1.0, 0.0),
            Vector3::z(),
            Vector3::y(),
            2.0,
            1.0,
            0.5,
            2.5,
        ))),
        NodeKind::Spline(periodic_spline()),
        NodeKind::ImplicitPoint(ImplicitPointNode::new(ImplicitPointKind::Define(2), NodeId(10))),
        NodeKind::ImplicitPoint(ImplicitPointNode::new(ImplicitPointKind::Center, NodeId(10))),
        NodeKind::RigidSet({
            let mut set = RigidSetNode::new(vec![NodeId(1), NodeId(2)]);
            set.set_transform(Matrix4::new_translation(&Vector3::new(1.0, -2.0, 0.5)));
            set
        }),
    ];
    kinds
        .into_iter()
        .enumerate()
        .map(|(i, kind)| {
            let dependency = kind.is_curve().then_some(i as u32 + 1);
            ConstrainedGeometry::new(base(i as u32 + 1, dependency), kind)
        })
        .collect()
}

#[test]
fn test_binary_round_trip_every_kind() {
    let tol = Tolerance::default();
    for node in sample_nodes() {
        let mut filer = MemoryDwgFiler::new();
        node.dwg_out_fields(&mut filer);
        let back = ConstrainedGeometry::dwg_in_fields(&mut filer, node.base.id).expect("read back");
        assert!(filer.is_exhausted(), "{} left fields unread", node.kind.name());
        assert!(node.geom_eq(&back, &tol), "{} changed on the round trip", node.kind.name());
        assert_eq!(back.base, node.base);
    }
}

#[test]
fn test_tagged_round_trip_every_kind() {
    let tol = Tolerance::default();
    for node in sample_nodes() {
        let mut filer = MemoryDxfFiler::new();
        node.dxf_out_fields(&mut filer);
        let back = ConstrainedGeometry::dxf_in_fields(&mut filer, node.base.id).expect("read back");
        assert!(filer.is_exhausted(), "{} left pairs unread", node.kind.name());
        assert!(node.geom_eq(&back, &tol), "{} changed on the round trip", node.kind.name());
        assert_eq!(back.base.dependency, node.base.dependency);
    }
}

#[test]
fn test_prefix_layout() {
    let node = ConstrainedGeometry::new(base(4, None), NodeKind::Circle(CircleNode::default()));
    let mut filer = MemoryDxfFiler::new();
    node.dxf_out_fields(&mut filer);
    let pairs = filer.pairs();
    assert_eq!(pairs[0].0, dxf_code::KIND);
    assert_eq!(pairs[1], (dxf_code::ID, FieldValue::I32(3)));
    // Unbound nodes file dependency 0.
    assert_eq!(pairs[2], (dxf_code::ID, FieldValue::I32(0)));
    assert_eq!(pairs[3].0, dxf_code::POINT);
}

#[test]
fn test_spline_arrays_and_wrap_point_survive() {
    let spline = periodic_spline();
    let node = ConstrainedGeometry::new(base(10, Some(1)), NodeKind::Spline(spline.clone()));
    let mut filer = MemoryDwgFiler::new();
    node.dwg_out_fields(&mut filer);

    // degree, periodic, then knots as (logical, physical, grow, elements).
    assert_eq!(filer.fields()[5], FieldValue::I32(6));
    assert_eq!(filer.fields()[6], FieldValue::I32(6));
    assert_eq!(filer.fields()[7], FieldValue::I32(ARRAY_GROW_LENGTH));

    let back = ConstrainedGeometry::dwg_in_fields(&mut filer, NodeId(10)).expect("read back");
    let NodeKind::Spline(read) = &back.kind else { panic!("spline expected") };
    assert_eq!(read.define_ids, spline.define_ids);
    assert_eq!(read.weights, spline.weights);
    assert_eq!(read.control_points.len(), 3);
    assert!(read.mirrors_wrap_point());
    assert_eq!(read.nurbs.current().num_control_points(), 4);
    assert!(read.nurbs.current().control_points[3].approx_eq(&read.control_points[0]));
    assert!(!read.nurbs.has_original());
}

#[test]
fn test_session_state_is_not_filed() {
    let mut node = sample_nodes().remove(6);
    node.set_point(ImplicitPointKind::Center, &Point3::new(9.0, 9.0, 0.0)).expect("edit");
    assert!(node.has_original());
    let mut filer = MemoryDwgFiler::new();
    node.dwg_out_fields(&mut filer);
    let back = ConstrainedGeometry::dwg_in_fields(&mut filer, node.base.id).expect("read back");
    assert!(!back.has_original());
    assert!(!back.base.dirty);
    assert!(back.point(ImplicitPointKind::Center).expect("centre") == Point3::new(9.0, 9.0, 0.0));
}

#[test]
fn test_code_mismatch_is_bad_dxf_sequence() {
    let node = ConstrainedGeometry::new(base(1, Some(2)), NodeKind::Circle(CircleNode::default()));
    let mut filer = MemoryDxfFiler::new();
    node.dxf_out_fields(&mut filer);

    let mut tampered = MemoryDxfFiler::new();
    for (i, (code, value)) in filer.pairs().iter().enumerate() {
        // The radius is filed under 40; file it under 41 instead.
        let code = if i == 6 { 41 } else { *code };
        tampered.push(code, *value);
    }
    let err = ConstrainedGeometry::dxf_in_fields(&mut tampered, NodeId(1)).unwrap_err();
    assert_eq!(
        err,
        AssocError::BadDxfSequence {
            expected: dxf_code::REAL,
            found: 41
        }
    );
}

#[test]
fn test_mismatch_consumes_nothing() {
    let mut filer = MemoryDxfFiler::new();
    filer.write_i32(dxf_code::ID, 7);
    assert!(filer.read_i32_expect(dxf_code::KIND).is_err());
    assert_eq!(filer.peek_code(), Some(dxf_code::ID));
    assert_eq!(filer.read_i32_expect(dxf_code::ID), Ok(7));
    assert_eq!(
        filer.read_bool_expect(dxf_code::BOOL),
        Err(AssocError::BadDxfSequence {
            expected: dxf_code::BOOL,
            found: dxf_code::END_OF_STREAM
        })
    );
}

#[test]
fn test_truncated_and_mistyped_binary_streams() {
    let mut filer = MemoryDwgFiler::new();
    filer.write_f64(1.0);
    assert!(matches!(filer.read_i32(), Err(AssocError::InvalidInput(_))));
    assert!(matches!(filer.read_f64(), Err(AssocError::InvalidInput(_))));

    let node = ConstrainedGeometry::new(base(1, None), NodeKind::Arc(ArcNode::new(CircArc3::full_circle(
        Point3::origin(),
        Vector3::z(),
        1.0,
    ))));
    let mut full = MemoryDwgFiler::new();
    node.dwg_out_fields(&mut full);
    let mut truncated = MemoryDwgFiler::new();
    for field in &full.fields()[..full.fields().len() - 1] {
        match field {
            FieldValue::Bool(v) => truncated.write_bool(*v),
            FieldValue::I32(v) => truncated.write_i32(*v),
            FieldValue::F64(v) => truncated.write_f64(*v),
            FieldValue::Point(v) => truncated.write_point3(v),
            FieldValue::Vector(v) => truncated.write_vector3(v),
        }
    }
    assert!(ConstrainedGeometry::dwg_in_fields(&mut truncated, NodeId(1)).is_err());
}

#[test]
fn test_unknown_tags_are_bad_obj_type() {
    let mut filer = MemoryDwgFiler::new();
    filer.write_i32(99);
    filer.write_i32(1);
    filer.write_i32(0);
    assert!(ConstrainedGeometry::dwg_in_fields(&mut filer, NodeId(1))
        .unwrap_err()
        .is_bad_obj_type());

    let mut filer = MemoryDwgFiler::new();
    let point = ConstrainedGeometry::new(
        base(1, None),
        NodeKind::ImplicitPoint(ImplicitPointNode::new(ImplicitPointKind::Start, NodeId(2))),
    );
    point.dwg_out_fields(&mut filer);
    let mut bad = MemoryDwgFiler::new();
    for (i, field) in filer.fields().iter().enumerate() {
        match (i, field) {
            (3, _) => bad.write_i32(8),
            (_, FieldValue::I32(v)) => bad.write_i32(*v),
            _ => unreachable!("implicit points file only integers"),
        }
    }
    assert!(ConstrainedGeometry::dwg_in_fields(&mut bad, NodeId(1))
        .unwrap_err()
        .is_bad_obj_type());
}

#[test]
fn test_array_physical_length_below_logical_is_rejected() {
    let mut filer = MemoryDwgFiler::new();
    filer.write_i32(9);
    filer.write_i32(1);
    filer.write_i32(0);
    filer.write_i32(2);
    filer.write_bool(false);
    filer.write_i32(4);
    filer.write_i32(2);
    filer.write_i32(ARRAY_GROW_LENGTH);
    assert!(matches!(
        ConstrainedGeometry::dwg_in_fields(&mut filer, NodeId(1)),
        Err(AssocError::InvalidInput(_))
    ));
}

fn sample_group() -> ConstraintGroup {
    let mut group = ConstraintGroup::with_tolerance(
        GroupId(5),
        Tolerance {
            equal_point: 1e-8,
            equal_vector: 1e-7,
        },
    );
    let a = group.add_node(NodeKind::BoundedLine(BoundedLineNode::default()));
    let arc = group.add_node(NodeKind::Arc(ArcNode::new(CircArc3::full_circle(
        Point3::origin(),
        Vector3::z(),
        1.0,
    ))));
    let start = group.find_implicit_point(a, ImplicitPointKind::Start).expect("start");
    let centre = group.find_implicit_point(arc, ImplicitPointKind::Center).expect("centre");
    group.add_node(NodeKind::ConstructionLine(ConstructionLineNode::two_point([start, centre])));
    group.add_rigid_set(vec![a, arc]).expect("rigid set");
    group
}

fn assert_groups_match(a: &ConstraintGroup, b: &ConstraintGroup) {
    assert_eq!(a.id(), b.id());
    assert_eq!(a.tolerance(), b.tolerance());
    assert_eq!(a.len(), b.len());
    for (x, y) in a.nodes().zip(b.nodes()) {
        assert_eq!(x.base, y.base);
        assert!(x.geom_eq(y, a.tolerance()));
    }
}

#[test]
fn test_group_round_trip() {
    let group = sample_group();

    let mut dwg = MemoryDwgFiler::new();
    group.dwg_out_fields(&mut dwg);
    let back = ConstraintGroup::dwg_in_fields(&mut dwg).expect("binary");
    assert_groups_match(&group, &back);

    let mut dxf = MemoryDxfFiler::new();
    group.dxf_out_fields(&mut dxf);
    let mut back = ConstraintGroup::dxf_in_fields(&mut dxf).expect("tagged");
    assert_groups_match(&group, &back);

    // New nodes continue after the highest filed id.
    let next = back.add_node(NodeKind::Line(LineNode::default()));
    assert!(group.node(next).is_err());
}

#[test]
fn test_group_with_dangling_reference_is_rejected() {
    let mut group = ConstraintGroup::new(GroupId(1));
    let arc = group.add_node(NodeKind::Arc(ArcNode::new(CircArc3::full_circle(
        Point3::origin(),
        Vector3::z(),
        1.0,
    ))));
    let mut dwg = MemoryDwgFiler::new();
    group.dwg_out_fields(&mut dwg);

    // Re-file without the arc itself, leaving its implicit points orphaned.
    let mut orphaned = MemoryDwgFiler::new();
    orphaned.write_i32(1);
    orphaned.write_f64(group.tolerance().equal_point);
    orphaned.write_f64(group.tolerance().equal_vector);
    let points = group.implicit_points_of(arc);
    orphaned.write_i32(points.len() as i32);
    for id in points {
        orphaned.write_i32(id.0 as i32);
        group.node(id).expect("point").dwg_out_fields(&mut orphaned);
    }
    assert!(ConstraintGroup::dwg_in_fields(&mut orphaned).unwrap_err().is_bad_obj_type());
}

#[test]
fn test_oversized_group_count_fails_cleanly() {
    let mut dxf = MemoryDxfFiler::new();
    dxf.push(dxf_code::ID, FieldValue::I32(1));
    dxf.push(dxf_code::REAL, FieldValue::F64(1e-6));
    dxf.push(dxf_code::REAL, FieldValue::F64(1e-6));
    dxf.push(dxf_code::LENGTH, FieldValue::I32(i32::MAX));
    let err = ConstraintGroup::dxf_in_fields(&mut dxf).unwrap_err();
    assert!(matches!(
        err,
        AssocError::BadDxfSequence {
            expected: dxf_code::ID,
            found: dxf_code::END_OF_STREAM
        }
    ));

    let mut dwg = MemoryDwgFiler::new();
    dwg.write_i32(1);
    dwg.write_f64(1e-6);
    dwg.write_f64(1e-6);
    dwg.write_i32(i32::MAX);
    assert!(matches!(
        ConstraintGroup::dwg_in_fields(&mut dwg),
        Err(AssocError::InvalidInput(_))
    ));
}

#[test]
fn test_edge_identity_round_trip() {
    for edge in [
        EdgeIdentity::edge(3, 4),
        EdgeIdentity::segment_mid(7, 1),
        EdgeIdentity::arc_center(2, 3),
        EdgeIdentity::null(),
    ] {
        let mut dwg = MemoryDwgFiler::new();
        edge.dwg_out_fields(&mut dwg);
        assert_eq!(EdgeIdentity::dwg_in_fields(&mut dwg), Ok(edge));

        let mut dxf = MemoryDxfFiler::new();
        edge.dxf_out_fields(&mut dxf);
        assert_eq!(EdgeIdentity::dxf_in_fields(&mut dxf), Ok(edge));
    }
}
