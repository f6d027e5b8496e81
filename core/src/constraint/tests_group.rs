use crate::constraint::*;
use crate::document::{ArcEntity, Entity, GroupId, LineEntity, MemoryDocument, PolylineEntity, PolylineVertex};
use crate::error::AssocError;
use crate::geometry::{ApproxEq, CircArc3, Line3, LineSeg3, Matrix4, Point3, Vector3};
use crate::persist::{
    vertex_index, EdgeIdentity, PersSubentId, SubentId, ARC_CENTER_VERTEX_BIAS, SEGMENT_MID_VERTEX_BIAS,
};
use crate::topo::ObjectId;
use std::f64::consts::FRAC_PI_2;

fn unit_circle() -> CircArc3 {
    CircArc3::full_circle(Point3::origin(), Vector3::z(), 1.0)
}

/// Open polyline (0,0) → (2,0) → (4,0) → (4,2) with ids 1..=4 and a
/// semicircular bulge on the segment between ids 2 and 3.
fn four_vertex_polyline() -> PolylineEntity {
    let mut pl = PolylineEntity::new(
        vec![
            PolylineVertex::new(0.0, 0.0),
            PolylineVertex::with_bulge(2.0, 0.0, 1.0),
            PolylineVertex::new(4.0, 0.0),
            PolylineVertex::new(4.0, 2.0),
        ],
        false,
    );
    for (i, v) in pl.vertices.iter_mut().enumerate() {
        v.vertex_id = i as u32 + 1;
    }
    pl.next_vertex_id = 5;
    pl
}

fn arc_on_polyline(edge: EdgeIdentity) -> (MemoryDocument, ConstraintGroup, NodeId, ObjectId) {
    let mut doc = MemoryDocument::new();
    let entity = doc.add_entity(Entity::Polyline(four_vertex_polyline()));
    let dep = doc.add_dependency(entity, Some(PersSubentId::Edge(edge)));
    let mut group = ConstraintGroup::new(GroupId(7));
    let arc = group.add_node(NodeKind::Arc(ArcNode::new(unit_circle())));
    group.init(&doc, arc, dep).expect("init");
    (doc, group, arc, entity)
}

#[test]
fn test_add_node_creates_implicit_points() {
    let mut group = ConstraintGroup::new(GroupId(1));
    let arc = group.add_node(NodeKind::Arc(ArcNode::new(unit_circle())));
    let line = group.add_node(NodeKind::Line(LineNode::default()));
    let seg = group.add_node(NodeKind::BoundedLine(BoundedLineNode::default()));
    let ellipse = group.add_node(NodeKind::BoundedEllipse(BoundedEllipseNode::new(
        crate::geometry::EllipArc3::full(Point3::origin(), Vector3::z(), Vector3::x(), 2.0, 1.0),
    )));

    assert_eq!(group.implicit_points_of(arc).len(), 4);
    assert!(group.implicit_points_of(line).is_empty());
    assert_eq!(group.implicit_points_of(seg).len(), 3);
    assert_eq!(group.implicit_points_of(ellipse).len(), 3);
    assert_eq!(group.len(), 5 + 1 + 4 + 4);

    let centre = group.find_implicit_point(arc, ImplicitPointKind::Center).expect("centre");
    assert_eq!(group.implicit_point(centre).expect("point").curve, arc);
    assert!(group.find_implicit_point(line, ImplicitPointKind::Start).is_none());
}

#[test]
fn test_dangling_ids_are_bad_obj_type() {
    let mut group = ConstraintGroup::new(GroupId(1));
    let line = group.add_node(NodeKind::Line(LineNode::default()));
    assert!(group.node(NodeId(999)).unwrap_err().is_bad_obj_type());
    assert!(group.point(line).unwrap_err().is_bad_obj_type());
    assert!(group.set_point(NodeId(999), &Point3::origin()).unwrap_err().is_bad_obj_type());
    assert!(group.add_rigid_set(vec![line, NodeId(999)]).unwrap_err().is_bad_obj_type());
    assert!(group.apply_rigid_set(line).unwrap_err().is_bad_obj_type());
}

#[test]
fn test_init_binds_once() {
    let mut doc = MemoryDocument::new();
    let a = doc.add_entity(Entity::Line(LineEntity {
        start: Point3::origin(),
        end: Point3::new(1.0, 0.0, 0.0),
    }));
    let first = doc.add_dependency(a, None);
    let second = doc.add_dependency(a, None);
    let mut group = ConstraintGroup::new(GroupId(1));
    let seg = group.add_node(NodeKind::BoundedLine(BoundedLineNode::default()));

    group.init(&doc, seg, first).expect("first init");
    group.init(&doc, seg, first).expect("same dependency again");
    assert!(group.init(&doc, seg, second).unwrap_err().is_bad_obj_type());
    assert_eq!(group.node(seg).expect("node").base.dependency, Some(first));

    let start = group.find_implicit_point(seg, ImplicitPointKind::Start).expect("start");
    assert!(group.init(&doc, start, first).unwrap_err().is_bad_obj_type());
}

#[test]
fn test_push_without_init_fails() {
    let mut doc = MemoryDocument::new();
    let mut group = ConstraintGroup::new(GroupId(1));
    let circle = group.add_node(NodeKind::Circle(CircleNode::default()));
    assert!(group.push(&mut doc, circle).unwrap_err().is_bad_obj_type());
    assert!(group.pull(&doc, circle).unwrap_err().is_bad_obj_type());
}

#[test]
fn test_polyline_arc_paths() {
    let (doc, group, arc, entity) = arc_on_polyline(EdgeIdentity::edge(2, 3));
    let path_of = |kind| {
        let id = group.find_implicit_point(arc, kind).expect("implicit point");
        let paths = group.full_subent_paths(&doc, id).expect("paths");
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].entity, entity);
        paths[0].subent
    };

    assert_eq!(path_of(ImplicitPointKind::Start), SubentId::vertex(2));
    assert_eq!(path_of(ImplicitPointKind::End), SubentId::vertex(3));
    assert_eq!(path_of(ImplicitPointKind::Center), SubentId::vertex(ARC_CENTER_VERTEX_BIAS + 2));
    assert_eq!(path_of(ImplicitPointKind::Mid), SubentId::vertex(SEGMENT_MID_VERTEX_BIAS + 2));

    let curve = group.full_subent_paths(&doc, arc).expect("curve path");
    assert_eq!(curve[0].subent, SubentId::edge(2));
}

#[test]
fn test_paths_follow_vertex_deletion() {
    let (mut doc, group, arc, entity) = arc_on_polyline(EdgeIdentity::edge(2, 3));
    if let Some(Entity::Polyline(pl)) = doc.entity_mut(entity) {
        pl.remove_vertex(0);
    }
    let start = group.find_implicit_point(arc, ImplicitPointKind::Start).expect("start");
    assert_eq!(group.full_subent_paths(&doc, start).expect("paths")[0].subent, SubentId::vertex(1));
    assert_eq!(group.full_subent_paths(&doc, arc).expect("paths")[0].subent, SubentId::edge(1));
    assert_eq!(group.segment_repairs(), 0);
}

#[test]
fn test_repaired_segment_is_counted() {
    let (mut doc, mut group, arc, entity) = arc_on_polyline(EdgeIdentity::edge(2, 3));
    if let Some(Entity::Polyline(pl)) = doc.entity_mut(entity) {
        // Drop the end vertex of the referenced segment; the next vertex takes its place.
        let index = pl.find_vertex_id(3).expect("vertex 3");
        pl.remove_vertex(index);
        pl.vertices[1].bulge = 1.0;
    }
    let outcome = group.pull(&doc, arc).expect("pull");
    assert!(outcome.is_polyline());
    assert_eq!(group.segment_repairs(), 1);
    let circle = group.node(arc).expect("node").circle_arc().expect("arc");
    assert!(circle.end_point().approx_eq(&Point3::new(4.0, 2.0, 0.0)));
}

#[test]
fn test_paths_through_repaired_segment_are_counted() {
    let (mut doc, group, arc, entity) = arc_on_polyline(EdgeIdentity::edge(2, 3));
    if let Some(Entity::Polyline(pl)) = doc.entity_mut(entity) {
        let index = pl.find_vertex_id(3).expect("vertex 3");
        pl.remove_vertex(index);
        pl.vertices[1].bulge = 1.0;
    }
    assert_eq!(group.segment_repairs(), 0);
    group.full_subent_paths(&doc, arc).expect("paths");
    assert_eq!(group.segment_repairs(), 1);
    let end = group.find_implicit_point(arc, ImplicitPointKind::End).expect("end");
    group.full_subent_paths(&doc, end).expect("paths");
    assert_eq!(group.segment_repairs(), 2);
}

#[test]
fn test_fixed_vertex_paths_for_simple_entities() {
    let mut doc = MemoryDocument::new();
    let entity = doc.add_entity(Entity::Arc(ArcEntity {
        center: Point3::origin(),
        normal: Vector3::z(),
        radius: 1.0,
        start_angle: 0.0,
        end_angle: FRAC_PI_2,
    }));
    let dep = doc.add_dependency(entity, None);
    let mut group = ConstraintGroup::new(GroupId(1));
    let arc = group.add_node(NodeKind::Arc(ArcNode::new(unit_circle())));
    group.init(&doc, arc, dep).expect("init");

    let centre = group.find_implicit_point(arc, ImplicitPointKind::Center).expect("centre");
    let end = group.find_implicit_point(arc, ImplicitPointKind::End).expect("end");
    assert_eq!(
        group.full_subent_paths(&doc, centre).expect("paths")[0].subent,
        SubentId::vertex(vertex_index::CENTER)
    );
    assert_eq!(
        group.full_subent_paths(&doc, end).expect("paths")[0].subent,
        SubentId::vertex(vertex_index::END)
    );
    assert_eq!(group.full_subent_paths(&doc, arc).expect("paths")[0].subent, SubentId::edge(1));
}

#[test]
fn test_rigid_set_paths_concatenate_members() {
    let (doc, mut group, arc, _) = arc_on_polyline(EdgeIdentity::edge(2, 3));
    let start = group.find_implicit_point(arc, ImplicitPointKind::Start).expect("start");
    let set = group.add_rigid_set(vec![arc, start]).expect("rigid set");
    let paths = group.full_subent_paths(&doc, set).expect("paths");
    assert_eq!(
        paths.iter().map(|p| p.subent).collect::<Vec<_>>(),
        vec![SubentId::edge(2), SubentId::vertex(2)]
    );
}

#[test]
fn test_two_point_construction_line_follows_points() {
    let mut group = ConstraintGroup::new(GroupId(1));
    let a = group.add_node(NodeKind::BoundedLine(BoundedLineNode::new(LineSeg3::new(
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(1.0, 5.0, 0.0),
    ))));
    let b = group.add_node(NodeKind::BoundedLine(BoundedLineNode::new(LineSeg3::new(
        Point3::new(3.0, 1.0, 0.0),
        Point3::new(3.0, 5.0, 0.0),
    ))));
    let pa = group.find_implicit_point(a, ImplicitPointKind::Start).expect("start a");
    let pb = group.find_implicit_point(b, ImplicitPointKind::Start).expect("start b");
    let xline = group.add_node(NodeKind::ConstructionLine(ConstructionLineNode::two_point([pa, pb])));

    group.do_post_evaluate_all().expect("evaluate");
    let line = group.node(xline).expect("node").line().expect("line");
    assert!(line.is_equal_to(&Line3::new(Point3::new(1.0, 1.0, 0.0), Vector3::x()), group.tolerance()));

    group.set_point(pb, &Point3::new(1.0, 1.0, 0.0)).expect("collapse");
    let err = group.do_post_evaluate_job(xline).unwrap_err();
    assert!(matches!(err, AssocError::DegenerateGeometry(_)));
}

#[test]
fn test_datum_construction_line_keeps_direction() {
    let mut group = ConstraintGroup::new(GroupId(1));
    let circle = group.add_node(NodeKind::Circle(CircleNode::new(Point3::new(2.0, 3.0, 0.0), 1.0)));
    let centre = group.find_implicit_point(circle, ImplicitPointKind::Center).expect("centre");
    let xline = group.add_node(NodeKind::ConstructionLine(ConstructionLineNode::datum(centre, Vector3::y())));

    group.do_post_evaluate_job(xline).expect("evaluate");
    let line = group.node(xline).expect("node").line().expect("line");
    assert!(line.is_equal_to(&Line3::new(Point3::new(2.0, 0.0, 0.0), Vector3::y()), group.tolerance()));
    assert!(group.node(xline).expect("node").base.dirty);
}

#[test]
fn test_rigid_set_moves_members_and_resets() {
    let mut group = ConstraintGroup::new(GroupId(1));
    let seg = group.add_node(NodeKind::BoundedLine(BoundedLineNode::default()));
    let arc = group.add_node(NodeKind::Arc(ArcNode::new(unit_circle())));
    let set = group.add_rigid_set(vec![seg, arc]).expect("rigid set");

    let shift = Matrix4::new_translation(&Vector3::new(0.0, 2.0, 0.0));
    group.set_rigid_transform(set, shift).expect("transform");
    group.apply_rigid_set(set).expect("apply");

    let end = group.find_implicit_point(seg, ImplicitPointKind::End).expect("end");
    assert!(group.point(end).expect("end").approx_eq(&Point3::new(1.0, 2.0, 0.0)));
    assert!(group
        .node(arc)
        .expect("arc")
        .circle_arc()
        .expect("arc")
        .center
        .approx_eq(&Point3::new(0.0, 2.0, 0.0)));
    let NodeKind::RigidSet(rigid) = &group.node(set).expect("set").kind else { panic!("rigid set") };
    assert!(rigid.transform.approx_eq(&Matrix4::identity()));
    assert!(group.original_point(end).expect("original").approx_eq(&Point3::new(1.0, 0.0, 0.0)));
}

#[test]
fn test_nodes_equal_uses_group_tolerance() {
    let mut group = ConstraintGroup::new(GroupId(1));
    let a = group.add_node(NodeKind::Circle(CircleNode::new(Point3::origin(), 1.0)));
    let b = group.add_node(NodeKind::Circle(CircleNode::new(Point3::new(1e-9, 0.0, 0.0), 1.0)));
    let c = group.add_node(NodeKind::Circle(CircleNode::new(Point3::new(0.1, 0.0, 0.0), 1.0)));
    assert!(group.nodes_equal(a, b).expect("compare"));
    assert!(!group.nodes_equal(a, c).expect("compare"));
}

fn reverse_in_place(group: &mut ConstraintGroup, arc: NodeId) {
    let node = group.node_mut(arc).expect("arc");
    let reversed = node.circle_arc().expect("arc").reversed();
    node.set_circle_arc(reversed).expect("reverse");
    node.commit();
}

#[test]
fn test_audit_reports_legacy_arc_without_fixing() {
    let (doc, mut group, arc, _) = arc_on_polyline(EdgeIdentity::edge(2, 3));
    reverse_in_place(&mut group, arc);
    let before = group.node(arc).expect("arc").clone();

    let mut audit = AuditInfo::new(false);
    group.audit(&doc, &mut audit).expect("audit");
    assert_eq!(audit.errors_found, 1);
    assert_eq!(audit.errors_fixed, 0);
    assert_eq!(group.node(arc).expect("arc"), &before);
}

#[test]
fn test_audit_fixes_legacy_arc() {
    let (doc, mut group, arc, _) = arc_on_polyline(EdgeIdentity::edge(2, 3));
    let start = group.find_implicit_point(arc, ImplicitPointKind::Start).expect("start");
    let end = group.find_implicit_point(arc, ImplicitPointKind::End).expect("end");
    let fresh = group.node(arc).expect("arc").clone();
    reverse_in_place(&mut group, arc);

    let mut audit = AuditInfo::new(true);
    group.audit_node(&doc, arc, &mut audit).expect("audit");
    assert_eq!(audit.errors_found, 1);
    assert_eq!(audit.errors_fixed, 1);
    assert!(group.node(arc).expect("arc").geom_eq(&fresh, group.tolerance()));
    assert_eq!(group.implicit_point(start).expect("point").kind, ImplicitPointKind::End);
    assert_eq!(group.implicit_point(end).expect("point").kind, ImplicitPointKind::Start);

    // A second pass finds nothing.
    let mut again = AuditInfo::new(true);
    group.audit(&doc, &mut again).expect("audit");
    assert_eq!(again.errors_found, 0);
}

#[test]
fn test_audit_ignores_consistent_and_non_polyline_arcs() {
    let (doc, mut group, _, _) = arc_on_polyline(EdgeIdentity::edge(2, 3));
    let mut audit = AuditInfo::new(true);
    group.audit(&doc, &mut audit).expect("audit");
    assert_eq!(audit, AuditInfo::new(true));

    let mut doc = MemoryDocument::new();
    let entity = doc.add_entity(Entity::Arc(ArcEntity {
        center: Point3::origin(),
        normal: Vector3::z(),
        radius: 1.0,
        start_angle: 0.0,
        end_angle: FRAC_PI_2,
    }));
    let dep = doc.add_dependency(entity, None);
    let mut group = ConstraintGroup::new(GroupId(1));
    let arc = group.add_node(NodeKind::Arc(ArcNode::new(unit_circle())));
    group.init(&doc, arc, dep).expect("init");
    reverse_in_place(&mut group, arc);
    group.audit(&doc, &mut audit).expect("audit");
    assert_eq!(audit.errors_found, 0);
}
