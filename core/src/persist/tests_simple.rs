use crate::document::{ArcEntity, CircleEntity, DocumentModel, Entity, LineEntity, MemoryDocument, RayEntity, XLineEntity};
use crate::error::AssocError;
use crate::geometry::{ApproxEq, EdgeCurve, LineSeg3, Point3, Vector3};
use crate::persist::{
    self, translator_for, vertex_index, PersSubentId, SubentId, SubentIdTranslator, SubentType,
};
use std::f64::consts::PI;

fn line() -> Entity {
    Entity::Line(LineEntity {
        start: Point3::new(0.0, 0.0, 0.0),
        end: Point3::new(4.0, 0.0, 0.0),
    })
}

fn arc() -> Entity {
    Entity::Arc(ArcEntity {
        center: Point3::origin(),
        normal: Vector3::z(),
        radius: 2.0,
        start_angle: 0.0,
        end_angle: PI,
    })
}

#[test]
fn test_subentity_counts_per_kind() {
    let circle = Entity::Circle(CircleEntity { center: Point3::origin(), normal: Vector3::z(), radius: 1.0 });
    let ray = Entity::Ray(RayEntity { base_point: Point3::origin(), direction: Vector3::x() });
    let xline = Entity::XLine(XLineEntity { base_point: Point3::origin(), direction: Vector3::y() });

    let counts = |e: &Entity| {
        let t = translator_for(e).expect("translator");
        (
            t.get_all_subentities(e, SubentType::Edge).expect("edges").len(),
            t.get_all_subentities(e, SubentType::Vertex).expect("vertices").len(),
        )
    };

    assert_eq!(counts(&line()), (1, 3));
    assert_eq!(counts(&circle), (1, 1));
    assert_eq!(counts(&arc()), (1, 4));
    assert_eq!(counts(&ray), (1, 1));
    assert_eq!(counts(&xline), (1, 0));
}

#[test]
fn test_indexed_persistent_id_round_trip() {
    let mut doc = MemoryDocument::new();
    let id = doc.add_entity(line());

    let pers = persist::create_new_pers_subent(&mut doc, id, SubentId::vertex(vertex_index::END)).expect("pers id");
    assert_eq!(pers, PersSubentId::Indexed(SubentId::vertex(vertex_index::END)));

    let back = persist::get_transient_subent_ids(&doc, id, &pers).expect("transient");
    assert_eq!(back, vec![SubentId::vertex(vertex_index::END)]);
    assert_eq!(doc.open_scope_count(), 0);
}

#[test]
fn test_invalid_ids_are_rejected() {
    let mut doc = MemoryDocument::new();
    let id = doc.add_entity(line());

    let err = persist::create_new_pers_subent(&mut doc, id, SubentId::vertex(vertex_index::CENTER)).unwrap_err();
    assert!(matches!(err, AssocError::InvalidInput(_)));
    let err = persist::create_new_pers_subent(&mut doc, id, SubentId::edge(2)).unwrap_err();
    assert!(matches!(err, AssocError::InvalidInput(_)));
    assert_eq!(doc.open_scope_count(), 0);
}

#[test]
fn test_arc_other_vertices_and_geometry() {
    let e = arc();
    let t = translator_for(&e).expect("translator");
    let edge = SubentId::edge(1);

    assert_eq!(t.fill_start_vertex_subent_id(&e, edge), Ok(SubentId::vertex(vertex_index::START)));
    assert_eq!(t.fill_end_vertex_subent_id(&e, edge), Ok(SubentId::vertex(vertex_index::END)));
    assert_eq!(
        t.get_other_vertex_subent_ids(&e, edge).expect("others"),
        vec![SubentId::vertex(vertex_index::CENTER), SubentId::vertex(vertex_index::MIDDLE)]
    );

    let mid = t.get_vertex_subentity_geometry(&e, SubentId::vertex(vertex_index::MIDDLE)).expect("mid");
    assert!(mid.approx_eq(&Point3::new(0.0, 2.0, 0.0)));
    let end = t.get_vertex_subentity_geometry(&e, SubentId::vertex(vertex_index::END)).expect("end");
    assert!(end.approx_eq(&Point3::new(-2.0, 0.0, 0.0)));
}

#[test]
fn test_circle_has_no_start_vertex() {
    let e = Entity::Circle(CircleEntity { center: Point3::origin(), normal: Vector3::z(), radius: 1.0 });
    let t = translator_for(&e).expect("translator");
    assert!(t.fill_start_vertex_subent_id(&e, SubentId::edge(1)).is_err());
    assert_eq!(
        t.get_other_vertex_subent_ids(&e, SubentId::edge(1)).expect("others"),
        vec![SubentId::vertex(vertex_index::CENTER)]
    );
}

#[test]
fn test_set_edge_geometry_is_type_checked() {
    let mut doc = MemoryDocument::new();
    let id = doc.add_entity(line());
    let seg = EdgeCurve::LineSeg(LineSeg3::new(Point3::new(1.0, 1.0, 0.0), Point3::new(2.0, 2.0, 0.0)));
    persist::set_edge_geometry(&mut doc, id, SubentId::edge(1), &seg).expect("line accepts a segment");

    let got = persist::get_edge_geometry(&doc, id, SubentId::edge(1)).expect("edge");
    assert_eq!(got, seg);

    let wrong = translator_for(&arc())
        .expect("translator")
        .get_edge_subentity_geometry(&arc(), SubentId::edge(1))
        .expect("arc edge");
    let err = persist::set_edge_geometry(&mut doc, id, SubentId::edge(1), &wrong).unwrap_err();
    assert!(matches!(err, AssocError::InvalidInput(_)));
}

#[test]
fn test_translator_rejects_foreign_entity() {
    let e = line();
    let err = crate::persist::ArcTranslator
        .get_edge_subentity_geometry(&e, SubentId::edge(1))
        .unwrap_err();
    assert!(matches!(err, AssocError::WrongObjectType(_)));
}

#[test]
fn test_moving_line_middle_translates() {
    let mut doc = MemoryDocument::new();
    let id = doc.add_entity(line());
    persist::set_vertex_geometry(&mut doc, id, SubentId::vertex(vertex_index::MIDDLE), &Point3::new(2.0, 3.0, 0.0))
        .expect("set middle");
    doc.with_entity(id, |e| {
        let Entity::Line(l) = e else { panic!("line expected") };
        assert!(l.start.approx_eq(&Point3::new(0.0, 3.0, 0.0)));
        assert!(l.end.approx_eq(&Point3::new(4.0, 3.0, 0.0)));
        Ok(())
    })
    .expect("read back");
}
