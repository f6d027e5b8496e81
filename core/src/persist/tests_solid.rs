use crate::document::{Entity, MemoryDocument, SolidEdge, SolidEntity, SolidVertex};
use crate::error::AssocError;
use crate::geometry::{EdgeCurve, LineSeg3, Point3};
use crate::persist::{self, translator_for, PersSubentId, SubentId, SubentType};
use crate::topo::{EntityId, NamingContext, TopoRank};

fn slab() -> SolidEntity {
    let naming = NamingContext::new(EntityId::new_deterministic("slab"));
    let a = Point3::new(0.0, 0.0, 0.0);
    let b = Point3::new(1.0, 0.0, 0.0);
    SolidEntity {
        faces: vec![naming.derive("top", TopoRank::Face), naming.derive("bottom", TopoRank::Face)],
        edges: vec![SolidEdge {
            topo_id: naming.derive("edge:a-b", TopoRank::Edge),
            curve: EdgeCurve::LineSeg(LineSeg3::new(a, b)),
            start_vertex: Some(0),
            end_vertex: Some(1),
        }],
        vertices: vec![
            SolidVertex { topo_id: naming.derive("a", TopoRank::Vertex), point: a },
            SolidVertex { topo_id: naming.derive("b", TopoRank::Vertex), point: b },
        ],
    }
}

#[test]
fn test_topological_names_follow_reordering() {
    let mut doc = MemoryDocument::new();
    let id = doc.add_entity(Entity::Solid(slab()));

    let pers = persist::create_new_pers_subent(&mut doc, id, SubentId::face(2)).expect("face id");
    assert!(matches!(pers, PersSubentId::Topo(_)));

    if let Some(Entity::Solid(solid)) = doc.entity_mut(id) {
        solid.faces.reverse();
    }
    let back = persist::get_transient_subent_ids(&doc, id, &pers).expect("transient");
    assert_eq!(back, vec![SubentId::face(1)]);
}

#[test]
fn test_removed_subentity_is_reported() {
    let mut doc = MemoryDocument::new();
    let id = doc.add_entity(Entity::Solid(slab()));
    let pers = persist::create_new_pers_subent(&mut doc, id, SubentId::vertex(2)).expect("vertex id");

    if let Some(Entity::Solid(solid)) = doc.entity_mut(id) {
        solid.vertices.pop();
    }
    let err = persist::get_transient_subent_ids(&doc, id, &pers).unwrap_err();
    assert!(matches!(err, AssocError::InvalidInput(_)));
}

#[test]
fn test_edge_end_vertices_and_geometry() {
    let e = Entity::Solid(slab());
    let t = translator_for(&e).expect("translator");

    assert_eq!(t.get_all_subentities(&e, SubentType::Face).expect("faces").len(), 2);
    assert_eq!(t.fill_start_vertex_subent_id(&e, SubentId::edge(1)), Ok(SubentId::vertex(1)));
    assert_eq!(t.fill_end_vertex_subent_id(&e, SubentId::edge(1)), Ok(SubentId::vertex(2)));
    assert!(t.get_other_vertex_subent_ids(&e, SubentId::edge(1)).expect("others").is_empty());
    assert_eq!(
        t.get_vertex_subentity_geometry(&e, SubentId::vertex(2)).expect("point"),
        Point3::new(1.0, 0.0, 0.0)
    );
    assert!(t.get_edge_subentity_geometry(&e, SubentId::edge(2)).is_err());
}

#[test]
fn test_geometry_injection_not_supported() {
    let mut e = Entity::Solid(slab());
    let t = translator_for(&e).expect("translator");
    let err = t
        .set_vertex_subentity_geometry(&mut e, SubentId::vertex(1), &Point3::origin())
        .unwrap_err();
    assert!(matches!(err, AssocError::NotImplementedYet(_)));
}

#[test]
fn test_foreign_persistent_id_is_bad() {
    let e = Entity::Solid(slab());
    let err = translator_for(&e)
        .expect("translator")
        .get_transient_subent_ids(&e, &PersSubentId::Vertex { vertex_id: 3 })
        .unwrap_err();
    assert!(err.is_bad_obj_type());
}
