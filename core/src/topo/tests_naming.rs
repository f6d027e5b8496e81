use crate::topo::naming::{NamingContext, TopoRank};
use crate::topo::EntityId;

#[test]
fn test_derive_is_deterministic_per_owner() {
    let owner = EntityId::new_deterministic("Solid1");
    let a = NamingContext::new(owner).derive("EdgeTop", TopoRank::Edge);
    let b = NamingContext::new(owner).derive("EdgeTop", TopoRank::Edge);
    assert_eq!(a, b);
    assert_eq!(a.owner, owner);
}

#[test]
fn test_derive_differs_by_owner_and_seed() {
    let ctx1 = NamingContext::new(EntityId::new_deterministic("Solid1"));
    let ctx2 = NamingContext::new(EntityId::new_deterministic("Solid2"));

    assert_ne!(ctx1.derive("EdgeTop", TopoRank::Edge), ctx2.derive("EdgeTop", TopoRank::Edge));
    assert_ne!(ctx1.derive("EdgeTop", TopoRank::Edge), ctx1.derive("EdgeBottom", TopoRank::Edge));
}

#[test]
fn test_topo_id_survives_json() {
    let id = NamingContext::new(EntityId::new()).derive("V0", TopoRank::Vertex);
    let json = serde_json::to_string(&id).expect("serialize");
    let back: crate::topo::TopoId = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(id, back);
}
