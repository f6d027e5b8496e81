//! Persistent subentity identity.
//!
//! One translation strategy per owning-entity kind maps transient subentity
//! ids (positional) to persistent ones (stable across topology edits) and
//! back, and reads or writes the geometry of edges and vertices.

pub mod ids;
pub use ids::*;

mod polyline;
mod simple;
mod solid;

pub use polyline::{resolve_segment, PolylineTranslator, SegmentRepair, SegmentResolution};
pub use simple::{ArcTranslator, CircleTranslator, LineTranslator, RayTranslator, XLineTranslator};
pub use solid::SolidTranslator;

#[cfg(test)]
mod tests_simple;
#[cfg(test)]
mod tests_solid;

use crate::document::{DocumentModel, Entity};
use crate::error::{AssocError, AssocResult};
use crate::geometry::{EdgeCurve, Point3};
use crate::topo::ObjectId;

/// Translation contract every owning-entity kind implements.
///
/// Every operation validates its ids through [`check_subent_id`] before it
/// touches entity state.
///
/// [`check_subent_id`]: SubentIdTranslator::check_subent_id
pub trait SubentIdTranslator: Sync {
    fn entity_kind(&self) -> &'static str;

    fn accepts(&self, entity: &Entity) -> bool;

    /// Is `id` a valid subentity of kind `kind` for `entity`?
    fn check_subent_id(&self, entity: &Entity, id: SubentId, kind: SubentType) -> bool;

    fn create_new_pers_subent(&self, entity: &mut Entity, id: SubentId) -> AssocResult<PersSubentId>;

    /// Resolve a persistent id to the transient ids it currently names.
    fn get_transient_subent_ids(&self, entity: &Entity, pers: &PersSubentId) -> AssocResult<Vec<SubentId>>;

    fn get_all_subentities(&self, entity: &Entity, kind: SubentType) -> AssocResult<Vec<SubentId>>;

    fn get_edge_subentity_geometry(&self, entity: &Entity, edge: SubentId) -> AssocResult<EdgeCurve>;

    fn set_edge_subentity_geometry(&self, entity: &mut Entity, edge: SubentId, curve: &EdgeCurve) -> AssocResult<()>;

    fn get_vertex_subentity_geometry(&self, entity: &Entity, vertex: SubentId) -> AssocResult<Point3>;

    fn set_vertex_subentity_geometry(&self, entity: &mut Entity, vertex: SubentId, p: &Point3) -> AssocResult<()>;

    fn fill_start_vertex_subent_id(&self, entity: &Entity, edge: SubentId) -> AssocResult<SubentId>;

    fn fill_end_vertex_subent_id(&self, entity: &Entity, edge: SubentId) -> AssocResult<SubentId>;

    /// Auxiliary vertices of an edge besides its start and end.
    fn get_other_vertex_subent_ids(&self, entity: &Entity, edge: SubentId) -> AssocResult<Vec<SubentId>>;

    /// Fails with `WrongObjectType` for a foreign entity and `InvalidInput`
    /// for an id that is not valid for it.
    fn require(&self, entity: &Entity, id: SubentId, kind: SubentType) -> AssocResult<()> {
        if !self.accepts(entity) {
            return Err(AssocError::wrong_object_type(format!(
                "{} is not a {}",
                entity.kind_name(),
                self.entity_kind()
            )));
        }
        if !self.check_subent_id(entity, id, kind) {
            return Err(AssocError::invalid_input(format!(
                "{:?} is not a valid {:?} of this {}",
                id,
                kind,
                self.entity_kind()
            )));
        }
        Ok(())
    }
}

/// Strategy for `entity`. Ellipses and splines have no persistent naming.
pub fn translator_for(entity: &Entity) -> AssocResult<&'static dyn SubentIdTranslator> {
    Ok(match entity {
        Entity::Line(_) => &LineTranslator,
        Entity::Arc(_) => &ArcTranslator,
        Entity::Circle(_) => &CircleTranslator,
        Entity::Ray(_) => &RayTranslator,
        Entity::XLine(_) => &XLineTranslator,
        Entity::Polyline(_) => &PolylineTranslator,
        Entity::Solid(_) => &SolidTranslator,
        other => {
            return Err(AssocError::wrong_object_type(format!(
                "{} has no persistent subentity naming",
                other.kind_name()
            )))
        }
    })
}

// =============================================================================
// Document-level entry points
// =============================================================================

/// Create (or look up) the persistent id of `id` on `entity`. Opens the entity
/// for write because polyline vertex identifiers may be assigned.
pub fn create_new_pers_subent<D: DocumentModel>(
    doc: &mut D,
    entity: ObjectId,
    id: SubentId,
) -> AssocResult<PersSubentId> {
    doc.with_entity_mut(entity, |e| {
        let translator = translator_for(e)?;
        translator.create_new_pers_subent(e, id)
    })
}

pub fn get_transient_subent_ids<D: DocumentModel>(
    doc: &D,
    entity: ObjectId,
    pers: &PersSubentId,
) -> AssocResult<Vec<SubentId>> {
    doc.with_entity(entity, |e| translator_for(e)?.get_transient_subent_ids(e, pers))
}

pub fn get_all_subentities<D: DocumentModel>(
    doc: &D,
    entity: ObjectId,
    kind: SubentType,
) -> AssocResult<Vec<SubentId>> {
    doc.with_entity(entity, |e| translator_for(e)?.get_all_subentities(e, kind))
}

pub fn get_edge_geometry<D: DocumentModel>(doc: &D, entity: ObjectId, edge: SubentId) -> AssocResult<EdgeCurve> {
    doc.with_entity(entity, |e| translator_for(e)?.get_edge_subentity_geometry(e, edge))
}

pub fn set_edge_geometry<D: DocumentModel>(
    doc: &mut D,
    entity: ObjectId,
    edge: SubentId,
    curve: &EdgeCurve,
) -> AssocResult<()> {
    doc.with_entity_mut(entity, |e| {
        let translator = translator_for(e)?;
        translator.set_edge_subentity_geometry(e, edge, curve)
    })
}

pub fn get_vertex_geometry<D: DocumentModel>(doc: &D, entity: ObjectId, vertex: SubentId) -> AssocResult<Point3> {
    doc.with_entity(entity, |e| translator_for(e)?.get_vertex_subentity_geometry(e, vertex))
}

pub fn set_vertex_geometry<D: DocumentModel>(
    doc: &mut D,
    entity: ObjectId,
    vertex: SubentId,
    p: &Point3,
) -> AssocResult<()> {
    doc.with_entity_mut(entity, |e| {
        let translator = translator_for(e)?;
        translator.set_vertex_subentity_geometry(e, vertex, p)
    })
}
