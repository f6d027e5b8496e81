//! Translator for 3D solids and surfaces. Subentities are named through the
//! topological naming layer, so persistent ids are the stored `TopoId`s.

use super::ids::{PersSubentId, SubentId, SubentType};
use super::SubentIdTranslator;
use crate::document::{Entity, SolidEntity};
use crate::error::{AssocError, AssocResult};
use crate::geometry::{EdgeCurve, Point3};
use crate::topo::{TopoId, TopoRank};

pub struct SolidTranslator;

fn solid_of(entity: &Entity) -> AssocResult<&SolidEntity> {
    match entity {
        Entity::Solid(solid) => Ok(solid),
        _ => Err(AssocError::wrong_object_type("not a solid")),
    }
}

fn count_of(solid: &SolidEntity, kind: SubentType) -> usize {
    match kind {
        SubentType::Edge => solid.edges.len(),
        SubentType::Vertex => solid.vertices.len(),
        SubentType::Face => solid.faces.len(),
        SubentType::Null => 0,
    }
}

fn topo_id_at(solid: &SolidEntity, id: SubentId) -> Option<TopoId> {
    let i = usize::try_from(id.index).ok()?.checked_sub(1)?;
    match id.kind {
        SubentType::Edge => solid.edges.get(i).map(|e| e.topo_id),
        SubentType::Vertex => solid.vertices.get(i).map(|v| v.topo_id),
        SubentType::Face => solid.faces.get(i).copied(),
        SubentType::Null => None,
    }
}

fn index_of(solid: &SolidEntity, topo: &TopoId) -> Option<SubentId> {
    let position = match topo.rank {
        TopoRank::Edge => solid.edges.iter().position(|e| e.topo_id == *topo),
        TopoRank::Vertex => solid.vertices.iter().position(|v| v.topo_id == *topo),
        TopoRank::Face => solid.faces.iter().position(|f| f == topo),
    }?;
    let kind = match topo.rank {
        TopoRank::Edge => SubentType::Edge,
        TopoRank::Vertex => SubentType::Vertex,
        TopoRank::Face => SubentType::Face,
    };
    Some(SubentId::new(kind, position as i64 + 1))
}

fn edge_vertex(solid: &SolidEntity, edge: SubentId, start: bool) -> AssocResult<SubentId> {
    let e = &solid.edges[edge.index as usize - 1];
    let vertex = if start { e.start_vertex } else { e.end_vertex };
    vertex
        .map(|i| SubentId::vertex(i as i64 + 1))
        .ok_or_else(|| AssocError::invalid_input("closed edge has no start or end vertex"))
}

impl SubentIdTranslator for SolidTranslator {
    fn entity_kind(&self) -> &'static str {
        "solid"
    }

    fn accepts(&self, entity: &Entity) -> bool {
        matches!(entity, Entity::Solid(_))
    }

    fn check_subent_id(&self, entity: &Entity, id: SubentId, kind: SubentType) -> bool {
        let Entity::Solid(solid) = entity else {
            return false;
        };
        id.kind == kind && id.index >= 1 && (id.index as usize) <= count_of(solid, kind)
    }

    fn create_new_pers_subent(&self, entity: &mut Entity, id: SubentId) -> AssocResult<PersSubentId> {
        self.require(entity, id, id.kind)?;
        let solid = solid_of(entity)?;
        topo_id_at(solid, id)
            .map(PersSubentId::Topo)
            .ok_or_else(|| AssocError::invalid_input("subentity out of range"))
    }

    fn get_transient_subent_ids(&self, entity: &Entity, pers: &PersSubentId) -> AssocResult<Vec<SubentId>> {
        let solid = solid_of(entity)?;
        match pers {
            PersSubentId::Topo(topo) => index_of(solid, topo)
                .map(|id| vec![id])
                .ok_or_else(|| AssocError::invalid_input(format!("{:?} no longer exists", topo))),
            other => Err(AssocError::bad_obj_type(format!("{:?} is not a solid id", other))),
        }
    }

    fn get_all_subentities(&self, entity: &Entity, kind: SubentType) -> AssocResult<Vec<SubentId>> {
        let solid = solid_of(entity)?;
        Ok((1..=count_of(solid, kind) as i64).map(|i| SubentId::new(kind, i)).collect())
    }

    fn get_edge_subentity_geometry(&self, entity: &Entity, edge: SubentId) -> AssocResult<EdgeCurve> {
        self.require(entity, edge, SubentType::Edge)?;
        Ok(solid_of(entity)?.edges[edge.index as usize - 1].curve)
    }

    fn set_edge_subentity_geometry(&self, entity: &mut Entity, edge: SubentId, _curve: &EdgeCurve) -> AssocResult<()> {
        self.require(entity, edge, SubentType::Edge)?;
        Err(AssocError::NotImplementedYet("solid edge geometry injection".into()))
    }

    fn get_vertex_subentity_geometry(&self, entity: &Entity, vertex: SubentId) -> AssocResult<Point3> {
        self.require(entity, vertex, SubentType::Vertex)?;
        Ok(solid_of(entity)?.vertices[vertex.index as usize - 1].point)
    }

    fn set_vertex_subentity_geometry(&self, entity: &mut Entity, vertex: SubentId, _p: &Point3) -> AssocResult<()> {
        self.require(entity, vertex, SubentType::Vertex)?;
        Err(AssocError::NotImplementedYet("solid vertex geometry injection".into()))
    }

    fn fill_start_vertex_subent_id(&self, entity: &Entity, edge: SubentId) -> AssocResult<SubentId> {
        self.require(entity, edge, SubentType::Edge)?;
        edge_vertex(solid_of(entity)?, edge, true)
    }

    fn fill_end_vertex_subent_id(&self, entity: &Entity, edge: SubentId) -> AssocResult<SubentId> {
        self.require(entity, edge, SubentType::Edge)?;
        edge_vertex(solid_of(entity)?, edge, false)
    }

    fn get_other_vertex_subent_ids(&self, entity: &Entity, edge: SubentId) -> AssocResult<Vec<SubentId>> {
        self.require(entity, edge, SubentType::Edge)?;
        Ok(Vec::new())
    }
}
