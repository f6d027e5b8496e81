//! Translators for entities with exactly one edge and a fixed vertex set.
//! Their persistent ids are the transient ids themselves.

use super::ids::{vertex_index, PersSubentId, SubentId, SubentType, SINGLE_EDGE_INDEX};
use super::SubentIdTranslator;
use crate::document::{ArcEntity, Entity};
use crate::error::{AssocError, AssocResult};
use crate::geometry::{EdgeCurve, Line3, LineSeg3, Point3, Ray3};

fn check_fixed(id: SubentId, kind: SubentType, vertices: &[i64]) -> bool {
    if id.kind != kind {
        return false;
    }
    match kind {
        SubentType::Edge => id.index == SINGLE_EDGE_INDEX,
        SubentType::Vertex => vertices.contains(&id.index),
        _ => false,
    }
}

fn all_fixed(kind: SubentType, vertices: &[i64]) -> Vec<SubentId> {
    match kind {
        SubentType::Edge => vec![SubentId::edge(SINGLE_EDGE_INDEX)],
        SubentType::Vertex => vertices.iter().map(|&i| SubentId::vertex(i)).collect(),
        _ => Vec::new(),
    }
}

fn indexed_transient<T: SubentIdTranslator + ?Sized>(
    translator: &T,
    entity: &Entity,
    pers: &PersSubentId,
) -> AssocResult<Vec<SubentId>> {
    match pers {
        PersSubentId::Indexed(id) => {
            translator.require(entity, *id, id.kind)?;
            Ok(vec![*id])
        }
        other => Err(AssocError::bad_obj_type(format!(
            "{:?} is not an id of a {}",
            other,
            translator.entity_kind()
        ))),
    }
}

fn no_vertex(kind: &str, which: &str) -> AssocError {
    AssocError::invalid_input(format!("a {} edge has no {} vertex", kind, which))
}

// =============================================================================
// Line
// =============================================================================

pub struct LineTranslator;

const LINE_VERTICES: &[i64] = &[vertex_index::START, vertex_index::END, vertex_index::MIDDLE];

impl SubentIdTranslator for LineTranslator {
    fn entity_kind(&self) -> &'static str {
        "line"
    }

    fn accepts(&self, entity: &Entity) -> bool {
        matches!(entity, Entity::Line(_))
    }

    fn check_subent_id(&self, entity: &Entity, id: SubentId, kind: SubentType) -> bool {
        self.accepts(entity) && check_fixed(id, kind, LINE_VERTICES)
    }

    fn create_new_pers_subent(&self, entity: &mut Entity, id: SubentId) -> AssocResult<PersSubentId> {
        self.require(entity, id, id.kind)?;
        Ok(PersSubentId::Indexed(id))
    }

    fn get_transient_subent_ids(&self, entity: &Entity, pers: &PersSubentId) -> AssocResult<Vec<SubentId>> {
        indexed_transient(self, entity, pers)
    }

    fn get_all_subentities(&self, entity: &Entity, kind: SubentType) -> AssocResult<Vec<SubentId>> {
        if !self.accepts(entity) {
            return Err(AssocError::wrong_object_type("not a line"));
        }
        Ok(all_fixed(kind, LINE_VERTICES))
    }

    fn get_edge_subentity_geometry(&self, entity: &Entity, edge: SubentId) -> AssocResult<EdgeCurve> {
        self.require(entity, edge, SubentType::Edge)?;
        match entity {
            Entity::Line(line) => Ok(EdgeCurve::LineSeg(LineSeg3::new(line.start, line.end))),
            _ => Err(AssocError::wrong_object_type("not a line")),
        }
    }

    fn set_edge_subentity_geometry(&self, entity: &mut Entity, edge: SubentId, curve: &EdgeCurve) -> AssocResult<()> {
        self.require(entity, edge, SubentType::Edge)?;
        match (entity, curve) {
            (Entity::Line(line), EdgeCurve::LineSeg(seg)) => {
                line.start = seg.start;
                line.end = seg.end;
                Ok(())
            }
            (_, other) => Err(AssocError::invalid_input(format!(
                "cannot set a line edge from a {}",
                other.kind_name()
            ))),
        }
    }

    fn get_vertex_subentity_geometry(&self, entity: &Entity, vertex: SubentId) -> AssocResult<Point3> {
        self.require(entity, vertex, SubentType::Vertex)?;
        let Entity::Line(line) = entity else {
            return Err(AssocError::wrong_object_type("not a line"));
        };
        Ok(match vertex.index {
            vertex_index::START => line.start,
            vertex_index::END => line.end,
            _ => nalgebra::center(&line.start, &line.end),
        })
    }

    fn set_vertex_subentity_geometry(&self, entity: &mut Entity, vertex: SubentId, p: &Point3) -> AssocResult<()> {
        self.require(entity, vertex, SubentType::Vertex)?;
        let Entity::Line(line) = entity else {
            return Err(AssocError::wrong_object_type("not a line"));
        };
        match vertex.index {
            vertex_index::START => line.start = *p,
            vertex_index::END => line.end = *p,
            _ => {
                // Moving the middle translates the whole line.
                let delta = p - nalgebra::center(&line.start, &line.end);
                line.start += delta;
                line.end += delta;
            }
        }
        Ok(())
    }

    fn fill_start_vertex_subent_id(&self, entity: &Entity, edge: SubentId) -> AssocResult<SubentId> {
        self.require(entity, edge, SubentType::Edge)?;
        Ok(SubentId::vertex(vertex_index::START))
    }

    fn fill_end_vertex_subent_id(&self, entity: &Entity, edge: SubentId) -> AssocResult<SubentId> {
        self.require(entity, edge, SubentType::Edge)?;
        Ok(SubentId::vertex(vertex_index::END))
    }

    fn get_other_vertex_subent_ids(&self, entity: &Entity, edge: SubentId) -> AssocResult<Vec<SubentId>> {
        self.require(entity, edge, SubentType::Edge)?;
        Ok(vec![SubentId::vertex(vertex_index::MIDDLE)])
    }
}

// =============================================================================
// Arc
// =============================================================================

pub struct ArcTranslator;

const ARC_VERTICES: &[i64] = &[
    vertex_index::START,
    vertex_index::END,
    vertex_index::CENTER,
    vertex_index::MIDDLE,
];

fn arc_of(entity: &Entity) -> AssocResult<&ArcEntity> {
    match entity {
        Entity::Arc(arc) => Ok(arc),
        _ => Err(AssocError::wrong_object_type("not an arc")),
    }
}

impl SubentIdTranslator for ArcTranslator {
    fn entity_kind(&self) -> &'static str {
        "arc"
    }

    fn accepts(&self, entity: &Entity) -> bool {
        matches!(entity, Entity::Arc(_))
    }

    fn check_subent_id(&self, entity: &Entity, id: SubentId, kind: SubentType) -> bool {
        self.accepts(entity) && check_fixed(id, kind, ARC_VERTICES)
    }

    fn create_new_pers_subent(&self, entity: &mut Entity, id: SubentId) -> AssocResult<PersSubentId> {
        self.require(entity, id, id.kind)?;
        Ok(PersSubentId::Indexed(id))
    }

    fn get_transient_subent_ids(&self, entity: &Entity, pers: &PersSubentId) -> AssocResult<Vec<SubentId>> {
        indexed_transient(self, entity, pers)
    }

    fn get_all_subentities(&self, entity: &Entity, kind: SubentType) -> AssocResult<Vec<SubentId>> {
        arc_of(entity)?;
        Ok(all_fixed(kind, ARC_VERTICES))
    }

    fn get_edge_subentity_geometry(&self, entity: &Entity, edge: SubentId) -> AssocResult<EdgeCurve> {
        self.require(entity, edge, SubentType::Edge)?;
        Ok(EdgeCurve::Arc(arc_of(entity)?.to_circ_arc()))
    }

    fn set_edge_subentity_geometry(&self, entity: &mut Entity, edge: SubentId, curve: &EdgeCurve) -> AssocResult<()> {
        self.require(entity, edge, SubentType::Edge)?;
        match (entity, curve) {
            (Entity::Arc(arc), EdgeCurve::Arc(new_arc)) if !new_arc.is_closed() => {
                arc.set_from_circ_arc(new_arc);
                Ok(())
            }
            (_, other) => Err(AssocError::invalid_input(format!(
                "cannot set an arc edge from a {}",
                other.kind_name()
            ))),
        }
    }

    fn get_vertex_subentity_geometry(&self, entity: &Entity, vertex: SubentId) -> AssocResult<Point3> {
        self.require(entity, vertex, SubentType::Vertex)?;
        let arc = arc_of(entity)?.to_circ_arc();
        Ok(match vertex.index {
            vertex_index::START => arc.start_point(),
            vertex_index::END => arc.end_point(),
            vertex_index::CENTER => arc.center,
            _ => arc.mid_point(),
        })
    }

    fn set_vertex_subentity_geometry(&self, entity: &mut Entity, vertex: SubentId, p: &Point3) -> AssocResult<()> {
        self.require(entity, vertex, SubentType::Vertex)?;
        let Entity::Arc(arc) = entity else {
            return Err(AssocError::wrong_object_type("not an arc"));
        };
        let mut curve = arc.to_circ_arc();
        match vertex.index {
            vertex_index::START => curve.set_start_point(p),
            vertex_index::END => curve.set_end_point(p),
            vertex_index::CENTER => curve.center = *p,
            _ => {
                let delta = p - curve.mid_point();
                curve.center += delta;
            }
        }
        arc.set_from_circ_arc(&curve);
        Ok(())
    }

    fn fill_start_vertex_subent_id(&self, entity: &Entity, edge: SubentId) -> AssocResult<SubentId> {
        self.require(entity, edge, SubentType::Edge)?;
        Ok(SubentId::vertex(vertex_index::START))
    }

    fn fill_end_vertex_subent_id(&self, entity: &Entity, edge: SubentId) -> AssocResult<SubentId> {
        self.require(entity, edge, SubentType::Edge)?;
        Ok(SubentId::vertex(vertex_index::END))
    }

    fn get_other_vertex_subent_ids(&self, entity: &Entity, edge: SubentId) -> AssocResult<Vec<SubentId>> {
        self.require(entity, edge, SubentType::Edge)?;
        Ok(vec![
            SubentId::vertex(vertex_index::CENTER),
            SubentId::vertex(vertex_index::MIDDLE),
        ])
    }
}

// =============================================================================
// Circle
// =============================================================================

pub struct CircleTranslator;

const CIRCLE_VERTICES: &[i64] = &[vertex_index::CENTER];

impl SubentIdTranslator for CircleTranslator {
    fn entity_kind(&self) -> &'static str {
        "circle"
    }

    fn accepts(&self, entity: &Entity) -> bool {
        matches!(entity, Entity::Circle(_))
    }

    fn check_subent_id(&self, entity: &Entity, id: SubentId, kind: SubentType) -> bool {
        self.accepts(entity) && check_fixed(id, kind, CIRCLE_VERTICES)
    }

    fn create_new_pers_subent(&self, entity: &mut Entity, id: SubentId) -> AssocResult<PersSubentId> {
        self.require(entity, id, id.kind)?;
        Ok(PersSubentId::Indexed(id))
    }

    fn get_transient_subent_ids(&self, entity: &Entity, pers: &PersSubentId) -> AssocResult<Vec<SubentId>> {
        indexed_transient(self, entity, pers)
    }

    fn get_all_subentities(&self, entity: &Entity, kind: SubentType) -> AssocResult<Vec<SubentId>> {
        if !self.accepts(entity) {
            return Err(AssocError::wrong_object_type("not a circle"));
        }
        Ok(all_fixed(kind, CIRCLE_VERTICES))
    }

    fn get_edge_subentity_geometry(&self, entity: &Entity, edge: SubentId) -> AssocResult<EdgeCurve> {
        self.require(entity, edge, SubentType::Edge)?;
        match entity {
            Entity::Circle(circle) => Ok(EdgeCurve::Arc(circle.to_circ_arc())),
            _ => Err(AssocError::wrong_object_type("not a circle")),
        }
    }

    fn set_edge_subentity_geometry(&self, entity: &mut Entity, edge: SubentId, curve: &EdgeCurve) -> AssocResult<()> {
        self.require(entity, edge, SubentType::Edge)?;
        match (entity, curve) {
            (Entity::Circle(circle), EdgeCurve::Arc(arc)) => {
                circle.center = arc.center;
                circle.normal = arc.normal;
                circle.radius = arc.radius;
                Ok(())
            }
            (_, other) => Err(AssocError::invalid_input(format!(
                "cannot set a circle edge from a {}",
                other.kind_name()
            ))),
        }
    }

    fn get_vertex_subentity_geometry(&self, entity: &Entity, vertex: SubentId) -> AssocResult<Point3> {
        self.require(entity, vertex, SubentType::Vertex)?;
        match entity {
            Entity::Circle(circle) => Ok(circle.center),
            _ => Err(AssocError::wrong_object_type("not a circle")),
        }
    }

    fn set_vertex_subentity_geometry(&self, entity: &mut Entity, vertex: SubentId, p: &Point3) -> AssocResult<()> {
        self.require(entity, vertex, SubentType::Vertex)?;
        match entity {
            Entity::Circle(circle) => {
                circle.center = *p;
                Ok(())
            }
            _ => Err(AssocError::wrong_object_type("not a circle")),
        }
    }

    fn fill_start_vertex_subent_id(&self, entity: &Entity, edge: SubentId) -> AssocResult<SubentId> {
        self.require(entity, edge, SubentType::Edge)?;
        Err(no_vertex("circle", "start"))
    }

    fn fill_end_vertex_subent_id(&self, entity: &Entity, edge: SubentId) -> AssocResult<SubentId> {
        self.require(entity, edge, SubentType::Edge)?;
        Err(no_vertex("circle", "end"))
    }

    fn get_other_vertex_subent_ids(&self, entity: &Entity, edge: SubentId) -> AssocResult<Vec<SubentId>> {
        self.require(entity, edge, SubentType::Edge)?;
        Ok(vec![SubentId::vertex(vertex_index::CENTER)])
    }
}

// =============================================================================
// Ray
// =============================================================================

pub struct RayTranslator;

const RAY_VERTICES: &[i64] = &[vertex_index::START];

impl SubentIdTranslator for RayTranslator {
    fn entity_kind(&self) -> &'static str {
        "ray"
    }

    fn accepts(&self, entity: &Entity) -> bool {
        matches!(entity, Entity::Ray(_))
    }

    fn check_subent_id(&self, entity: &Entity, id: SubentId, kind: SubentType) -> bool {
        self.accepts(entity) && check_fixed(id, kind, RAY_VERTICES)
    }

    fn create_new_pers_subent(&self, entity: &mut Entity, id: SubentId) -> AssocResult<PersSubentId> {
        self.require(entity, id, id.kind)?;
        Ok(PersSubentId::Indexed(id))
    }

    fn get_transient_subent_ids(&self, entity: &Entity, pers: &PersSubentId) -> AssocResult<Vec<SubentId>> {
        indexed_transient(self, entity, pers)
    }

    fn get_all_subentities(&self, entity: &Entity, kind: SubentType) -> AssocResult<Vec<SubentId>> {
        if !self.accepts(entity) {
            return Err(AssocError::wrong_object_type("not a ray"));
        }
        Ok(all_fixed(kind, RAY_VERTICES))
    }

    fn get_edge_subentity_geometry(&self, entity: &Entity, edge: SubentId) -> AssocResult<EdgeCurve> {
        self.require(entity, edge, SubentType::Edge)?;
        match entity {
            Entity::Ray(ray) => Ok(EdgeCurve::Ray(Ray3::new(ray.base_point, ray.direction))),
            _ => Err(AssocError::wrong_object_type("not a ray")),
        }
    }

    fn set_edge_subentity_geometry(&self, entity: &mut Entity, edge: SubentId, curve: &EdgeCurve) -> AssocResult<()> {
        self.require(entity, edge, SubentType::Edge)?;
        match (entity, curve) {
            (Entity::Ray(ray), EdgeCurve::Ray(new_ray)) => {
                ray.base_point = new_ray.origin;
                ray.direction = new_ray.direction;
                Ok(())
            }
            (_, other) => Err(AssocError::invalid_input(format!(
                "cannot set a ray edge from a {}",
                other.kind_name()
            ))),
        }
    }

    fn get_vertex_subentity_geometry(&self, entity: &Entity, vertex: SubentId) -> AssocResult<Point3> {
        self.require(entity, vertex, SubentType::Vertex)?;
        match entity {
            Entity::Ray(ray) => Ok(ray.base_point),
            _ => Err(AssocError::wrong_object_type("not a ray")),
        }
    }

    fn set_vertex_subentity_geometry(&self, entity: &mut Entity, vertex: SubentId, p: &Point3) -> AssocResult<()> {
        self.require(entity, vertex, SubentType::Vertex)?;
        match entity {
            Entity::Ray(ray) => {
                ray.base_point = *p;
                Ok(())
            }
            _ => Err(AssocError::wrong_object_type("not a ray")),
        }
    }

    fn fill_start_vertex_subent_id(&self, entity: &Entity, edge: SubentId) -> AssocResult<SubentId> {
        self.require(entity, edge, SubentType::Edge)?;
        Ok(SubentId::vertex(vertex_index::START))
    }

    fn fill_end_vertex_subent_id(&self, entity: &Entity, edge: SubentId) -> AssocResult<SubentId> {
        self.require(entity, edge, SubentType::Edge)?;
        Err(no_vertex("ray", "end"))
    }

    fn get_other_vertex_subent_ids(&self, entity: &Entity, edge: SubentId) -> AssocResult<Vec<SubentId>> {
        self.require(entity, edge, SubentType::Edge)?;
        Ok(Vec::new())
    }
}

// =============================================================================
// Construction line
// =============================================================================

pub struct XLineTranslator;

impl SubentIdTranslator for XLineTranslator {
    fn entity_kind(&self) -> &'static str {
        "construction line"
    }

    fn accepts(&self, entity: &Entity) -> bool {
        matches!(entity, Entity::XLine(_))
    }

    fn check_subent_id(&self, entity: &Entity, id: SubentId, kind: SubentType) -> bool {
        self.accepts(entity) && check_fixed(id, kind, &[])
    }

    fn create_new_pers_subent(&self, entity: &mut Entity, id: SubentId) -> AssocResult<PersSubentId> {
        self.require(entity, id, id.kind)?;
        Ok(PersSubentId::Indexed(id))
    }

    fn get_transient_subent_ids(&self, entity: &Entity, pers: &PersSubentId) -> AssocResult<Vec<SubentId>> {
        indexed_transient(self, entity, pers)
    }

    fn get_all_subentities(&self, entity: &Entity, kind: SubentType) -> AssocResult<Vec<SubentId>> {
        if !self.accepts(entity) {
            return Err(AssocError::wrong_object_type("not a construction line"));
        }
        Ok(all_fixed(kind, &[]))
    }

    fn get_edge_subentity_geometry(&self, entity: &Entity, edge: SubentId) -> AssocResult<EdgeCurve> {
        self.require(entity, edge, SubentType::Edge)?;
        match entity {
            Entity::XLine(xline) => Ok(EdgeCurve::Line(Line3::new(xline.base_point, xline.direction))),
            _ => Err(AssocError::wrong_object_type("not a construction line")),
        }
    }

    fn set_edge_subentity_geometry(&self, entity: &mut Entity, edge: SubentId, curve: &EdgeCurve) -> AssocResult<()> {
        self.require(entity, edge, SubentType::Edge)?;
        match (entity, curve) {
            (Entity::XLine(xline), EdgeCurve::Line(line)) => {
                xline.base_point = line.origin;
                xline.direction = line.direction;
                Ok(())
            }
            (_, other) => Err(AssocError::invalid_input(format!(
                "cannot set a construction line edge from a {}",
                other.kind_name()
            ))),
        }
    }

    fn get_vertex_subentity_geometry(&self, entity: &Entity, vertex: SubentId) -> AssocResult<Point3> {
        self.require(entity, vertex, SubentType::Vertex)?;
        Err(no_vertex("construction line", "any"))
    }

    fn set_vertex_subentity_geometry(&self, entity: &mut Entity, vertex: SubentId, _p: &Point3) -> AssocResult<()> {
        self.require(entity, vertex, SubentType::Vertex)?;
        Err(no_vertex("construction line", "any"))
    }

    fn fill_start_vertex_subent_id(&self, entity: &Entity, edge: SubentId) -> AssocResult<SubentId> {
        self.require(entity, edge, SubentType::Edge)?;
        Err(no_vertex("construction line", "start"))
    }

    fn fill_end_vertex_subent_id(&self, entity: &Entity, edge: SubentId) -> AssocResult<SubentId> {
        self.require(entity, edge, SubentType::Edge)?;
        Err(no_vertex("construction line", "end"))
    }

    fn get_other_vertex_subent_ids(&self, entity: &Entity, edge: SubentId) -> AssocResult<Vec<SubentId>> {
        self.require(entity, edge, SubentType::Edge)?;
        Ok(Vec::new())
    }
}

