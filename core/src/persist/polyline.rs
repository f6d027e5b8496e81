//! Polyline translator and segment resolution.
//!
//! Polyline edges are named by the stable identifiers of their two end
//! vertices, so an edge reference survives vertices being inserted or removed
//! elsewhere in the polyline.

use super::ids::{
    EdgeIdentity, PersSubentId, SubentId, SubentType, ARC_CENTER_VERTEX_BIAS, SEGMENT_MID_VERTEX_BIAS,
};
use super::SubentIdTranslator;
use crate::document::{Entity, PolylineEntity};
use crate::error::{AssocError, AssocResult};
use crate::geometry::{EdgeCurve, Point3};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// How a segment reference had to be corrected to match the polyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentRepair {
    None,
    /// Both identifiers were found but the end vertex is not the successor
    /// of the start vertex.
    AdjacencyMismatch,
    /// Two-vertex polyline that never had identifiers assigned.
    UnassignedTwoVertex,
    /// Only the end identifier was found.
    MissingStart,
    /// Only the start identifier was found.
    MissingEnd,
}

impl SegmentRepair {
    pub fn is_repair(&self) -> bool {
        !matches!(self, SegmentRepair::None | SegmentRepair::UnassignedTwoVertex)
    }
}

/// Current vertex indices of a persistently named segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentResolution {
    pub start: usize,
    pub end: usize,
    pub repair: SegmentRepair,
}

impl SegmentResolution {
    /// 1-based transient edge index, derived from the end vertex so the
    /// closing segment of a closed polyline maps to the last edge.
    pub fn edge_index(&self, vertex_count: usize) -> i64 {
        if self.end == 0 {
            vertex_count as i64
        } else {
            self.end as i64
        }
    }
}

/// Find the segment named by `edge` in `polyline`.
///
/// Inconsistent identifiers are repaired using the adjacency rule
/// `end = (start + 1) mod count` and reported in
/// [`SegmentResolution::repair`]. Fails only when neither identifier is found.
pub fn resolve_segment(polyline: &PolylineEntity, edge: &EdgeIdentity) -> AssocResult<SegmentResolution> {
    let count = polyline.num_vertices();
    if count < 2 {
        return Err(AssocError::bad_obj_type("polyline has no segments"));
    }
    let start = polyline.find_vertex_id(edge.vertex_id_1);
    let end = polyline.find_vertex_id(edge.vertex_id_2);

    let resolution = match (start, end) {
        (Some(s), Some(e)) => {
            let expected = (s + 1) % count;
            if e == expected {
                SegmentResolution { start: s, end: e, repair: SegmentRepair::None }
            } else {
                warn!(
                    "polyline vertex ids {} and {} are not adjacent (indices {} and {}), using {}",
                    edge.vertex_id_1, edge.vertex_id_2, s, e, expected
                );
                SegmentResolution { start: s, end: expected, repair: SegmentRepair::AdjacencyMismatch }
            }
        }
        (None, None) if count == 2 && !polyline.has_vertex_ids() => SegmentResolution {
            start: 0,
            end: 1,
            repair: SegmentRepair::UnassignedTwoVertex,
        },
        (Some(s), None) => {
            warn!("polyline vertex id {} not found, deriving it from vertex {}", edge.vertex_id_2, s);
            SegmentResolution { start: s, end: (s + 1) % count, repair: SegmentRepair::MissingEnd }
        }
        (None, Some(e)) => {
            warn!("polyline vertex id {} not found, deriving it from vertex {}", edge.vertex_id_1, e);
            SegmentResolution { start: (e + count - 1) % count, end: e, repair: SegmentRepair::MissingStart }
        }
        (None, None) => {
            return Err(AssocError::bad_obj_type(format!(
                "polyline has no vertices with ids {} or {}",
                edge.vertex_id_1, edge.vertex_id_2
            )))
        }
    };
    Ok(resolution)
}

enum PolylineVertexRef {
    Real(usize),
    ArcCenter(usize),
    SegmentMid(usize),
}

pub struct PolylineTranslator;

fn polyline_of(entity: &Entity) -> AssocResult<&PolylineEntity> {
    match entity {
        Entity::Polyline(pl) => Ok(pl),
        _ => Err(AssocError::wrong_object_type("not a polyline")),
    }
}

fn polyline_of_mut(entity: &mut Entity) -> AssocResult<&mut PolylineEntity> {
    match entity {
        Entity::Polyline(pl) => Ok(pl),
        _ => Err(AssocError::wrong_object_type("not a polyline")),
    }
}

fn is_bulged(pl: &PolylineEntity, segment: usize) -> bool {
    pl.segment_vertices(segment).is_some() && pl.vertices[segment].bulge.abs() > 1e-12
}

/// 0-based segment of a 1-based edge index.
fn segment_of_edge(pl: &PolylineEntity, index: i64) -> Option<usize> {
    if index >= 1 && (index as usize) <= pl.num_segments() {
        Some(index as usize - 1)
    } else {
        None
    }
}

fn classify_vertex(pl: &PolylineEntity, index: i64) -> Option<PolylineVertexRef> {
    if index >= SEGMENT_MID_VERTEX_BIAS {
        let segment = segment_of_edge(pl, index - SEGMENT_MID_VERTEX_BIAS)?;
        Some(PolylineVertexRef::SegmentMid(segment))
    } else if index >= ARC_CENTER_VERTEX_BIAS {
        let segment = segment_of_edge(pl, index - ARC_CENTER_VERTEX_BIAS)?;
        is_bulged(pl, segment).then_some(PolylineVertexRef::ArcCenter(segment))
    } else if index >= 1 && (index as usize) <= pl.num_vertices() {
        Some(PolylineVertexRef::Real(index as usize - 1))
    } else {
        None
    }
}

fn segment_identity(pl: &mut PolylineEntity, segment: usize) -> AssocResult<(u32, u32)> {
    let (s, e) = pl
        .segment_vertices(segment)
        .ok_or_else(|| AssocError::invalid_input("segment out of range"))?;
    let v1 = pl
        .ensure_vertex_id(s)
        .ok_or_else(|| AssocError::invalid_input("vertex out of range"))?;
    let v2 = pl
        .ensure_vertex_id(e)
        .ok_or_else(|| AssocError::invalid_input("vertex out of range"))?;
    Ok((v1, v2))
}

impl SubentIdTranslator for PolylineTranslator {
    fn entity_kind(&self) -> &'static str {
        "polyline"
    }

    fn accepts(&self, entity: &Entity) -> bool {
        matches!(entity, Entity::Polyline(_))
    }

    fn check_subent_id(&self, entity: &Entity, id: SubentId, kind: SubentType) -> bool {
        let Entity::Polyline(pl) = entity else {
            return false;
        };
        if id.kind != kind {
            return false;
        }
        match kind {
            SubentType::Edge => segment_of_edge(pl, id.index).is_some(),
            SubentType::Vertex => classify_vertex(pl, id.index).is_some(),
            _ => false,
        }
    }

    fn create_new_pers_subent(&self, entity: &mut Entity, id: SubentId) -> AssocResult<PersSubentId> {
        self.require(entity, id, id.kind)?;
        let pl = polyline_of_mut(entity)?;
        match id.kind {
            SubentType::Edge => {
                let segment = segment_of_edge(pl, id.index)
                    .ok_or_else(|| AssocError::invalid_input("edge out of range"))?;
                let (v1, v2) = segment_identity(pl, segment)?;
                Ok(PersSubentId::Edge(EdgeIdentity::edge(v1, v2)))
            }
            _ => match classify_vertex(pl, id.index) {
                Some(PolylineVertexRef::Real(i)) => {
                    let vertex_id = pl
                        .ensure_vertex_id(i)
                        .ok_or_else(|| AssocError::invalid_input("vertex out of range"))?;
                    Ok(PersSubentId::Vertex { vertex_id })
                }
                Some(PolylineVertexRef::ArcCenter(segment)) => {
                    let (v1, v2) = segment_identity(pl, segment)?;
                    Ok(PersSubentId::Edge(EdgeIdentity::arc_center(v1, v2)))
                }
                Some(PolylineVertexRef::SegmentMid(segment)) => {
                    let (v1, v2) = segment_identity(pl, segment)?;
                    Ok(PersSubentId::Edge(EdgeIdentity::segment_mid(v1, v2)))
                }
                None => Err(AssocError::invalid_input("vertex out of range")),
            },
        }
    }

    fn get_transient_subent_ids(&self, entity: &Entity, pers: &PersSubentId) -> AssocResult<Vec<SubentId>> {
        let pl = polyline_of(entity)?;
        match pers {
            PersSubentId::Vertex { vertex_id } => {
                let index = pl
                    .find_vertex_id(*vertex_id)
                    .ok_or_else(|| AssocError::invalid_input(format!("no vertex with id {}", vertex_id)))?;
                Ok(vec![SubentId::vertex(index as i64 + 1)])
            }
            PersSubentId::Edge(edge) if edge.is_null() && pl.has_vertex_ids() => {
                Err(AssocError::bad_obj_type("null polyline edge identity"))
            }
            PersSubentId::Edge(edge) => {
                let resolved = resolve_segment(pl, edge)?;
                let edge_index = resolved.edge_index(pl.num_vertices());
                let id = match (edge.kind, edge.midpoint_style) {
                    (SubentType::Edge, _) => SubentId::edge(edge_index),
                    (SubentType::Vertex, true) => SubentId::vertex(SEGMENT_MID_VERTEX_BIAS + edge_index),
                    (SubentType::Vertex, false) => SubentId::vertex(ARC_CENTER_VERTEX_BIAS + edge_index),
                    (other, _) => {
                        return Err(AssocError::bad_obj_type(format!("{:?} is not a polyline subentity", other)))
                    }
                };
                Ok(vec![id])
            }
            other => Err(AssocError::bad_obj_type(format!("{:?} is not a polyline id", other))),
        }
    }

    fn get_all_subentities(&self, entity: &Entity, kind: SubentType) -> AssocResult<Vec<SubentId>> {
        let pl = polyline_of(entity)?;
        Ok(match kind {
            SubentType::Edge => (1..=pl.num_segments() as i64).map(SubentId::edge).collect(),
            SubentType::Vertex => {
                let mut ids = Vec::new();
                for i in 0..pl.num_vertices() {
                    let edge_index = i as i64 + 1;
                    ids.push(SubentId::vertex(edge_index));
                    if is_bulged(pl, i) {
                        ids.push(SubentId::vertex(ARC_CENTER_VERTEX_BIAS + edge_index));
                    }
                    if pl.segment_vertices(i).is_some() {
                        ids.push(SubentId::vertex(SEGMENT_MID_VERTEX_BIAS + edge_index));
                    }
                }
                ids
            }
            _ => Vec::new(),
        })
    }

    fn get_edge_subentity_geometry(&self, entity: &Entity, edge: SubentId) -> AssocResult<EdgeCurve> {
        self.require(entity, edge, SubentType::Edge)?;
        let pl = polyline_of(entity)?;
        segment_of_edge(pl, edge.index)
            .and_then(|segment| pl.segment_curve_world(segment))
            .ok_or_else(|| AssocError::invalid_input("edge out of range"))
    }

    fn set_edge_subentity_geometry(&self, entity: &mut Entity, edge: SubentId, _curve: &EdgeCurve) -> AssocResult<()> {
        self.require(entity, edge, SubentType::Edge)?;
        Err(AssocError::NotImplementedYet("polyline edge geometry injection".into()))
    }

    fn get_vertex_subentity_geometry(&self, entity: &Entity, vertex: SubentId) -> AssocResult<Point3> {
        self.require(entity, vertex, SubentType::Vertex)?;
        let pl = polyline_of(entity)?;
        let missing = || AssocError::invalid_input("vertex out of range");
        match classify_vertex(pl, vertex.index).ok_or_else(missing)? {
            PolylineVertexRef::Real(i) => pl.point_world(i).ok_or_else(missing),
            PolylineVertexRef::ArcCenter(segment) => match pl.segment_curve_world(segment) {
                Some(EdgeCurve::Arc(arc)) => Ok(arc.center),
                _ => Err(missing()),
            },
            PolylineVertexRef::SegmentMid(segment) => match pl.segment_curve_world(segment) {
                Some(EdgeCurve::Arc(arc)) => Ok(arc.mid_point()),
                Some(EdgeCurve::LineSeg(seg)) => Ok(seg.midpoint()),
                _ => Err(missing()),
            },
        }
    }

    fn set_vertex_subentity_geometry(&self, entity: &mut Entity, vertex: SubentId, p: &Point3) -> AssocResult<()> {
        self.require(entity, vertex, SubentType::Vertex)?;
        let pl = polyline_of_mut(entity)?;
        match classify_vertex(pl, vertex.index) {
            Some(PolylineVertexRef::Real(i)) => {
                let ocs = crate::geometry::world_to_ocs(&pl.normal, pl.elevation).transform_point(p);
                let v = &mut pl.vertices[i];
                v.position.x = ocs.x;
                v.position.y = ocs.y;
                Ok(())
            }
            Some(_) => Err(AssocError::NotImplementedYet("polyline pseudo-vertex injection".into())),
            None => Err(AssocError::invalid_input("vertex out of range")),
        }
    }

    fn fill_start_vertex_subent_id(&self, entity: &Entity, edge: SubentId) -> AssocResult<SubentId> {
        self.require(entity, edge, SubentType::Edge)?;
        let pl = polyline_of(entity)?;
        let (s, _) = segment_of_edge(pl, edge.index)
            .and_then(|segment| pl.segment_vertices(segment))
            .ok_or_else(|| AssocError::invalid_input("edge out of range"))?;
        Ok(SubentId::vertex(s as i64 + 1))
    }

    fn fill_end_vertex_subent_id(&self, entity: &Entity, edge: SubentId) -> AssocResult<SubentId> {
        self.require(entity, edge, SubentType::Edge)?;
        let pl = polyline_of(entity)?;
        let (_, e) = segment_of_edge(pl, edge.index)
            .and_then(|segment| pl.segment_vertices(segment))
            .ok_or_else(|| AssocError::invalid_input("edge out of range"))?;
        Ok(SubentId::vertex(e as i64 + 1))
    }

    fn get_other_vertex_subent_ids(&self, entity: &Entity, edge: SubentId) -> AssocResult<Vec<SubentId>> {
        self.require(entity, edge, SubentType::Edge)?;
        let pl = polyline_of(entity)?;
        let segment = segment_of_edge(pl, edge.index).ok_or_else(|| AssocError::invalid_input("edge out of range"))?;
        let mut ids = Vec::new();
        if is_bulged(pl, segment) {
            ids.push(SubentId::vertex(ARC_CENTER_VERTEX_BIAS + edge.index));
        }
        ids.push(SubentId::vertex(SEGMENT_MID_VERTEX_BIAS + edge.index));
        Ok(ids)
    }
}
