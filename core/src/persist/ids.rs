//! Transient and persistent subentity references.

use crate::topo::{ObjectId, TopoId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubentType {
    Null,
    Edge,
    Vertex,
    Face,
}

/// Positional reference to part of an entity. Only valid until the entity's
/// topology changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubentId {
    pub kind: SubentType,
    pub index: i64,
}

impl SubentId {
    pub fn new(kind: SubentType, index: i64) -> Self {
        Self { kind, index }
    }

    pub fn edge(index: i64) -> Self {
        Self::new(SubentType::Edge, index)
    }

    pub fn vertex(index: i64) -> Self {
        Self::new(SubentType::Vertex, index)
    }

    pub fn face(index: i64) -> Self {
        Self::new(SubentType::Face, index)
    }
}

/// Edge index of entities with exactly one edge.
pub const SINGLE_EDGE_INDEX: i64 = 1;

/// Vertex indices of entities with a fixed vertex set.
pub mod vertex_index {
    pub const START: i64 = 1;
    pub const END: i64 = 2;
    pub const MIDDLE: i64 = 3;
    pub const CENTER: i64 = 4;
}

/// Bias of arc-centre pseudo-vertices of polyline segments.
pub const ARC_CENTER_VERTEX_BIAS: i64 = 1_000_000;
/// Bias of mid-segment pseudo-vertices of polyline segments.
pub const SEGMENT_MID_VERTEX_BIAS: i64 = 2_000_000;

/// Persistent identity of a polyline segment (or of a pseudo-vertex derived
/// from one), named by the stable identifiers of its two end vertices.
///
/// Null while `vertex_id_1 == 0`. Equality is order-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeIdentity {
    pub kind: SubentType,
    pub vertex_id_1: u32,
    pub vertex_id_2: u32,
    /// For pseudo-vertices: `true` names the segment midpoint, `false` the arc centre.
    pub midpoint_style: bool,
}

impl EdgeIdentity {
    pub fn null() -> Self {
        Self {
            kind: SubentType::Edge,
            vertex_id_1: 0,
            vertex_id_2: 0,
            midpoint_style: false,
        }
    }

    pub fn edge(vertex_id_1: u32, vertex_id_2: u32) -> Self {
        Self {
            kind: SubentType::Edge,
            vertex_id_1,
            vertex_id_2,
            midpoint_style: false,
        }
    }

    pub fn segment_mid(vertex_id_1: u32, vertex_id_2: u32) -> Self {
        Self {
            kind: SubentType::Vertex,
            vertex_id_1,
            vertex_id_2,
            midpoint_style: true,
        }
    }

    pub fn arc_center(vertex_id_1: u32, vertex_id_2: u32) -> Self {
        Self {
            kind: SubentType::Vertex,
            vertex_id_1,
            vertex_id_2,
            midpoint_style: false,
        }
    }

    pub fn is_null(&self) -> bool {
        self.vertex_id_1 == 0
    }
}

impl Default for EdgeIdentity {
    fn default() -> Self {
        Self::null()
    }
}

/// A reference to part of an entity that stays valid across topology edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PersSubentId {
    /// Entities whose topology never changes keep the transient id.
    Indexed(SubentId),
    /// A polyline vertex, by stable identifier.
    Vertex { vertex_id: u32 },
    /// A polyline segment or segment pseudo-vertex.
    Edge(EdgeIdentity),
    /// A solid or surface subentity, by topological name.
    Topo(TopoId),
}

impl PersSubentId {
    pub fn kind(&self) -> SubentType {
        match self {
            PersSubentId::Indexed(id) => id.kind,
            PersSubentId::Vertex { .. } => SubentType::Vertex,
            PersSubentId::Edge(edge) => edge.kind,
            PersSubentId::Topo(topo) => match topo.rank {
                crate::topo::TopoRank::Vertex => SubentType::Vertex,
                crate::topo::TopoRank::Edge => SubentType::Edge,
                crate::topo::TopoRank::Face => SubentType::Face,
            },
        }
    }

    pub fn as_edge_identity(&self) -> Option<&EdgeIdentity> {
        match self {
            PersSubentId::Edge(edge) => Some(edge),
            _ => None,
        }
    }
}

/// Entity plus subentity a consumer should highlight or edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FullSubentPath {
    pub entity: ObjectId,
    pub subent: SubentId,
}

impl FullSubentPath {
    pub fn new(entity: ObjectId, subent: SubentId) -> Self {
        Self { entity, subent }
    }
}
