use serde::{Deserialize, Serialize};
use super::EntityId;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TopoRank {
    Vertex = 0,
    Edge = 1,
    Face = 2,
}

/// A stable identifier for a subentity of a solid or surface body
/// (e.g. "edge 5 of Solid 1").
///
/// It survives re-indexing of the body's edge and vertex lists, which is what
/// lets a constraint keep pointing at the same edge after the body changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopoId {
    /// The body that owns this topology.
    pub owner: EntityId,
    /// A deterministic local identifier derived from the construction step.
    pub local_id: u64,
    pub rank: TopoRank,
}

impl TopoId {
    pub fn new(owner: EntityId, local_id: u64, rank: TopoRank) -> Self {
        Self {
            owner,
            local_id,
            rank,
        }
    }
}

/// Derives stable TopoIds for one body.
pub struct NamingContext {
    owner: EntityId,
}

impl NamingContext {
    pub fn new(owner: EntityId) -> Self {
        Self { owner }
    }

    /// Derives a stable TopoId from a string seed (e.g. "EdgeTopFront").
    /// Uses UUID v5 (SHA-1) truncated to u64 so the id is stable across platforms.
    pub fn derive(&self, seed: &str, rank: TopoRank) -> TopoId {
        let uuid = Uuid::new_v5(&self.owner.0, seed.as_bytes());
        let bytes = uuid.as_bytes();
        let mut arr = [0u8; 8];
        arr.copy_from_slice(&bytes[..8]);
        TopoId::new(self.owner, u64::from_be_bytes(arr), rank)
    }
}
