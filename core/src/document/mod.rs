//! Document-model collaborator.
//!
//! The constrained geometry never holds on to an entity between calls. Every
//! access goes through [`DocumentModel::with_entity`] or
//! [`DocumentModel::with_entity_mut`], whose closure scope is the open-for-read
//! or open-for-write window; the entity is released on every exit path.

pub mod entities;
pub use entities::*;

use crate::error::{AssocError, AssocResult};
use crate::geometry::Matrix4;
use crate::persist::PersSubentId;
use crate::topo::ObjectId;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Opaque reference from a constraint node to the entity it derives from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyId(pub u32);

/// A constraint group: the nodes sharing one working plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u32);

impl fmt::Display for DependencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dep#{}", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

/// What a geometry dependency resolves to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyInfo {
    pub entity: ObjectId,
    /// Persistent reference to the part of the entity this dependency is on,
    /// e.g. one polyline segment. `None` means the whole entity.
    pub subent: Option<PersSubentId>,
}

/// Boundary of the owning document and transaction model.
pub trait DocumentModel {
    fn dependency(&self, id: DependencyId) -> AssocResult<DependencyInfo>;

    /// World-to-plane transform of a constraint group's working plane.
    fn world_to_plane(&self, group: GroupId) -> AssocResult<Matrix4>;

    /// Open `id` for read for the duration of `f`.
    fn with_entity<R>(&self, id: ObjectId, f: impl FnOnce(&Entity) -> AssocResult<R>) -> AssocResult<R>;

    /// Open `id` for write for the duration of `f`.
    fn with_entity_mut<R>(&mut self, id: ObjectId, f: impl FnOnce(&mut Entity) -> AssocResult<R>) -> AssocResult<R>;
}

/// In-memory document used by hosts without a database and by tests.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    entities: HashMap<ObjectId, Entity>,
    dependencies: BTreeMap<DependencyId, DependencyInfo>,
    planes: HashMap<GroupId, Matrix4>,
    next_dependency: u32,
    open_scopes: Cell<u32>,
    write_opens: Cell<u32>,
}

/// Tracks one open scope; closing happens in `Drop` so early returns and
/// panics inside the scope still release the entity.
struct OpenScope<'a> {
    counter: &'a Cell<u32>,
}

impl<'a> OpenScope<'a> {
    fn enter(counter: &'a Cell<u32>) -> Self {
        counter.set(counter.get() + 1);
        Self { counter }
    }
}

impl Drop for OpenScope<'_> {
    fn drop(&mut self) {
        self.counter.set(self.counter.get() - 1);
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entity(&mut self, entity: Entity) -> ObjectId {
        let id = ObjectId::new();
        self.entities.insert(id, entity);
        id
    }

    pub fn entity(&self, id: ObjectId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Direct mutable access, bypassing the open-for-write accounting.
    /// Used to simulate edits made by other commands.
    pub fn entity_mut(&mut self, id: ObjectId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn erase(&mut self, id: ObjectId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn add_dependency(&mut self, entity: ObjectId, subent: Option<PersSubentId>) -> DependencyId {
        self.next_dependency += 1;
        let id = DependencyId(self.next_dependency);
        self.dependencies.insert(id, DependencyInfo { entity, subent });
        id
    }

    pub fn set_dependency_subent(&mut self, id: DependencyId, subent: Option<PersSubentId>) -> AssocResult<()> {
        let info = self
            .dependencies
            .get_mut(&id)
            .ok_or_else(|| AssocError::InvalidObjectId(format!("unknown {}", id)))?;
        info.subent = subent;
        Ok(())
    }

    pub fn set_world_to_plane(&mut self, group: GroupId, world_to_plane: Matrix4) {
        self.planes.insert(group, world_to_plane);
    }

    /// Number of entities currently opened through a scope.
    pub fn open_scope_count(&self) -> u32 {
        self.open_scopes.get()
    }

    /// Total number of open-for-write scopes entered so far.
    pub fn write_open_count(&self) -> u32 {
        self.write_opens.get()
    }
}

impl DocumentModel for MemoryDocument {
    fn dependency(&self, id: DependencyId) -> AssocResult<DependencyInfo> {
        self.dependencies
            .get(&id)
            .cloned()
            .ok_or_else(|| AssocError::InvalidObjectId(format!("unknown {}", id)))
    }

    fn world_to_plane(&self, group: GroupId) -> AssocResult<Matrix4> {
        Ok(self.planes.get(&group).copied().unwrap_or_else(Matrix4::identity))
    }

    fn with_entity<R>(&self, id: ObjectId, f: impl FnOnce(&Entity) -> AssocResult<R>) -> AssocResult<R> {
        let entity = self
            .entities
            .get(&id)
            .ok_or_else(|| AssocError::InvalidObjectId(format!("no entity {}", id)))?;
        let _scope = OpenScope::enter(&self.open_scopes);
        f(entity)
    }

    fn with_entity_mut<R>(&mut self, id: ObjectId, f: impl FnOnce(&mut Entity) -> AssocResult<R>) -> AssocResult<R> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or_else(|| AssocError::InvalidObjectId(format!("no entity {}", id)))?;
        self.write_opens.set(self.write_opens.get() + 1);
        let _scope = OpenScope::enter(&self.open_scopes);
        f(entity)
    }
}
