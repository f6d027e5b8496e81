//! Node identity, shared base state and the original-snapshot tracker.

use crate::document::{DependencyId, GroupId};
use crate::error::{AssocError, AssocResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a node in its [`ConstraintGroup`](super::ConstraintGroup) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// State every constrained-geometry node carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeBase {
    pub id: NodeId,
    pub group: GroupId,
    /// Set once by `init`.
    pub dependency: Option<DependencyId>,
    /// Edited since the last pull.
    pub dirty: bool,
}

impl NodeBase {
    pub fn new(id: NodeId, group: GroupId) -> Self {
        Self {
            id,
            group,
            dependency: None,
            dirty: false,
        }
    }

    /// Bind the node to `dependency`. Re-binding to the same id is a no-op;
    /// binding to a different one fails.
    pub fn bind(&mut self, dependency: DependencyId) -> AssocResult<()> {
        match self.dependency {
            None => {
                self.dependency = Some(dependency);
                Ok(())
            }
            Some(existing) if existing == dependency => Ok(()),
            Some(existing) => Err(AssocError::bad_obj_type(format!(
                "{} is already bound to {}, cannot rebind to {}",
                self.id, existing, dependency
            ))),
        }
    }

    pub fn require_dependency(&self) -> AssocResult<DependencyId> {
        self.dependency
            .ok_or_else(|| AssocError::bad_obj_type(format!("{} has no dependency", self.id)))
    }
}

/// A value plus the snapshot it had before the first edit since the last commit.
///
/// `Clean` while `original` is `None`; the first [`edit`](Tracked::edit) or
/// [`replace`](Tracked::replace) moves to `Dirty(original)` and further edits
/// are coalesced into the same snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tracked<T> {
    current: T,
    original: Option<T>,
}

impl<T: Clone> Tracked<T> {
    pub fn new(value: T) -> Self {
        Self {
            current: value,
            original: None,
        }
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    /// The captured snapshot, or the current value while clean.
    pub fn original(&self) -> &T {
        self.original.as_ref().unwrap_or(&self.current)
    }

    pub fn has_original(&self) -> bool {
        self.original.is_some()
    }

    fn capture(&mut self) {
        if self.original.is_none() {
            self.original = Some(self.current.clone());
        }
    }

    pub fn edit(&mut self) -> &mut T {
        self.capture();
        &mut self.current
    }

    pub fn replace(&mut self, value: T) {
        self.capture();
        self.current = value;
    }

    /// Drop the snapshot; the current value becomes the new baseline.
    pub fn commit(&mut self) {
        self.original = None;
    }

    /// Replace the value and drop any snapshot.
    pub fn reset(&mut self, value: T) {
        self.current = value;
        self.original = None;
    }
}

impl<T: Clone + Default> Default for Tracked<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Which point of its curve an implicit point stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImplicitPointKind {
    Start,
    End,
    Mid,
    Center,
    /// Control point `i` of a spline.
    Define(u32),
}

/// Define index written for every kind other than `Define`.
pub const NO_DEFINE_INDEX: i32 = -1;

impl ImplicitPointKind {
    pub fn tag(&self) -> i32 {
        match self {
            ImplicitPointKind::Start => 0,
            ImplicitPointKind::End => 1,
            ImplicitPointKind::Mid => 2,
            ImplicitPointKind::Center => 3,
            ImplicitPointKind::Define(_) => 4,
        }
    }

    pub fn define_index(&self) -> i32 {
        match self {
            ImplicitPointKind::Define(i) => *i as i32,
            _ => NO_DEFINE_INDEX,
        }
    }

    pub fn from_parts(tag: i32, define_index: i32) -> AssocResult<Self> {
        Ok(match tag {
            0 => ImplicitPointKind::Start,
            1 => ImplicitPointKind::End,
            2 => ImplicitPointKind::Mid,
            3 => ImplicitPointKind::Center,
            4 => {
                let index = u32::try_from(define_index)
                    .map_err(|_| AssocError::bad_obj_type(format!("define index {} out of range", define_index)))?;
                ImplicitPointKind::Define(index)
            }
            other => return Err(AssocError::bad_obj_type(format!("unknown implicit point tag {}", other))),
        })
    }

    /// Start and End exchanged, everything else unchanged.
    pub fn with_ends_swapped(self) -> Self {
        match self {
            ImplicitPointKind::Start => ImplicitPointKind::End,
            ImplicitPointKind::End => ImplicitPointKind::Start,
            other => other,
        }
    }
}

/// A point derived from a curve node. Holds no geometry of its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImplicitPointNode {
    pub kind: ImplicitPointKind,
    pub curve: NodeId,
}

impl ImplicitPointNode {
    pub fn new(kind: ImplicitPointKind, curve: NodeId) -> Self {
        Self { kind, curve }
    }
}
