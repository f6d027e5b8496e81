//! Constrained geometry: the nodes a constraint solver reads and writes,
//! derived from and written back to document entities.
//!
//! A host builds a [`ConstraintGroup`], adds curve nodes, calls
//! [`ConstraintGroup::init`] once per dependency, lets the solver work through
//! the node getters and setters, then calls [`ConstraintGroup::push`].

pub mod audit;
pub mod curves;
pub mod geometry;
pub mod group;
pub mod node;
pub mod spline;
pub mod sync;

pub use audit::AuditInfo;
pub use curves::{
    ArcNode, BoundedEllipseNode, BoundedLineNode, CircleNode, ConstructionLineNode, ConstructionVariant, EllipseNode,
    LineNode, RigidSetNode,
};
pub use geometry::{ConstrainedGeometry, NodeKind};
pub use group::ConstraintGroup;
pub use node::{ImplicitPointKind, ImplicitPointNode, NodeBase, NodeId, Tracked, NO_DEFINE_INDEX};
pub use spline::SplineNode;
pub use sync::SyncOutcome;

#[cfg(test)]
mod tests_nodes;
#[cfg(test)]
mod tests_group;
