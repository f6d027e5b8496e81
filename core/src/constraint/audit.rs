//! Detection and repair of arcs on polylines stored in the legacy convention:
//! normal reversed and start/end swapped relative to a fresh pull.

use super::geometry::{ConstrainedGeometry, NodeKind};
use super::group::ConstraintGroup;
use super::node::{NodeBase, NodeId};
use super::sync;
use crate::document::DocumentModel;
use crate::error::AssocResult;
use crate::geometry::{is_anti_codirectional, ApproxEq, CircArc3};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Counters for one audit pass. Fixes are applied only when `fix_errors` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditInfo {
    pub fix_errors: bool,
    pub errors_found: u32,
    pub errors_fixed: u32,
}

impl AuditInfo {
    pub fn new(fix_errors: bool) -> Self {
        Self {
            fix_errors,
            ..Self::default()
        }
    }
}

fn is_legacy_reversed(stored: &CircArc3, reference: &CircArc3, group: &ConstraintGroup) -> bool {
    let tol = group.tolerance();
    is_anti_codirectional(&stored.normal, &reference.normal, tol)
        && stored.start_point().approx_eq_tol(&reference.end_point(), tol)
        && stored.end_point().approx_eq_tol(&reference.start_point(), tol)
}

impl ConstraintGroup {
    /// Check one node against a node freshly derived from its dependency.
    ///
    /// Only failures to read the dependency are errors; findings are counted
    /// in `audit`.
    pub fn audit_node<D: DocumentModel>(&mut self, doc: &D, id: NodeId, audit: &mut AuditInfo) -> AssocResult<()> {
        let node = self.node(id)?;
        let Some(dependency) = node.base.dependency else {
            return Ok(());
        };
        if !matches!(node.kind, NodeKind::Arc(_)) {
            return Ok(());
        }

        let mut reference = ConstrainedGeometry::new(NodeBase::new(id, self.id()), node.kind.clone());
        let world_to_plane = doc.world_to_plane(self.id())?;
        let outcome = sync::pull(&mut reference.kind, doc, dependency, &world_to_plane)?;
        reference.commit();

        if node.geom_eq(&reference, self.tolerance()) || !outcome.is_polyline() {
            return Ok(());
        }
        let (stored, fresh) = (node.circle_arc()?, reference.circle_arc()?);
        if !is_legacy_reversed(&stored, &fresh, self) {
            return Ok(());
        }

        audit.errors_found += 1;
        warn!("{} stores a polyline arc in the reversed legacy convention", id);
        if !audit.fix_errors {
            return Ok(());
        }

        self.init(doc, id, dependency)?;
        self.swap_implicit_ends(id);
        audit.errors_fixed += 1;
        info!("{} re-initialised and its start/end points swapped", id);
        Ok(())
    }

    /// Audit every node of the group.
    pub fn audit<D: DocumentModel>(&mut self, doc: &D, audit: &mut AuditInfo) -> AssocResult<()> {
        let ids: Vec<NodeId> = self.nodes().map(|n| n.base.id).collect();
        for id in ids {
            self.audit_node(doc, id, audit)?;
        }
        Ok(())
    }
}
