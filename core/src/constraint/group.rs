//! Constraint group: the arena that owns every node sharing one working plane.
//!
//! Back-references between nodes (implicit point → curve, rigid set → member,
//! construction line → point) are plain [`NodeId`]s looked up here. A lookup
//! miss is a `BadObjType`, never a dangling reference.

use super::curves::{ConstructionVariant, RigidSetNode};
use super::geometry::{ConstrainedGeometry, NodeKind};
use super::node::{ImplicitPointKind, ImplicitPointNode, NodeBase, NodeId};
use super::sync::{self, SyncOutcome};
use crate::config::Tolerance;
use crate::document::{DependencyId, DocumentModel, GroupId};
use crate::error::{AssocError, AssocResult};
use crate::geometry::{invert_or_identity, Line3, Matrix4, Point3};
use crate::persist::{
    self, resolve_segment, vertex_index, FullSubentPath, PersSubentId, SegmentResolution, SubentId,
    ARC_CENTER_VERTEX_BIAS, SEGMENT_MID_VERTEX_BIAS, SINGLE_EDGE_INDEX,
};
use crate::topo::ObjectId;
use std::cell::Cell;
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ConstraintGroup {
    id: GroupId,
    nodes: BTreeMap<NodeId, ConstrainedGeometry>,
    next_id: u32,
    tolerance: Tolerance,
    /// Bumped by path queries too, which only borrow the group.
    segment_repairs: Cell<u32>,
}

/// Where a dependency points, with the polyline segment already resolved.
struct DependencyTarget {
    entity: ObjectId,
    subent: Option<PersSubentId>,
    /// Resolved segment and vertex count for polyline dependencies.
    segment: Option<(SegmentResolution, usize)>,
}

impl ConstraintGroup {
    pub fn new(id: GroupId) -> Self {
        Self::with_tolerance(id, Tolerance::default())
    }

    pub fn with_tolerance(id: GroupId, tolerance: Tolerance) -> Self {
        Self {
            id,
            nodes: BTreeMap::new(),
            next_id: 0,
            tolerance,
            segment_repairs: Cell::new(0),
        }
    }

    /// Rebuild a group from filed nodes. Every node reference must resolve
    /// inside the group.
    pub(crate) fn from_filed(id: GroupId, tolerance: Tolerance, nodes: Vec<ConstrainedGeometry>) -> AssocResult<Self> {
        let mut group = Self::with_tolerance(id, tolerance);
        for node in nodes {
            let node_id = node.base.id;
            group.next_id = group.next_id.max(node_id.0);
            if group.nodes.insert(node_id, node).is_some() {
                return Err(AssocError::invalid_input(format!("{} filed twice in {}", node_id, id)));
            }
        }
        for node in group.nodes.values() {
            for referenced in node.kind.referenced_nodes() {
                group.node(referenced)?;
            }
        }
        Ok(group)
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// Polyline segment references repaired so far by pulls, pushes and
    /// subentity path queries.
    pub fn segment_repairs(&self) -> u32 {
        self.segment_repairs.get()
    }

    fn count_repair(&self) {
        self.segment_repairs.set(self.segment_repairs.get() + 1);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ConstrainedGeometry> {
        self.nodes.values()
    }

    pub fn node(&self, id: NodeId) -> AssocResult<&ConstrainedGeometry> {
        self.nodes
            .get(&id)
            .ok_or_else(|| AssocError::bad_obj_type(format!("{} is not in {}", id, self.id)))
    }

    pub fn node_mut(&mut self, id: NodeId) -> AssocResult<&mut ConstrainedGeometry> {
        let group = self.id;
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| AssocError::bad_obj_type(format!("{} is not in {}", id, group)))
    }

    fn insert(&mut self, kind: NodeKind) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        self.nodes.insert(id, ConstrainedGeometry::new(NodeBase::new(id, self.id), kind));
        id
    }

    /// Add a node, plus the implicit points a curve of its kind exposes.
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let implicit = kind.implicit_kinds();
        let id = self.insert(kind);
        self.add_implicit_points(id, &implicit);
        id
    }

    fn add_implicit_points(&mut self, curve: NodeId, kinds: &[ImplicitPointKind]) {
        let mut define_ids = Vec::new();
        for kind in kinds {
            let point = self.insert(NodeKind::ImplicitPoint(ImplicitPointNode::new(*kind, curve)));
            if matches!(kind, ImplicitPointKind::Define(_)) {
                define_ids.push(point);
            }
        }
        if !define_ids.is_empty() {
            if let Some(NodeKind::Spline(spline)) = self.nodes.get_mut(&curve).map(|n| &mut n.kind) {
                spline.define_ids.extend(define_ids);
            }
        }
    }

    pub fn add_rigid_set(&mut self, members: Vec<NodeId>) -> AssocResult<NodeId> {
        for member in &members {
            self.node(*member)?;
        }
        Ok(self.insert(NodeKind::RigidSet(RigidSetNode::new(members))))
    }

    // -------------------------------------------------------------------------
    // Implicit points
    // -------------------------------------------------------------------------

    /// Implicit points whose owning curve is `curve`, in id order.
    pub fn implicit_points_of(&self, curve: NodeId) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| matches!(&n.kind, NodeKind::ImplicitPoint(p) if p.curve == curve))
            .map(|n| n.base.id)
            .collect()
    }

    pub fn find_implicit_point(&self, curve: NodeId, kind: ImplicitPointKind) -> Option<NodeId> {
        self.nodes.values().find_map(|n| match &n.kind {
            NodeKind::ImplicitPoint(p) if p.curve == curve && p.kind == kind => Some(n.base.id),
            _ => None,
        })
    }

    pub fn implicit_point(&self, id: NodeId) -> AssocResult<ImplicitPointNode> {
        match &self.node(id)?.kind {
            NodeKind::ImplicitPoint(p) => Ok(*p),
            other => Err(AssocError::bad_obj_type(format!("{} is a {}, not an implicit point", id, other.name()))),
        }
    }

    pub fn point(&self, id: NodeId) -> AssocResult<Point3> {
        let p = self.implicit_point(id)?;
        self.node(p.curve)?.point(p.kind)
    }

    pub fn original_point(&self, id: NodeId) -> AssocResult<Point3> {
        let p = self.implicit_point(id)?;
        self.node(p.curve)?.original_point(p.kind)
    }

    pub fn set_point(&mut self, id: NodeId, point: &Point3) -> AssocResult<()> {
        let p = self.implicit_point(id)?;
        self.node_mut(p.curve)?.set_point(p.kind, point)
    }

    /// Exchange Start and End on every implicit point of `curve`.
    pub(crate) fn swap_implicit_ends(&mut self, curve: NodeId) {
        for node in self.nodes.values_mut() {
            if let NodeKind::ImplicitPoint(p) = &mut node.kind {
                if p.curve == curve {
                    p.kind = p.kind.with_ends_swapped();
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Sync with the document
    // -------------------------------------------------------------------------

    fn record(&mut self, outcome: &SyncOutcome) {
        if let Some(resolved) = &outcome.segment {
            if resolved.repair.is_repair() {
                self.count_repair();
            }
        }
    }

    /// Bind `id` to `dependency` and pull its geometry. The pulled geometry
    /// becomes the baseline: no original snapshot survives `init`.
    pub fn init<D: DocumentModel>(&mut self, doc: &D, id: NodeId, dependency: DependencyId) -> AssocResult<()> {
        let world_to_plane = doc.world_to_plane(self.id)?;
        let node = self.node_mut(id)?;
        if !node.kind.is_curve() {
            return Err(AssocError::bad_obj_type(format!(
                "a {} has no dependency",
                node.kind.name()
            )));
        }
        node.base.bind(dependency)?;
        let outcome = sync::pull(&mut node.kind, doc, dependency, &world_to_plane)?;
        node.commit();
        node.base.dirty = false;

        // Splines learn their control point count on the first pull.
        let missing_defines = match &node.kind {
            NodeKind::Spline(s) if s.define_ids.is_empty() => s.implicit_kinds(),
            _ => Vec::new(),
        };
        self.add_implicit_points(id, &missing_defines);
        self.record(&outcome);
        debug!("initialised {} from {}", id, dependency);
        Ok(())
    }

    /// Re-read the dependency. The pulled geometry becomes the baseline and
    /// any earlier original snapshot is dropped.
    pub fn pull<D: DocumentModel>(&mut self, doc: &D, id: NodeId) -> AssocResult<SyncOutcome> {
        let world_to_plane = doc.world_to_plane(self.id)?;
        let node = self.node_mut(id)?;
        let dependency = node.base.require_dependency()?;
        let outcome = sync::pull(&mut node.kind, doc, dependency, &world_to_plane)?;
        node.commit();
        node.base.dirty = false;
        self.record(&outcome);
        Ok(outcome)
    }

    /// Write the node back to its dependency and make it the new baseline.
    pub fn push<D: DocumentModel>(&mut self, doc: &mut D, id: NodeId) -> AssocResult<SyncOutcome> {
        let plane_to_world = invert_or_identity(&doc.world_to_plane(self.id)?);
        let node = self.node_mut(id)?;
        let dependency = node.base.require_dependency()?;
        let outcome = sync::push(&node.kind, doc, dependency, &plane_to_world)?;
        node.commit();
        self.record(&outcome);
        Ok(outcome)
    }

    fn bound_curves(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.kind.is_curve() && n.base.dependency.is_some())
            .map(|n| n.base.id)
            .collect()
    }

    pub fn pull_all<D: DocumentModel>(&mut self, doc: &D) -> AssocResult<()> {
        for id in self.bound_curves() {
            self.pull(doc, id)?;
        }
        Ok(())
    }

    pub fn push_all<D: DocumentModel>(&mut self, doc: &mut D) -> AssocResult<()> {
        for id in self.bound_curves() {
            self.push(doc, id)?;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Solver hooks
    // -------------------------------------------------------------------------

    /// Tolerance-aware equality of two nodes of this group.
    pub fn nodes_equal(&self, a: NodeId, b: NodeId) -> AssocResult<bool> {
        Ok(self.node(a)?.geom_eq(self.node(b)?, &self.tolerance))
    }

    /// Recompute derived geometry after a solve pass. Construction lines
    /// follow the point nodes they are attached to; other kinds are unchanged.
    pub fn do_post_evaluate_job(&mut self, id: NodeId) -> AssocResult<()> {
        let variant = match &self.node(id)?.kind {
            NodeKind::ConstructionLine(c) => c.variant,
            _ => return Ok(()),
        };
        let line = match variant {
            ConstructionVariant::TwoPoint { points } => {
                let p1 = self.point(points[0])?;
                let p2 = self.point(points[1])?;
                Line3::through(&p1, &p2).ok_or_else(|| {
                    AssocError::DegenerateGeometry("construction line points coincide".into())
                })?
            }
            ConstructionVariant::Datum { point, direction } => Line3::new(self.point(point)?, direction),
        };
        self.node_mut(id)?.set_line(line)
    }

    pub fn do_post_evaluate_all(&mut self) -> AssocResult<()> {
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        for id in ids {
            self.do_post_evaluate_job(id)?;
        }
        Ok(())
    }

    pub fn set_rigid_transform(&mut self, id: NodeId, transform: Matrix4) -> AssocResult<()> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::RigidSet(set) => {
                set.set_transform(transform);
                Ok(())
            }
            other => Err(AssocError::bad_obj_type(format!("{} is a {}, not a rigid set", id, other.name()))),
        }
    }

    /// Move every member curve by the set's transform, then reset it to
    /// identity. Implicit point members follow their curves.
    pub fn apply_rigid_set(&mut self, id: NodeId) -> AssocResult<()> {
        let (members, transform) = match &self.node(id)?.kind {
            NodeKind::RigidSet(set) => (set.members.clone(), set.transform),
            other => return Err(AssocError::bad_obj_type(format!("{} is a {}, not a rigid set", id, other.name()))),
        };
        for member in members {
            let node = self.node_mut(member)?;
            if node.kind.is_curve() {
                node.transform_by(&transform)?;
            }
        }
        self.set_rigid_transform(id, Matrix4::identity())
    }

    // -------------------------------------------------------------------------
    // Subentity paths
    // -------------------------------------------------------------------------

    fn dependency_target<D: DocumentModel>(&self, doc: &D, dependency: DependencyId) -> AssocResult<DependencyTarget> {
        let info = doc.dependency(dependency)?;
        let segment = doc.with_entity(info.entity, |e| match (e.as_polyline(), &info.subent) {
            (Some(pl), Some(PersSubentId::Edge(edge))) => {
                let resolved = resolve_segment(pl, edge)?;
                Ok(Some((resolved, pl.num_vertices())))
            }
            _ => Ok(None),
        })?;
        if let Some((resolved, _)) = &segment {
            if resolved.repair.is_repair() {
                warn!("subentity path for {} uses a repaired segment", dependency);
                self.count_repair();
            }
        }
        Ok(DependencyTarget {
            entity: info.entity,
            subent: info.subent,
            segment,
        })
    }

    fn curve_edge<D: DocumentModel>(&self, doc: &D, target: &DependencyTarget) -> AssocResult<Vec<SubentId>> {
        if let Some((resolved, count)) = &target.segment {
            return Ok(vec![SubentId::edge(resolved.edge_index(*count))]);
        }
        match &target.subent {
            Some(pers) => persist::get_transient_subent_ids(doc, target.entity, pers),
            None => Ok(vec![SubentId::edge(SINGLE_EDGE_INDEX)]),
        }
    }

    /// Entity and subentity a consumer should highlight or edit for `id`.
    pub fn full_subent_paths<D: DocumentModel>(&self, doc: &D, id: NodeId) -> AssocResult<Vec<FullSubentPath>> {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::ImplicitPoint(p) => {
                let curve = self.node(p.curve)?;
                let target = self.dependency_target(doc, curve.base.require_dependency()?)?;
                let vertex = match (&target.segment, p.kind) {
                    (Some((resolved, _)), ImplicitPointKind::Start) => resolved.start as i64 + 1,
                    (Some((resolved, _)), ImplicitPointKind::End) => resolved.end as i64 + 1,
                    (Some((resolved, count)), ImplicitPointKind::Center) => {
                        ARC_CENTER_VERTEX_BIAS + resolved.edge_index(*count)
                    }
                    (Some((resolved, count)), ImplicitPointKind::Mid) => {
                        SEGMENT_MID_VERTEX_BIAS + resolved.edge_index(*count)
                    }
                    (_, ImplicitPointKind::Start) => vertex_index::START,
                    (_, ImplicitPointKind::End) => vertex_index::END,
                    (_, ImplicitPointKind::Mid) => vertex_index::MIDDLE,
                    (_, ImplicitPointKind::Center) => vertex_index::CENTER,
                    (_, ImplicitPointKind::Define(i)) => i as i64 + 1,
                };
                Ok(vec![FullSubentPath::new(target.entity, SubentId::vertex(vertex))])
            }
            NodeKind::RigidSet(set) => {
                let mut paths = Vec::new();
                for member in &set.members {
                    paths.extend(self.full_subent_paths(doc, *member)?);
                }
                Ok(paths)
            }
            _ => {
                let target = self.dependency_target(doc, node.base.require_dependency()?)?;
                Ok(self
                    .curve_edge(doc, &target)?
                    .into_iter()
                    .map(|edge| FullSubentPath::new(target.entity, edge))
                    .collect())
            }
        }
    }
}
