//! The closed set of node kinds and the per-node solver surface.

use super::curves::{
    ArcNode, BoundedEllipseNode, BoundedLineNode, CircleNode, ConstructionLineNode, ConstructionVariant, EllipseNode,
    LineNode, RigidSetNode,
};
use super::node::{ImplicitPointKind, ImplicitPointNode, NodeBase, NodeId};
use super::spline::SplineNode;
use crate::config::Tolerance;
use crate::error::{AssocError, AssocResult};
use crate::geometry::{CircArc3, EllipArc3, Line3, LineSeg3, Matrix4, NurbsCurve3, Point3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Line(LineNode),
    BoundedLine(BoundedLineNode),
    ConstructionLine(ConstructionLineNode),
    Circle(CircleNode),
    Arc(ArcNode),
    Ellipse(EllipseNode),
    BoundedEllipse(BoundedEllipseNode),
    Spline(SplineNode),
    ImplicitPoint(ImplicitPointNode),
    RigidSet(RigidSetNode),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Line(_) => "line",
            NodeKind::BoundedLine(_) => "bounded line",
            NodeKind::ConstructionLine(_) => "construction line",
            NodeKind::Circle(_) => "circle",
            NodeKind::Arc(_) => "arc",
            NodeKind::Ellipse(_) => "ellipse",
            NodeKind::BoundedEllipse(_) => "bounded ellipse",
            NodeKind::Spline(_) => "spline",
            NodeKind::ImplicitPoint(_) => "implicit point",
            NodeKind::RigidSet(_) => "rigid set",
        }
    }

    /// Curve nodes own geometry pulled from a dependency.
    pub fn is_curve(&self) -> bool {
        !matches!(self, NodeKind::ImplicitPoint(_) | NodeKind::RigidSet(_))
    }

    /// Implicit points the group creates when this node is added.
    pub fn implicit_kinds(&self) -> Vec<ImplicitPointKind> {
        use ImplicitPointKind::*;
        match self {
            NodeKind::BoundedLine(n) => n.implicit_kinds(),
            NodeKind::Circle(_) | NodeKind::Ellipse(_) => vec![Center],
            NodeKind::Arc(_) => vec![Center, Start, End, Mid],
            NodeKind::BoundedEllipse(_) => vec![Center, Start, End],
            NodeKind::Spline(n) => n.implicit_kinds(),
            _ => Vec::new(),
        }
    }

    /// Other nodes of the group this node points at.
    pub fn referenced_nodes(&self) -> Vec<NodeId> {
        match self {
            NodeKind::ImplicitPoint(p) => vec![p.curve],
            NodeKind::ConstructionLine(n) => match n.variant {
                ConstructionVariant::TwoPoint { points } => points.to_vec(),
                ConstructionVariant::Datum { point, .. } => vec![point],
            },
            NodeKind::Spline(n) => n.define_ids.clone(),
            NodeKind::RigidSet(n) => n.members.clone(),
            _ => Vec::new(),
        }
    }
}

fn not_applicable(kind: &str, what: &str) -> AssocError {
    AssocError::bad_obj_type(format!("{} has no {}", kind, what))
}

/// One node of a constraint group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstrainedGeometry {
    pub base: NodeBase,
    pub kind: NodeKind,
}

impl ConstrainedGeometry {
    pub fn new(base: NodeBase, kind: NodeKind) -> Self {
        Self { base, kind }
    }

    fn not_applicable(&self, what: &str) -> AssocError {
        not_applicable(self.kind.name(), what)
    }

    // -------------------------------------------------------------------------
    // Implicit points
    // -------------------------------------------------------------------------

    pub fn point(&self, kind: ImplicitPointKind) -> AssocResult<Point3> {
        match &self.kind {
            NodeKind::BoundedLine(n) => n.point(kind),
            NodeKind::Circle(n) => n.point(kind),
            NodeKind::Arc(n) => n.point(kind),
            NodeKind::Ellipse(n) => n.point(kind),
            NodeKind::BoundedEllipse(n) => n.point(kind),
            NodeKind::Spline(n) => n.point(kind),
            _ => Err(self.not_applicable("implicit points")),
        }
    }

    pub fn original_point(&self, kind: ImplicitPointKind) -> AssocResult<Point3> {
        match &self.kind {
            NodeKind::BoundedLine(n) => n.original_point(kind),
            NodeKind::Circle(n) => n.original_point(kind),
            NodeKind::Arc(n) => n.original_point(kind),
            NodeKind::Ellipse(n) => n.original_point(kind),
            NodeKind::BoundedEllipse(n) => n.original_point(kind),
            NodeKind::Spline(n) => n.original_point(kind),
            _ => Err(self.not_applicable("implicit points")),
        }
    }

    /// Move an implicit point. Midpoints cannot be set.
    pub fn set_point(&mut self, kind: ImplicitPointKind, p: &Point3) -> AssocResult<()> {
        let name = self.kind.name();
        if kind == ImplicitPointKind::Mid {
            return Err(AssocError::bad_obj_type("midpoints are derived and cannot be set"));
        }
        match &mut self.kind {
            NodeKind::BoundedLine(n) => n.set_point(kind, p)?,
            NodeKind::Circle(n) => n.set_point(kind, p)?,
            NodeKind::Arc(n) => n.set_point(kind, p)?,
            NodeKind::Ellipse(n) => n.set_point(kind, p)?,
            NodeKind::BoundedEllipse(n) => n.set_point(kind, p)?,
            NodeKind::Spline(n) => n.set_point(kind, p)?,
            _ => return Err(not_applicable(name, "implicit points")),
        }
        self.base.dirty = true;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Curve getters and setters
    // -------------------------------------------------------------------------

    pub fn line(&self) -> AssocResult<Line3> {
        match &self.kind {
            NodeKind::Line(n) => Ok(*n.line.current()),
            NodeKind::ConstructionLine(n) => Ok(*n.line.current()),
            NodeKind::BoundedLine(n) => Ok(n.seg.current().to_line()),
            _ => Err(self.not_applicable("line")),
        }
    }

    pub fn set_line(&mut self, line: Line3) -> AssocResult<()> {
        let name = self.kind.name();
        match &mut self.kind {
            NodeKind::Line(n) => n.line.replace(line),
            NodeKind::ConstructionLine(n) => n.line.replace(line),
            _ => return Err(not_applicable(name, "unbounded line")),
        }
        self.base.dirty = true;
        Ok(())
    }

    pub fn line_seg(&self) -> AssocResult<LineSeg3> {
        match &self.kind {
            NodeKind::BoundedLine(n) => Ok(*n.seg.current()),
            _ => Err(self.not_applicable("line segment")),
        }
    }

    pub fn set_line_seg(&mut self, seg: LineSeg3) -> AssocResult<()> {
        let name = self.kind.name();
        match &mut self.kind {
            NodeKind::BoundedLine(n) => n.seg.replace(seg),
            _ => return Err(not_applicable(name, "line segment")),
        }
        self.base.dirty = true;
        Ok(())
    }

    pub fn circle_arc(&self) -> AssocResult<CircArc3> {
        match &self.kind {
            NodeKind::Circle(n) => Ok(*n.arc.current()),
            NodeKind::Arc(n) => Ok(*n.arc.current()),
            _ => Err(self.not_applicable("circular arc")),
        }
    }

    pub fn set_circle_arc(&mut self, arc: CircArc3) -> AssocResult<()> {
        let name = self.kind.name();
        match &mut self.kind {
            NodeKind::Circle(n) => n.arc.replace(arc),
            NodeKind::Arc(n) => n.arc.replace(arc),
            _ => return Err(not_applicable(name, "circular arc")),
        }
        self.base.dirty = true;
        Ok(())
    }

    pub fn ellipse_arc(&self) -> AssocResult<EllipArc3> {
        match &self.kind {
            NodeKind::Ellipse(n) => Ok(*n.arc.current()),
            NodeKind::BoundedEllipse(n) => Ok(*n.arc.current()),
            _ => Err(self.not_applicable("elliptical arc")),
        }
    }

    pub fn set_ellipse_arc(&mut self, arc: EllipArc3) -> AssocResult<()> {
        let name = self.kind.name();
        match &mut self.kind {
            NodeKind::Ellipse(n) => n.arc.replace(arc),
            NodeKind::BoundedEllipse(n) => n.arc.replace(arc),
            _ => return Err(not_applicable(name, "elliptical arc")),
        }
        self.base.dirty = true;
        Ok(())
    }

    pub fn nurbs(&self) -> AssocResult<&NurbsCurve3> {
        match &self.kind {
            NodeKind::Spline(n) => Ok(n.nurbs.current()),
            _ => Err(self.not_applicable("NURBS curve")),
        }
    }

    /// Replace the spline curve. The control-point count must not change.
    pub fn set_nurbs(&mut self, curve: NurbsCurve3) -> AssocResult<()> {
        let name = self.kind.name();
        match &mut self.kind {
            NodeKind::Spline(n) => n.pull_curve(curve)?,
            _ => return Err(not_applicable(name, "NURBS curve")),
        }
        self.base.dirty = true;
        Ok(())
    }

    /// Does this node carry a captured original snapshot?
    pub fn has_original(&self) -> bool {
        match &self.kind {
            NodeKind::Line(n) => n.line.has_original(),
            NodeKind::BoundedLine(n) => n.seg.has_original(),
            NodeKind::ConstructionLine(n) => n.line.has_original(),
            NodeKind::Circle(n) => n.arc.has_original(),
            NodeKind::Arc(n) => n.arc.has_original(),
            NodeKind::Ellipse(n) => n.arc.has_original(),
            NodeKind::BoundedEllipse(n) => n.arc.has_original(),
            NodeKind::Spline(n) => n.nurbs.has_original(),
            NodeKind::ImplicitPoint(_) | NodeKind::RigidSet(_) => false,
        }
    }

    /// Make the current geometry the new baseline.
    pub fn commit(&mut self) {
        match &mut self.kind {
            NodeKind::Line(n) => n.line.commit(),
            NodeKind::BoundedLine(n) => n.seg.commit(),
            NodeKind::ConstructionLine(n) => n.line.commit(),
            NodeKind::Circle(n) => n.arc.commit(),
            NodeKind::Arc(n) => n.arc.commit(),
            NodeKind::Ellipse(n) => n.arc.commit(),
            NodeKind::BoundedEllipse(n) => n.arc.commit(),
            NodeKind::Spline(n) => n.nurbs.commit(),
            NodeKind::ImplicitPoint(_) | NodeKind::RigidSet(_) => {}
        }
    }

    /// Apply a plane-space transform to the geometry, capturing the original.
    pub fn transform_by(&mut self, m: &Matrix4) -> AssocResult<()> {
        let name = self.kind.name();
        match &mut self.kind {
            NodeKind::Line(n) => n.line.edit().transform_by(m),
            NodeKind::BoundedLine(n) => n.seg.edit().transform_by(m),
            NodeKind::ConstructionLine(n) => n.line.edit().transform_by(m),
            NodeKind::Circle(n) => n.arc.edit().transform_by(m),
            NodeKind::Arc(n) => n.arc.edit().transform_by(m),
            NodeKind::Ellipse(n) => n.arc.edit().transform_by(m),
            NodeKind::BoundedEllipse(n) => n.arc.edit().transform_by(m),
            NodeKind::Spline(n) => n.transform_by(m),
            _ => return Err(not_applicable(name, "transformable geometry")),
        }
        self.base.dirty = true;
        Ok(())
    }

    /// Same kind and the same geometry within `tol`.
    pub fn geom_eq(&self, other: &Self, tol: &Tolerance) -> bool {
        match (&self.kind, &other.kind) {
            (NodeKind::Line(a), NodeKind::Line(b)) => a.geom_eq(b, tol),
            (NodeKind::BoundedLine(a), NodeKind::BoundedLine(b)) => a.geom_eq(b, tol),
            (NodeKind::ConstructionLine(a), NodeKind::ConstructionLine(b)) => a.geom_eq(b, tol),
            (NodeKind::Circle(a), NodeKind::Circle(b)) => a.geom_eq(b, tol),
            (NodeKind::Arc(a), NodeKind::Arc(b)) => a.geom_eq(b, tol),
            (NodeKind::Ellipse(a), NodeKind::Ellipse(b)) => a.geom_eq(b, tol),
            (NodeKind::BoundedEllipse(a), NodeKind::BoundedEllipse(b)) => a.geom_eq(b, tol),
            (NodeKind::Spline(a), NodeKind::Spline(b)) => a.geom_eq(b, tol),
            (NodeKind::ImplicitPoint(a), NodeKind::ImplicitPoint(b)) => a == b,
            (NodeKind::RigidSet(a), NodeKind::RigidSet(b)) => a.geom_eq(b, tol),
            _ => false,
        }
    }
}
