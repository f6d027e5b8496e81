//! Curve node payloads. All geometry is in the plane space of the owning group.

use super::node::{ImplicitPointKind, NodeId, Tracked};
use crate::config::Tolerance;
use crate::error::{AssocError, AssocResult};
use crate::geometry::{ApproxEq, CircArc3, EllipArc3, Line3, LineSeg3, Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

pub(crate) fn unsupported_point(kind: ImplicitPointKind, node: &str) -> AssocError {
    AssocError::bad_obj_type(format!("{:?} is not a point of a {}", kind, node))
}

// =============================================================================
// Straight curves
// =============================================================================

/// Unbounded line. Has no implicit points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineNode {
    pub line: Tracked<Line3>,
}

impl LineNode {
    pub fn new(line: Line3) -> Self {
        Self { line: Tracked::new(line) }
    }

    pub fn geom_eq(&self, other: &Self, tol: &Tolerance) -> bool {
        self.line.current().is_equal_to(other.line.current(), tol)
    }
}

impl Default for LineNode {
    fn default() -> Self {
        Self::new(Line3::new(Point3::origin(), Vector3::x()))
    }
}

/// Line segment, or a ray when `is_ray` is set. A ray keeps its base point in
/// `start` and a point one unit along its direction in `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundedLineNode {
    pub seg: Tracked<LineSeg3>,
    pub is_ray: bool,
}

impl BoundedLineNode {
    pub fn new(seg: LineSeg3) -> Self {
        Self {
            seg: Tracked::new(seg),
            is_ray: false,
        }
    }

    pub fn ray(origin: Point3, direction: Vector3) -> Self {
        Self {
            seg: Tracked::new(LineSeg3::new(origin, origin + direction.normalize())),
            is_ray: true,
        }
    }

    pub fn implicit_kinds(&self) -> Vec<ImplicitPointKind> {
        if self.is_ray {
            vec![ImplicitPointKind::Start]
        } else {
            vec![ImplicitPointKind::Start, ImplicitPointKind::End, ImplicitPointKind::Mid]
        }
    }

    fn point_on(&self, seg: &LineSeg3, kind: ImplicitPointKind) -> AssocResult<Point3> {
        match kind {
            ImplicitPointKind::Start => Ok(seg.start),
            ImplicitPointKind::End if !self.is_ray => Ok(seg.end),
            ImplicitPointKind::Mid if !self.is_ray => Ok(seg.midpoint()),
            other => Err(unsupported_point(other, if self.is_ray { "ray" } else { "bounded line" })),
        }
    }

    pub fn point(&self, kind: ImplicitPointKind) -> AssocResult<Point3> {
        self.point_on(self.seg.current(), kind)
    }

    pub fn original_point(&self, kind: ImplicitPointKind) -> AssocResult<Point3> {
        self.point_on(self.seg.original(), kind)
    }

    pub fn set_point(&mut self, kind: ImplicitPointKind, p: &Point3) -> AssocResult<()> {
        match kind {
            ImplicitPointKind::Start if self.is_ray => {
                let direction = self.seg.current().direction();
                self.seg.replace(LineSeg3::new(*p, p + direction));
            }
            ImplicitPointKind::Start => self.seg.edit().start = *p,
            ImplicitPointKind::End if !self.is_ray => self.seg.edit().end = *p,
            other => return Err(unsupported_point(other, "bounded line")),
        }
        Ok(())
    }

    pub fn geom_eq(&self, other: &Self, tol: &Tolerance) -> bool {
        let (a, b) = (self.seg.current(), other.seg.current());
        self.is_ray == other.is_ray && a.start.approx_eq_tol(&b.start, tol) && a.end.approx_eq_tol(&b.end, tol)
    }
}

impl Default for BoundedLineNode {
    fn default() -> Self {
        Self::new(LineSeg3::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0)))
    }
}

/// How a construction line is defined by the point nodes it is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConstructionVariant {
    /// Through two points.
    TwoPoint { points: [NodeId; 2] },
    /// Through one point with a fixed direction.
    Datum { point: NodeId, direction: Vector3 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionLineNode {
    pub line: Tracked<Line3>,
    pub variant: ConstructionVariant,
}

impl ConstructionLineNode {
    pub fn two_point(points: [NodeId; 2]) -> Self {
        Self {
            line: Tracked::new(Line3::new(Point3::origin(), Vector3::x())),
            variant: ConstructionVariant::TwoPoint { points },
        }
    }

    pub fn datum(point: NodeId, direction: Vector3) -> Self {
        Self {
            line: Tracked::new(Line3::new(Point3::origin(), direction)),
            variant: ConstructionVariant::Datum { point, direction },
        }
    }

    pub fn geom_eq(&self, other: &Self, tol: &Tolerance) -> bool {
        self.variant == other.variant && self.line.current().is_equal_to(other.line.current(), tol)
    }
}

// =============================================================================
// Circular curves
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleNode {
    pub arc: Tracked<CircArc3>,
}

impl CircleNode {
    pub fn new(center: Point3, radius: f64) -> Self {
        Self {
            arc: Tracked::new(CircArc3::full_circle(center, Vector3::z(), radius)),
        }
    }

    pub fn point(&self, kind: ImplicitPointKind) -> AssocResult<Point3> {
        match kind {
            ImplicitPointKind::Center => Ok(self.arc.current().center),
            other => Err(unsupported_point(other, "circle")),
        }
    }

    pub fn original_point(&self, kind: ImplicitPointKind) -> AssocResult<Point3> {
        match kind {
            ImplicitPointKind::Center => Ok(self.arc.original().center),
            other => Err(unsupported_point(other, "circle")),
        }
    }

    pub fn set_point(&mut self, kind: ImplicitPointKind, p: &Point3) -> AssocResult<()> {
        match kind {
            ImplicitPointKind::Center => {
                self.arc.edit().center = *p;
                Ok(())
            }
            other => Err(unsupported_point(other, "circle")),
        }
    }

    pub fn geom_eq(&self, other: &Self, tol: &Tolerance) -> bool {
        circ_arcs_equal(self.arc.current(), other.arc.current(), tol)
    }
}

impl Default for CircleNode {
    fn default() -> Self {
        Self::new(Point3::origin(), 1.0)
    }
}

/// Circular arc. The end points are not stored; they are the circle points at
/// the stored angles, and setting one projects it through the circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcNode {
    pub arc: Tracked<CircArc3>,
}

impl ArcNode {
    pub fn new(arc: CircArc3) -> Self {
        Self { arc: Tracked::new(arc) }
    }

    fn point_on(arc: &CircArc3, kind: ImplicitPointKind) -> AssocResult<Point3> {
        match kind {
            ImplicitPointKind::Center => Ok(arc.center),
            ImplicitPointKind::Start => Ok(arc.start_point()),
            ImplicitPointKind::End => Ok(arc.end_point()),
            ImplicitPointKind::Mid => Ok(arc.mid_point()),
            other => Err(unsupported_point(other, "arc")),
        }
    }

    pub fn point(&self, kind: ImplicitPointKind) -> AssocResult<Point3> {
        Self::point_on(self.arc.current(), kind)
    }

    pub fn original_point(&self, kind: ImplicitPointKind) -> AssocResult<Point3> {
        Self::point_on(self.arc.original(), kind)
    }

    pub fn set_point(&mut self, kind: ImplicitPointKind, p: &Point3) -> AssocResult<()> {
        match kind {
            ImplicitPointKind::Center => self.arc.edit().center = *p,
            ImplicitPointKind::Start => self.arc.edit().set_start_point(p),
            ImplicitPointKind::End => self.arc.edit().set_end_point(p),
            other => return Err(unsupported_point(other, "arc")),
        }
        Ok(())
    }

    pub fn geom_eq(&self, other: &Self, tol: &Tolerance) -> bool {
        let (a, b) = (self.arc.current(), other.arc.current());
        circ_arcs_equal(a, b, tol)
            && a.start_point().approx_eq_tol(&b.start_point(), tol)
            && a.end_point().approx_eq_tol(&b.end_point(), tol)
    }
}

fn circ_arcs_equal(a: &CircArc3, b: &CircArc3, tol: &Tolerance) -> bool {
    a.center.approx_eq_tol(&b.center, tol)
        && a.normal.approx_eq_tol(&b.normal, tol)
        && tol.scalars_equal(a.radius, b.radius)
}

// =============================================================================
// Elliptical curves
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EllipseNode {
    pub arc: Tracked<EllipArc3>,
}

impl EllipseNode {
    pub fn new(arc: EllipArc3) -> Self {
        Self { arc: Tracked::new(arc) }
    }

    pub fn point(&self, kind: ImplicitPointKind) -> AssocResult<Point3> {
        match kind {
            ImplicitPointKind::Center => Ok(self.arc.current().center),
            other => Err(unsupported_point(other, "ellipse")),
        }
    }

    pub fn original_point(&self, kind: ImplicitPointKind) -> AssocResult<Point3> {
        match kind {
            ImplicitPointKind::Center => Ok(self.arc.original().center),
            other => Err(unsupported_point(other, "ellipse")),
        }
    }

    pub fn set_point(&mut self, kind: ImplicitPointKind, p: &Point3) -> AssocResult<()> {
        match kind {
            ImplicitPointKind::Center => {
                self.arc.edit().center = *p;
                Ok(())
            }
            other => Err(unsupported_point(other, "ellipse")),
        }
    }

    pub fn geom_eq(&self, other: &Self, tol: &Tolerance) -> bool {
        ellip_arcs_equal(self.arc.current(), other.arc.current(), tol)
    }
}

impl Default for EllipseNode {
    fn default() -> Self {
        Self::new(EllipArc3::full(Point3::origin(), Vector3::z(), Vector3::x(), 2.0, 1.0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundedEllipseNode {
    pub arc: Tracked<EllipArc3>,
}

impl BoundedEllipseNode {
    pub fn new(arc: EllipArc3) -> Self {
        Self { arc: Tracked::new(arc) }
    }

    fn point_on(arc: &EllipArc3, kind: ImplicitPointKind) -> AssocResult<Point3> {
        match kind {
            ImplicitPointKind::Center => Ok(arc.center),
            ImplicitPointKind::Start => Ok(arc.start_point()),
            ImplicitPointKind::End => Ok(arc.end_point()),
            ImplicitPointKind::Mid => Ok(arc.mid_point()),
            other => Err(unsupported_point(other, "elliptical arc")),
        }
    }

    pub fn point(&self, kind: ImplicitPointKind) -> AssocResult<Point3> {
        Self::point_on(self.arc.current(), kind)
    }

    pub fn original_point(&self, kind: ImplicitPointKind) -> AssocResult<Point3> {
        Self::point_on(self.arc.original(), kind)
    }

    pub fn set_point(&mut self, kind: ImplicitPointKind, p: &Point3) -> AssocResult<()> {
        match kind {
            ImplicitPointKind::Center => self.arc.edit().center = *p,
            ImplicitPointKind::Start => self.arc.edit().set_start_point(p),
            ImplicitPointKind::End => self.arc.edit().set_end_point(p),
            other => return Err(unsupported_point(other, "elliptical arc")),
        }
        Ok(())
    }

    pub fn geom_eq(&self, other: &Self, tol: &Tolerance) -> bool {
        let (a, b) = (self.arc.current(), other.arc.current());
        ellip_arcs_equal(a, b, tol)
            && tol.scalars_equal(a.start_angle, b.start_angle)
            && tol.scalars_equal(a.end_angle, b.end_angle)
    }
}

fn ellip_arcs_equal(a: &EllipArc3, b: &EllipArc3, tol: &Tolerance) -> bool {
    a.center.approx_eq_tol(&b.center, tol)
        && a.normal.approx_eq_tol(&b.normal, tol)
        && a.major_axis.approx_eq_tol(&b.major_axis, tol)
        && tol.scalars_equal(a.major_radius, b.major_radius)
        && tol.scalars_equal(a.minor_radius, b.minor_radius)
}

// =============================================================================
// Rigid sets
// =============================================================================

/// Nodes that move together under one rigid transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidSetNode {
    pub members: Vec<NodeId>,
    pub transform: Matrix4,
}

impl RigidSetNode {
    pub fn new(members: Vec<NodeId>) -> Self {
        Self {
            members,
            transform: Matrix4::identity(),
        }
    }

    pub fn set_transform(&mut self, transform: Matrix4) {
        self.transform = transform;
    }

    pub fn geom_eq(&self, other: &Self, tol: &Tolerance) -> bool {
        self.members == other.members && self.transform.approx_eq_tol(&other.transform, tol)
    }
}
