//! Persisted drawing entities the constrained geometry is derived from.
//!
//! Everything is stored in world coordinates except polylines, whose 2D
//! vertices live in the OCS of the polyline normal.

use crate::geometry::{
    frames::ocs_x_axis, ocs_to_world, CircArc3, EdgeCurve, EllipArc3, LineSeg3, Matrix4, NurbsCurve3, Point2,
    Point3, Vector3,
};
use crate::topo::TopoId;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Angle differences below this are round-off from a pull/push cycle.
const ANGLE_ROUND_OFF: f64 = 1e-12;

/// `angle` moved onto the 2π branch closest to `previous`. Round-off
/// differences return `previous` unchanged.
fn on_branch_of(previous: f64, angle: f64) -> f64 {
    let delta = (angle - previous + PI).rem_euclid(TAU) - PI;
    if delta.abs() < ANGLE_ROUND_OFF {
        previous
    } else {
        previous + delta
    }
}

/// New `(start, end)` for a stored angle pair, written in the convention the
/// pair already uses. Pairs stored as `start < end <= start + 2π` get
/// `end = start + sweep`; any other pair keeps each angle on its own branch.
fn in_stored_convention(stored_start: f64, stored_end: f64, start: f64, sweep: f64) -> (f64, f64) {
    let new_start = on_branch_of(stored_start, start);
    let stored_sweep = stored_end - stored_start;
    let end = new_start + sweep;
    let new_end = if stored_sweep > 0.0 && stored_sweep <= TAU + ANGLE_ROUND_OFF {
        if (end - stored_end).abs() < ANGLE_ROUND_OFF {
            stored_end
        } else {
            end
        }
    } else {
        on_branch_of(stored_end, end)
    };
    (new_start, new_end)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineEntity {
    pub start: Point3,
    pub end: Point3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RayEntity {
    pub base_point: Point3,
    pub direction: Vector3,
}

/// Construction line: infinite in both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XLineEntity {
    pub base_point: Point3,
    pub direction: Vector3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleEntity {
    pub center: Point3,
    pub normal: Vector3,
    pub radius: f64,
}

impl CircleEntity {
    pub fn to_circ_arc(&self) -> CircArc3 {
        CircArc3::new(self.center, self.normal, ocs_x_axis(&self.normal), self.radius, 0.0, std::f64::consts::TAU)
    }
}

/// Arc with angles measured from the OCS x axis of its normal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcEntity {
    pub center: Point3,
    pub normal: Vector3,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl ArcEntity {
    pub fn to_circ_arc(&self) -> CircArc3 {
        CircArc3::new(
            self.center,
            self.normal,
            ocs_x_axis(&self.normal),
            self.radius,
            self.start_angle,
            self.end_angle,
        )
    }

    pub fn set_from_circ_arc(&mut self, arc: &CircArc3) {
        let frame = CircArc3::new(arc.center, arc.normal, ocs_x_axis(&arc.normal), arc.radius, 0.0, 0.0);
        self.center = arc.center;
        self.normal = arc.normal;
        self.radius = arc.radius;
        let start = frame.angle_of(&arc.start_point());
        (self.start_angle, self.end_angle) =
            in_stored_convention(self.start_angle, self.end_angle, start, arc.sweep());
    }

    pub fn start_point(&self) -> Point3 {
        self.to_circ_arc().start_point()
    }

    pub fn end_point(&self) -> Point3 {
        self.to_circ_arc().end_point()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EllipseEntity {
    pub center: Point3,
    pub normal: Vector3,
    /// Direction and length of the semi-major axis.
    pub major_axis: Vector3,
    /// Minor radius over major radius.
    pub radius_ratio: f64,
    pub start_param: f64,
    pub end_param: f64,
}

impl EllipseEntity {
    pub fn to_ellip_arc(&self) -> EllipArc3 {
        let major = self.major_axis.norm();
        EllipArc3::new(
            self.center,
            self.normal,
            self.major_axis,
            major,
            major * self.radius_ratio,
            self.start_param,
            self.end_param,
        )
    }

    pub fn set_from_ellip_arc(&mut self, arc: &EllipArc3) {
        self.center = arc.center;
        self.normal = arc.normal;
        self.major_axis = arc.major_axis * arc.major_radius;
        self.radius_ratio = arc.minor_radius / arc.major_radius;
        (self.start_param, self.end_param) =
            in_stored_convention(self.start_param, self.end_param, arc.start_angle, arc.sweep());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplineEntity {
    pub curve: NurbsCurve3,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolylineVertex {
    pub position: Point2,
    /// Curvature of the segment that starts at this vertex.
    pub bulge: f64,
    /// Stable identifier, `0` until a persistent reference first needs it.
    pub vertex_id: u32,
}

impl PolylineVertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: Point2::new(x, y),
            bulge: 0.0,
            vertex_id: 0,
        }
    }

    pub fn with_bulge(x: f64, y: f64, bulge: f64) -> Self {
        Self {
            bulge,
            ..Self::new(x, y)
        }
    }
}

/// Lightweight 2D polyline with per-vertex stable identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolylineEntity {
    pub vertices: Vec<PolylineVertex>,
    pub closed: bool,
    pub normal: Vector3,
    pub elevation: f64,
    /// Next identifier to hand out. Never decreases, even when vertices are removed.
    pub next_vertex_id: u32,
}

impl PolylineEntity {
    pub fn new(vertices: Vec<PolylineVertex>, closed: bool) -> Self {
        let next_vertex_id = vertices.iter().map(|v| v.vertex_id).max().unwrap_or(0) + 1;
        Self {
            vertices,
            closed,
            normal: Vector3::z(),
            elevation: 0.0,
            next_vertex_id,
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_segments(&self) -> usize {
        let n = self.vertices.len();
        if n < 2 {
            0
        } else if self.closed {
            n
        } else {
            n - 1
        }
    }

    pub fn ocs_to_world(&self) -> Matrix4 {
        ocs_to_world(&self.normal, self.elevation)
    }

    /// Vertex position in OCS, with z = 0.
    pub fn point_ocs(&self, index: usize) -> Option<Point3> {
        self.vertices.get(index).map(|v| Point3::new(v.position.x, v.position.y, 0.0))
    }

    pub fn point_world(&self, index: usize) -> Option<Point3> {
        self.point_ocs(index).map(|p| self.ocs_to_world().transform_point(&p))
    }

    /// Vertex indices of segment `segment` (0-based, start vertex index).
    pub fn segment_vertices(&self, segment: usize) -> Option<(usize, usize)> {
        if segment >= self.num_segments() {
            return None;
        }
        Some((segment, (segment + 1) % self.vertices.len()))
    }

    /// Segment geometry in world coordinates.
    pub fn segment_curve_world(&self, segment: usize) -> Option<EdgeCurve> {
        let (s, e) = self.segment_vertices(segment)?;
        let start = self.point_ocs(s)?;
        let end = self.point_ocs(e)?;
        let bulge = self.vertices[s].bulge;
        let mut curve = if bulge.abs() < 1e-12 {
            EdgeCurve::LineSeg(LineSeg3::new(start, end))
        } else {
            EdgeCurve::Arc(crate::geometry::bulge_to_arc(&start, &end, bulge).ok()?)
        };
        curve.transform_by(&self.ocs_to_world());
        Some(curve)
    }

    pub fn find_vertex_id(&self, vertex_id: u32) -> Option<usize> {
        if vertex_id == 0 {
            return None;
        }
        self.vertices.iter().position(|v| v.vertex_id == vertex_id)
    }

    pub fn has_vertex_ids(&self) -> bool {
        self.vertices.iter().any(|v| v.vertex_id != 0)
    }

    /// Identifier of vertex `index`, assigning the next unused one if needed.
    pub fn ensure_vertex_id(&mut self, index: usize) -> Option<u32> {
        let next = self.next_vertex_id.max(1);
        let vertex = self.vertices.get_mut(index)?;
        if vertex.vertex_id == 0 {
            vertex.vertex_id = next;
            self.next_vertex_id = next + 1;
        }
        Some(vertex.vertex_id)
    }

    pub fn insert_vertex(&mut self, index: usize, vertex: PolylineVertex) {
        let index = index.min(self.vertices.len());
        if vertex.vertex_id >= self.next_vertex_id {
            self.next_vertex_id = vertex.vertex_id + 1;
        }
        self.vertices.insert(index, vertex);
    }

    pub fn remove_vertex(&mut self, index: usize) -> Option<PolylineVertex> {
        if index < self.vertices.len() {
            Some(self.vertices.remove(index))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidVertex {
    pub topo_id: TopoId,
    pub point: Point3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidEdge {
    pub topo_id: TopoId,
    pub curve: EdgeCurve,
    pub start_vertex: Option<usize>,
    pub end_vertex: Option<usize>,
}

/// Boundary representation summary of a 3D solid or surface body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SolidEntity {
    pub faces: Vec<TopoId>,
    pub edges: Vec<SolidEdge>,
    pub vertices: Vec<SolidVertex>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    Line(LineEntity),
    Ray(RayEntity),
    XLine(XLineEntity),
    Circle(CircleEntity),
    Arc(ArcEntity),
    Ellipse(EllipseEntity),
    Spline(SplineEntity),
    Polyline(PolylineEntity),
    Solid(SolidEntity),
}

impl Entity {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Entity::Line(_) => "line",
            Entity::Ray(_) => "ray",
            Entity::XLine(_) => "construction line",
            Entity::Circle(_) => "circle",
            Entity::Arc(_) => "arc",
            Entity::Ellipse(_) => "ellipse",
            Entity::Spline(_) => "spline",
            Entity::Polyline(_) => "polyline",
            Entity::Solid(_) => "solid",
        }
    }

    pub fn as_polyline(&self) -> Option<&PolylineEntity> {
        match self {
            Entity::Polyline(p) => Some(p),
            _ => None,
        }
    }
}
