//! Parametric curve objects the constraint nodes and the identity layer exchange.
//!
//! Angles are radians measured counter-clockwise around the curve normal,
//! starting at the curve's reference axis.

use super::{perpendicular, ApproxEq, Matrix4, Point3, Vector3, EPSILON};
use crate::config::Tolerance;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Normalize an angle to `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a >= TAU - 1e-12 {
        0.0
    } else {
        a
    }
}

// =============================================================================
// Straight curves
// =============================================================================

/// Unbounded line through `origin` along a unit `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line3 {
    pub origin: Point3,
    pub direction: Vector3,
}

impl Line3 {
    pub fn new(origin: Point3, direction: Vector3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Line through two distinct points.
    pub fn through(p1: &Point3, p2: &Point3) -> Option<Self> {
        let d = p2 - p1;
        if d.norm() < EPSILON {
            return None;
        }
        Some(Self::new(*p1, d))
    }

    pub fn param_of(&self, p: &Point3) -> f64 {
        (p - self.origin).dot(&self.direction)
    }

    pub fn point_at(&self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }

    pub fn project_point(&self, p: &Point3) -> Point3 {
        self.point_at(self.param_of(p))
    }

    pub fn transform_by(&mut self, m: &Matrix4) {
        self.origin = m.transform_point(&self.origin);
        self.direction = m.transform_vector(&self.direction).normalize();
    }

    /// Same infinite line, regardless of which point is the origin.
    pub fn is_equal_to(&self, other: &Self, tol: &Tolerance) -> bool {
        self.direction.approx_eq_tol(&other.direction, tol)
            && self.project_point(&other.origin).approx_eq_tol(&other.origin, tol)
    }
}

/// Bounded line segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSeg3 {
    pub start: Point3,
    pub end: Point3,
}

impl LineSeg3 {
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    pub fn midpoint(&self) -> Point3 {
        na_midpoint(&self.start, &self.end)
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    pub fn direction(&self) -> Vector3 {
        let d = self.end - self.start;
        if d.norm() < EPSILON {
            Vector3::x()
        } else {
            d.normalize()
        }
    }

    pub fn to_line(&self) -> Line3 {
        Line3::new(self.start, self.direction())
    }

    pub fn transform_by(&mut self, m: &Matrix4) {
        self.start = m.transform_point(&self.start);
        self.end = m.transform_point(&self.end);
    }
}

/// Half-line starting at `origin`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray3 {
    pub origin: Point3,
    pub direction: Vector3,
}

impl Ray3 {
    pub fn new(origin: Point3, direction: Vector3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn transform_by(&mut self, m: &Matrix4) {
        self.origin = m.transform_point(&self.origin);
        self.direction = m.transform_vector(&self.direction).normalize();
    }
}

fn na_midpoint(a: &Point3, b: &Point3) -> Point3 {
    nalgebra::center(a, b)
}

// =============================================================================
// Circular arcs
// =============================================================================

/// Circular arc in 3D. A full circle has a sweep of 2π.
///
/// `start_angle < end_angle <= start_angle + 2π` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircArc3 {
    pub center: Point3,
    pub normal: Vector3,
    pub ref_vec: Vector3,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl CircArc3 {
    pub fn new(
        center: Point3,
        normal: Vector3,
        ref_vec: Vector3,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Self {
        let normal = normal.normalize();
        let mut arc = Self {
            center,
            normal,
            ref_vec: orthonormalize(&ref_vec, &normal),
            radius,
            start_angle: normalize_angle(start_angle),
            end_angle,
        };
        arc.end_angle = arc.start_angle + sweep_between(start_angle, end_angle);
        arc
    }

    pub fn full_circle(center: Point3, normal: Vector3, radius: f64) -> Self {
        let normal = normal.normalize();
        Self {
            center,
            normal,
            ref_vec: perpendicular(&normal),
            radius,
            start_angle: 0.0,
            end_angle: TAU,
        }
    }

    /// Counter-clockwise arc around `normal` from `start` to `end`.
    /// The reference axis points at `start`.
    pub fn from_center_and_points(center: Point3, normal: Vector3, start: &Point3, end: &Point3) -> Self {
        let normal = normal.normalize();
        let radius = (start - center).norm();
        let ref_vec = orthonormalize(&(start - center), &normal);
        let mut arc = Self {
            center,
            normal,
            ref_vec,
            radius,
            start_angle: 0.0,
            end_angle: TAU,
        };
        let rel = arc.angle_of(end);
        arc.end_angle = if rel < EPSILON { TAU } else { rel };
        arc
    }

    fn y_axis(&self) -> Vector3 {
        self.normal.cross(&self.ref_vec)
    }

    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    pub fn is_closed(&self) -> bool {
        self.sweep() >= TAU - EPSILON
    }

    pub fn point_at(&self, angle: f64) -> Point3 {
        self.center + (self.ref_vec * angle.cos() + self.y_axis() * angle.sin()) * self.radius
    }

    /// Raw angle of `p` around the centre, in `[0, 2π)`.
    pub fn angle_of(&self, p: &Point3) -> f64 {
        let v = p - self.center;
        normalize_angle(v.dot(&self.y_axis()).atan2(v.dot(&self.ref_vec)))
    }

    /// Parameter of `p` measured from the start angle, in `[start, start + 2π)`.
    pub fn param_of(&self, p: &Point3) -> f64 {
        self.start_angle + normalize_angle(self.angle_of(p) - self.start_angle)
    }

    pub fn start_point(&self) -> Point3 {
        self.point_at(self.start_angle)
    }

    pub fn end_point(&self) -> Point3 {
        self.point_at(self.end_angle)
    }

    /// Point halfway along the sweep.
    pub fn mid_point(&self) -> Point3 {
        self.point_at(0.5 * (self.start_angle + self.end_angle))
    }

    /// Move the start of the arc to the angle of `p` on the circle.
    pub fn set_start_point(&mut self, p: &Point3) {
        let sweep_end = self.end_angle;
        let start = normalize_angle(self.angle_of(p));
        self.start_angle = start;
        self.end_angle = start + sweep_between(start, sweep_end);
    }

    /// Move the end of the arc to the angle of `p` on the circle.
    pub fn set_end_point(&mut self, p: &Point3) {
        let rel = normalize_angle(self.angle_of(p) - self.start_angle);
        self.end_angle = self.start_angle + if rel < EPSILON { TAU } else { rel };
    }

    /// Same point set traversed the other way: normal flipped, ends swapped.
    pub fn reversed(&self) -> Self {
        let mut arc = *self;
        arc.normal = -self.normal;
        arc.start_angle = normalize_angle(-self.end_angle);
        arc.end_angle = arc.start_angle + self.sweep();
        arc
    }

    pub fn transform_by(&mut self, m: &Matrix4) {
        let x = m.transform_vector(&self.ref_vec);
        let y = m.transform_vector(&self.y_axis());
        self.center = m.transform_point(&self.center);
        self.radius *= x.norm();
        self.normal = x.cross(&y).normalize();
        self.ref_vec = x.normalize();
    }
}

/// Sweep from `start` forward to `end`, in `(0, 2π]`.
fn sweep_between(start: f64, end: f64) -> f64 {
    let s = normalize_angle(end - start);
    if s < EPSILON {
        TAU
    } else {
        s
    }
}

fn orthonormalize(v: &Vector3, normal: &Vector3) -> Vector3 {
    let projected = v - normal * v.dot(normal);
    if projected.norm() < EPSILON {
        perpendicular(normal)
    } else {
        projected.normalize()
    }
}

// =============================================================================
// Elliptical arcs
// =============================================================================

/// Elliptical arc. `major_axis` is a unit vector; the minor axis is
/// `normal × major_axis`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EllipArc3 {
    pub center: Point3,
    pub normal: Vector3,
    pub major_axis: Vector3,
    pub major_radius: f64,
    pub minor_radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl EllipArc3 {
    pub fn new(
        center: Point3,
        normal: Vector3,
        major_axis: Vector3,
        major_radius: f64,
        minor_radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Self {
        let normal = normal.normalize();
        let start = normalize_angle(start_angle);
        Self {
            center,
            normal,
            major_axis: orthonormalize(&major_axis, &normal),
            major_radius,
            minor_radius,
            start_angle: start,
            end_angle: start + sweep_between(start_angle, end_angle),
        }
    }

    pub fn full(center: Point3, normal: Vector3, major_axis: Vector3, major_radius: f64, minor_radius: f64) -> Self {
        Self::new(center, normal, major_axis, major_radius, minor_radius, 0.0, TAU)
    }

    pub fn minor_axis(&self) -> Vector3 {
        self.normal.cross(&self.major_axis)
    }

    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    pub fn is_closed(&self) -> bool {
        self.sweep() >= TAU - EPSILON
    }

    pub fn point_at(&self, t: f64) -> Point3 {
        self.center
            + self.major_axis * (self.major_radius * t.cos())
            + self.minor_axis() * (self.minor_radius * t.sin())
    }

    pub fn angle_of(&self, p: &Point3) -> f64 {
        let v = p - self.center;
        let x = v.dot(&self.major_axis) / self.major_radius;
        let y = v.dot(&self.minor_axis()) / self.minor_radius;
        normalize_angle(y.atan2(x))
    }

    pub fn param_of(&self, p: &Point3) -> f64 {
        self.start_angle + normalize_angle(self.angle_of(p) - self.start_angle)
    }

    pub fn start_point(&self) -> Point3 {
        self.point_at(self.start_angle)
    }

    pub fn end_point(&self) -> Point3 {
        self.point_at(self.end_angle)
    }

    pub fn mid_point(&self) -> Point3 {
        self.point_at(0.5 * (self.start_angle + self.end_angle))
    }

    pub fn set_start_point(&mut self, p: &Point3) {
        let old_end = self.end_angle;
        let start = self.angle_of(p);
        self.start_angle = start;
        self.end_angle = start + sweep_between(start, old_end);
    }

    pub fn set_end_point(&mut self, p: &Point3) {
        let rel = normalize_angle(self.angle_of(p) - self.start_angle);
        self.end_angle = self.start_angle + if rel < EPSILON { TAU } else { rel };
    }

    pub fn transform_by(&mut self, m: &Matrix4) {
        let x = m.transform_vector(&self.major_axis);
        let y = m.transform_vector(&self.minor_axis());
        self.center = m.transform_point(&self.center);
        self.major_radius *= x.norm();
        self.minor_radius *= y.norm();
        self.normal = x.cross(&y).normalize();
        self.major_axis = x.normalize();
    }
}

// =============================================================================
// Edge curves
// =============================================================================

/// The curve shapes an entity edge can be extracted as or injected from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EdgeCurve {
    LineSeg(LineSeg3),
    Arc(CircArc3),
    Line(Line3),
    Ray(Ray3),
}

impl EdgeCurve {
    pub fn kind_name(&self) -> &'static str {
        match self {
            EdgeCurve::LineSeg(_) => "line segment",
            EdgeCurve::Arc(_) => "circular arc",
            EdgeCurve::Line(_) => "line",
            EdgeCurve::Ray(_) => "ray",
        }
    }

    pub fn transform_by(&mut self, m: &Matrix4) {
        match self {
            EdgeCurve::LineSeg(c) => c.transform_by(m),
            EdgeCurve::Arc(c) => c.transform_by(m),
            EdgeCurve::Line(c) => c.transform_by(m),
            EdgeCurve::Ray(c) => c.transform_by(m),
        }
    }
}
