use nalgebra as na;

use crate::config::Tolerance;

pub type Point2 = na::Point2<f64>;
pub type Point3 = na::Point3<f64>;
pub type Vector3 = na::Vector3<f64>;
pub type Matrix4 = na::Matrix4<f64>;

pub const EPSILON: f64 = 1e-6;

/// Tolerance-aware equality for geometric values.
pub trait ApproxEq {
    fn approx_eq_tol(&self, other: &Self, tol: &Tolerance) -> bool;

    fn approx_eq(&self, other: &Self) -> bool {
        self.approx_eq_tol(other, &Tolerance::default())
    }
}

impl ApproxEq for f64 {
    fn approx_eq_tol(&self, other: &Self, tol: &Tolerance) -> bool {
        (self - other).abs() <= tol.equal_point
    }
}

impl ApproxEq for Point3 {
    fn approx_eq_tol(&self, other: &Self, tol: &Tolerance) -> bool {
        na::distance_squared(self, other) <= tol.equal_point * tol.equal_point
    }
}

impl ApproxEq for Vector3 {
    fn approx_eq_tol(&self, other: &Self, tol: &Tolerance) -> bool {
        (self - other).norm_squared() <= tol.equal_vector * tol.equal_vector
    }
}

impl ApproxEq for Matrix4 {
    fn approx_eq_tol(&self, other: &Self, tol: &Tolerance) -> bool {
        self.iter().zip(other.iter()).all(|(a, b)| (a - b).abs() <= tol.equal_vector)
    }
}

pub mod primitives;
pub use primitives::*;

pub mod nurbs;
pub use nurbs::{KnotVector, NurbsCurve3};

pub mod bulge;
pub use bulge::{arc_to_bulge, bulge_to_arc};

pub mod frames;
pub use frames::{ocs_to_world, world_to_ocs};

/// Inverse of a transform, falling back to identity for singular input.
pub fn invert_or_identity(m: &Matrix4) -> Matrix4 {
    m.try_inverse().unwrap_or_else(Matrix4::identity)
}

/// True if `a` and `b` point in opposite directions.
pub fn is_anti_codirectional(a: &Vector3, b: &Vector3, tol: &Tolerance) -> bool {
    let (na_, nb) = (a.norm(), b.norm());
    if na_ < tol.equal_vector || nb < tol.equal_vector {
        return false;
    }
    (a / na_ + b / nb).norm() <= tol.equal_vector
}

/// Any unit vector perpendicular to `v`.
pub fn perpendicular(v: &Vector3) -> Vector3 {
    let candidate = if v.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
    v.cross(&candidate).normalize()
}
