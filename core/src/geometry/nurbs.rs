//! NURBS storage. Evaluation is left to the host's curve library; this module
//! only keeps the defining data consistent and comparable.

use super::{ApproxEq, Matrix4, Point3};
use crate::config::{Tolerance, WEIGHT_TOLERANCE};
use serde::{Deserialize, Serialize};

/// Default tolerance carried by a knot vector.
pub const DEFAULT_KNOT_TOLERANCE: f64 = 1e-9;

/// Knot values plus the tolerance used to compare them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnotVector {
    pub knots: Vec<f64>,
    pub tolerance: f64,
}

impl Default for KnotVector {
    fn default() -> Self {
        Self {
            knots: Vec::new(),
            tolerance: DEFAULT_KNOT_TOLERANCE,
        }
    }
}

impl KnotVector {
    pub fn new(knots: Vec<f64>) -> Self {
        Self {
            knots,
            tolerance: DEFAULT_KNOT_TOLERANCE,
        }
    }

    pub fn with_tolerance(knots: Vec<f64>, tolerance: f64) -> Self {
        Self { knots, tolerance }
    }

    pub fn len(&self) -> usize {
        self.knots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    /// Element-wise comparison within this vector's own tolerance.
    pub fn is_equal_to(&self, other: &Self) -> bool {
        self.knots.len() == other.knots.len()
            && self
                .knots
                .iter()
                .zip(&other.knots)
                .all(|(a, b)| (a - b).abs() <= self.tolerance)
    }

    /// Clamped uniform knots for `count` control points.
    pub fn clamped_uniform(degree: u32, count: usize) -> Self {
        let p = degree as usize;
        let n = count + p + 1;
        let spans = count.saturating_sub(p).max(1);
        let knots = (0..n)
            .map(|i| {
                if i <= p {
                    0.0
                } else if i >= count {
                    1.0
                } else {
                    (i - p) as f64 / spans as f64
                }
            })
            .collect();
        Self::new(knots)
    }
}

/// Non-uniform rational B-spline defining data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NurbsCurve3 {
    pub degree: u32,
    pub knots: KnotVector,
    pub control_points: Vec<Point3>,
    /// Empty for non-rational curves.
    pub weights: Vec<f64>,
    pub periodic: bool,
}

impl NurbsCurve3 {
    pub fn new(degree: u32, knots: KnotVector, control_points: Vec<Point3>, weights: Vec<f64>, periodic: bool) -> Self {
        Self {
            degree,
            knots,
            control_points,
            weights,
            periodic,
        }
    }

    pub fn is_rational(&self) -> bool {
        !self.weights.is_empty()
    }

    pub fn num_control_points(&self) -> usize {
        self.control_points.len()
    }

    pub fn set_control_point_at(&mut self, index: usize, p: Point3) -> bool {
        match self.control_points.get_mut(index) {
            Some(slot) => {
                *slot = p;
                true
            }
            None => false,
        }
    }

    pub fn transform_by(&mut self, m: &Matrix4) {
        for p in &mut self.control_points {
            *p = m.transform_point(p);
        }
    }

    /// Knots within the knot tolerance, weights within [`WEIGHT_TOLERANCE`],
    /// control points within the point tolerance.
    pub fn is_equal_to(&self, other: &Self, tol: &Tolerance) -> bool {
        self.degree == other.degree
            && self.periodic == other.periodic
            && self.knots.is_equal_to(&other.knots)
            && self.weights.len() == other.weights.len()
            && self
                .weights
                .iter()
                .zip(&other.weights)
                .all(|(a, b)| (a - b).abs() <= WEIGHT_TOLERANCE)
            && self.control_points.len() == other.control_points.len()
            && self
                .control_points
                .iter()
                .zip(&other.control_points)
                .all(|(a, b)| a.approx_eq_tol(b, tol))
    }
}
