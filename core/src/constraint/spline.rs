//! Spline node: raw NURBS arrays plus the curve object built from them.
//!
//! The raw control-point array holds one entry per `Define` implicit point. A
//! periodic curve may repeat its first control point at the end of the NURBS
//! control net. When the knot vector is sized for the distinct points only,
//! that repeat is a wrap point: it is not part of the raw array and follows
//! control point 0. When the knots count the repeat, it is an ordinary
//! control point with its own `Define` point.

use super::curves::unsupported_point;
use super::node::{ImplicitPointKind, NodeId, Tracked};
use crate::config::{Tolerance, WEIGHT_TOLERANCE};
use crate::error::{AssocError, AssocResult};
use crate::geometry::{ApproxEq, KnotVector, Matrix4, NurbsCurve3, Point3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplineNode {
    pub degree: u32,
    pub knots: KnotVector,
    pub weights: Vec<f64>,
    pub control_points: Vec<Point3>,
    pub periodic: bool,
    /// The NURBS net carries a wrap point after the raw control points.
    pub wrap_point: bool,
    /// Node ids of the `Define` implicit points, one per raw control point.
    pub define_ids: Vec<NodeId>,
    pub nurbs: Tracked<NurbsCurve3>,
}

impl Default for SplineNode {
    fn default() -> Self {
        Self {
            degree: 0,
            knots: KnotVector::default(),
            weights: Vec::new(),
            control_points: Vec::new(),
            periodic: false,
            wrap_point: false,
            define_ids: Vec::new(),
            nurbs: Tracked::new(NurbsCurve3::new(0, KnotVector::default(), Vec::new(), Vec::new(), false)),
        }
    }
}

/// Control points the knot vector of a degree-`degree` curve accounts for.
fn declared_control_points(knots: &KnotVector, degree: u32) -> usize {
    knots.len().saturating_sub(degree as usize + 1)
}

/// Control points of `curve` without a trailing wrap point, and whether one
/// was dropped. Only a repeat of the first point that the knots do not
/// account for is a wrap point.
fn split_wrap_point(curve: &NurbsCurve3) -> (Vec<Point3>, bool) {
    let mut points = curve.control_points.clone();
    if !curve.periodic || points.len() < 2 {
        return (points, false);
    }
    let repeats_first = points
        .first()
        .zip(points.last())
        .map_or(false, |(first, last)| first.approx_eq(last));
    if repeats_first && declared_control_points(&curve.knots, curve.degree) < points.len() {
        points.pop();
        return (points, true);
    }
    (points, false)
}

impl SplineNode {
    pub fn from_curve(curve: NurbsCurve3) -> Self {
        let mut node = Self::default();
        node.load(curve);
        node.nurbs.commit();
        node
    }

    /// Does setting control point 0 also move a wrap point at the end of
    /// the NURBS net?
    pub fn mirrors_wrap_point(&self) -> bool {
        self.periodic && self.wrap_point
    }

    /// Overwrite the raw arrays and the curve from `curve`. Fails if the
    /// control-point count differs from an earlier load.
    pub fn pull_curve(&mut self, curve: NurbsCurve3) -> AssocResult<()> {
        let incoming = split_wrap_point(&curve).0.len();
        if !self.control_points.is_empty() && incoming != self.control_points.len() {
            return Err(AssocError::bad_obj_type(format!(
                "spline control point count changed from {} to {}",
                self.control_points.len(),
                incoming
            )));
        }
        self.load(curve);
        Ok(())
    }

    fn load(&mut self, curve: NurbsCurve3) {
        self.degree = curve.degree;
        self.knots = curve.knots.clone();
        self.weights = curve.weights.clone();
        self.periodic = curve.periodic;
        let (points, wrap_point) = split_wrap_point(&curve);
        self.control_points = points;
        self.wrap_point = wrap_point;
        self.nurbs.replace(curve);
    }

    /// Rebuild the NURBS object from the raw arrays.
    pub fn rebuild_curve(&mut self) {
        let mut points = self.control_points.clone();
        if self.mirrors_wrap_point() {
            if let Some(first) = points.first().copied() {
                points.push(first);
            }
        }
        let curve = NurbsCurve3::new(self.degree, self.knots.clone(), points, self.weights.clone(), self.periodic);
        self.nurbs.replace(curve);
    }

    fn define_index(&self, kind: ImplicitPointKind) -> AssocResult<usize> {
        match kind {
            ImplicitPointKind::Define(i) if (i as usize) < self.control_points.len() => Ok(i as usize),
            ImplicitPointKind::Define(i) => Err(AssocError::bad_obj_type(format!(
                "spline has {} control points, no define point {}",
                self.control_points.len(),
                i
            ))),
            other => Err(unsupported_point(other, "spline")),
        }
    }

    pub fn point(&self, kind: ImplicitPointKind) -> AssocResult<Point3> {
        let i = self.define_index(kind)?;
        Ok(self.control_points[i])
    }

    pub fn original_point(&self, kind: ImplicitPointKind) -> AssocResult<Point3> {
        let i = self.define_index(kind)?;
        self.nurbs
            .original()
            .control_points
            .get(i)
            .copied()
            .ok_or_else(|| AssocError::bad_obj_type(format!("no original control point {}", i)))
    }

    /// Move control point `i` in both the raw array and the curve. For a
    /// periodic curve with a wrap point, index 0 also moves the wrap point.
    pub fn set_point(&mut self, kind: ImplicitPointKind, p: &Point3) -> AssocResult<()> {
        let i = self.define_index(kind)?;
        let wrap = (i == 0 && self.mirrors_wrap_point()).then_some(self.control_points.len());
        self.control_points[i] = *p;
        let curve = self.nurbs.edit();
        curve.set_control_point_at(i, *p);
        if let Some(w) = wrap {
            curve.set_control_point_at(w, *p);
        }
        Ok(())
    }

    pub fn implicit_kinds(&self) -> Vec<ImplicitPointKind> {
        (0..self.control_points.len() as u32).map(ImplicitPointKind::Define).collect()
    }

    pub fn transform_by(&mut self, m: &Matrix4) {
        for p in &mut self.control_points {
            *p = m.transform_point(p);
        }
        self.nurbs.edit().transform_by(m);
    }

    pub fn geom_eq(&self, other: &Self, tol: &Tolerance) -> bool {
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
            && self.nurbs.current().is_equal_to(other.nurbs.current(), tol)
    }
}
