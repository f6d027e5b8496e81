//! Conversion between polyline bulge segments and circular arcs.
//!
//! Both directions work in the polyline's OCS, where the polyline normal is +Z.
//! A positive bulge turns counter-clockwise around +Z; a negative bulge is
//! expressed as a counter-clockwise arc around -Z so the arc always runs from
//! the segment's start vertex to its end vertex.

use super::{CircArc3, Point3, Vector3, EPSILON};
use crate::error::{AssocError, AssocResult};

/// Build the arc for the segment `start → end` with the given `bulge`.
pub fn bulge_to_arc(start: &Point3, end: &Point3, bulge: f64) -> AssocResult<CircArc3> {
    if bulge.abs() < 1e-12 {
        return Err(AssocError::DegenerateGeometry(
            "straight polyline segment has no arc".into(),
        ));
    }
    let chord = end - start;
    let chord_len = chord.norm();
    if chord_len < EPSILON {
        return Err(AssocError::DegenerateGeometry(
            "polyline segment has zero length".into(),
        ));
    }

    let half_angle = bulge.abs().atan();
    let radius = (chord_len / 2.0) / (2.0 * half_angle).sin();
    let offset = radius * (2.0 * half_angle).cos() * bulge.signum();

    let perp = Vector3::new(-chord.y, chord.x, 0.0) / chord_len;
    let mid = nalgebra::center(start, end);
    let center = mid + perp * offset;

    let normal = if bulge > 0.0 { Vector3::z() } else { -Vector3::z() };
    Ok(CircArc3::from_center_and_points(center, normal, start, end))
}

/// Bulge for an arc written back to a segment. The sign comes from the
/// segment's previous bulge.
pub fn arc_to_bulge(arc: &CircArc3, original_bulge: f64) -> f64 {
    let sign = if original_bulge < 0.0 { -1.0 } else { 1.0 };
    (arc.sweep() / 4.0).tan() * sign
}
