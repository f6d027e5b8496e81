//! Object coordinate systems for planar entities.
//!
//! Polylines store 2D vertices in an OCS derived from their normal with the
//! arbitrary-axis rule, lifted by an elevation along that normal.

use super::{invert_or_identity, Matrix4, Vector3};

const ARBITRARY_AXIS_LIMIT: f64 = 1.0 / 64.0;

/// X axis of the OCS for `normal`.
pub fn ocs_x_axis(normal: &Vector3) -> Vector3 {
    let n = normal.normalize();
    let axis = if n.x.abs() < ARBITRARY_AXIS_LIMIT && n.y.abs() < ARBITRARY_AXIS_LIMIT {
        Vector3::y().cross(&n)
    } else {
        Vector3::z().cross(&n)
    };
    axis.normalize()
}

/// Maps OCS coordinates (with elevation as z offset) to world coordinates.
pub fn ocs_to_world(normal: &Vector3, elevation: f64) -> Matrix4 {
    let n = normal.normalize();
    let x = ocs_x_axis(&n);
    let y = n.cross(&x);
    let origin = n * elevation;
    Matrix4::new(
        x.x, y.x, n.x, origin.x,
        x.y, y.y, n.y, origin.y,
        x.z, y.z, n.z, origin.z,
        0.0, 0.0, 0.0, 1.0,
    )
}

pub fn world_to_ocs(normal: &Vector3, elevation: f64) -> Matrix4 {
    invert_or_identity(&ocs_to_world(normal, elevation))
}
