//! Tolerances used by geometric equality and the NURBS comparisons.

use serde::{Deserialize, Serialize};

/// Fixed tolerance for comparing spline weights.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Default tolerance for point and vector comparisons.
pub const DEFAULT_EQUAL_POINT: f64 = 1e-6;
pub const DEFAULT_EQUAL_VECTOR: f64 = 1e-6;

/// Geometric equality tolerance.
///
/// Hosts usually keep one per document and hand it to the constraint group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Two points closer than this are equal. Also used for lengths and radii.
    #[serde(default = "default_equal_point")]
    pub equal_point: f64,
    /// Two vectors whose difference is shorter than this are equal.
    #[serde(default = "default_equal_vector")]
    pub equal_vector: f64,
}

fn default_equal_point() -> f64 {
    DEFAULT_EQUAL_POINT
}

fn default_equal_vector() -> f64 {
    DEFAULT_EQUAL_VECTOR
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            equal_point: DEFAULT_EQUAL_POINT,
            equal_vector: DEFAULT_EQUAL_VECTOR,
        }
    }
}

impl Tolerance {
    pub fn new(equal_point: f64, equal_vector: f64) -> Self {
        Self { equal_point, equal_vector }
    }

    /// Load a tolerance from a JSON fragment, e.g. a document settings blob.
    /// Missing fields fall back to the defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn scalars_equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.equal_point
    }
}
