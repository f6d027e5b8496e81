//! Field filers: the wire contract nodes and identities are saved through.
//!
//! A [`DwgFiler`] is a position-encoded stream of primitive fields. A
//! [`DxfFiler`] carries the same fields as `(group code, value)` pairs and
//! rejects a read whose code does not match the next pair.
//!
//! Every layout is written once against the code-carrying adapters in
//! `fields`, so the binary and tagged forms cannot drift apart and every
//! writer has exactly one matching reader.

mod fields;
pub mod memory;
mod nodes;

pub use memory::{FieldValue, MemoryDwgFiler, MemoryDxfFiler};
pub use nodes::ARRAY_GROW_LENGTH;

use crate::error::AssocResult;
use crate::geometry::{Point3, Vector3};

/// Group codes used by the tagged layouts.
pub mod dxf_code {
    /// 32-bit integers and node/dependency ids.
    pub const ID: i16 = 90;
    /// Array lengths.
    pub const LENGTH: i16 = 91;
    pub const REAL: i16 = 40;
    pub const POINT: i16 = 10;
    pub const VECTOR: i16 = 11;
    pub const BOOL: i16 = 290;
    /// Kind tags and enumerations.
    pub const KIND: i16 = 70;
    /// Returned as `found` when the stream ends before an expected pair.
    pub const END_OF_STREAM: i16 = -1;
}

/// Binary, position-encoded field stream.
pub trait DwgFiler {
    fn write_bool(&mut self, value: bool);
    fn write_i32(&mut self, value: i32);
    fn write_f64(&mut self, value: f64);
    fn write_point3(&mut self, value: &Point3);
    fn write_vector3(&mut self, value: &Vector3);

    fn read_bool(&mut self) -> AssocResult<bool>;
    fn read_i32(&mut self) -> AssocResult<i32>;
    fn read_f64(&mut self) -> AssocResult<f64>;
    fn read_point3(&mut self) -> AssocResult<Point3>;
    fn read_vector3(&mut self) -> AssocResult<Vector3>;
}

/// Tagged field stream of `(group code, value)` pairs.
///
/// Readers name the code they expect; a different code at the read position
/// fails with [`AssocError::BadDxfSequence`](crate::error::AssocError::BadDxfSequence)
/// and consumes nothing.
pub trait DxfFiler {
    fn write_bool(&mut self, code: i16, value: bool);
    fn write_i32(&mut self, code: i16, value: i32);
    fn write_f64(&mut self, code: i16, value: f64);
    fn write_point3(&mut self, code: i16, value: &Point3);
    fn write_vector3(&mut self, code: i16, value: &Vector3);

    /// Group code of the next unread pair.
    fn peek_code(&self) -> Option<i16>;

    fn read_bool_expect(&mut self, code: i16) -> AssocResult<bool>;
    fn read_i32_expect(&mut self, code: i16) -> AssocResult<i32>;
    fn read_f64_expect(&mut self, code: i16) -> AssocResult<f64>;
    fn read_point3_expect(&mut self, code: i16) -> AssocResult<Point3>;
    fn read_vector3_expect(&mut self, code: i16) -> AssocResult<Vector3>;
}

#[cfg(test)]
mod tests_filer;
