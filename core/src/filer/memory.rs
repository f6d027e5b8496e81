//! In-memory filers for hosts without a drawing database, and for tests.

use super::{dxf_code, DwgFiler, DxfFiler};
use crate::error::{AssocError, AssocResult};
use crate::geometry::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// One primitive field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Bool(bool),
    I32(i32),
    F64(f64),
    Point(Point3),
    Vector(Vector3),
}

impl FieldValue {
    fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Bool(_) => "bool",
            FieldValue::I32(_) => "i32",
            FieldValue::F64(_) => "f64",
            FieldValue::Point(_) => "point",
            FieldValue::Vector(_) => "vector",
        }
    }
}

fn type_mismatch(wanted: &str, found: &FieldValue) -> AssocError {
    AssocError::invalid_input(format!("expected a {} field, found a {}", wanted, found.type_name()))
}

macro_rules! expect_variant {
    ($value:expr, $variant:ident, $wanted:literal) => {
        match $value {
            FieldValue::$variant(v) => Ok(v),
            other => Err(type_mismatch($wanted, &other)),
        }
    };
}

// =============================================================================
// Binary
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryDwgFiler {
    fields: Vec<FieldValue>,
    cursor: usize,
}

impl MemoryDwgFiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[FieldValue] {
        &self.fields
    }

    /// Start reading from the first field again.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.fields.len()
    }

    fn next(&mut self) -> AssocResult<FieldValue> {
        let value = self
            .fields
            .get(self.cursor)
            .copied()
            .ok_or_else(|| AssocError::invalid_input(format!("binary stream ended at field {}", self.cursor)))?;
        self.cursor += 1;
        Ok(value)
    }
}

impl DwgFiler for MemoryDwgFiler {
    fn write_bool(&mut self, value: bool) {
        self.fields.push(FieldValue::Bool(value));
    }

    fn write_i32(&mut self, value: i32) {
        self.fields.push(FieldValue::I32(value));
    }

    fn write_f64(&mut self, value: f64) {
        self.fields.push(FieldValue::F64(value));
    }

    fn write_point3(&mut self, value: &Point3) {
        self.fields.push(FieldValue::Point(*value));
    }

    fn write_vector3(&mut self, value: &Vector3) {
        self.fields.push(FieldValue::Vector(*value));
    }

    fn read_bool(&mut self) -> AssocResult<bool> {
        expect_variant!(self.next()?, Bool, "bool")
    }

    fn read_i32(&mut self) -> AssocResult<i32> {
        expect_variant!(self.next()?, I32, "i32")
    }

    fn read_f64(&mut self) -> AssocResult<f64> {
        expect_variant!(self.next()?, F64, "f64")
    }

    fn read_point3(&mut self) -> AssocResult<Point3> {
        expect_variant!(self.next()?, Point, "point")
    }

    fn read_vector3(&mut self) -> AssocResult<Vector3> {
        expect_variant!(self.next()?, Vector, "vector")
    }
}

// =============================================================================
// Tagged
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryDxfFiler {
    pairs: Vec<(i16, FieldValue)>,
    cursor: usize,
}

impl MemoryDxfFiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pairs(&self) -> &[(i16, FieldValue)] {
        &self.pairs
    }

    /// Append a raw pair, bypassing the typed writers.
    pub fn push(&mut self, code: i16, value: FieldValue) {
        self.pairs.push((code, value));
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.pairs.len()
    }

    /// Consume the next pair if it carries `code`.
    fn next_expect(&mut self, code: i16) -> AssocResult<FieldValue> {
        let (found, value) = self.pairs.get(self.cursor).copied().ok_or(AssocError::BadDxfSequence {
            expected: code,
            found: dxf_code::END_OF_STREAM,
        })?;
        if found != code {
            return Err(AssocError::BadDxfSequence { expected: code, found });
        }
        self.cursor += 1;
        Ok(value)
    }
}

impl DxfFiler for MemoryDxfFiler {
    fn write_bool(&mut self, code: i16, value: bool) {
        self.push(code, FieldValue::Bool(value));
    }

    fn write_i32(&mut self, code: i16, value: i32) {
        self.push(code, FieldValue::I32(value));
    }

    fn write_f64(&mut self, code: i16, value: f64) {
        self.push(code, FieldValue::F64(value));
    }

    fn write_point3(&mut self, code: i16, value: &Point3) {
        self.push(code, FieldValue::Point(*value));
    }

    fn write_vector3(&mut self, code: i16, value: &Vector3) {
        self.push(code, FieldValue::Vector(*value));
    }

    fn peek_code(&self) -> Option<i16> {
        self.pairs.get(self.cursor).map(|(code, _)| *code)
    }

    fn read_bool_expect(&mut self, code: i16) -> AssocResult<bool> {
        expect_variant!(self.next_expect(code)?, Bool, "bool")
    }

    fn read_i32_expect(&mut self, code: i16) -> AssocResult<i32> {
        expect_variant!(self.next_expect(code)?, I32, "i32")
    }

    fn read_f64_expect(&mut self, code: i16) -> AssocResult<f64> {
        expect_variant!(self.next_expect(code)?, F64, "f64")
    }

    fn read_point3_expect(&mut self, code: i16) -> AssocResult<Point3> {
        expect_variant!(self.next_expect(code)?, Point, "point")
    }

    fn read_vector3_expect(&mut self, code: i16) -> AssocResult<Vector3> {
        expect_variant!(self.next_expect(code)?, Vector, "vector")
    }
}
