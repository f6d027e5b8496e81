//! Code-carrying adapters over both filer kinds. The binary adapter drops
//! the group codes; the tagged adapter passes them through.

use super::{DwgFiler, DxfFiler};
use crate::error::AssocResult;
use crate::geometry::{Point3, Vector3};

pub(crate) trait FieldOut {
    fn put_bool(&mut self, code: i16, value: bool);
    fn put_i32(&mut self, code: i16, value: i32);
    fn put_f64(&mut self, code: i16, value: f64);
    fn put_point(&mut self, code: i16, value: &Point3);
    fn put_vector(&mut self, code: i16, value: &Vector3);
}

pub(crate) trait FieldIn {
    fn take_bool(&mut self, code: i16) -> AssocResult<bool>;
    fn take_i32(&mut self, code: i16) -> AssocResult<i32>;
    fn take_f64(&mut self, code: i16) -> AssocResult<f64>;
    fn take_point(&mut self, code: i16) -> AssocResult<Point3>;
    fn take_vector(&mut self, code: i16) -> AssocResult<Vector3>;
}

pub(crate) struct Dwg<'a, F: ?Sized>(pub &'a mut F);

pub(crate) struct Dxf<'a, F: ?Sized>(pub &'a mut F);

impl<F: DwgFiler + ?Sized> FieldOut for Dwg<'_, F> {
    fn put_bool(&mut self, _: i16, value: bool) {
        self.0.write_bool(value);
    }

    fn put_i32(&mut self, _: i16, value: i32) {
        self.0.write_i32(value);
    }

    fn put_f64(&mut self, _: i16, value: f64) {
        self.0.write_f64(value);
    }

    fn put_point(&mut self, _: i16, value: &Point3) {
        self.0.write_point3(value);
    }

    fn put_vector(&mut self, _: i16, value: &Vector3) {
        self.0.write_vector3(value);
    }
}

impl<F: DwgFiler + ?Sized> FieldIn for Dwg<'_, F> {
    fn take_bool(&mut self, _: i16) -> AssocResult<bool> {
        self.0.read_bool()
    }

    fn take_i32(&mut self, _: i16) -> AssocResult<i32> {
        self.0.read_i32()
    }

    fn take_f64(&mut self, _: i16) -> AssocResult<f64> {
        self.0.read_f64()
    }

    fn take_point(&mut self, _: i16) -> AssocResult<Point3> {
        self.0.read_point3()
    }

    fn take_vector(&mut self, _: i16) -> AssocResult<Vector3> {
        self.0.read_vector3()
    }
}

impl<F: DxfFiler + ?Sized> FieldOut for Dxf<'_, F> {
    fn put_bool(&mut self, code: i16, value: bool) {
        self.0.write_bool(code, value);
    }

    fn put_i32(&mut self, code: i16, value: i32) {
        self.0.write_i32(code, value);
    }

    fn put_f64(&mut self, code: i16, value: f64) {
        self.0.write_f64(code, value);
    }

    fn put_point(&mut self, code: i16, value: &Point3) {
        self.0.write_point3(code, value);
    }

    fn put_vector(&mut self, code: i16, value: &Vector3) {
        self.0.write_vector3(code, value);
    }
}

impl<F: DxfFiler + ?Sized> FieldIn for Dxf<'_, F> {
    fn take_bool(&mut self, code: i16) -> AssocResult<bool> {
        self.0.read_bool_expect(code)
    }

    fn take_i32(&mut self, code: i16) -> AssocResult<i32> {
        self.0.read_i32_expect(code)
    }

    fn take_f64(&mut self, code: i16) -> AssocResult<f64> {
        self.0.read_f64_expect(code)
    }

    fn take_point(&mut self, code: i16) -> AssocResult<Point3> {
        self.0.read_point3_expect(code)
    }

    fn take_vector(&mut self, code: i16) -> AssocResult<Vector3> {
        self.0.read_vector3_expect(code)
    }
}
