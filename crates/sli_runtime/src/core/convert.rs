//! Visitor for turning datums into foreign representations.

use sli_core::Name;

use super::token::Token;
use super::value::{Datum, Procedure, Value};
use crate::dict::DictRef;

/// Receives one callback per datum kind; kinds a converter does not handle
/// fall through to `convert_unsupported`.
pub trait DatumConverter {
    fn convert_unsupported(&mut self, datum: &Datum);

    fn convert_integer(&mut self, datum: &Datum, _value: i64) {
        self.convert_unsupported(datum)
    }
    fn convert_double(&mut self, datum: &Datum, _value: f64) {
        self.convert_unsupported(datum)
    }
    fn convert_bool(&mut self, datum: &Datum, _value: bool) {
        self.convert_unsupported(datum)
    }
    fn convert_string(&mut self, datum: &Datum, _value: &str) {
        self.convert_unsupported(datum)
    }
    fn convert_name(&mut self, datum: &Datum, _value: &Name) {
        self.convert_unsupported(datum)
    }
    fn convert_literal(&mut self, datum: &Datum, _value: &Name) {
        self.convert_unsupported(datum)
    }
    fn convert_array(&mut self, datum: &Datum, _items: &[Token]) {
        self.convert_unsupported(datum)
    }
    fn convert_procedure(&mut self, datum: &Datum, _proc: &Procedure) {
        self.convert_unsupported(datum)
    }
    fn convert_dictionary(&mut self, datum: &Datum, _dict: &DictRef) {
        self.convert_unsupported(datum)
    }
}

impl Datum {
    pub fn use_converter(&self, converter: &mut dyn DatumConverter) {
        match self.value() {
            Value::Integer(i) => converter.convert_integer(self, *i),
            Value::Double(f) => converter.convert_double(self, *f),
            Value::Bool(b) => converter.convert_bool(self, *b),
            Value::String(s) => converter.convert_string(self, s),
            Value::Name(n) => converter.convert_name(self, n),
            Value::Literal(n) => converter.convert_literal(self, n),
            Value::Array(items) => converter.convert_array(self, items),
            Value::Procedure(p) | Value::LitProcedure(p) => converter.convert_procedure(self, p),
            Value::Dictionary(h) => match h.get() {
                Some(d) => converter.convert_dictionary(self, &d),
                None => converter.convert_unsupported(self),
            },
            _ => converter.convert_unsupported(self),
        }
    }
}
