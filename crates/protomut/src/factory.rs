//! Producing fresh and mutated field values.

use crate::random::RandomEngine;
use crate::scalar::ScalarMutations;
use protomut_schema::{DynamicMessage, FieldDescriptor, Kind, Value};

/// Borrowed view of the engine state needed to produce values: the random
/// stream, the scalar strategy and the default-value ratio.
pub(crate) struct ValueFactory<'a, S: ?Sized> {
    pub(crate) random: &'a mut RandomEngine,
    pub(crate) strategy: &'a mut S,
    pub(crate) random_to_default_ratio: u64,
}

impl<'a, S: ScalarMutations + ?Sized> ValueFactory<'a, S> {
    /// A mutated copy of one element of `field`.
    ///
    /// Messages and lists are returned unchanged; structural edits are the
    /// walker's job.
    pub(crate) fn mutate(&mut self, field: &FieldDescriptor, value: &Value, size_increase_hint: usize) -> Value {
        let random = &mut *self.random;
        let strategy = &mut *self.strategy;
        match value {
            Value::I32(v) => Value::I32(strategy.mutate_i32(random, *v, size_increase_hint)),
            Value::I64(v) => Value::I64(strategy.mutate_i64(random, *v, size_increase_hint)),
            Value::U32(v) => Value::U32(strategy.mutate_u32(random, *v, size_increase_hint)),
            Value::U64(v) => Value::U64(strategy.mutate_u64(random, *v, size_increase_hint)),
            Value::F32(v) => Value::F32(strategy.mutate_f32(random, *v)),
            Value::F64(v) => Value::F64(strategy.mutate_f64(random, *v)),
            Value::Bool(v) => Value::Bool(strategy.mutate_bool(random, *v)),
            Value::String(s) => Value::String(strategy.mutate_string(random, s, size_increase_hint)),
            Value::Bytes(b) => Value::Bytes(strategy.mutate_bytes(random, b, size_increase_hint)),
            Value::EnumNumber(number) => match field.kind() {
                Kind::Enum(enumeration) => {
                    let values = enumeration.values();
                    if values.is_empty() {
                        return value.clone();
                    }
                    let index = enumeration.index_of(*number).unwrap_or(values.len());
                    let next = strategy.mutate_enum(random, index, values.len());
                    // A custom strategy may hand back an out-of-range index.
                    Value::EnumNumber(values.get(next).map_or(*number, |v| v.number))
                }
                _ => value.clone(),
            },
            Value::Message(_) | Value::List(_) => value.clone(),
        }
    }

    /// A value for a newly materialized element of `field`.
    ///
    /// One time in `random_to_default_ratio` this is the field's default;
    /// otherwise it is a mutation of the kind's zero value.  Message fields
    /// always get an empty instance.
    pub(crate) fn create(&mut self, field: &FieldDescriptor, size_increase_hint: usize) -> Value {
        if let Kind::Message(nested) = field.kind() {
            return Value::Message(DynamicMessage::new(nested));
        }
        if self.random.one_in(self.random_to_default_ratio) {
            return field.default_value();
        }
        let zero = field.kind().zero_value();
        self.mutate(field, &zero, size_increase_hint)
    }
}
