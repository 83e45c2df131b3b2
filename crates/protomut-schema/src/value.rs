//! Field values held by dynamic messages.

use crate::descriptor::{FieldDescriptor, Kind};
use crate::message::DynamicMessage;

/// A single field value, or the element list of a repeated field.
///
/// Equality is bitwise for floating point values, so two values compare
/// equal exactly when they would encode to the same bytes (a NaN equals the
/// same NaN, `0.0` differs from `-0.0`).
#[derive(Debug, Clone)]
pub enum Value {
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    /// Enum value, stored by number.
    EnumNumber(i32),
    Message(DynamicMessage),
    /// Elements of a repeated field.
    List(Vec<Value>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a.to_bits() == b.to_bits(),
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::EnumNumber(a), Value::EnumNumber(b)) => a == b,
            (Value::Message(a), Value::Message(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Whether this value can be stored as one element of `kind`.
    pub fn is_valid_for(&self, kind: &Kind) -> bool {
        match (self, kind) {
            (Value::I32(_), Kind::Int32)
            | (Value::I64(_), Kind::Int64)
            | (Value::U32(_), Kind::UInt32)
            | (Value::U64(_), Kind::UInt64)
            | (Value::F32(_), Kind::Float)
            | (Value::F64(_), Kind::Double)
            | (Value::Bool(_), Kind::Bool)
            | (Value::String(_), Kind::String)
            | (Value::Bytes(_), Kind::Bytes)
            | (Value::EnumNumber(_), Kind::Enum(_)) => true,
            (Value::Message(m), Kind::Message(desc)) => m.descriptor() == desc,
            _ => false,
        }
    }

    /// Whether this value can be stored in `field` as a whole: a list of
    /// valid elements for repeated fields, a single valid element otherwise.
    pub fn is_valid_for_field(&self, field: &FieldDescriptor) -> bool {
        let kind = field.kind();
        match self {
            Value::List(items) if field.is_repeated() => {
                items.iter().all(|item| item.is_valid_for(&kind))
            }
            _ if field.is_repeated() => false,
            _ => self.is_valid_for(&kind),
        }
    }

    /// Short variant name, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::I32(_) => "int32",
            Value::I64(_) => "int64",
            Value::U32(_) => "uint32",
            Value::U64(_) => "uint64",
            Value::F32(_) => "float",
            Value::F64(_) => "double",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::EnumNumber(_) => "enum",
            Value::Message(_) => "message",
            Value::List(_) => "list",
        }
    }

    pub fn as_message(&self) -> Option<&DynamicMessage> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_message_mut(&mut self) -> Option<&mut DynamicMessage> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Value::I32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Value::U32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::U64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_enum_number(&self) -> Option<i32> {
        match *self {
            Value::EnumNumber(v) => Some(v),
            _ => None,
        }
    }

    /// Nested messages held directly by this value (the value itself, or
    /// the message elements of a list).
    pub fn messages(&self) -> impl Iterator<Item = &DynamicMessage> {
        let (single, list) = match self {
            Value::Message(m) => (Some(m), &[][..]),
            Value::List(items) => (None, items.as_slice()),
            _ => (None, &[][..]),
        };
        single
            .into_iter()
            .chain(list.iter().filter_map(Value::as_message))
    }

    /// Mutable counterpart of [`Value::messages`].
    pub fn messages_mut(&mut self) -> impl Iterator<Item = &mut DynamicMessage> {
        let (single, list) = match self {
            Value::Message(m) => (Some(m), &mut [][..]),
            Value::List(items) => (None, items.as_mut_slice()),
            _ => (None, &mut [][..]),
        };
        single
            .into_iter()
            .chain(list.iter_mut().filter_map(Value::as_message_mut))
    }
}
