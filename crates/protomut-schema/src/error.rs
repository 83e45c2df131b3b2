//! Errors raised while building schemas or editing dynamic messages.

use thiserror::Error;

/// Errors from schema construction and reflective message access.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("type name `{0}` is declared more than once")]
    DuplicateType(String),

    #[error("unknown type `{type_name}` referenced by `{message}.{field}`")]
    UnknownType {
        message: String,
        field: String,
        type_name: String,
    },

    #[error("field number {number} is used more than once in `{message}`")]
    DuplicateFieldNumber { message: String, number: u32 },

    #[error("field name `{field}` is used more than once in `{message}`")]
    DuplicateFieldName { message: String, field: String },

    #[error("field `{message}.{field}` uses reserved field number 0")]
    ZeroFieldNumber { message: String, field: String },

    #[error("enum `{0}` declares no values")]
    EmptyEnum(String),

    #[error("enum `{enumeration}` declares value `{value}` more than once")]
    DuplicateEnumValue { enumeration: String, value: String },

    #[error("oneof member `{message}.{field}` must be optional")]
    InvalidOneofMember { message: String, field: String },

    #[error("invalid default for `{message}.{field}`: {reason}")]
    InvalidDefault {
        message: String,
        field: String,
        reason: String,
    },

    #[error("field `{field}` does not belong to message `{message}`")]
    ForeignField { message: String, field: String },

    #[error("field `{field}` expects {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: String,
        got: &'static str,
    },

    #[error("field `{0}` is not repeated")]
    NotRepeated(String),

    #[error("field `{0}` is not a singular message field")]
    NotSingularMessage(String),

    #[error("message `{message}` has no field named `{field}`")]
    UnknownField { message: String, field: String },

    #[error("invalid JSON for `{message}.{field}`: {reason}")]
    InvalidJson {
        message: String,
        field: String,
        reason: String,
    },
}
