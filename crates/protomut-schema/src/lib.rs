//! Schema descriptors and dynamic messages for the protomut mutation engine.
//!
//! This crate is the reflection layer the mutator is written against:
//!
//! - [`descriptor`]: message, field and enum descriptors built from a
//!   declarative (JSON-friendly) [`SchemaDef`]
//! - [`message`]: [`DynamicMessage`], a message instance driven entirely by
//!   its descriptor (get/set/has/clear/len/get-at/push/remove-at)
//! - [`value`]: the tagged [`Value`] union stored in fields
//! - [`json`]: JSON mapping for messages, used by tools and tests
//!
//! Descriptors are handles into a shared, immutable [`Schema`], so message
//! types may be self-referential.  Message instances are plain trees: each
//! nested message is owned by exactly one parent.

pub mod descriptor;
pub mod error;
pub mod json;
pub mod message;
pub mod value;

pub use descriptor::{
    EnumDef, EnumDescriptor, EnumValueDef, FieldDef, FieldDescriptor, Kind, Label, MessageDef,
    MessageDescriptor, Schema, SchemaDef,
};
pub use error::SchemaError;
pub use message::DynamicMessage;
pub use value::Value;
