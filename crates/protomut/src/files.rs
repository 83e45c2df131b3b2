//! Loading schemas and messages from JSON files, and saving messages back.

use protomut_schema::{DynamicMessage, MessageDescriptor, Schema, SchemaDef, SchemaError};
use snafu::{OptionExt, Snafu};
use std::fs;
use std::path::Path;

/// Errors from file operations.
#[derive(Debug, Snafu)]
pub enum FileError {
    #[snafu(display("I/O error: {source}"), context(false))]
    Io { source: std::io::Error },

    #[snafu(display("JSON error: {source}"), context(false))]
    Json { source: serde_json::Error },

    #[snafu(display("{source}"), context(false))]
    Schema { source: SchemaError },

    #[snafu(display("message type `{name}` is not declared in the schema"))]
    UnknownMessageType { name: String },
}

/// Load and validate a schema definition.
pub fn load_schema<P: AsRef<Path>>(path: P) -> Result<Schema, FileError> {
    let json = fs::read_to_string(path)?;
    let def: SchemaDef = serde_json::from_str(&json)?;
    Ok(Schema::new(def)?)
}

/// Look up a message type, failing if it is not declared.
pub fn message_type(schema: &Schema, name: &str) -> Result<MessageDescriptor, FileError> {
    schema.message(name).context(UnknownMessageTypeSnafu { name })
}

/// Load a message of type `descriptor` from its JSON form.
pub fn load_message<P: AsRef<Path>>(
    path: P,
    descriptor: &MessageDescriptor,
) -> Result<DynamicMessage, FileError> {
    let json = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&json)?;
    Ok(DynamicMessage::from_json(descriptor, &value)?)
}

/// Save a message as pretty-printed JSON.
pub fn save_message<P: AsRef<Path>>(path: P, message: &DynamicMessage) -> Result<(), FileError> {
    let json = serde_json::to_string_pretty(&message.to_json())?;
    fs::write(path, json)?;
    Ok(())
}
