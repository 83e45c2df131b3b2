//! Schema descriptors: immutable metadata describing message and enum types.
//!
//! A [`Schema`] is built once from a serde-friendly [`SchemaDef`] and then
//! shared.  Descriptor handles ([`MessageDescriptor`], [`FieldDescriptor`],
//! [`EnumDescriptor`]) are cheap `(schema, index)` pairs, so message types may
//! refer to each other (or to themselves) without ownership cycles.

use crate::error::SchemaError;
use crate::json;
use crate::message::DynamicMessage;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Cardinality of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    #[default]
    Optional,
    Required,
    Repeated,
}

// ── Definitions ─────────────────────────────────────────────────

/// Declarative schema, usually loaded from JSON.
///
/// ```
/// use protomut_schema::{FieldDef, MessageDef, SchemaDef};
///
/// let schema = SchemaDef::new()
///     .message(
///         MessageDef::new("Node")
///             .field(FieldDef::required("x", 1, "int32"))
///             .field(FieldDef::optional("child", 2, "Node")),
///     )
///     .build()
///     .unwrap();
///
/// let node = schema.message("Node").unwrap();
/// assert_eq!(node.fields().count(), 2);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDef {
    #[serde(default)]
    pub enums: Vec<EnumDef>,
    #[serde(default)]
    pub messages: Vec<MessageDef>,
}

impl SchemaDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: MessageDef) -> Self {
        self.messages.push(message);
        self
    }

    pub fn enumeration(mut self, enumeration: EnumDef) -> Self {
        self.enums.push(enumeration);
        self
    }

    /// Validate and resolve this definition into a [`Schema`].
    pub fn build(self) -> Result<Schema, SchemaError> {
        Schema::new(self)
    }
}

/// A message type definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDef {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl MessageDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }
}

/// A field definition.
///
/// `type_name` is either a scalar keyword (`int32`, `int64`, `uint32`,
/// `uint64`, `float`, `double`, `bool`, `string`, `bytes`) or the name of
/// an enum or message type declared in the same schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub number: u32,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub label: Label,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oneof: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl FieldDef {
    fn with_label(
        name: impl Into<String>,
        number: u32,
        type_name: impl Into<String>,
        label: Label,
    ) -> Self {
        Self {
            name: name.into(),
            number,
            type_name: type_name.into(),
            label,
            oneof: None,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, number: u32, type_name: impl Into<String>) -> Self {
        Self::with_label(name, number, type_name, Label::Optional)
    }

    pub fn required(name: impl Into<String>, number: u32, type_name: impl Into<String>) -> Self {
        Self::with_label(name, number, type_name, Label::Required)
    }

    pub fn repeated(name: impl Into<String>, number: u32, type_name: impl Into<String>) -> Self {
        Self::with_label(name, number, type_name, Label::Repeated)
    }

    /// Place this field in the named oneof group.
    pub fn in_oneof(mut self, group: impl Into<String>) -> Self {
        self.oneof = Some(group.into());
        self
    }

    /// Declare a default value (JSON, same mapping as message fields).
    pub fn with_default(mut self, value: serde_json::Value) -> Self {
        self.default = Some(value);
        self
    }
}

/// An enum type definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    #[serde(default)]
    pub values: Vec<EnumValueDef>,
}

impl EnumDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    pub fn value(mut self, name: impl Into<String>, number: i32) -> Self {
        self.values.push(EnumValueDef {
            name: name.into(),
            number,
        });
        self
    }
}

/// One named value of an enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValueDef {
    pub name: String,
    pub number: i32,
}

// ── Resolved schema ─────────────────────────────────────────────

/// Field type with nested types resolved to schema indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KindRef {
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float,
    Double,
    Bool,
    String,
    Bytes,
    Enum(usize),
    Message(usize),
}

impl KindRef {
    fn scalar(type_name: &str) -> Option<Self> {
        Some(match type_name {
            "int32" => KindRef::Int32,
            "int64" => KindRef::Int64,
            "uint32" => KindRef::UInt32,
            "uint64" => KindRef::UInt64,
            "float" => KindRef::Float,
            "double" => KindRef::Double,
            "bool" => KindRef::Bool,
            "string" => KindRef::String,
            "bytes" => KindRef::Bytes,
            _ => return None,
        })
    }
}

#[derive(Debug)]
pub(crate) struct FieldEntry {
    name: String,
    number: u32,
    label: Label,
    kind: KindRef,
    oneof: Option<usize>,
    default: Option<Value>,
}

#[derive(Debug)]
struct MessageType {
    name: String,
    fields: Vec<FieldEntry>,
    oneofs: Vec<String>,
}

#[derive(Debug)]
pub(crate) struct EnumType {
    pub(crate) name: String,
    pub(crate) values: Vec<EnumValueDef>,
}

#[derive(Debug)]
struct SchemaInner {
    messages: Vec<MessageType>,
    enums: Vec<EnumType>,
    message_index: BTreeMap<String, usize>,
    enum_index: BTreeMap<String, usize>,
}

/// A validated, shareable set of message and enum types.
#[derive(Clone)]
pub struct Schema {
    inner: Arc<SchemaInner>,
}

impl Schema {
    /// Validate `def` and resolve all type references.
    pub fn new(def: SchemaDef) -> Result<Self, SchemaError> {
        let mut enum_index = BTreeMap::new();
        let mut message_index = BTreeMap::new();

        for (i, e) in def.enums.iter().enumerate() {
            if enum_index.insert(e.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateType(e.name.clone()));
            }
        }
        for (i, m) in def.messages.iter().enumerate() {
            if enum_index.contains_key(&m.name) || message_index.insert(m.name.clone(), i).is_some()
            {
                return Err(SchemaError::DuplicateType(m.name.clone()));
            }
        }

        let mut enums = Vec::with_capacity(def.enums.len());
        for e in def.enums {
            if e.values.is_empty() {
                return Err(SchemaError::EmptyEnum(e.name));
            }
            let mut seen = BTreeSet::new();
            for v in &e.values {
                if !seen.insert(v.name.as_str()) {
                    return Err(SchemaError::DuplicateEnumValue {
                        enumeration: e.name.clone(),
                        value: v.name.clone(),
                    });
                }
            }
            enums.push(EnumType {
                name: e.name,
                values: e.values,
            });
        }

        let mut messages = Vec::with_capacity(def.messages.len());
        for m in def.messages {
            messages.push(resolve_message(m, &message_index, &enum_index, &enums)?);
        }

        Ok(Self {
            inner: Arc::new(SchemaInner {
                messages,
                enums,
                message_index,
                enum_index,
            }),
        })
    }

    /// Look up a message type by name.
    pub fn message(&self, name: &str) -> Option<MessageDescriptor> {
        self.inner
            .message_index
            .get(name)
            .map(|&index| MessageDescriptor {
                schema: self.clone(),
                index,
            })
    }

    /// Look up an enum type by name.
    pub fn enumeration(&self, name: &str) -> Option<EnumDescriptor> {
        self.inner.enum_index.get(name).map(|&index| EnumDescriptor {
            schema: self.clone(),
            index,
        })
    }

    /// All message types, in declaration order.
    pub fn messages(&self) -> impl Iterator<Item = MessageDescriptor> + '_ {
        (0..self.inner.messages.len()).map(move |index| MessageDescriptor {
            schema: self.clone(),
            index,
        })
    }

    pub(crate) fn enum_types(&self) -> &[EnumType] {
        &self.inner.enums
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Schema {}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("messages", &self.inner.message_index.keys().collect::<Vec<_>>())
            .field("enums", &self.inner.enum_index.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn resolve_message(
    def: MessageDef,
    message_index: &BTreeMap<String, usize>,
    enum_index: &BTreeMap<String, usize>,
    enums: &[EnumType],
) -> Result<MessageType, SchemaError> {
    let mut numbers = BTreeSet::new();
    let mut names = BTreeSet::new();
    let mut oneofs: Vec<String> = Vec::new();
    let mut fields = Vec::with_capacity(def.fields.len());

    for f in def.fields {
        if f.number == 0 {
            return Err(SchemaError::ZeroFieldNumber {
                message: def.name.clone(),
                field: f.name,
            });
        }
        if !numbers.insert(f.number) {
            return Err(SchemaError::DuplicateFieldNumber {
                message: def.name.clone(),
                number: f.number,
            });
        }
        if !names.insert(f.name.clone()) {
            return Err(SchemaError::DuplicateFieldName {
                message: def.name.clone(),
                field: f.name,
            });
        }

        let kind = KindRef::scalar(&f.type_name)
            .or_else(|| enum_index.get(&f.type_name).map(|&i| KindRef::Enum(i)))
            .or_else(|| message_index.get(&f.type_name).map(|&i| KindRef::Message(i)))
            .ok_or_else(|| SchemaError::UnknownType {
                message: def.name.clone(),
                field: f.name.clone(),
                type_name: f.type_name.clone(),
            })?;

        let oneof = match f.oneof {
            Some(group) => {
                if f.label != Label::Optional {
                    return Err(SchemaError::InvalidOneofMember {
                        message: def.name.clone(),
                        field: f.name,
                    });
                }
                let index = match oneofs.iter().position(|g| *g == group) {
                    Some(index) => index,
                    None => {
                        oneofs.push(group);
                        oneofs.len() - 1
                    }
                };
                Some(index)
            }
            None => None,
        };

        let default = match f.default {
            Some(json_default) => {
                let invalid = |reason: &str| SchemaError::InvalidDefault {
                    message: def.name.clone(),
                    field: f.name.clone(),
                    reason: reason.to_string(),
                };
                if f.label == Label::Repeated {
                    return Err(invalid("repeated fields cannot declare a default"));
                }
                if matches!(kind, KindRef::Message(_)) {
                    return Err(invalid("message fields cannot declare a default"));
                }
                let value = json::parse_scalar(kind, &json_default, enums, false)
                    .ok_or_else(|| invalid("value does not match the field type"))?;
                Some(value)
            }
            None => None,
        };

        fields.push(FieldEntry {
            name: f.name,
            number: f.number,
            label: f.label,
            kind,
            oneof,
            default,
        });
    }

    Ok(MessageType {
        name: def.name,
        fields,
        oneofs,
    })
}

// ── Handles ─────────────────────────────────────────────────────

/// Handle to a message type.
#[derive(Clone, PartialEq, Eq)]
pub struct MessageDescriptor {
    schema: Schema,
    index: usize,
}

impl MessageDescriptor {
    fn ty(&self) -> &MessageType {
        &self.schema.inner.messages[self.index]
    }

    /// Type name; unique within the schema and stable across runs.
    pub fn name(&self) -> &str {
        &self.ty().name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        (0..self.ty().fields.len()).map(move |index| FieldDescriptor {
            message: self.clone(),
            index,
        })
    }

    /// Look up a field by number.
    pub fn field(&self, number: u32) -> Option<FieldDescriptor> {
        self.ty()
            .fields
            .iter()
            .position(|f| f.number == number)
            .map(|index| FieldDescriptor {
                message: self.clone(),
                index,
            })
    }

    /// Look up a field by name.
    pub fn field_by_name(&self, name: &str) -> Option<FieldDescriptor> {
        self.ty()
            .fields
            .iter()
            .position(|f| f.name == name)
            .map(|index| FieldDescriptor {
                message: self.clone(),
                index,
            })
    }

    /// Names of the oneof groups declared by this message.
    pub fn oneofs(&self) -> &[String] {
        &self.ty().oneofs
    }
}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageDescriptor({})", self.name())
    }
}

/// Handle to one field of a message type.
#[derive(Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    message: MessageDescriptor,
    index: usize,
}

impl FieldDescriptor {
    fn entry(&self) -> &FieldEntry {
        &self.message.ty().fields[self.index]
    }

    pub fn name(&self) -> &str {
        &self.entry().name
    }

    pub fn number(&self) -> u32 {
        self.entry().number
    }

    pub fn label(&self) -> Label {
        self.entry().label
    }

    pub fn is_required(&self) -> bool {
        self.label() == Label::Required
    }

    pub fn is_repeated(&self) -> bool {
        self.label() == Label::Repeated
    }

    /// The message type this field is declared in.
    pub fn containing_message(&self) -> &MessageDescriptor {
        &self.message
    }

    pub(crate) fn kind_ref(&self) -> KindRef {
        self.entry().kind
    }

    /// The field's type, with nested types resolved to descriptors.
    pub fn kind(&self) -> Kind {
        let schema = self.message.schema.clone();
        match self.entry().kind {
            KindRef::Int32 => Kind::Int32,
            KindRef::Int64 => Kind::Int64,
            KindRef::UInt32 => Kind::UInt32,
            KindRef::UInt64 => Kind::UInt64,
            KindRef::Float => Kind::Float,
            KindRef::Double => Kind::Double,
            KindRef::Bool => Kind::Bool,
            KindRef::String => Kind::String,
            KindRef::Bytes => Kind::Bytes,
            KindRef::Enum(index) => Kind::Enum(EnumDescriptor { schema, index }),
            KindRef::Message(index) => Kind::Message(MessageDescriptor { schema, index }),
        }
    }

    pub fn is_message(&self) -> bool {
        matches!(self.entry().kind, KindRef::Message(_))
    }

    /// Index of the oneof group this field belongs to, if any.
    pub fn oneof_index(&self) -> Option<usize> {
        self.entry().oneof
    }

    pub fn oneof_name(&self) -> Option<&str> {
        self.entry()
            .oneof
            .map(|i| self.message.ty().oneofs[i].as_str())
    }

    /// Whether the schema declares an explicit default for this field.
    pub fn has_declared_default(&self) -> bool {
        self.entry().default.is_some()
    }

    /// The default value of a single element of this field: the declared
    /// default if any, otherwise the kind's zero value.
    pub fn default_value(&self) -> Value {
        match &self.entry().default {
            Some(value) => value.clone(),
            None => self.kind().zero_value(),
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FieldDescriptor({}.{} = {})",
            self.message.name(),
            self.name(),
            self.number()
        )
    }
}

/// Handle to an enum type.
#[derive(Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    schema: Schema,
    index: usize,
}

impl EnumDescriptor {
    fn ty(&self) -> &EnumType {
        &self.schema.inner.enums[self.index]
    }

    pub fn name(&self) -> &str {
        &self.ty().name
    }

    /// Declared values, in declaration order.
    pub fn values(&self) -> &[EnumValueDef] {
        &self.ty().values
    }

    /// Position of the first value with the given number.
    pub fn index_of(&self, number: i32) -> Option<usize> {
        self.values().iter().position(|v| v.number == number)
    }
}

impl fmt::Debug for EnumDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnumDescriptor({})", self.name())
    }
}

/// Resolved field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float,
    Double,
    Bool,
    String,
    Bytes,
    Enum(EnumDescriptor),
    Message(MessageDescriptor),
}

impl Kind {
    /// Zero value: `0`, `false`, empty string/bytes, the first declared
    /// enum value, or an empty message.
    pub fn zero_value(&self) -> Value {
        match self {
            Kind::Int32 => Value::I32(0),
            Kind::Int64 => Value::I64(0),
            Kind::UInt32 => Value::U32(0),
            Kind::UInt64 => Value::U64(0),
            Kind::Float => Value::F32(0.0),
            Kind::Double => Value::F64(0.0),
            Kind::Bool => Value::Bool(false),
            Kind::String => Value::String(String::new()),
            Kind::Bytes => Value::Bytes(Vec::new()),
            Kind::Enum(e) => Value::EnumNumber(e.values().first().map_or(0, |v| v.number)),
            Kind::Message(m) => Value::Message(DynamicMessage::new(m.clone())),
        }
    }

    pub fn as_message(&self) -> Option<&MessageDescriptor> {
        match self {
            Kind::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumDescriptor> {
        match self {
            Kind::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Human-readable type name used in error messages.
    pub fn type_name(&self) -> String {
        match self {
            Kind::Int32 => "int32".to_string(),
            Kind::Int64 => "int64".to_string(),
            Kind::UInt32 => "uint32".to_string(),
            Kind::UInt64 => "uint64".to_string(),
            Kind::Float => "float".to_string(),
            Kind::Double => "double".to_string(),
            Kind::Bool => "bool".to_string(),
            Kind::String => "string".to_string(),
            Kind::Bytes => "bytes".to_string(),
            Kind::Enum(e) => format!("enum {}", e.name()),
            Kind::Message(m) => format!("message {}", m.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn color() -> EnumDef {
        EnumDef::new("Color").value("RED", 0).value("GREEN", 5)
    }

    #[test]
    fn test_build_recursive_schema() {
        let schema = SchemaDef::new()
            .message(
                MessageDef::new("Node")
                    .field(FieldDef::required("x", 1, "int32"))
                    .field(FieldDef::optional("child", 2, "Node")),
            )
            .build()
            .unwrap();

        let node = schema.message("Node").unwrap();
        let child = node.field(2).unwrap();
        assert_eq!(child.kind(), Kind::Message(node.clone()));
        assert!(node.field_by_name("x").unwrap().is_required());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = SchemaDef::new()
            .message(MessageDef::new("A").field(FieldDef::optional("b", 1, "Missing")))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType { .. }));
    }

    #[test]
    fn test_duplicate_field_number_rejected() {
        let err = SchemaDef::new()
            .message(
                MessageDef::new("A")
                    .field(FieldDef::optional("a", 1, "int32"))
                    .field(FieldDef::optional("b", 1, "int64")),
            )
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateFieldNumber {
                message: "A".to_string(),
                number: 1
            }
        );
    }

    #[test]
    fn test_duplicate_type_across_namespaces() {
        let err = SchemaDef::new()
            .enumeration(color())
            .message(MessageDef::new("Color"))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateType("Color".to_string()));
    }

    #[test]
    fn test_empty_enum_rejected() {
        let err = SchemaDef::new()
            .enumeration(EnumDef::new("Nothing"))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::EmptyEnum("Nothing".to_string()));
    }

    #[test]
    fn test_required_oneof_member_rejected() {
        let err = SchemaDef::new()
            .message(MessageDef::new("A").field(FieldDef::required("a", 1, "int32").in_oneof("g")))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidOneofMember { .. }));
    }

    #[test]
    fn test_oneof_groups_indexed_in_order() {
        let schema = SchemaDef::new()
            .message(
                MessageDef::new("A")
                    .field(FieldDef::optional("a", 1, "int32").in_oneof("first"))
                    .field(FieldDef::optional("b", 2, "string").in_oneof("second"))
                    .field(FieldDef::optional("c", 3, "bool").in_oneof("first")),
            )
            .build()
            .unwrap();
        let a = schema.message("A").unwrap();
        assert_eq!(a.oneofs(), &["first".to_string(), "second".to_string()]);
        assert_eq!(a.field(3).unwrap().oneof_index(), Some(0));
        assert_eq!(a.field(2).unwrap().oneof_name(), Some("second"));
    }

    #[test]
    fn test_declared_defaults() {
        let schema = SchemaDef::new()
            .enumeration(color())
            .message(
                MessageDef::new("A")
                    .field(FieldDef::optional("n", 1, "int32").with_default(json!(-7)))
                    .field(FieldDef::optional("c", 2, "Color").with_default(json!("GREEN")))
                    .field(FieldDef::optional("s", 3, "string")),
            )
            .build()
            .unwrap();
        let a = schema.message("A").unwrap();
        assert_eq!(a.field(1).unwrap().default_value(), Value::I32(-7));
        assert_eq!(a.field(2).unwrap().default_value(), Value::EnumNumber(5));
        assert_eq!(a.field(3).unwrap().default_value(), Value::String(String::new()));
        assert!(!a.field(3).unwrap().has_declared_default());
    }

    #[test]
    fn test_invalid_default_rejected() {
        let err = SchemaDef::new()
            .message(
                MessageDef::new("A")
                    .field(FieldDef::optional("n", 1, "uint32").with_default(json!(-1))),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDefault { .. }));
    }

    #[test]
    fn test_schema_def_from_json() {
        let def: SchemaDef = serde_json::from_value(json!({
            "enums": [{"name": "E", "values": [{"name": "A", "number": 0}]}],
            "messages": [{
                "name": "M",
                "fields": [
                    {"name": "e", "number": 1, "type": "E", "label": "required"},
                    {"name": "items", "number": 2, "type": "bytes", "label": "repeated"}
                ]
            }]
        }))
        .unwrap();
        let schema = def.build().unwrap();
        let m = schema.message("M").unwrap();
        assert_eq!(m.field(1).unwrap().label(), Label::Required);
        assert!(m.field(2).unwrap().is_repeated());
        assert_eq!(
            m.field(1).unwrap().kind(),
            Kind::Enum(schema.enumeration("E").unwrap())
        );
    }

    #[test]
    fn test_descriptors_from_different_schemas_differ() {
        let build = || {
            SchemaDef::new()
                .message(MessageDef::new("A"))
                .build()
                .unwrap()
        };
        let a1 = build().message("A").unwrap();
        let a2 = build().message("A").unwrap();
        assert_ne!(a1, a2);
        assert_eq!(a1, a1.schema().message("A").unwrap());
    }
}
