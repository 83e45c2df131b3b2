//! JSON mapping for dynamic messages and declared defaults.
//!
//! Fields are keyed by name.  64-bit integers are plain JSON numbers (string
//! forms are accepted on input), non-finite floats are the strings `"NaN"`,
//! `"Infinity"` and `"-Infinity"`, bytes are lowercase hex, and enum values
//! are written by name when the number is declared.

use crate::descriptor::{EnumType, EnumValueDef, FieldDescriptor, Kind, KindRef, MessageDescriptor};
use crate::error::SchemaError;
use crate::message::DynamicMessage;
use crate::value::Value;
use serde_json::{Map, Number, Value as Json};
use std::str::FromStr;

impl DynamicMessage {
    /// Render this message as a JSON object.
    pub fn to_json(&self) -> Json {
        let mut object = Map::new();
        for (field, value) in self.set_fields() {
            let kind = field.kind();
            let enum_values = kind.as_enum().map(|e| e.values());
            object.insert(field.name().to_string(), render_value(value, enum_values));
        }
        Json::Object(object)
    }

    /// Parse a JSON object into an instance of `descriptor`.
    ///
    /// `null` field values are skipped.  Unknown field names are rejected.
    pub fn from_json(descriptor: &MessageDescriptor, json: &Json) -> Result<Self, SchemaError> {
        let object = json.as_object().ok_or_else(|| SchemaError::InvalidJson {
            message: descriptor.name().to_string(),
            field: String::new(),
            reason: "expected a JSON object".to_string(),
        })?;

        let mut message = DynamicMessage::new(descriptor.clone());
        for (name, field_json) in object {
            let field =
                descriptor
                    .field_by_name(name)
                    .ok_or_else(|| SchemaError::UnknownField {
                        message: descriptor.name().to_string(),
                        field: name.clone(),
                    })?;
            if field_json.is_null() {
                continue;
            }
            let value = if field.is_repeated() {
                let items = field_json
                    .as_array()
                    .ok_or_else(|| invalid(&field, "expected a JSON array"))?;
                Value::List(
                    items
                        .iter()
                        .map(|item| element_from_json(&field, item))
                        .collect::<Result<_, _>>()?,
                )
            } else {
                element_from_json(&field, field_json)?
            };
            message.set(&field, value)?;
        }
        Ok(message)
    }
}

fn invalid(field: &FieldDescriptor, reason: &str) -> SchemaError {
    SchemaError::InvalidJson {
        message: field.containing_message().name().to_string(),
        field: field.name().to_string(),
        reason: reason.to_string(),
    }
}

fn element_from_json(field: &FieldDescriptor, json: &Json) -> Result<Value, SchemaError> {
    match field.kind() {
        Kind::Message(nested) => DynamicMessage::from_json(&nested, json).map(Value::Message),
        kind => {
            let enums = field.containing_message().schema().enum_types();
            parse_scalar(field.kind_ref(), json, enums, true)
                .ok_or_else(|| invalid(field, &format!("expected {}", kind.type_name())))
        }
    }
}

/// Parse a non-message value of `kind`.
///
/// With `open_enums`, enum numbers that are not declared are accepted (as
/// when decoding data from a newer schema); declared defaults must name a
/// declared value.
pub(crate) fn parse_scalar(
    kind: KindRef,
    json: &Json,
    enums: &[EnumType],
    open_enums: bool,
) -> Option<Value> {
    match kind {
        KindRef::Int32 => parse_integer(json).map(Value::I32),
        KindRef::Int64 => parse_integer(json).map(Value::I64),
        KindRef::UInt32 => parse_integer(json).map(Value::U32),
        KindRef::UInt64 => parse_integer(json).map(Value::U64),
        KindRef::Float => parse_float(json).map(|v| Value::F32(v as f32)),
        KindRef::Double => parse_float(json).map(Value::F64),
        KindRef::Bool => json.as_bool().map(Value::Bool),
        KindRef::String => json.as_str().map(|s| Value::String(s.to_string())),
        KindRef::Bytes => json
            .as_str()
            .and_then(|s| hex::decode(s).ok())
            .map(Value::Bytes),
        KindRef::Enum(index) => {
            let values = &enums.get(index)?.values;
            let number = match json {
                Json::String(name) => values.iter().find(|v| v.name == *name)?.number,
                _ => {
                    let number: i32 = parse_integer(json)?;
                    if !open_enums && !values.iter().any(|v| v.number == number) {
                        return None;
                    }
                    number
                }
            };
            Some(Value::EnumNumber(number))
        }
        KindRef::Message(_) => None,
    }
}

fn parse_integer<T>(json: &Json) -> Option<T>
where
    T: TryFrom<i64> + TryFrom<u64> + FromStr,
{
    match json {
        Json::Number(n) => {
            if let Some(v) = n.as_i64() {
                <T as TryFrom<i64>>::try_from(v).ok()
            } else {
                n.as_u64().and_then(|v| <T as TryFrom<u64>>::try_from(v).ok())
            }
        }
        Json::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn parse_float(json: &Json) -> Option<f64> {
    match json {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => match s.as_str() {
            "NaN" => Some(f64::NAN),
            "Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            other => other.parse().ok(),
        },
        _ => None,
    }
}

fn render_value(value: &Value, enum_values: Option<&[EnumValueDef]>) -> Json {
    match value {
        Value::I32(v) => Json::from(*v),
        Value::I64(v) => Json::from(*v),
        Value::U32(v) => Json::from(*v),
        Value::U64(v) => Json::from(*v),
        Value::F32(v) => render_float(f64::from(*v)),
        Value::F64(v) => render_float(*v),
        Value::Bool(v) => Json::Bool(*v),
        Value::String(s) => Json::String(s.clone()),
        Value::Bytes(b) => Json::String(hex::encode(b)),
        Value::EnumNumber(n) => enum_values
            .and_then(|values| values.iter().find(|v| v.number == *n))
            .map(|v| Json::String(v.name.clone()))
            .unwrap_or_else(|| Json::from(*n)),
        Value::Message(m) => m.to_json(),
        Value::List(items) => Json::Array(
            items
                .iter()
                .map(|item| render_value(item, enum_values))
                .collect(),
        ),
    }
}

fn render_float(v: f64) -> Json {
    if v.is_nan() {
        Json::String("NaN".to_string())
    } else if v == f64::INFINITY {
        Json::String("Infinity".to_string())
    } else if v == f64::NEG_INFINITY {
        Json::String("-Infinity".to_string())
    } else {
        Number::from_f64(v).map_or(Json::Null, Json::Number)
    }
}

#[cfg(test)]
mod tests {
    use crate::descriptor::{EnumDef, FieldDef, MessageDef, Schema, SchemaDef};
    use crate::error::SchemaError;
    use crate::message::DynamicMessage;
    use crate::value::Value;
    use serde_json::json;

    fn schema() -> Schema {
        SchemaDef::new()
            .enumeration(EnumDef::new("Mode").value("OFF", 0).value("ON", 1))
            .message(
                MessageDef::new("Everything")
                    .field(FieldDef::optional("i32", 1, "int32"))
                    .field(FieldDef::optional("i64", 2, "int64"))
                    .field(FieldDef::optional("u32", 3, "uint32"))
                    .field(FieldDef::optional("u64", 4, "uint64"))
                    .field(FieldDef::optional("f32", 5, "float"))
                    .field(FieldDef::optional("f64", 6, "double"))
                    .field(FieldDef::optional("flag", 7, "bool"))
                    .field(FieldDef::optional("text", 8, "string"))
                    .field(FieldDef::optional("blob", 9, "bytes"))
                    .field(FieldDef::optional("mode", 10, "Mode"))
                    .field(FieldDef::optional("child", 11, "Everything"))
                    .field(FieldDef::repeated("list", 12, "uint32")),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_json_round_trip_preserves_message() {
        let schema = schema();
        let desc = schema.message("Everything").unwrap();
        let input = json!({
            "i32": -5,
            "i64": "-9223372036854775808",
            "u32": 4294967295u32,
            "u64": 18446744073709551615u64,
            "f32": 1.5,
            "f64": "NaN",
            "flag": true,
            "text": "héllo",
            "blob": "00ff10",
            "mode": "ON",
            "child": {"mode": 7},
            "list": [1, 2, 3]
        });

        let msg = DynamicMessage::from_json(&desc, &input).unwrap();
        let field = |name: &str| desc.field_by_name(name).unwrap();
        assert_eq!(msg.get(&field("i64")), Some(&Value::I64(i64::MIN)));
        assert_eq!(msg.get(&field("u64")), Some(&Value::U64(u64::MAX)));
        assert_eq!(msg.get(&field("blob")), Some(&Value::Bytes(vec![0, 0xff, 0x10])));
        assert_eq!(msg.get(&field("mode")), Some(&Value::EnumNumber(1)));
        assert_eq!(msg.field_len(&field("list")), 3);

        let rendered = msg.to_json();
        assert_eq!(rendered["f64"], json!("NaN"));
        assert_eq!(rendered["mode"], json!("ON"));
        assert_eq!(rendered["child"]["mode"], json!(7));
        assert_eq!(rendered["i64"], json!(i64::MIN));

        let again = DynamicMessage::from_json(&desc, &rendered).unwrap();
        assert_eq!(again, msg);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let schema = schema();
        let desc = schema.message("Everything").unwrap();
        let err = DynamicMessage::from_json(&desc, &json!({"nope": 1})).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownField { .. }));
    }

    #[test]
    fn test_out_of_range_integer_rejected() {
        let schema = schema();
        let desc = schema.message("Everything").unwrap();
        let err = DynamicMessage::from_json(&desc, &json!({"i32": 1u64 << 40})).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidJson { .. }));
    }

    #[test]
    fn test_null_fields_skipped() {
        let schema = schema();
        let desc = schema.message("Everything").unwrap();
        let msg = DynamicMessage::from_json(&desc, &json!({"text": null})).unwrap();
        assert!(msg.is_empty());
    }
}
