//! Schemas and assertions shared by the unit tests.

use protomut_schema::{
    DynamicMessage, EnumDef, FieldDef, MessageDef, Schema, SchemaDef, Value,
};
use serde_json::json;

/// `Node { required int32 x = 1; optional Node child = 2; }`
pub(crate) fn recursive_node() -> Schema {
    SchemaDef::new()
        .message(
            MessageDef::new("Node")
                .field(FieldDef::required("x", 1, "int32"))
                .field(FieldDef::optional("child", 2, "Node")),
        )
        .build()
        .unwrap()
}

/// Build a `Node` chain from the outermost `x` inwards.
pub(crate) fn node_chain(schema: &Schema, xs: &[i32]) -> DynamicMessage {
    let desc = schema.message("Node").unwrap();
    let x = desc.field_by_name("x").unwrap();
    let child = desc.field_by_name("child").unwrap();
    let mut inner: Option<DynamicMessage> = None;
    for value in xs.iter().rev() {
        let mut node = DynamicMessage::new(desc.clone());
        node.set(&x, Value::I32(*value)).unwrap();
        if let Some(nested) = inner.take() {
            node.set(&child, Value::Message(nested)).unwrap();
        }
        inner = Some(node);
    }
    inner.unwrap_or_else(|| DynamicMessage::new(desc))
}

/// A schema touching every kind, label and oneof rule, with mutual
/// recursion between `Everything` and `Item`.
pub(crate) fn everything() -> Schema {
    SchemaDef::new()
        .enumeration(
            EnumDef::new("Color")
                .value("RED", 0)
                .value("GREEN", 5)
                .value("BLUE", -3),
        )
        .enumeration(EnumDef::new("Lonely").value("ONLY", 7))
        .message(
            MessageDef::new("Item")
                .field(FieldDef::required("label", 1, "string"))
                .field(FieldDef::optional("data", 2, "bytes"))
                .field(FieldDef::optional("parent", 3, "Everything")),
        )
        .message(
            MessageDef::new("Everything")
                .field(FieldDef::optional("count", 1, "int32").with_default(json!(42)))
                .field(FieldDef::optional("big", 2, "int64"))
                .field(FieldDef::optional("small", 3, "uint32"))
                .field(FieldDef::optional("huge", 4, "uint64"))
                .field(FieldDef::optional("ratio", 5, "float"))
                .field(FieldDef::optional("precise", 6, "double"))
                .field(FieldDef::optional("flag", 7, "bool"))
                .field(FieldDef::optional("text", 8, "string"))
                .field(FieldDef::optional("blob", 9, "bytes"))
                .field(FieldDef::optional("color", 10, "Color"))
                .field(FieldDef::optional("lonely", 11, "Lonely"))
                .field(FieldDef::repeated("numbers", 12, "int32"))
                .field(FieldDef::repeated("tags", 13, "string"))
                .field(FieldDef::repeated("items", 14, "Item"))
                .field(FieldDef::required("header", 15, "Item"))
                .field(FieldDef::optional("id", 16, "int64").in_oneof("choice"))
                .field(FieldDef::optional("name", 17, "string").in_oneof("choice"))
                .field(FieldDef::optional("picked", 18, "Item").in_oneof("choice"))
                .field(FieldDef::optional("next", 19, "Everything")),
        )
        .build()
        .unwrap()
}

/// `B { required int32 y = 1; }` and
/// `A { required B b = 1; optional A next = 2; }`
pub(crate) fn required_pair() -> Schema {
    SchemaDef::new()
        .message(MessageDef::new("B").field(FieldDef::required("y", 1, "int32")))
        .message(
            MessageDef::new("A")
                .field(FieldDef::required("b", 1, "B"))
                .field(FieldDef::optional("next", 2, "A")),
        )
        .build()
        .unwrap()
}

/// Whether nesting stays within `max_depth`, apart from required message
/// fields on nodes at the bound, whose children hold no message fields.
pub(crate) fn within_depth_bound(message: &DynamicMessage, max_depth: usize) -> bool {
    fn check(message: &DynamicMessage, depth: usize, max_depth: usize) -> bool {
        message.set_fields().all(|(field, value)| {
            value.messages().all(|child| {
                if depth < max_depth {
                    check(child, depth + 1, max_depth)
                } else {
                    depth == max_depth
                        && field.is_required()
                        && child.set_fields().all(|(nested, _)| !nested.is_message())
                }
            })
        })
    }
    check(message, 0, max_depth)
}

/// Whether every oneof group in the tree has at most one member set.
pub(crate) fn oneofs_exclusive(message: &DynamicMessage) -> bool {
    let descriptor = message.descriptor();
    let groups_ok = (0..descriptor.oneofs().len()).all(|group| {
        descriptor
            .fields()
            .filter(|field| field.oneof_index() == Some(group) && message.has(field))
            .count()
            <= 1
    });
    groups_ok
        && message
            .set_fields()
            .all(|(_, value)| value.messages().all(oneofs_exclusive))
}

/// Whether every value in the tree is valid for its field.
pub(crate) fn well_typed(message: &DynamicMessage) -> bool {
    message.set_fields().all(|(field, value)| {
        value.is_valid_for_field(&field) && value.messages().all(well_typed)
    })
}
