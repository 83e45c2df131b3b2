//! Dynamic (reflection-driven) message instances.

use crate::descriptor::{FieldDescriptor, MessageDescriptor};
use crate::error::SchemaError;
use crate::value::Value;
use std::collections::BTreeMap;

/// A message instance whose shape is only known through its descriptor.
///
/// Field values are keyed by field number.  A repeated field is stored as
/// [`Value::List`]; an empty list is treated as unset and never stored.
/// Setting a member of a oneof group clears the other members.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicMessage {
    descriptor: MessageDescriptor,
    fields: BTreeMap<u32, Value>,
}

impl DynamicMessage {
    /// Create an empty instance of `descriptor`.
    pub fn new(descriptor: MessageDescriptor) -> Self {
        Self {
            descriptor,
            fields: BTreeMap::new(),
        }
    }

    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.descriptor
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether `field` holds a value (a non-empty list for repeated fields).
    pub fn has(&self, field: &FieldDescriptor) -> bool {
        match self.get(field) {
            Some(Value::List(items)) => !items.is_empty(),
            Some(_) => true,
            None => false,
        }
    }

    pub fn get(&self, field: &FieldDescriptor) -> Option<&Value> {
        if !self.owns(field) {
            return None;
        }
        self.fields.get(&field.number())
    }

    pub fn get_mut(&mut self, field: &FieldDescriptor) -> Option<&mut Value> {
        if !self.owns(field) {
            return None;
        }
        self.fields.get_mut(&field.number())
    }

    /// Store `value` in `field`, replacing any previous value.
    ///
    /// Repeated fields take a [`Value::List`].  Setting a oneof member
    /// clears its siblings.
    pub fn set(&mut self, field: &FieldDescriptor, value: Value) -> Result<(), SchemaError> {
        self.check_owned(field)?;
        if !value.is_valid_for_field(field) {
            return Err(SchemaError::TypeMismatch {
                field: field.name().to_string(),
                expected: expected_name(field),
                got: value.type_name(),
            });
        }
        if matches!(&value, Value::List(items) if items.is_empty()) {
            self.fields.remove(&field.number());
            return Ok(());
        }
        self.clear_oneof_siblings(field);
        self.fields.insert(field.number(), value);
        Ok(())
    }

    /// Unset `field`, returning the previous value.
    pub fn clear(&mut self, field: &FieldDescriptor) -> Option<Value> {
        if !self.owns(field) {
            return None;
        }
        self.fields.remove(&field.number())
    }

    /// Number of values held: list length for repeated fields, 0 or 1
    /// otherwise.
    pub fn field_len(&self, field: &FieldDescriptor) -> usize {
        match self.get(field) {
            Some(Value::List(items)) => items.len(),
            Some(_) => 1,
            None => 0,
        }
    }

    /// Element `index` of a repeated field.
    pub fn get_at(&self, field: &FieldDescriptor, index: usize) -> Option<&Value> {
        self.get(field)?.as_list()?.get(index)
    }

    pub fn get_at_mut(&mut self, field: &FieldDescriptor, index: usize) -> Option<&mut Value> {
        self.get_mut(field)?.as_list_mut()?.get_mut(index)
    }

    /// Append one element to a repeated field.
    pub fn push(&mut self, field: &FieldDescriptor, value: Value) -> Result<(), SchemaError> {
        self.check_owned(field)?;
        if !field.is_repeated() {
            return Err(SchemaError::NotRepeated(field.name().to_string()));
        }
        let kind = field.kind();
        if !value.is_valid_for(&kind) {
            return Err(SchemaError::TypeMismatch {
                field: field.name().to_string(),
                expected: kind.type_name(),
                got: value.type_name(),
            });
        }
        match self
            .fields
            .entry(field.number())
            .or_insert_with(|| Value::List(Vec::new()))
        {
            Value::List(items) => items.push(value),
            other => *other = Value::List(vec![value]),
        }
        Ok(())
    }

    /// Remove element `index` of a repeated field.
    pub fn remove_at(&mut self, field: &FieldDescriptor, index: usize) -> Option<Value> {
        let items = self.get_mut(field)?.as_list_mut()?;
        if index >= items.len() {
            return None;
        }
        let removed = items.remove(index);
        if items.is_empty() {
            self.fields.remove(&field.number());
        }
        Some(removed)
    }

    /// The sub-message held by a singular message field, created empty if
    /// unset.
    pub fn get_or_insert_message(
        &mut self,
        field: &FieldDescriptor,
    ) -> Result<&mut DynamicMessage, SchemaError> {
        self.check_owned(field)?;
        let nested = match field.kind().as_message() {
            Some(nested) if !field.is_repeated() => nested.clone(),
            _ => return Err(SchemaError::NotSingularMessage(field.name().to_string())),
        };
        if !self.fields.contains_key(&field.number()) {
            self.clear_oneof_siblings(field);
        }
        let slot = self
            .fields
            .entry(field.number())
            .or_insert_with(|| Value::Message(DynamicMessage::new(nested.clone())));
        if !matches!(slot, Value::Message(_)) {
            *slot = Value::Message(DynamicMessage::new(nested));
        }
        match slot {
            Value::Message(m) => Ok(m),
            _ => Err(SchemaError::NotSingularMessage(field.name().to_string())),
        }
    }

    /// Set fields with their values, in declaration order.
    pub fn set_fields(&self) -> impl Iterator<Item = (FieldDescriptor, &Value)> + '_ {
        self.descriptor
            .fields()
            .filter_map(move |field| self.fields.get(&field.number()).map(|v| (field, v)))
    }

    /// Deepest message nesting level in this tree; a message without
    /// message-typed values has depth 0.
    pub fn depth(&self) -> usize {
        self.fields
            .values()
            .flat_map(Value::messages)
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Whether every required field is set, transitively.
    pub fn is_initialized(&self) -> bool {
        self.descriptor
            .fields()
            .all(|field| !field.is_required() || self.has(&field))
            && self
                .fields
                .values()
                .flat_map(Value::messages)
                .all(DynamicMessage::is_initialized)
    }

    /// Dotted paths of unset required fields, e.g. `child.items[2].x`.
    pub fn missing_required(&self) -> Vec<String> {
        let mut missing = Vec::new();
        self.collect_missing("", &mut missing);
        missing
    }

    fn collect_missing(&self, prefix: &str, missing: &mut Vec<String>) {
        for field in self.descriptor.fields() {
            let path = if prefix.is_empty() {
                field.name().to_string()
            } else {
                format!("{}.{}", prefix, field.name())
            };
            match self.fields.get(&field.number()) {
                None if field.is_required() => missing.push(path),
                None => {}
                Some(Value::Message(m)) => m.collect_missing(&path, missing),
                Some(Value::List(items)) => {
                    for (i, item) in items.iter().enumerate() {
                        if let Value::Message(m) = item {
                            m.collect_missing(&format!("{}[{}]", path, i), missing);
                        }
                    }
                }
                Some(_) => {}
            }
        }
    }

    fn owns(&self, field: &FieldDescriptor) -> bool {
        field.containing_message() == &self.descriptor
    }

    fn check_owned(&self, field: &FieldDescriptor) -> Result<(), SchemaError> {
        if self.owns(field) {
            Ok(())
        } else {
            Err(SchemaError::ForeignField {
                message: self.descriptor.name().to_string(),
                field: field.name().to_string(),
            })
        }
    }

    fn clear_oneof_siblings(&mut self, field: &FieldDescriptor) {
        let Some(group) = field.oneof_index() else {
            return;
        };
        for sibling in self.descriptor.fields() {
            if sibling.oneof_index() == Some(group) && sibling.number() != field.number() {
                self.fields.remove(&sibling.number());
            }
        }
    }
}

fn expected_name(field: &FieldDescriptor) -> String {
    if field.is_repeated() {
        format!("list of {}", field.kind().type_name())
    } else {
        field.kind().type_name()
    }
}
