//! Depth trimming and required-field repair.
//!
//! Runs after every mutation and crossover.  Optional and repeated message
//! fields on nodes at the depth bound are cleared.  A required message field
//! on such a node is kept (or, with `keep_initialized`, created empty), so
//! it forms one overflow level below the bound.  An overflow node holds no
//! message fields at all, required or not, but its required scalars are
//! filled like anywhere else.  With `keep_initialized`, unset required
//! fields are filled children before parents.

use crate::factory::ValueFactory;
use crate::scalar::ScalarMutations;
use log::{trace, warn};
use protomut_schema::{DynamicMessage, FieldDescriptor, Value};

/// Size hint used when synthesizing values for required fields.
const FILL_SIZE_HINT: usize = 0;

/// Whether a node at `depth` may keep a value in message field `field`.
fn keeps_message_field(field: &FieldDescriptor, depth: usize, max_depth: usize) -> bool {
    depth < max_depth || (depth == max_depth && field.is_required())
}

pub(crate) fn initialize_and_trim<S: ScalarMutations + ?Sized>(
    message: &mut DynamicMessage,
    depth: usize,
    max_depth: usize,
    keep_initialized: bool,
    factory: &mut ValueFactory<'_, S>,
) {
    let descriptor = message.descriptor().clone();

    for field in descriptor.fields().filter(|field| field.is_message()) {
        if !keeps_message_field(&field, depth, max_depth) {
            if message.clear(&field).is_some() {
                trace!("trimmed {}.{} at depth {}", descriptor.name(), field.name(), depth);
            }
            continue;
        }
        if let Some(value) = message.get_mut(&field) {
            for child in value.messages_mut() {
                initialize_and_trim(child, depth + 1, max_depth, keep_initialized, factory);
            }
        }
    }

    if !keep_initialized {
        return;
    }
    for field in descriptor.fields() {
        if !field.is_required() || message.has(&field) {
            continue;
        }
        let value = match field.kind().as_message() {
            Some(nested) => {
                if !keeps_message_field(&field, depth, max_depth) {
                    continue;
                }
                let mut child = DynamicMessage::new(nested.clone());
                initialize_and_trim(&mut child, depth + 1, max_depth, keep_initialized, factory);
                Value::Message(child)
            }
            None => factory.create(&field, FILL_SIZE_HINT),
        };
        if let Err(err) = message.set(&field, value) {
            warn!("could not fill required {}.{}: {}", descriptor.name(), field.name(), err);
        }
    }
}

/// Whether every required field reachable within the depth bound is set.
/// Required message fields on overflow nodes are exempt.
pub(crate) fn is_initialized_within(message: &DynamicMessage, depth: usize, max_depth: usize) -> bool {
    message.descriptor().fields().all(|field| {
        if !field.is_required() || message.has(&field) {
            return true;
        }
        field.is_message() && !keeps_message_field(&field, depth, max_depth)
    }) && message.set_fields().all(|(field, value)| {
        !keeps_message_field(&field, depth, max_depth)
            || value
                .messages()
                .all(|child| is_initialized_within(child, depth + 1, max_depth))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::RandomEngine;
    use crate::scalar::DefaultMutations;
    use crate::testing;

    fn run(message: &mut DynamicMessage, max_depth: usize, keep_initialized: bool) {
        let mut random = RandomEngine::with_seed(1);
        let mut strategy = DefaultMutations;
        let mut factory = ValueFactory {
            random: &mut random,
            strategy: &mut strategy,
            random_to_default_ratio: 100,
        };
        initialize_and_trim(message, 0, max_depth, keep_initialized, &mut factory);
    }

    #[test]
    fn test_trims_beyond_max_depth() {
        let schema = testing::recursive_node();
        let mut root = testing::node_chain(&schema, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(root.depth(), 5);
        run(&mut root, 3, true);
        assert_eq!(root.depth(), 3);
        assert_eq!(root, testing::node_chain(&schema, &[1, 2, 3, 4]));
    }

    #[test]
    fn test_trims_even_without_keep_initialized() {
        let schema = testing::recursive_node();
        let mut root = testing::node_chain(&schema, &[1, 2, 3]);
        run(&mut root, 1, false);
        assert_eq!(root.depth(), 1);
    }

    #[test]
    fn test_fills_required_fields() {
        let schema = testing::everything();
        let desc = schema.message("Everything").unwrap();
        let mut root = DynamicMessage::new(desc.clone());
        assert!(!root.is_initialized());
        run(&mut root, 4, true);
        assert!(root.is_initialized());
        let header = root.get(&desc.field_by_name("header").unwrap()).unwrap();
        let label = header.as_message().unwrap().descriptor().field_by_name("label").unwrap();
        assert!(header.as_message().unwrap().has(&label));
    }

    #[test]
    fn test_no_fill_without_keep_initialized() {
        let schema = testing::recursive_node();
        let desc = schema.message("Node").unwrap();
        let mut root = DynamicMessage::new(desc);
        run(&mut root, 3, false);
        assert!(root.is_empty());
    }

    #[test]
    fn test_required_message_at_bound_is_created_empty() {
        let schema = testing::everything();
        let desc = schema.message("Everything").unwrap();
        let mut root = DynamicMessage::new(desc.clone());
        run(&mut root, 0, true);
        let header = root.get(&desc.field_by_name("header").unwrap()).unwrap();
        let header = header.as_message().unwrap();
        assert!(header.has(&header.descriptor().field_by_name("label").unwrap()));
        assert_eq!(root.depth(), 1);
        assert!(root.is_initialized());
        assert!(is_initialized_within(&root, 0, 0));
        assert!(testing::within_depth_bound(&root, 0));
    }

    #[test]
    fn test_overflow_node_is_trimmed() {
        let schema = testing::everything();
        let desc = schema.message("Everything").unwrap();
        let item = schema.message("Item").unwrap();
        let parent = item.field_by_name("parent").unwrap();
        let mut header = DynamicMessage::new(item);
        header
            .set(&parent, Value::Message(DynamicMessage::new(desc.clone())))
            .unwrap();
        let mut root = DynamicMessage::new(desc.clone());
        root.set(&desc.field_by_name("header").unwrap(), Value::Message(header))
            .unwrap();
        assert_eq!(root.depth(), 2);

        run(&mut root, 0, false);
        assert_eq!(root.depth(), 1);
        assert!(testing::within_depth_bound(&root, 0));
    }

    #[test]
    fn test_required_chain_is_cut_one_level_below_bound() {
        let schema = testing::required_pair();
        let a = schema.message("A").unwrap();
        let b = a.field_by_name("b").unwrap();
        let next = a.field_by_name("next").unwrap();
        let mut root = DynamicMessage::new(a.clone());
        root.set(&next, Value::Message(DynamicMessage::new(a.clone())))
            .unwrap();
        run(&mut root, 1, true);

        let inner = root.get(&next).and_then(Value::as_message).unwrap();
        assert!(inner.has(&b));
        assert_eq!(root.depth(), 2);
        assert!(root.is_initialized());
        assert!(is_initialized_within(&root, 0, 1));
    }

    #[test]
    fn test_fills_inside_repeated_messages() {
        let schema = testing::everything();
        let desc = schema.message("Everything").unwrap();
        let item = schema.message("Item").unwrap();
        let items = desc.field_by_name("items").unwrap();
        let mut root = DynamicMessage::new(desc);
        root.push(&items, Value::Message(DynamicMessage::new(item.clone()))).unwrap();
        root.push(&items, Value::Message(DynamicMessage::new(item))).unwrap();
        run(&mut root, 4, true);
        assert!(root.is_initialized());
        assert!(root.missing_required().is_empty());
    }

    #[test]
    fn test_is_initialized_within_detects_missing_scalar() {
        let schema = testing::recursive_node();
        let desc = schema.message("Node").unwrap();
        let root = DynamicMessage::new(desc);
        assert!(!is_initialized_within(&root, 0, 3));
        assert!(is_initialized_within(&testing::node_chain(&schema, &[1, 2]), 0, 3));
    }
}
