//! Merging material from one message into another of the same type.

use crate::random::RandomEngine;
use log::warn;
use protomut_schema::{DynamicMessage, FieldDescriptor, Value};

/// Chance of taking a set singular scalar from the source.
const TAKE_SCALAR_PROBABILITY: f64 = 0.5;
/// Chance of each source element joining a repeated field's pool.
const TAKE_ELEMENT_PROBABILITY: f64 = 0.5;

/// Merge fields of `source` into `target`.  `source` is never modified.
///
/// Singular scalars are taken with probability one half.  Repeated fields
/// get their own elements plus a random half of the source's, shuffled and
/// cut back to the longer of the two original lengths.  Singular messages
/// are merged recursively, creating the target sub-message if needed,
/// as long as the child fits within `max_depth`.
pub(crate) fn cross_over(
    source: &DynamicMessage,
    target: &mut DynamicMessage,
    depth: usize,
    max_depth: usize,
    random: &mut RandomEngine,
) {
    if source.descriptor() != target.descriptor() {
        warn!(
            "cannot cross {} into {}",
            source.descriptor().name(),
            target.descriptor().name()
        );
        return;
    }
    let descriptor = target.descriptor().clone();
    for field in descriptor.fields() {
        if field.is_message() && depth >= max_depth {
            continue;
        }
        if field.is_repeated() {
            cross_over_repeated(source, target, &field, random);
            continue;
        }
        match source.get(&field) {
            None => {}
            Some(Value::Message(source_child)) => match target.get_or_insert_message(&field) {
                Ok(target_child) => {
                    cross_over(source_child, target_child, depth + 1, max_depth, random)
                }
                Err(err) => warn!("crossover of {} failed: {}", field.name(), err),
            },
            Some(value) => {
                if random.bool_with_probability(TAKE_SCALAR_PROBABILITY) {
                    if let Err(err) = target.set(&field, value.clone()) {
                        warn!("crossover of {} failed: {}", field.name(), err);
                    }
                }
            }
        }
    }
}

fn cross_over_repeated(
    source: &DynamicMessage,
    target: &mut DynamicMessage,
    field: &FieldDescriptor,
    random: &mut RandomEngine,
) {
    let donated = source.get(field).and_then(Value::as_list).unwrap_or(&[]);
    if donated.is_empty() {
        return;
    }
    let mut pool = match target.clear(field) {
        Some(Value::List(items)) => items,
        _ => Vec::new(),
    };
    let bound = pool.len().max(donated.len());
    for item in donated {
        if random.bool_with_probability(TAKE_ELEMENT_PROBABILITY) {
            pool.push(item.clone());
        }
    }
    random.shuffle(&mut pool);
    pool.truncate(bound);
    if let Err(err) = target.set(field, Value::List(pool)) {
        warn!("crossover of {} failed: {}", field.name(), err);
    }
}
