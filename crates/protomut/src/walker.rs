//! Target selection and structural edits.
//!
//! A message tree is presented as a flat set of weighted targets, one per
//! applicable (field, edit) pair.  Selection is a single read-only pass with
//! a reservoir sampler; the chosen target is recorded as a path of field
//! numbers and list indexes, then applied in a second, mutable pass.
//!
//! Targets offered for a node at depth `d` (the root is depth 0):
//!
//! | field state                  | edits                                   |
//! |------------------------------|-----------------------------------------|
//! | singular scalar, set         | mutate, copy, clear (unless required)   |
//! | singular scalar, unset       | set                                     |
//! | singular message, set        | copy, clear (unless required), recurse  |
//! | singular message, unset      | set (only if `d < max_depth`)           |
//! | repeated                     | add, remove each element                |
//! | repeated scalar element      | mutate                                  |
//! | repeated message element     | recurse                                 |
//!
//! A single-value enum holding its declared value is never offered for
//! mutate.
//!
//! Growth edits (set, add) are weighted by the size-increase hint, so a
//! zero hint strongly favours edits that keep the message size.

use crate::factory::ValueFactory;
use crate::random::RandomEngine;
use crate::sampler::WeightedReservoirSampler;
use crate::scalar::ScalarMutations;
use log::{trace, warn};
use protomut_schema::{DynamicMessage, FieldDescriptor, Kind, Value};

/// Weight of every non-growth edit.
const BASE_WEIGHT: u64 = 16;
/// Weight of copy edits.
const COPY_WEIGHT: u64 = BASE_WEIGHT / 4;

/// One step from a message to a nested message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PathStep {
    /// Singular message field, by number.
    Field(u32),
    /// Element of a repeated message field.
    Element(u32, usize),
}

/// What to do with the selected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Edit {
    /// Give an unset singular field a fresh value.
    Set,
    /// Replace a set singular scalar with a mutated value.
    Mutate,
    /// Unset an optional field.
    Clear,
    /// Append a fresh element to a repeated field.
    Add,
    /// Remove one element of a repeated field.
    Remove(usize),
    /// Replace one scalar element of a repeated field with a mutated value.
    MutateElement(usize),
    /// Overwrite a set singular field with an equal-kind value found
    /// elsewhere in the tree.
    Copy,
}

#[derive(Debug, Clone)]
pub(crate) struct Target {
    /// Path from the root to the message owning `field`.
    pub(crate) path: Vec<PathStep>,
    pub(crate) field: FieldDescriptor,
    pub(crate) edit: Edit,
}

fn growth_weight(size_increase_hint: usize) -> u64 {
    (size_increase_hint.min(BASE_WEIGHT as usize) as u64).max(1)
}

/// Whether a mutate edit can change `value`.  A declared value of a
/// single-value enum has nowhere to go.
fn mutable(field: &FieldDescriptor, value: &Value) -> bool {
    match (field.kind(), value) {
        (Kind::Enum(enumeration), Value::EnumNumber(number)) => {
            enumeration.values().len() > 1 || enumeration.index_of(*number).is_none()
        }
        _ => true,
    }
}

// ── Selection ──────────────────────────────────────────────────────

struct TargetFinder {
    sampler: WeightedReservoirSampler<Target>,
    path: Vec<PathStep>,
    max_depth: usize,
    size_increase_hint: usize,
    allow_copy: bool,
}

impl TargetFinder {
    fn offer(&mut self, field: &FieldDescriptor, edit: Edit, weight: u64, random: &mut RandomEngine) {
        let path = &self.path;
        self.sampler.sample_with(weight, random, || Target {
            path: path.clone(),
            field: field.clone(),
            edit,
        });
    }

    fn visit(&mut self, message: &DynamicMessage, depth: usize, random: &mut RandomEngine) {
        for field in message.descriptor().fields() {
            if let Kind::Enum(enumeration) = field.kind() {
                if enumeration.values().is_empty() {
                    continue;
                }
            }
            if field.is_repeated() {
                self.visit_repeated(message, &field, depth, random);
            } else {
                self.visit_singular(message, &field, depth, random);
            }
        }
    }

    fn visit_singular(
        &mut self,
        message: &DynamicMessage,
        field: &FieldDescriptor,
        depth: usize,
        random: &mut RandomEngine,
    ) {
        let child_fits = depth < self.max_depth;
        match message.get(field) {
            None => {
                if !field.is_message() || child_fits {
                    self.offer(field, Edit::Set, growth_weight(self.size_increase_hint), random);
                }
            }
            Some(value) => {
                if !field.is_required() {
                    self.offer(field, Edit::Clear, BASE_WEIGHT, random);
                }
                if self.allow_copy && (!field.is_message() || child_fits) {
                    self.offer(field, Edit::Copy, COPY_WEIGHT, random);
                }
                match value {
                    Value::Message(child) => {
                        if child_fits {
                            self.path.push(PathStep::Field(field.number()));
                            self.visit(child, depth + 1, random);
                            self.path.pop();
                        }
                    }
                    scalar => {
                        if mutable(field, scalar) {
                            self.offer(field, Edit::Mutate, BASE_WEIGHT, random);
                        }
                    }
                }
            }
        }
    }

    fn visit_repeated(
        &mut self,
        message: &DynamicMessage,
        field: &FieldDescriptor,
        depth: usize,
        random: &mut RandomEngine,
    ) {
        let child_fits = depth < self.max_depth;
        if !field.is_message() || child_fits {
            self.offer(field, Edit::Add, growth_weight(self.size_increase_hint), random);
        }
        let items = message.get(field).and_then(Value::as_list).unwrap_or(&[]);
        for (index, item) in items.iter().enumerate() {
            self.offer(field, Edit::Remove(index), BASE_WEIGHT, random);
            match item {
                Value::Message(child) => {
                    if child_fits {
                        self.path.push(PathStep::Element(field.number(), index));
                        self.visit(child, depth + 1, random);
                        self.path.pop();
                    }
                }
                scalar => {
                    if mutable(field, scalar) {
                        self.offer(field, Edit::MutateElement(index), BASE_WEIGHT, random);
                    }
                }
            }
        }
    }
}

/// Choose one target in `root`, or `None` if the tree offers no target.
pub(crate) fn select_target(
    root: &DynamicMessage,
    max_depth: usize,
    size_increase_hint: usize,
    allow_copy: bool,
    random: &mut RandomEngine,
) -> Option<Target> {
    let mut finder = TargetFinder {
        sampler: WeightedReservoirSampler::new(),
        path: Vec::new(),
        max_depth,
        size_increase_hint,
        allow_copy,
    };
    finder.visit(root, 0, random);
    finder.sampler.into_selected()
}

// ── Copy sources ───────────────────────────────────────────────────

struct SourceFinder<'t, 'm> {
    target: &'t Target,
    kind: Kind,
    current: Option<&'m Value>,
    sampler: WeightedReservoirSampler<&'m Value>,
    path: Vec<PathStep>,
    max_depth: usize,
}

impl<'t, 'm> SourceFinder<'t, 'm> {
    fn visit(&mut self, message: &'m DynamicMessage, depth: usize, random: &mut RandomEngine) {
        for (field, value) in message.set_fields() {
            let is_target = field == self.target.field && self.path == self.target.path;
            let same_kind = field.kind() == self.kind;
            let items: &'m [Value] = match value {
                Value::List(items) => items,
                single => std::slice::from_ref(single),
            };
            for (index, item) in items.iter().enumerate() {
                if same_kind && !is_target && self.current != Some(item) {
                    self.sampler.sample(item, 1, random);
                }
                if let Value::Message(child) = item {
                    if depth < self.max_depth {
                        let step = if field.is_repeated() {
                            PathStep::Element(field.number(), index)
                        } else {
                            PathStep::Field(field.number())
                        };
                        self.path.push(step);
                        self.visit(child, depth + 1, random);
                        self.path.pop();
                    }
                }
            }
        }
    }
}

/// A uniformly chosen value elsewhere in the tree with the same kind as
/// the target field and different from its current value.
fn find_copy_source(
    root: &DynamicMessage,
    target: &Target,
    max_depth: usize,
    random: &mut RandomEngine,
) -> Option<Value> {
    let current = resolve(root, &target.path).and_then(|node| node.get(&target.field));
    let mut finder = SourceFinder {
        target,
        kind: target.field.kind(),
        current,
        sampler: WeightedReservoirSampler::new(),
        path: Vec::new(),
        max_depth,
    };
    finder.visit(root, 0, random);
    finder.sampler.into_selected().cloned()
}

// ── Application ────────────────────────────────────────────────────

fn resolve<'a>(root: &'a DynamicMessage, path: &[PathStep]) -> Option<&'a DynamicMessage> {
    let mut node = root;
    for step in path {
        node = match *step {
            PathStep::Field(number) => node.get(&node.descriptor().field(number)?)?.as_message()?,
            PathStep::Element(number, index) => {
                node.get_at(&node.descriptor().field(number)?, index)?.as_message()?
            }
        };
    }
    Some(node)
}

fn resolve_mut<'a>(root: &'a mut DynamicMessage, path: &[PathStep]) -> Option<&'a mut DynamicMessage> {
    let mut node = root;
    for step in path {
        node = match *step {
            PathStep::Field(number) => {
                let field = node.descriptor().field(number)?;
                node.get_mut(&field)?.as_message_mut()?
            }
            PathStep::Element(number, index) => {
                let field = node.descriptor().field(number)?;
                node.get_at_mut(&field, index)?.as_message_mut()?
            }
        };
    }
    Some(node)
}

/// Apply exactly one edit to `root`.  Returns the edit applied, or `None`
/// when the tree offers no target at all.
pub(crate) fn mutate_tree<S: ScalarMutations + ?Sized>(
    root: &mut DynamicMessage,
    max_depth: usize,
    size_increase_hint: usize,
    factory: &mut ValueFactory<'_, S>,
) -> Option<Edit> {
    let mut target = select_target(root, max_depth, size_increase_hint, true, factory.random)?;
    let mut source = None;
    if target.edit == Edit::Copy {
        source = find_copy_source(root, &target, max_depth, factory.random);
        if source.is_none() {
            trace!("no copy source for {}, reselecting", target.field.name());
            target = select_target(root, max_depth, size_increase_hint, false, factory.random)?;
        }
    }
    trace!(
        "{:?} on {}.{} at depth {}",
        target.edit,
        target.field.containing_message().name(),
        target.field.name(),
        target.path.len()
    );

    let node = resolve_mut(root, &target.path)?;
    let field = &target.field;
    let result = match target.edit {
        Edit::Set => {
            let value = factory.create(field, size_increase_hint);
            node.set(field, value)
        }
        Edit::Mutate => {
            let current = node.get(field)?;
            let value = factory.mutate(field, current, size_increase_hint);
            node.set(field, value)
        }
        Edit::Clear => {
            node.clear(field);
            Ok(())
        }
        Edit::Add => {
            let value = factory.create(field, size_increase_hint);
            node.push(field, value)
        }
        Edit::Remove(index) => {
            node.remove_at(field, index);
            Ok(())
        }
        Edit::MutateElement(index) => {
            let value = factory.mutate(field, node.get_at(field, index)?, size_increase_hint);
            if let Some(slot) = node.get_at_mut(field, index) {
                *slot = value;
            }
            Ok(())
        }
        Edit::Copy => match source {
            Some(value) => node.set(field, value),
            None => Ok(()),
        },
    };
    if let Err(err) = result {
        warn!("{:?} on {} failed: {}", target.edit, field.name(), err);
    }
    Some(target.edit)
}
