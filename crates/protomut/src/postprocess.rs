//! User callbacks run on every message of a type after each mutation or
//! crossover.

use crate::random::RandomEngine;
use protomut_schema::{DynamicMessage, MessageDescriptor};
use std::fmt;

/// A post-processing callback.  Receives the message and a seed derived
/// from the engine's random stream.
pub type PostProcess = Box<dyn FnMut(&mut DynamicMessage, u32) + Send>;

/// Callbacks keyed by message descriptor.  Descriptors from different
/// schemas never share callbacks, even when their type names match.
#[derive(Default)]
pub struct PostProcessorRegistry {
    callbacks: Vec<(MessageDescriptor, Vec<PostProcess>)>,
}

impl PostProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a callback for `descriptor`'s type.  Callbacks for one type run
    /// in registration order.
    pub fn register<F>(&mut self, descriptor: &MessageDescriptor, callback: F)
    where
        F: FnMut(&mut DynamicMessage, u32) + Send + 'static,
    {
        let callback: PostProcess = Box::new(callback);
        match self.callbacks_for(descriptor) {
            Some(list) => list.push(callback),
            None => self.callbacks.push((descriptor.clone(), vec![callback])),
        }
    }

    fn callbacks_for(&mut self, descriptor: &MessageDescriptor) -> Option<&mut Vec<PostProcess>> {
        self.callbacks
            .iter_mut()
            .find(|(registered, _)| registered == descriptor)
            .map(|(_, list)| list)
    }

    /// Total number of registered callbacks.
    pub fn len(&self) -> usize {
        self.callbacks.iter().map(|(_, list)| list.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Run the callbacks on every message in the tree, children before
    /// their parent.
    pub(crate) fn apply(&mut self, message: &mut DynamicMessage, random: &mut RandomEngine) {
        if self.callbacks.is_empty() {
            return;
        }
        let descriptor = message.descriptor().clone();
        for field in descriptor.fields().filter(|field| field.is_message()) {
            if let Some(value) = message.get_mut(&field) {
                for child in value.messages_mut() {
                    self.apply(child, random);
                }
            }
        }
        if let Some(callbacks) = self.callbacks_for(&descriptor) {
            for callback in callbacks.iter_mut() {
                let seed = random.derive_seed();
                callback(message, seed);
            }
        }
    }
}

impl fmt::Debug for PostProcessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.callbacks.iter().map(|(descriptor, list)| (descriptor.name(), list.len())))
            .finish()
    }
}
