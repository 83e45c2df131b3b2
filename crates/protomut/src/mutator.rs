//! The mutation engine: one structural edit per call, then repair.

use crate::crossover;
use crate::factory::ValueFactory;
use crate::initialize;
use crate::postprocess::PostProcessorRegistry;
use crate::random::RandomEngine;
use crate::scalar::{DefaultMutations, ScalarMutations};
use crate::walker;
use log::{debug, trace, warn};
use protomut_schema::{DynamicMessage, MessageDescriptor};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bound on message nesting.
pub const DEFAULT_MAX_DEPTH: usize = 32;
/// Default odds (one in N) of materializing a field with its schema
/// default rather than a synthesized value.
pub const DEFAULT_RANDOM_TO_DEFAULT_RATIO: u64 = 100;

/// Invalid engine configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_depth must be at least 1")]
    ZeroMaxDepth,
    #[error("random_to_default_ratio must be at least 1")]
    ZeroRandomToDefaultRatio,
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutatorConfig {
    /// Deepest allowed nesting; the root is depth 0.
    pub max_depth: usize,
    /// Fill unset required fields after each edit.
    pub keep_initialized: bool,
    /// A new field value is the schema default one time in this many.
    pub random_to_default_ratio: u64,
}

impl Default for MutatorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            keep_initialized: true,
            random_to_default_ratio: DEFAULT_RANDOM_TO_DEFAULT_RATIO,
        }
    }
}

impl MutatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroMaxDepth);
        }
        if self.random_to_default_ratio == 0 {
            return Err(ConfigError::ZeroRandomToDefaultRatio);
        }
        Ok(())
    }
}

/// Structural mutator for dynamic messages.
///
/// Every [`Mutator::mutate`] applies exactly one edit somewhere in the
/// tree, then trims nesting beyond `max_depth`, refills required fields
/// (with `keep_initialized`) and runs the registered post-processors.  All
/// randomness comes from one seeded stream, so identical seeds and inputs
/// give identical outputs.
///
/// Scalar edits are delegated to a [`ScalarMutations`] strategy; supply a
/// custom one with [`Mutator::with_strategy`].
pub struct Mutator<S = DefaultMutations> {
    random: RandomEngine,
    strategy: S,
    config: MutatorConfig,
    post_processors: PostProcessorRegistry,
}

impl Mutator<DefaultMutations> {
    /// A mutator with the default configuration and strategy, on the
    /// default random stream.
    pub fn new() -> Self {
        Self {
            random: RandomEngine::new(),
            strategy: DefaultMutations,
            config: MutatorConfig::default(),
            post_processors: PostProcessorRegistry::new(),
        }
    }

    pub fn with_config(config: MutatorConfig) -> Result<Self, ConfigError> {
        Self::with_strategy(DefaultMutations, config)
    }
}

impl Default for Mutator<DefaultMutations> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ScalarMutations> Mutator<S> {
    pub fn with_strategy(strategy: S, config: MutatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            random: RandomEngine::new(),
            strategy,
            config,
            post_processors: PostProcessorRegistry::new(),
        })
    }

    /// Reset the random stream.
    pub fn seed(&mut self, value: u32) {
        debug!("seeding mutator with {}", value);
        self.random.seed(value);
    }

    pub fn config(&self) -> &MutatorConfig {
        &self.config
    }

    pub fn set_max_depth(&mut self, max_depth: usize) -> Result<(), ConfigError> {
        if max_depth == 0 {
            return Err(ConfigError::ZeroMaxDepth);
        }
        self.config.max_depth = max_depth;
        Ok(())
    }

    pub fn set_keep_initialized(&mut self, keep_initialized: bool) {
        self.config.keep_initialized = keep_initialized;
    }

    pub fn set_random_to_default_ratio(&mut self, ratio: u64) -> Result<(), ConfigError> {
        if ratio == 0 {
            return Err(ConfigError::ZeroRandomToDefaultRatio);
        }
        self.config.random_to_default_ratio = ratio;
        Ok(())
    }

    /// The engine's random stream, for strategies and callers that need
    /// values in sync with it.
    pub fn random(&mut self) -> &mut RandomEngine {
        &mut self.random
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn strategy_mut(&mut self) -> &mut S {
        &mut self.strategy
    }

    /// Run `callback` on every message of `descriptor`'s type after each
    /// mutation or crossover, innermost messages first.
    pub fn register_post_processor<F>(&mut self, descriptor: &MessageDescriptor, callback: F)
    where
        F: FnMut(&mut DynamicMessage, u32) + Send + 'static,
    {
        debug!("registering post-processor for {}", descriptor.name());
        self.post_processors.register(descriptor, callback);
    }

    /// Apply one random edit to `message`.
    ///
    /// `size_increase_hint` is how many bytes the caller would like the
    /// message to grow by at most; larger hints favour edits that add
    /// fields, elements and bytes.
    pub fn mutate(&mut self, message: &mut DynamicMessage, size_increase_hint: usize) {
        let max_depth = self.config.max_depth;
        let edit = walker::mutate_tree(message, max_depth, size_increase_hint, &mut self.factory());
        match edit {
            Some(edit) => trace!("applied {:?} to {}", edit, message.descriptor().name()),
            None => trace!("{} offers no mutation target", message.descriptor().name()),
        }
        self.repair(message);
    }

    /// Merge material from `message1` into `message2`.  `message1` is left
    /// unchanged.  Messages of different types are not merged, but
    /// `message2` is still repaired.
    pub fn cross_over(&mut self, message1: &DynamicMessage, message2: &mut DynamicMessage) {
        if message1.descriptor() == message2.descriptor() {
            crossover::cross_over(message1, message2, 0, self.config.max_depth, &mut self.random);
        } else {
            warn!(
                "skipping crossover of {} into {}: different message types",
                message1.descriptor().name(),
                message2.descriptor().name()
            );
        }
        self.repair(message2);
    }

    /// Whether every required field within the depth bound is set.
    pub fn is_initialized(&self, message: &DynamicMessage) -> bool {
        initialize::is_initialized_within(message, 0, self.config.max_depth)
    }

    fn factory(&mut self) -> ValueFactory<'_, S> {
        ValueFactory {
            random: &mut self.random,
            strategy: &mut self.strategy,
            random_to_default_ratio: self.config.random_to_default_ratio,
        }
    }

    fn repair(&mut self, message: &mut DynamicMessage) {
        let max_depth = self.config.max_depth;
        let keep_initialized = self.config.keep_initialized;
        initialize::initialize_and_trim(message, 0, max_depth, keep_initialized, &mut self.factory());
        self.post_processors.apply(message, &mut self.random);
    }
}
