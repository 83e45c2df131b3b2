//! Structure-aware mutation for schema-described messages.
//!
//! Given a message and its schema, the [`Mutator`] produces a new message
//! that still conforms to the schema, for use inside a fuzzing loop:
//!
//! 1. **Mutate**: apply exactly one structural or scalar edit somewhere in
//!    the tree (set, clear, mutate, add/remove an element, copy a value).
//! 2. **Cross over**: merge material from a second message of the same type.
//! 3. **Repair**: trim nesting beyond `max_depth`, refill required fields,
//!    then run user post-processors.
//!
//! # Example Usage
//!
//! ```
//! use protomut::{DynamicMessage, FieldDef, MessageDef, Mutator, SchemaDef};
//!
//! let schema = SchemaDef::new()
//!     .message(
//!         MessageDef::new("Node")
//!             .field(FieldDef::required("x", 1, "int32"))
//!             .field(FieldDef::optional("child", 2, "Node")),
//!     )
//!     .build()
//!     .unwrap();
//! let node = schema.message("Node").unwrap();
//!
//! let mut mutator = Mutator::new();
//! mutator.set_max_depth(3).unwrap();
//! mutator.seed(42);
//!
//! let mut message = DynamicMessage::new(node);
//! for _ in 0..100 {
//!     mutator.mutate(&mut message, 64);
//!     assert!(message.depth() <= 3);
//!     assert!(message.is_initialized());
//! }
//! ```
//!
//! # Module Structure
//!
//! - [`random`]: seeded random engine
//! - [`scalar`]: per-kind scalar mutation strategies
//! - [`mutator`]: the engine and its configuration
//! - [`postprocess`]: per-type post-processing callbacks
//! - [`files`]: JSON file loading and saving
//!
//! Target selection, depth trimming and crossover are internal to the
//! engine.
//!
//! # Determinism
//!
//! All randomness flows from one seeded [`RandomEngine`]; identical seeds
//! and operation sequences give identical messages.  Ordered maps are used
//! throughout instead of hash maps.

mod crossover;
mod factory;
pub mod files;
mod initialize;
pub mod mutator;
pub mod postprocess;
pub mod random;
mod sampler;
pub mod scalar;
mod walker;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use mutator::{
    ConfigError, Mutator, MutatorConfig, DEFAULT_MAX_DEPTH, DEFAULT_RANDOM_TO_DEFAULT_RATIO,
};
pub use postprocess::{PostProcess, PostProcessorRegistry};
pub use protomut_schema::{
    DynamicMessage, EnumDef, FieldDef, FieldDescriptor, Kind, Label, MessageDef,
    MessageDescriptor, Schema, SchemaDef, SchemaError, Value,
};
pub use random::RandomEngine;
pub use scalar::{DefaultMutations, ScalarMutations};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_exports() {
        let _ = Mutator::new();
        let _ = MutatorConfig::default();
        let _ = RandomEngine::new();
        let _ = PostProcessorRegistry::new();
        let _ = DefaultMutations;
    }
}
