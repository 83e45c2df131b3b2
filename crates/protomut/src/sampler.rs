//! Single-pass weighted reservoir sampling.
//!
//! Lets the walker pick one target out of a tree it only traverses once,
//! without materializing the candidate list.

use crate::random::RandomEngine;

/// Keeps one item out of a stream, each item chosen with probability
/// proportional to its weight.
#[derive(Debug)]
pub(crate) struct WeightedReservoirSampler<T> {
    total_weight: u64,
    selected: Option<T>,
}

impl<T> WeightedReservoirSampler<T> {
    pub(crate) fn new() -> Self {
        Self {
            total_weight: 0,
            selected: None,
        }
    }

    /// Offer one candidate; `make` is only called if it replaces the
    /// current selection.  Zero-weight candidates are never selected.
    pub(crate) fn sample_with(
        &mut self,
        weight: u64,
        random: &mut RandomEngine,
        make: impl FnOnce() -> T,
    ) {
        if weight == 0 {
            return;
        }
        self.total_weight += weight;
        if random.uniform_int(1, self.total_weight) <= weight {
            self.selected = Some(make());
        }
    }

    pub(crate) fn sample(&mut self, item: T, weight: u64, random: &mut RandomEngine) {
        self.sample_with(weight, random, || item);
    }

    pub(crate) fn into_selected(self) -> Option<T> {
        self.selected
    }
}
