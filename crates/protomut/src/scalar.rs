//! Scalar mutation strategies.
//!
//! [`ScalarMutations`] has one hook per scalar kind.  Every hook has a
//! default implementation, so a custom strategy overrides only the kinds it
//! cares about and inherits the rest:
//!
//! ```
//! use protomut::{RandomEngine, ScalarMutations};
//!
//! struct Shouting;
//!
//! impl ScalarMutations for Shouting {
//!     fn mutate_string(&mut self, _: &mut RandomEngine, value: &str, _: usize) -> String {
//!         value.to_uppercase()
//!     }
//! }
//! ```
//!
//! All results stay inside their kind's value domain: integers keep their
//! width, enum indexes stay in range and strings stay valid UTF-8.

use crate::random::RandomEngine;
use rand::Rng;

// ── Tuning ─────────────────────────────────────────────────────────

/// Chance of injecting a boundary value instead of flipping a bit, at
/// size hint 0.
const BOUNDARY_PROBABILITY_MIN: f64 = 0.05;
/// Chance of injecting a boundary value once the hint reaches
/// [`BOUNDARY_HINT_SATURATION`].
const BOUNDARY_PROBABILITY_MAX: f64 = 0.25;
const BOUNDARY_HINT_SATURATION: usize = 256;

/// Chance of a float mutation flipping a bit rather than nudging the value.
const FLOAT_BIT_FLIP_PROBABILITY: f64 = 0.5;
/// Largest relative nudge applied to a float.
const FLOAT_MAX_RELATIVE_DELTA: f64 = 0.125;

/// Longest run a single duplication may copy.
const MAX_DUPLICATE_RUN: usize = 64;
/// Chance that an inserted character is printable ASCII.
const ASCII_CHAR_PROBABILITY: f64 = 0.5;

// ── Strategy trait ─────────────────────────────────────────────────

/// Per-kind mutation hooks.
///
/// `size_increase_hint` is the caller's remaining growth budget in bytes;
/// it biases, never bounds, the result.
pub trait ScalarMutations {
    fn mutate_i32(&mut self, random: &mut RandomEngine, value: i32, size_increase_hint: usize) -> i32 {
        mutate_int(random, value, size_increase_hint)
    }

    fn mutate_i64(&mut self, random: &mut RandomEngine, value: i64, size_increase_hint: usize) -> i64 {
        mutate_int(random, value, size_increase_hint)
    }

    fn mutate_u32(&mut self, random: &mut RandomEngine, value: u32, size_increase_hint: usize) -> u32 {
        mutate_int(random, value, size_increase_hint)
    }

    fn mutate_u64(&mut self, random: &mut RandomEngine, value: u64, size_increase_hint: usize) -> u64 {
        mutate_int(random, value, size_increase_hint)
    }

    fn mutate_f32(&mut self, random: &mut RandomEngine, value: f32) -> f32 {
        mutate_float(random, value)
    }

    fn mutate_f64(&mut self, random: &mut RandomEngine, value: f64) -> f64 {
        mutate_float(random, value)
    }

    fn mutate_bool(&mut self, _random: &mut RandomEngine, value: bool) -> bool {
        !value
    }

    /// Pick a new index into an enum's declared values.
    ///
    /// Panics if `item_count == 0`.
    fn mutate_enum(&mut self, random: &mut RandomEngine, index: usize, item_count: usize) -> usize {
        mutate_enum(random, index, item_count)
    }

    fn mutate_bytes(
        &mut self,
        random: &mut RandomEngine,
        value: &[u8],
        size_increase_hint: usize,
    ) -> Vec<u8> {
        mutate_bytes(random, value, size_increase_hint)
    }

    fn mutate_string(
        &mut self,
        random: &mut RandomEngine,
        value: &str,
        size_increase_hint: usize,
    ) -> String {
        mutate_utf8(random, value, size_increase_hint)
    }
}

/// The stock strategy: every hook uses its default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMutations;

impl ScalarMutations for DefaultMutations {}

// ── Integers ───────────────────────────────────────────────────────

/// Fixed-width integer viewed as a bit pattern.
pub trait FixedWidthInt: Copy + PartialEq + 'static {
    const BITS: u32;
    /// Zero-extended bit pattern.
    fn to_raw(self) -> u64;
    /// Truncating inverse of [`FixedWidthInt::to_raw`].
    fn from_raw(raw: u64) -> Self;
    /// 0, ±1 and the type's extremes.
    fn boundary_values() -> &'static [Self];
}

macro_rules! fixed_width_int {
    ($t:ty, $unsigned:ty, [$($boundary:expr),* $(,)?]) => {
        impl FixedWidthInt for $t {
            const BITS: u32 = <$t>::BITS;

            fn to_raw(self) -> u64 {
                self as $unsigned as u64
            }

            fn from_raw(raw: u64) -> Self {
                raw as $unsigned as $t
            }

            fn boundary_values() -> &'static [Self] {
                &[$($boundary),*]
            }
        }
    };
}

fixed_width_int!(i32, u32, [0, 1, -1, i32::MIN, i32::MAX]);
fixed_width_int!(i64, u64, [0, 1, -1, i64::MIN, i64::MAX]);
fixed_width_int!(u32, u32, [0, 1, u32::MAX]);
fixed_width_int!(u64, u64, [0, 1, u64::MAX]);

fn boundary_probability(size_increase_hint: usize) -> f64 {
    let scale = size_increase_hint.min(BOUNDARY_HINT_SATURATION) as f64
        / BOUNDARY_HINT_SATURATION as f64;
    BOUNDARY_PROBABILITY_MIN + (BOUNDARY_PROBABILITY_MAX - BOUNDARY_PROBABILITY_MIN) * scale
}

/// Flip one bit, or occasionally jump to a boundary value.
pub fn mutate_int<T: FixedWidthInt>(random: &mut RandomEngine, value: T, size_increase_hint: usize) -> T {
    if random.bool_with_probability(boundary_probability(size_increase_hint)) {
        let boundary = *random.pick_one_of(T::boundary_values());
        if boundary != value {
            return boundary;
        }
    }
    flip_bit(random, value)
}

/// Flip exactly one bit within the type's width.
pub fn flip_bit<T: FixedWidthInt>(random: &mut RandomEngine, value: T) -> T {
    let bit = random.uniform_int(0, T::BITS - 1);
    T::from_raw(value.to_raw() ^ (1u64 << bit))
}

// ── Floats ─────────────────────────────────────────────────────────

pub trait FixedWidthFloat: Copy {
    const BITS: u32;
    fn to_raw(self) -> u64;
    fn from_raw(raw: u64) -> Self;
    fn to_f64(self) -> f64;
    fn from_f64(value: f64) -> Self;
}

impl FixedWidthFloat for f32 {
    const BITS: u32 = 32;

    fn to_raw(self) -> u64 {
        u64::from(self.to_bits())
    }

    fn from_raw(raw: u64) -> Self {
        f32::from_bits(raw as u32)
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl FixedWidthFloat for f64 {
    const BITS: u32 = 64;

    fn to_raw(self) -> u64 {
        self.to_bits()
    }

    fn from_raw(raw: u64) -> Self {
        f64::from_bits(raw)
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> Self {
        value
    }
}

/// Flip one bit of the IEEE-754 pattern, or nudge the value by a small
/// relative delta.  NaN and infinities may be produced by a flip; a nudge of
/// a non-finite value restarts from a small finite one.
pub fn mutate_float<T: FixedWidthFloat>(random: &mut RandomEngine, value: T) -> T {
    if random.bool_with_probability(FLOAT_BIT_FLIP_PROBABILITY) {
        let bit = random.uniform_int(0, T::BITS - 1);
        return T::from_raw(value.to_raw() ^ (1u64 << bit));
    }
    let current = value.to_f64();
    if !current.is_finite() {
        return T::from_f64(random.gen_range(-1.0..=1.0));
    }
    let magnitude = current.abs().max(1.0);
    let delta = random.gen_range(-FLOAT_MAX_RELATIVE_DELTA..=FLOAT_MAX_RELATIVE_DELTA) * magnitude;
    T::from_f64(current + delta)
}

// ── Enums ──────────────────────────────────────────────────────────

/// A different index in `0..item_count`; `0` for single-value enums.  An
/// out-of-range `index` (an undeclared number) maps to any declared index.
pub fn mutate_enum(random: &mut RandomEngine, index: usize, item_count: usize) -> usize {
    assert!(item_count > 0, "mutate_enum: enum declares no values");
    if item_count == 1 {
        return 0;
    }
    if index >= item_count {
        return random.index(item_count);
    }
    let shift = random.uniform_int(1, item_count - 1);
    (index + shift) % item_count
}

// ── Byte and character sequences ───────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequenceEdit {
    FlipBit,
    Insert,
    Delete,
    Duplicate,
}

/// Edits applicable to a sequence of `len` units.  Growth is only offered
/// with a positive hint, except that an empty sequence can always grow.
fn sequence_edits(len: usize, size_increase_hint: usize) -> Vec<SequenceEdit> {
    let mut edits = Vec::with_capacity(4);
    if len > 0 {
        edits.push(SequenceEdit::FlipBit);
        edits.push(SequenceEdit::Delete);
    }
    if len == 0 || size_increase_hint > 0 {
        edits.push(SequenceEdit::Insert);
    }
    if len > 0 && size_increase_hint > 1 {
        edits.push(SequenceEdit::Duplicate);
    }
    edits
}

/// Copy a random run of `items` right after itself.
fn duplicate_run<T: Clone>(random: &mut RandomEngine, items: &mut Vec<T>, size_increase_hint: usize) {
    let start = random.index(items.len());
    let longest = (items.len() - start)
        .min(size_increase_hint)
        .min(MAX_DUPLICATE_RUN)
        .max(1);
    let run = random.uniform_int(1, longest);
    let chunk: Vec<T> = items[start..start + run].to_vec();
    let at = start + run;
    items.splice(at..at, chunk);
}

/// One bit flip, insertion, deletion or duplicated run.
pub fn mutate_bytes(random: &mut RandomEngine, value: &[u8], size_increase_hint: usize) -> Vec<u8> {
    let mut bytes = value.to_vec();
    match *random.pick_one_of(&sequence_edits(bytes.len(), size_increase_hint)) {
        SequenceEdit::FlipBit => {
            let at = random.index(bytes.len());
            let bit = random.uniform_int(0u32, 7);
            bytes[at] ^= 1u8 << bit;
        }
        SequenceEdit::Insert => {
            let at = random.uniform_int(0, bytes.len());
            let fresh = random.random_bytes(1);
            bytes.insert(at, fresh[0]);
        }
        SequenceEdit::Delete => {
            let at = random.index(bytes.len());
            bytes.remove(at);
        }
        SequenceEdit::Duplicate => duplicate_run(random, &mut bytes, size_increase_hint),
    }
    bytes
}

/// Like [`mutate_bytes`], but edits whole code points so the result is
/// always valid UTF-8.
pub fn mutate_utf8(random: &mut RandomEngine, value: &str, size_increase_hint: usize) -> String {
    let mut chars: Vec<char> = value.chars().collect();
    match *random.pick_one_of(&sequence_edits(chars.len(), size_increase_hint)) {
        SequenceEdit::FlipBit => {
            let at = random.index(chars.len());
            chars[at] = flip_char_bit(random, chars[at]);
        }
        SequenceEdit::Insert => {
            let at = random.uniform_int(0, chars.len());
            let fresh = random_char(random);
            chars.insert(at, fresh);
        }
        SequenceEdit::Delete => {
            let at = random.index(chars.len());
            chars.remove(at);
        }
        SequenceEdit::Duplicate => duplicate_run(random, &mut chars, size_increase_hint),
    }
    chars.into_iter().collect()
}

/// Flip a bit within the code point's encoded width.  A flip that lands on
/// a surrogate or past U+10FFFF yields a fresh character instead.
fn flip_char_bit(random: &mut RandomEngine, c: char) -> char {
    let width = match c.len_utf8() {
        1 => 7,
        2 => 11,
        3 => 16,
        _ => 21,
    };
    let bit = random.uniform_int(0u32, width - 1);
    match char::from_u32(u32::from(c) ^ (1 << bit)) {
        Some(flipped) => flipped,
        None => random_char(random),
    }
}

fn random_char(random: &mut RandomEngine) -> char {
    if random.bool_with_probability(ASCII_CHAR_PROBABILITY) {
        char::from(random.uniform_int(0x20u8, 0x7e))
    } else {
        random.gen::<char>()
    }
}
