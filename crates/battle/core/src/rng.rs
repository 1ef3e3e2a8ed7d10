//! Deterministic random source.
//!
//! Every randomized resolution (damage variance, initiative, AI tie-breaks and
//! scan jitter) draws from a [`RandomSource`] passed explicitly by the caller.
//! There is no process-wide generator.
//!
//! # Determinism
//!
//! Given the same seed, [`PcgRng`] produces the same sequence on every
//! platform. Its state is plain data and serializes with the battle snapshot,
//! so a worker can continue the exact sequence of the primary side.

/// Source of deterministic random draws.
///
/// The trait is object safe; callers thread `&mut dyn RandomSource` through
/// the engine, effects and planner.
pub trait RandomSource: Send {
    /// Draws the next raw 32-bit value.
    fn next_u32(&mut self) -> u32;

    /// Draws a float in `[0, 1)`.
    fn random(&mut self) -> f64 {
        f64::from(self.next_u32()) / (f64::from(u32::MAX) + 1.0)
    }

    /// Draws a fair boolean.
    fn bool(&mut self) -> bool {
        self.random() < 0.5
    }

    /// Draws an integer in `[min, max]` inclusive.
    fn range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let span = u64::from(max - min) + 1;
        let offset = (self.random() * span as f64) as u64;
        min + offset.min(span - 1) as u32
    }

    /// Picks an index into a collection of `len` elements, `None` when empty.
    fn choice(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let index = (self.random() * len as f64) as usize;
        Some(index.min(len - 1))
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR variant: 64-bit state, 32-bit output.
///
/// # Properties
///
/// - **Deterministic**: Same seed always produces same output
/// - **Fast**: Single multiply + xorshift + rotate
/// - **Small state**: Only 64 bits, cheap to ship across the worker boundary
///
/// # References
///
/// - PCG paper: <https://www.pcg-random.org/>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PcgRng {
    state: u64,
}

impl PcgRng {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    /// Creates a generator from a user-facing seed.
    ///
    /// The seed is avalanched first so that neighbouring seeds give unrelated
    /// sequences.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            state: compute_seed(seed, 0, 0),
        }
    }

    /// Restores a generator from a raw state previously read with [`PcgRng::state`].
    pub const fn from_state(state: u64) -> Self {
        Self { state }
    }

    /// Raw internal state.
    pub const fn state(&self) -> u64 {
        self.state
    }

    /// Derives an independent generator for a sub-task (e.g. one planning request).
    pub fn fork(&self, stream: u64) -> Self {
        Self {
            state: compute_seed(self.state, stream, 1),
        }
    }

    /// Advance the PCG state by one step.
    ///
    /// Uses LCG (Linear Congruential Generator) formula:
    /// `state' = (state × multiplier + increment) mod 2^64`
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// PCG output function using XSH-RR (xorshift high, random rotate).
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RandomSource for PcgRng {
    fn next_u32(&mut self) -> u32 {
        self.state = Self::pcg_step(self.state);
        Self::pcg_output(self.state)
    }
}

/// Random source replaying a fixed cycle of floats.
///
/// Used by tests to force damage rolls and initiative draws.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkewedRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl SkewedRandom {
    /// Creates a source cycling over `values` (each clamped into `[0, 1)`).
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Source always drawing the same value.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for SkewedRandom {
    fn next_u32(&mut self) -> u32 {
        (self.random() * (f64::from(u32::MAX) + 1.0)) as u32
    }

    fn random(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor = (self.cursor + 1) % self.values.len();
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

/// Mixes seed components into a well-distributed 64-bit state.
///
/// * `seed` - Base seed (battle seed or current generator state)
/// * `stream` - Sub-sequence selector (planning request, fork index)
/// * `context` - Additional discriminator for several derivations from one stream
pub fn compute_seed(seed: u64, stream: u64, context: u32) -> u64 {
    // These constants are based on SplitMix64 and FxHash multipliers
    let mut hash = seed;

    hash ^= stream.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(context).wrapping_mul(0x517cc1b727220a95);
    hash ^= 0x85ebca6b;

    // Final avalanche step
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
