//! Seed validation and generation.
//!
//! Seeds arrive from the graph as wide signed integers so that out-of-range
//! values can be detected instead of silently wrapping.

use rand::Rng;
use serde::Serialize;
use strum::{Display, EnumIter, EnumString};

/// Seed used when an invalid value reaches the output stage.
pub const DEFAULT_SEED: u64 = 0;

/// Largest valid seed.
pub const MAX_SEED: u64 = u64::MAX;

/// Whether `seed` lies in `[0, MAX_SEED]`.
#[must_use]
pub fn validate(seed: i128) -> bool {
    u64::try_from(seed).is_ok()
}

/// Clamp `seed` into `[0, MAX_SEED]`.
#[must_use]
pub fn clamp(seed: i128) -> u64 {
    u64::try_from(seed).unwrap_or(if seed < 0 { 0 } else { MAX_SEED })
}

/// Pass valid seeds through, replacing invalid ones with [`DEFAULT_SEED`].
#[must_use]
pub fn sanitize(seed: i128) -> u64 {
    u64::try_from(seed).unwrap_or_else(|_| {
        tracing::warn!("seed {seed} out of range, falling back to {DEFAULT_SEED}");
        DEFAULT_SEED
    })
}

/// Uniformly random seed over the full range.
#[must_use]
pub fn generate() -> u64 {
    rand::rng().random()
}

/// What happens to the seed widget after a run is queued.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum SeedControl {
    #[default]
    Fixed,
    Increment,
    Decrement,
    Randomize,
}

impl SeedControl {
    /// The seed for the next run. Increment and decrement wrap at the bounds.
    #[must_use]
    pub fn next(self, seed: u64) -> u64 {
        match self {
            Self::Fixed => seed,
            Self::Increment => seed.wrapping_add(1),
            Self::Decrement => seed.wrapping_sub(1),
            Self::Randomize => generate(),
        }
    }
}
