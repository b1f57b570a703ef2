//! Width/height pairs constrained to multiples of 8.

mod extract;
mod scale;

pub use extract::{from_image, from_latent, DimensionSource};
pub use scale::{scale, MAX_SCALE_FACTOR, MIN_SCALE_FACTOR};

use serde::Serialize;

/// Spatial dimensions must be a multiple of this for latent-space models.
pub const DIMENSION_ALIGN: u32 = 8;

/// Smallest dimension a node will emit.
pub const MIN_DIMENSION: u32 = 64;

/// Largest dimension a node will emit.
pub const MAX_DIMENSION: u32 = 8192;

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width and height exchanged.
    #[must_use]
    pub const fn swapped(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// Both sides divisible by 8 and within `[MIN_DIMENSION, MAX_DIMENSION]`.
    #[must_use]
    pub const fn is_aligned(&self) -> bool {
        is_valid_side(self.width) && is_valid_side(self.height)
    }

    /// Clamp both sides into the emitted range.
    ///
    /// The bounds are themselves multiples of 8, so clamping an aligned value
    /// keeps it aligned.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            width: self.width.clamp(MIN_DIMENSION, MAX_DIMENSION),
            height: self.height.clamp(MIN_DIMENSION, MAX_DIMENSION),
        }
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl From<Dimensions> for (u32, u32) {
    fn from(dims: Dimensions) -> Self {
        (dims.width, dims.height)
    }
}

const fn is_valid_side(side: u32) -> bool {
    side % DIMENSION_ALIGN == 0 && side >= MIN_DIMENSION && side <= MAX_DIMENSION
}

/// Round to the nearest multiple of 8, halves rounding up.
///
/// Negative and non-finite inputs yield 0.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn round_to_multiple_of_8(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let align = f64::from(DIMENSION_ALIGN);
    let rounded = ((value + align / 2.0) / align).floor() * align;
    // Saturating float-to-int cast
    rounded.min(f64::from(u32::MAX)) as u32
}
