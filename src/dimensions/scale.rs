//! Scale a dimension pair by a factor, keeping both sides on the 8-pixel grid.

use crate::error::{Error, Result};

use super::{round_to_multiple_of_8, Dimensions};

/// Smallest factor the scale node declares.
pub const MIN_SCALE_FACTOR: f64 = 1.0;

/// Largest accepted factor.
pub const MAX_SCALE_FACTOR: f64 = 8.0;

/// Multiply `width` and `height` by `factor` and round each to a multiple of 8.
///
/// Results are clamped into `[MIN_DIMENSION, MAX_DIMENSION]`.
///
/// # Errors
///
/// Returns an error if either side is zero, or if the factor is not finite,
/// not positive, or above [`MAX_SCALE_FACTOR`].
pub fn scale(width: u32, height: u32, factor: f64) -> Result<Dimensions> {
    if width == 0 || height == 0 {
        return Err(Error::UnsupportedDimensions {
            width,
            height,
            reason: "width and height must be positive".to_string(),
        });
    }

    if !factor.is_finite() || factor <= 0.0 {
        return Err(Error::invalid("scale_factor", "must be greater than 0"));
    }

    if factor > MAX_SCALE_FACTOR {
        return Err(Error::invalid(
            "scale_factor",
            format!("must not exceed {MAX_SCALE_FACTOR}"),
        ));
    }

    let scaled = Dimensions::new(
        round_to_multiple_of_8(f64::from(width) * factor),
        round_to_multiple_of_8(f64::from(height) * factor),
    )
    .clamped();

    tracing::debug!(
        "scaled {width}x{height} by {factor} -> {}x{}",
        scaled.width,
        scaled.height
    );

    Ok(scaled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_reference_case() {
        let dims = scale(832, 1216, 1.5).unwrap();
        assert_eq!((dims.width, dims.height), (1248, 1824));
    }

    #[test]
    fn test_scale_always_divisible_by_8() {
        let factors = [1.0, 1.25, 1.333, 1.5, 2.0, 2.7, 3.99, 5.5, 8.0];
        for width in (1..=1500).step_by(37) {
            for height in (1..=1500).step_by(53) {
                for &factor in &factors {
                    let dims = scale(width, height, factor).unwrap();
                    assert_eq!(dims.width % 8, 0, "{width}x{height} * {factor}");
                    assert_eq!(dims.height % 8, 0, "{width}x{height} * {factor}");
                    assert!(dims.is_aligned());
                }
            }
        }
    }

    #[test]
    fn test_scale_clamps_small_and_large() {
        let small = scale(3, 3, 1.0).unwrap();
        assert_eq!((small.width, small.height), (64, 64));

        let large = scale(4096, 4096, 4.0).unwrap();
        assert_eq!((large.width, large.height), (8192, 8192));
    }

    #[test]
    fn test_scale_rejects_bad_factor() {
        assert!(matches!(
            scale(512, 512, 0.0),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(scale(512, 512, -1.5).is_err());
        assert!(scale(512, 512, f64::NAN).is_err());
        assert!(scale(512, 512, 8.5).is_err());
    }

    #[test]
    fn test_scale_rejects_zero_side() {
        assert!(matches!(
            scale(0, 512, 2.0),
            Err(Error::UnsupportedDimensions { .. })
        ));
    }
}
