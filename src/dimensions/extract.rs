//! Read width/height from image or latent tensors.

use crate::error::{Error, Result};
use crate::image::{ImageTensor, LatentTensor, LATENT_DOWNSCALE};

use super::Dimensions;

/// Where a node takes its source dimensions from.
///
/// The scale node accepts an image and a latent as mutually exclusive
/// optional inputs; the image wins when both are connected.
#[derive(Debug, Clone, Copy)]
pub enum DimensionSource<'a> {
    Image(&'a ImageTensor),
    Latent(&'a LatentTensor),
}

impl<'a> DimensionSource<'a> {
    /// Pick a source from the two optional inputs.
    ///
    /// # Errors
    ///
    /// Returns an error if neither input is supplied.
    pub fn select(
        image: Option<&'a ImageTensor>,
        latent: Option<&'a LatentTensor>,
    ) -> Result<Self> {
        match (image, latent) {
            (Some(image), Some(_)) => {
                tracing::warn!("both image and latent connected, using image dimensions");
                Ok(Self::Image(image))
            }
            (Some(image), None) => Ok(Self::Image(image)),
            (None, Some(latent)) => Ok(Self::Latent(latent)),
            (None, None) => Err(Error::invalid(
                "image/latent",
                "either an image or a latent input is required",
            )),
        }
    }

    /// Pixel dimensions of the selected source.
    ///
    /// # Errors
    ///
    /// Returns an error if the tensor has zero extent.
    pub fn dimensions(self) -> Result<Dimensions> {
        match self {
            Self::Image(image) => from_image(image),
            Self::Latent(latent) => from_latent(latent),
        }
    }
}

/// Dimensions of an image batch laid out as `(batch, height, width, channels)`.
///
/// # Errors
///
/// Returns an error if the batch is empty or a side has zero length.
pub fn from_image(image: &ImageTensor) -> Result<Dimensions> {
    let (batch, height, width, _channels) = image.dim();
    to_dimensions(batch, width, height, 1)
}

/// Pixel dimensions of a latent batch laid out as `(batch, channels, height, width)`.
///
/// # Errors
///
/// Returns an error if the batch is empty or a side has zero length.
pub fn from_latent(latent: &LatentTensor) -> Result<Dimensions> {
    let (batch, _channels, height, width) = latent.dim();
    to_dimensions(batch, width, height, LATENT_DOWNSCALE)
}

fn to_dimensions(batch: usize, width: usize, height: usize, multiplier: usize) -> Result<Dimensions> {
    let width_px = width.checked_mul(multiplier).and_then(|w| u32::try_from(w).ok());
    let height_px = height.checked_mul(multiplier).and_then(|h| u32::try_from(h).ok());

    match (width_px, height_px) {
        (Some(w), Some(h)) if batch > 0 && w > 0 && h > 0 => Ok(Dimensions::new(w, h)),
        _ => Err(Error::ShapeMismatch {
            expected: "non-empty batch with positive width and height".to_string(),
            actual: format!("batch {batch}, {width}x{height}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    #[test]
    fn test_from_image() {
        let image: ImageTensor = Array4::zeros((2, 1216, 832, 3));
        assert_eq!(from_image(&image).unwrap(), Dimensions::new(832, 1216));
    }

    #[test]
    fn test_from_latent() {
        let latent: LatentTensor = Array4::zeros((1, 4, 128, 96));
        assert_eq!(from_latent(&latent).unwrap(), Dimensions::new(768, 1024));
    }

    #[test]
    fn test_empty_batch() {
        let image: ImageTensor = Array4::zeros((0, 64, 64, 3));
        assert!(matches!(
            from_image(&image),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_select_requires_a_source() {
        assert!(matches!(
            DimensionSource::select(None, None),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_select_prefers_image() {
        let image: ImageTensor = Array4::zeros((1, 512, 256, 3));
        let latent: LatentTensor = Array4::zeros((1, 4, 8, 8));
        let dims = DimensionSource::select(Some(&image), Some(&latent))
            .unwrap()
            .dimensions()
            .unwrap();
        assert_eq!(dims, Dimensions::new(256, 512));
    }
}
