//! Decoding image files into BHWC batches.

use std::path::Path;

use image::{DynamicImage, GenericImageView};
use ndarray::{s, Array4};

use crate::error::{Error, Result};

use super::{ImageTensor, RGB_CHANNELS};

/// Load an image from disk as a single-image batch.
///
/// # Errors
///
/// Returns an error if the image cannot be loaded.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ImageTensor> {
    let path = path.as_ref();

    let img = image::open(path).map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("loaded {} ({}x{})", path.display(), img.width(), img.height());

    Ok(image_to_tensor(&img))
}

/// Load several images into one batch.
///
/// # Errors
///
/// Returns an error if no paths are given, an image cannot be loaded, or the
/// images do not all share the first image's dimensions.
pub fn load_images<P: AsRef<Path>>(paths: &[P]) -> Result<ImageTensor> {
    let Some((first, rest)) = paths.split_first() else {
        return Err(Error::invalid("paths", "at least one image is required"));
    };

    let first = load_image(first)?;
    let (_, height, width, channels) = first.dim();

    let mut batch = Array4::<f32>::zeros((paths.len(), height, width, channels));
    batch.slice_mut(s![0..1, .., .., ..]).assign(&first);

    for (i, path) in rest.iter().enumerate() {
        let tensor = load_image(path)?;
        if tensor.dim() != first.dim() {
            let (_, h, w, _) = tensor.dim();
            return Err(Error::ShapeMismatch {
                expected: format!("{width}x{height}"),
                actual: format!("{w}x{h} in {}", path.as_ref().display()),
            });
        }
        batch.slice_mut(s![i + 1..i + 2, .., .., ..]).assign(&tensor);
    }

    Ok(batch)
}

/// Convert a `DynamicImage` to a one-image NHWC tensor with values in [0, 1].
#[must_use]
pub fn image_to_tensor(img: &DynamicImage) -> ImageTensor {
    let rgb = img.to_rgb8();
    let (width, height) = img.dimensions();
    let (width, height) = (width as usize, height as usize);

    let mut tensor = Array4::<f32>::zeros((1, height, width, RGB_CHANNELS));

    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..RGB_CHANNELS {
            tensor[[0, y as usize, x as usize, c]] = f32::from(pixel[c]) / 255.0;
        }
    }

    tensor
}
