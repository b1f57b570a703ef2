//! Image and latent tensors, loading, and batch saving.

mod load;
mod save;

pub use load::{image_to_tensor, load_image, load_images};
pub use save::{
    BatchFailurePolicy, FailedImage, ImageFormat, OutputTarget, SaveImageRequest, SaveReport,
    SavedImage,
};

use ndarray::Array4;

/// Image batch in NHWC format (batch, height, width, channels).
/// Values are in the [0, 1] range, matching the host's IMAGE type.
pub type ImageTensor = Array4<f32>;

/// Latent batch in NCHW format (batch, channels, height / 8, width / 8).
pub type LatentTensor = Array4<f32>;

/// Pixel size of one latent cell.
pub const LATENT_DOWNSCALE: usize = 8;

/// Number of channels in RGB images.
pub const RGB_CHANNELS: usize = 3;
