//! Batch image saving.
//!
//! Each image in a batch is encoded in memory first and then written to a
//! file created with `create_new`, bumping a sequence number on collision, so
//! an existing file is never overwritten.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageBuffer, Rgb};
use ndarray::ArrayView3;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::config::Config;
use crate::error::{Error, Result};

use super::ImageTensor;

/// Highest sequence number tried before giving up on a unique filename.
const MAX_SEQUENCE: u32 = 99_999;

/// Output encoding and its quality knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImageFormat {
    /// Lossless PNG, compression level 0-9.
    Png { compression: u8 },
    /// JPEG, quality 1-100.
    Jpeg { quality: u8 },
    /// WebP, quality 1-100, optionally lossless.
    WebP { quality: u8, lossless: bool },
}

impl Default for ImageFormat {
    fn default() -> Self {
        Self::Png { compression: 4 }
    }
}

impl ImageFormat {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Png { .. } => "png",
            Self::Jpeg { .. } => "jpg",
            Self::WebP { .. } => "webp",
        }
    }

    /// Build a format from its name and the generic knobs exposed by the node.
    ///
    /// `quality` applies to JPEG and WebP, `compression` to PNG.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown format name.
    pub fn from_parts(name: &str, quality: u8, compression: u8, lossless: bool) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png { compression }),
            "jpg" | "jpeg" => Ok(Self::Jpeg { quality }),
            "webp" => Ok(Self::WebP { quality, lossless }),
            other => Err(Error::invalid(
                "format",
                format!("unknown format {other:?}, expected png, jpeg or webp"),
            )),
        }
    }

    /// Validate the quality knob for this format.
    ///
    /// # Errors
    ///
    /// Returns an error if the knob is out of range.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Png { compression } if compression > 9 => {
                Err(Error::invalid("compression", "must be between 0 and 9"))
            }
            Self::Jpeg { quality } | Self::WebP { quality, .. } if !(1..=100).contains(&quality) => {
                Err(Error::invalid("quality", "must be between 1 and 100"))
            }
            _ => Ok(()),
        }
    }
}

/// Which configured directory receives the files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum OutputTarget {
    /// Persistent output directory.
    #[default]
    Output,
    /// Scratch directory for previews.
    Preview,
}

impl OutputTarget {
    /// `true` selects the output directory, `false` the preview directory.
    #[must_use]
    pub const fn from_save_output(save_output: bool) -> Self {
        if save_output {
            Self::Output
        } else {
            Self::Preview
        }
    }
}

/// What to do when one image in a batch cannot be written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BatchFailurePolicy {
    /// Log the failure, record it in the report and continue.
    #[default]
    SkipAndReport,
    /// Return the first failure as the call's error.
    AbortOnFirstError,
}

/// A request to write every image of a batch.
#[derive(Debug, Clone)]
pub struct SaveImageRequest<'a> {
    pub images: &'a ImageTensor,
    /// File name stem, optionally prefixed with `/`-separated subfolders.
    pub filename_prefix: &'a str,
    pub format: ImageFormat,
    pub target: OutputTarget,
}

/// Metadata of a written file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedImage {
    pub path: PathBuf,
    pub filename: String,
    pub subfolder: String,
    pub size_bytes: u64,
    pub width: u32,
    pub height: u32,
    pub format: &'static str,
}

/// An image that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedImage {
    pub index: usize,
    pub error: String,
}

/// Outcome of saving a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    pub saved: Vec<SavedImage>,
    pub failed: Vec<FailedImage>,
}

impl SaveImageRequest<'_> {
    /// Encode and write every image in the batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the format knobs or the prefix are invalid, the
    /// target directory cannot be created, or (with
    /// [`BatchFailurePolicy::AbortOnFirstError`]) any single image fails.
    pub fn save(&self, config: &Config) -> Result<SaveReport> {
        self.format.validate()?;

        let (subfolder, stem) = split_prefix(self.filename_prefix)?;
        let base = match self.target {
            OutputTarget::Output => &config.output_dir,
            OutputTarget::Preview => &config.temp_dir,
        };
        let dir = base.join(&subfolder);
        fs::create_dir_all(&dir)?;

        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
        let mut sequence = 0;
        let mut report = SaveReport::default();

        for (index, image) in self.images.outer_iter().enumerate() {
            match self.save_one(image, &dir, &stem, &timestamp, &mut sequence) {
                Ok(mut saved) => {
                    saved.subfolder = subfolder.to_string_lossy().replace('\\', "/");
                    tracing::info!(
                        "saved {} ({}x{}, {} bytes)",
                        saved.path.display(),
                        saved.width,
                        saved.height,
                        saved.size_bytes
                    );
                    report.saved.push(saved);
                }
                Err(err) => match config.failure_policy {
                    BatchFailurePolicy::AbortOnFirstError => return Err(err),
                    BatchFailurePolicy::SkipAndReport => {
                        tracing::warn!("skipping image {index} of batch: {err}");
                        report.failed.push(FailedImage {
                            index,
                            error: err.to_string(),
                        });
                    }
                },
            }
        }

        Ok(report)
    }

    fn save_one(
        &self,
        image: ArrayView3<'_, f32>,
        dir: &Path,
        stem: &str,
        timestamp: &str,
        sequence: &mut u32,
    ) -> Result<SavedImage> {
        let rgb = tensor_to_image(image)?;
        let (width, height) = rgb.dimensions();

        let (path, file) = create_unique(dir, stem, timestamp, self.format.extension(), sequence)?;

        let encoded = encode(DynamicImage::ImageRgb8(rgb), self.format, &path);
        let bytes = write_or_remove(&path, file, encoded)?;

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(SavedImage {
            size_bytes: bytes.len() as u64,
            path,
            filename,
            subfolder: String::new(),
            width,
            height,
            format: self.format.extension(),
        })
    }
}

/// Split `dir/sub/name` into a relative subfolder and a file stem.
fn split_prefix(prefix: &str) -> Result<(PathBuf, String)> {
    let normalized = prefix.trim().replace('\\', "/");
    if normalized.starts_with('/') {
        return Err(Error::invalid("filename_prefix", "must be a relative path"));
    }

    let mut parts: Vec<&str> = Vec::new();
    for part in normalized.split('/') {
        match Path::new(part).components().next() {
            None | Some(Component::CurDir) => {}
            Some(Component::Normal(_)) => parts.push(part),
            Some(_) => {
                return Err(Error::invalid(
                    "filename_prefix",
                    "must not leave the target directory",
                ))
            }
        }
    }

    let Some((stem, folders)) = parts.split_last() else {
        return Err(Error::invalid("filename_prefix", "must not be empty"));
    };

    Ok((folders.iter().collect(), (*stem).to_string()))
}

/// Create `{stem}_{timestamp}_{seq}.{ext}` exclusively, advancing `sequence`.
fn create_unique(
    dir: &Path,
    stem: &str,
    timestamp: &str,
    extension: &str,
    sequence: &mut u32,
) -> Result<(PathBuf, fs::File)> {
    while *sequence <= MAX_SEQUENCE {
        let path = dir.join(format!("{stem}_{timestamp}_{:05}.{extension}", *sequence));
        *sequence += 1;

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {}
            Err(err) => return Err(err.into()),
        }
    }

    Err(Error::invalid(
        "filename_prefix",
        format!("no free filename left for {stem}_{timestamp} in {}", dir.display()),
    ))
}

/// Write encoded bytes into the freshly created file at `path`.
///
/// On an encoding or write error the file is removed so no empty or
/// truncated image is left behind.
fn write_or_remove<W: Write>(path: &Path, mut file: W, encoded: Result<Vec<u8>>) -> Result<Vec<u8>> {
    let written = encoded.and_then(|bytes| {
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(bytes)
    });

    if written.is_err() {
        drop(file);
        let _ = fs::remove_file(path);
    }
    written
}

/// Encode an image into memory.
fn encode(img: DynamicImage, format: ImageFormat, path: &Path) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let save_err = |source| Error::ImageSave {
        path: path.to_path_buf(),
        source,
    };

    match format {
        ImageFormat::Png { compression } => {
            let encoder =
                PngEncoder::new_with_quality(&mut bytes, png_compression(compression), FilterType::Adaptive);
            img.write_with_encoder(encoder).map_err(save_err)?;
        }
        ImageFormat::Jpeg { quality } => {
            let encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
            img.write_with_encoder(encoder).map_err(save_err)?;
        }
        ImageFormat::WebP { quality, lossless } => {
            let rgb = img.to_rgb8();
            let encoded = webp::Encoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height())
                .encode_simple(lossless, f32::from(quality))
                .map_err(|err| Error::ImageEncode {
                    path: path.to_path_buf(),
                    reason: format!("{err:?}"),
                })?;
            bytes.extend_from_slice(&encoded);
        }
    }

    Ok(bytes)
}

/// Pass a 0-9 zlib-style level straight to the PNG encoder. Level 0 stores
/// the image data uncompressed.
const fn png_compression(level: u8) -> CompressionType {
    match level {
        0 => CompressionType::Uncompressed,
        _ => CompressionType::Level(level),
    }
}

/// Convert one HWC image with values in [0, 1] to an RGB image.
///
/// Grayscale images are replicated into all channels; an alpha channel is
/// dropped.
#[allow(clippy::cast_possible_truncation)]
fn tensor_to_image(image: ArrayView3<'_, f32>) -> Result<ImageBuffer<Rgb<u8>, Vec<u8>>> {
    let (height, width, channels) = image.dim();

    let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else {
        return Err(Error::ShapeMismatch {
            expected: "image sides that fit in u32".to_string(),
            actual: format!("{width}x{height}"),
        });
    };

    if w == 0 || h == 0 {
        return Err(Error::UnsupportedDimensions {
            width: w,
            height: h,
            reason: "image is empty".to_string(),
        });
    }

    let channel_map: [usize; 3] = match channels {
        1 => [0, 0, 0],
        3 | 4 => [0, 1, 2],
        _ => {
            return Err(Error::ShapeMismatch {
                expected: "1, 3 or 4 channels".to_string(),
                actual: format!("{channels} channels"),
            })
        }
    };

    Ok(ImageBuffer::from_fn(w, h, |x, y| {
        let (x, y) = (x as usize, y as usize);
        Rgb(channel_map.map(|c| denormalize(image[[y, x, c]])))
    }))
}

/// Denormalize a value from [0, 1] to [0, 255] with clamping.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn denormalize(value: f32) -> u8 {
    // NaN saturates to 0 in the cast
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}
