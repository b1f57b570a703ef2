//! Errors raised by nodes, the registry and the image saver.

use std::path::PathBuf;
use thiserror::Error;

/// Every failure a node can report to its host.
#[derive(Error, Debug)]
pub enum Error {
    /// An input image could not be opened or decoded.
    #[error("cannot read image {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// PNG or JPEG encoding of a batch entry failed.
    #[error("cannot write image {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// An encoder without a typed error (WebP) rejected the image.
    #[error("failed to encode image for {path}: {reason}")]
    ImageEncode { path: PathBuf, reason: String },

    /// Width or height cannot be scaled or encoded.
    #[error("dimensions {width}x{height} rejected: {reason}")]
    UnsupportedDimensions {
        width: u32,
        height: u32,
        reason: String,
    },

    /// A parameter is outside what the operation accepts.
    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// A required node input was not supplied.
    #[error("missing required input {name} for node {node}")]
    MissingInput { node: String, name: String },

    /// A node input had the wrong value type.
    #[error("input {name} expects {expected}, got {actual}")]
    InputType {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// No node is registered under the requested name.
    #[error("unknown node {0}")]
    UnknownNode(String),

    /// A node with the same name was registered twice.
    #[error("node {0} is already registered")]
    DuplicateNode(String),

    /// A grid axis could not be parsed or is empty.
    #[error("invalid grid axis {axis}: {reason}")]
    GridAxis { axis: String, reason: String },

    /// Creating a directory or writing an output file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tensors or node outputs do not have the expected layout.
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },
}

impl Error {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Shorthand used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
