//! Batch image saving node.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::image::{ImageFormat, OutputTarget, SaveImageRequest};
use crate::node::{InputSpec, NodeDescriptor, NodeInputs, OutputSpec, Value, ValueType};

use super::CATEGORY_IMAGE;

pub fn save_image_batch() -> NodeDescriptor {
    NodeDescriptor {
        name: "SaveImageBatch",
        display_name: "Save Image Batch",
        category: CATEGORY_IMAGE,
        description: "Write every image of a batch as PNG, JPEG or WebP with a unique filename.",
        inputs: vec![
            InputSpec::image("images"),
            InputSpec::string("filename_prefix")
                .default("ComfyUI")
                .tooltip("May contain subfolders, e.g. portraits/hero"),
            InputSpec::combo("format", ["png", "jpeg", "webp"]).default("png"),
            InputSpec::int("quality")
                .default(95)
                .range(1, 100)
                .tooltip("JPEG and WebP quality"),
            InputSpec::int("compression")
                .default(4)
                .range(0, 9)
                .tooltip("PNG compression level"),
            InputSpec::boolean("lossless")
                .default(false)
                .tooltip("Lossless WebP"),
            InputSpec::boolean("save_output")
                .default(true)
                .tooltip("Off writes previews to the temp directory"),
        ],
        outputs: vec![
            OutputSpec::new("paths", ValueType::String),
            OutputSpec::new("saved", ValueType::Int),
            OutputSpec::new("failed", ValueType::Int),
        ],
        output_node: true,
        entry: run_save_image_batch,
    }
}

fn run_save_image_batch(inputs: &NodeInputs, config: &Config) -> Result<Vec<Value>> {
    let images = inputs
        .image("images")
        .ok_or_else(|| Error::MissingInput {
            node: "SaveImageBatch".to_string(),
            name: "images".to_string(),
        })?;

    let format = ImageFormat::from_parts(
        inputs.string("format")?,
        inputs.u8("quality")?,
        inputs.u8("compression")?,
        inputs.boolean("lossless")?,
    )?;

    let report = SaveImageRequest {
        images,
        filename_prefix: inputs.string("filename_prefix")?,
        format,
        target: OutputTarget::from_save_output(inputs.boolean("save_output")?),
    }
    .save(config)?;

    let paths = report
        .saved
        .iter()
        .map(|saved| saved.path.display().to_string())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(vec![
        paths.into(),
        (report.saved.len() as u64).into(),
        (report.failed.len() as u64).into(),
    ])
}
