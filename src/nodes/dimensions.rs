//! Dimension extraction and scaling nodes.

use crate::config::Config;
use crate::dimensions::{self, DimensionSource, MAX_SCALE_FACTOR, MIN_SCALE_FACTOR};
use crate::error::Result;
use crate::node::{InputSpec, NodeDescriptor, NodeInputs, OutputSpec, Value, ValueType};

use super::CATEGORY_DIMENSIONS;

pub fn image_dimensions() -> NodeDescriptor {
    NodeDescriptor {
        name: "ImageDimensions",
        display_name: "Image Dimensions",
        category: CATEGORY_DIMENSIONS,
        description: "Read width and height from an image or a latent.",
        inputs: vec![
            InputSpec::image("image").optional(),
            InputSpec::latent("latent").optional(),
        ],
        outputs: vec![
            OutputSpec::new("width", ValueType::Int),
            OutputSpec::new("height", ValueType::Int),
            OutputSpec::new("batch_size", ValueType::Int),
        ],
        output_node: false,
        entry: run_image_dimensions,
    }
}

fn run_image_dimensions(inputs: &NodeInputs, _config: &Config) -> Result<Vec<Value>> {
    let source = DimensionSource::select(inputs.image("image"), inputs.latent("latent"))?;
    let dims = source.dimensions()?;
    let batch = match source {
        DimensionSource::Image(t) | DimensionSource::Latent(t) => t.dim().0,
    };

    Ok(vec![
        dims.width.into(),
        dims.height.into(),
        (batch as u64).into(),
    ])
}

pub fn scale_dimensions() -> NodeDescriptor {
    NodeDescriptor {
        name: "ScaleDimensions",
        display_name: "Scale Dimensions",
        category: CATEGORY_DIMENSIONS,
        description: "Multiply image or latent dimensions by a factor, rounding to multiples of 8.",
        inputs: vec![
            InputSpec::float("scale_factor")
                .default(1.5)
                .range(MIN_SCALE_FACTOR, MAX_SCALE_FACTOR)
                .step(0.05),
            InputSpec::image("image").optional(),
            InputSpec::latent("latent").optional(),
        ],
        outputs: vec![
            OutputSpec::new("width", ValueType::Int),
            OutputSpec::new("height", ValueType::Int),
        ],
        output_node: false,
        entry: run_scale_dimensions,
    }
}

fn run_scale_dimensions(inputs: &NodeInputs, _config: &Config) -> Result<Vec<Value>> {
    let factor = inputs.float("scale_factor")?;
    let source = DimensionSource::select(inputs.image("image"), inputs.latent("latent"))?;
    let dims = source.dimensions()?;

    let scaled = dimensions::scale(dims.width, dims.height, factor)?;

    Ok(vec![scaled.width.into(), scaled.height.into()])
}
