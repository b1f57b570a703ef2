//! Model-native resolution preset node.

use crate::config::Config;
use crate::dimensions::{MAX_DIMENSION, MIN_DIMENSION};
use crate::error::Result;
use crate::node::{InputSpec, NodeDescriptor, NodeInputs, OutputSpec, Value, ValueType};
use crate::presets::{self, LABELS};

use super::CATEGORY_DIMENSIONS;

pub fn preset_resolution() -> NodeDescriptor {
    NodeDescriptor {
        name: "PresetResolution",
        display_name: "Preset Resolution",
        category: CATEGORY_DIMENSIONS,
        description: "Pick a model-native resolution, or pass custom dimensions through.",
        inputs: vec![
            InputSpec::combo("preset", LABELS.iter().cloned()).default(presets::CUSTOM_LABEL),
            InputSpec::int("custom_width")
                .default(1024)
                .range(MIN_DIMENSION, MAX_DIMENSION)
                .advisory_range()
                .step(8.0),
            InputSpec::int("custom_height")
                .default(1024)
                .range(MIN_DIMENSION, MAX_DIMENSION)
                .advisory_range()
                .step(8.0),
            InputSpec::boolean("swap")
                .default(false)
                .tooltip("Exchange width and height"),
        ],
        outputs: vec![
            OutputSpec::new("width", ValueType::Int),
            OutputSpec::new("height", ValueType::Int),
            OutputSpec::new("label", ValueType::String),
        ],
        output_node: false,
        entry: run_preset_resolution,
    }
}

fn run_preset_resolution(inputs: &NodeInputs, _config: &Config) -> Result<Vec<Value>> {
    let label = inputs.string("preset")?;
    let preset = presets::find(label);

    // Custom sides only matter without a matching preset
    let custom_width = custom_side(inputs, "custom_width", preset.is_none())?;
    let custom_height = custom_side(inputs, "custom_height", preset.is_none())?;
    let mut dims = presets::resolve(label, custom_width, custom_height);

    if inputs.boolean("swap")? {
        dims = dims.swapped();
    }

    let label = preset.map_or_else(|| presets::CUSTOM_LABEL.to_string(), |p| p.label());

    Ok(vec![dims.width.into(), dims.height.into(), label.into()])
}

/// Clamp a custom side into the supported dimension range.
fn custom_side(inputs: &NodeInputs, name: &str, used: bool) -> Result<u32> {
    let raw = inputs.int(name)?;
    let side = raw.clamp(MIN_DIMENSION.into(), MAX_DIMENSION.into());
    if used && side != raw {
        tracing::warn!("{name} {raw} is outside [{MIN_DIMENSION}, {MAX_DIMENSION}], using {side}");
    }
    // Within [MIN_DIMENSION, MAX_DIMENSION] after clamping
    Ok(u32::try_from(side).unwrap_or(MAX_DIMENSION))
}
