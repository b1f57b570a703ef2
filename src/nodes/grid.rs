//! XYZ parameter grid node.

use serde_json::Map;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::grid::{Axis, Grid};
use crate::node::{InputSpec, NodeDescriptor, NodeInputs, OutputSpec, Value, ValueType};

use super::CATEGORY_UTILS;

const AXES: [(&str, &str); 3] = [
    ("x_parameter", "x_values"),
    ("y_parameter", "y_values"),
    ("z_parameter", "z_values"),
];

pub fn xyz_grid_info() -> NodeDescriptor {
    let mut inputs = Vec::with_capacity(AXES.len() * 2 + 1);
    for (parameter, values) in AXES {
        inputs.push(InputSpec::string(parameter).default(""));
        inputs.push(
            InputSpec::string(values)
                .default("")
                .tooltip("Comma separated; ranges like 1-4 or 0.5-1.5 (+0.25)"),
        );
    }
    inputs.push(InputSpec::int("index").default(0).range(0, u32::MAX));

    NodeDescriptor {
        name: "XyzGridInfo",
        display_name: "XYZ Grid",
        category: CATEGORY_UTILS,
        description: "Enumerate a parameter grid and pick the combination for one run.",
        inputs,
        outputs: vec![
            OutputSpec::new("total", ValueType::Int),
            OutputSpec::new("combination", ValueType::String),
            OutputSpec::new("x", ValueType::String),
            OutputSpec::new("y", ValueType::String),
            OutputSpec::new("z", ValueType::String),
        ],
        output_node: false,
        entry: run_xyz_grid_info,
    }
}

fn run_xyz_grid_info(inputs: &NodeInputs, _config: &Config) -> Result<Vec<Value>> {
    let mut axes = Vec::new();
    // Position of each X/Y/Z slot in `axes`, if the slot is in use
    let mut slots = [None; 3];

    for (slot, (parameter, values)) in AXES.iter().enumerate() {
        let parameter = inputs.string(parameter)?.trim();
        if parameter.is_empty() {
            continue;
        }
        slots[slot] = Some(axes.len());
        axes.push(Axis::parse(parameter, inputs.string(values)?)?);
    }

    let grid = Grid::new(axes);
    let index = usize::try_from(inputs.int("index")?).unwrap_or(usize::MAX);
    let combination = grid.combination(index).ok_or_else(|| {
        Error::invalid("index", format!("{index} is past the last of {} runs", grid.len()))
    })?;

    let object: Map<String, serde_json::Value> = combination
        .iter()
        .map(|(name, value)| ((*name).to_string(), serde_json::json!(value)))
        .collect();

    let mut outputs = vec![
        (grid.len() as u64).into(),
        serde_json::Value::Object(object).to_string().into(),
    ];
    outputs.extend(slots.iter().map(|slot| {
        slot.map(|i| combination[i].1.to_string())
            .unwrap_or_default()
            .into()
    }));

    Ok(outputs)
}
