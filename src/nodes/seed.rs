//! Seed node with after-run seed control.

use strum::IntoEnumIterator;

use crate::config::Config;
use crate::error::Result;
use crate::node::{InputSpec, NodeDescriptor, NodeInputs, OutputSpec, Value, ValueType};
use crate::seed::{self, SeedControl, DEFAULT_SEED, MAX_SEED};

use super::CATEGORY_UTILS;

pub fn seed_generator() -> NodeDescriptor {
    NodeDescriptor {
        name: "SeedGenerator",
        display_name: "Seed",
        category: CATEGORY_UTILS,
        description: "Validate a seed and compute the seed for the next queued run.",
        inputs: vec![
            InputSpec::int("seed")
                .default(DEFAULT_SEED)
                .range(0, MAX_SEED)
                .advisory_range()
                .tooltip("Out-of-range seeds fall back to the default seed"),
            InputSpec::combo(
                "control_after_generate",
                SeedControl::iter().map(|c| c.to_string()),
            )
            .default(SeedControl::default().to_string()),
        ],
        outputs: vec![
            OutputSpec::new("seed", ValueType::Int),
            OutputSpec::new("next_seed", ValueType::Int),
        ],
        output_node: false,
        entry: run_seed_generator,
    }
}

fn run_seed_generator(inputs: &NodeInputs, _config: &Config) -> Result<Vec<Value>> {
    let seed = seed::sanitize(inputs.int("seed")?);

    let control_name = inputs.string("control_after_generate")?;
    let control = control_name.parse::<SeedControl>().unwrap_or_else(|_| {
        tracing::warn!("unknown seed control {control_name:?}, keeping the seed fixed");
        SeedControl::Fixed
    });

    Ok(vec![seed.into(), control.next(seed).into()])
}
