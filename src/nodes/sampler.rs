//! Sampler/scheduler settings node.

use crate::config::Config;
use crate::error::Result;
use crate::node::{InputSpec, NodeDescriptor, NodeInputs, OutputSpec, Value, ValueType};
use crate::sampler::{
    self, Sampler, Scheduler, DEFAULT_CFG, DEFAULT_STEPS, MAX_CFG, MAX_STEPS, MIN_CFG, MIN_STEPS,
};

use super::CATEGORY_SAMPLING;

pub fn sampler_scheduler_combo() -> NodeDescriptor {
    NodeDescriptor {
        name: "SamplerSchedulerCombo",
        display_name: "Sampler / Scheduler Combo",
        category: CATEGORY_SAMPLING,
        description: "Bundle sampler settings, replacing unknown names with safe defaults.",
        inputs: vec![
            InputSpec::combo("sampler", sampler::sampler_names())
                .default(Sampler::default().to_string()),
            InputSpec::combo("scheduler", sampler::scheduler_names())
                .default(Scheduler::default().to_string()),
            InputSpec::int("steps")
                .default(DEFAULT_STEPS)
                .range(MIN_STEPS, MAX_STEPS)
                .advisory_range(),
            InputSpec::float("cfg")
                .default(DEFAULT_CFG)
                .range(MIN_CFG, MAX_CFG)
                .step(0.1)
                .advisory_range(),
        ],
        outputs: vec![
            OutputSpec::new("sampler", ValueType::String),
            OutputSpec::new("scheduler", ValueType::String),
            OutputSpec::new("steps", ValueType::Int),
            OutputSpec::new("cfg", ValueType::Float),
        ],
        output_node: false,
        entry: run_sampler_scheduler_combo,
    }
}

fn run_sampler_scheduler_combo(inputs: &NodeInputs, _config: &Config) -> Result<Vec<Value>> {
    let steps = inputs.int("steps")?;
    // Saturate before narrowing so huge values still clamp to the maximum
    let steps = i64::try_from(steps).unwrap_or(if steps < 0 { i64::MIN } else { i64::MAX });

    let combo = sampler::validate_combo(
        inputs.string("sampler")?,
        inputs.string("scheduler")?,
        steps,
        inputs.float("cfg")?,
    );

    Ok(vec![
        combo.sampler.into(),
        combo.scheduler.into(),
        combo.steps.into(),
        combo.cfg.into(),
    ])
}
