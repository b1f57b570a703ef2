//! Sampler and scheduler allow-lists, and the combo validator.

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Sampling algorithms the host's `KSampler` accepts.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter,
)]
pub enum Sampler {
    #[default]
    #[strum(to_string = "euler")]
    Euler,
    #[strum(to_string = "euler_cfg_pp")]
    EulerCfgPp,
    #[strum(to_string = "euler_ancestral")]
    EulerAncestral,
    #[strum(to_string = "euler_ancestral_cfg_pp")]
    EulerAncestralCfgPp,
    #[strum(to_string = "heun")]
    Heun,
    #[strum(to_string = "heunpp2")]
    HeunPp2,
    #[strum(to_string = "dpm_2")]
    Dpm2,
    #[strum(to_string = "dpm_2_ancestral")]
    Dpm2Ancestral,
    #[strum(to_string = "lms")]
    Lms,
    #[strum(to_string = "dpm_fast")]
    DpmFast,
    #[strum(to_string = "dpm_adaptive")]
    DpmAdaptive,
    #[strum(to_string = "dpmpp_2s_ancestral")]
    DpmPp2sAncestral,
    #[strum(to_string = "dpmpp_2s_ancestral_cfg_pp")]
    DpmPp2sAncestralCfgPp,
    #[strum(to_string = "dpmpp_sde")]
    DpmPpSde,
    #[strum(to_string = "dpmpp_sde_gpu")]
    DpmPpSdeGpu,
    #[strum(to_string = "dpmpp_2m")]
    DpmPp2m,
    #[strum(to_string = "dpmpp_2m_cfg_pp")]
    DpmPp2mCfgPp,
    #[strum(to_string = "dpmpp_2m_sde")]
    DpmPp2mSde,
    #[strum(to_string = "dpmpp_2m_sde_gpu")]
    DpmPp2mSdeGpu,
    #[strum(to_string = "dpmpp_3m_sde")]
    DpmPp3mSde,
    #[strum(to_string = "dpmpp_3m_sde_gpu")]
    DpmPp3mSdeGpu,
    #[strum(to_string = "ddpm")]
    Ddpm,
    #[strum(to_string = "lcm")]
    Lcm,
    #[strum(to_string = "ipndm")]
    Ipndm,
    #[strum(to_string = "ipndm_v")]
    IpndmV,
    #[strum(to_string = "deis")]
    Deis,
    #[strum(to_string = "res_multistep")]
    ResMultistep,
    #[strum(to_string = "gradient_estimation")]
    GradientEstimation,
    #[strum(to_string = "ddim")]
    Ddim,
    #[strum(to_string = "uni_pc")]
    UniPc,
    #[strum(to_string = "uni_pc_bh2")]
    UniPcBh2,
}

/// Noise schedules the host's `KSampler` accepts.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Scheduler {
    #[default]
    Normal,
    Karras,
    Exponential,
    SgmUniform,
    Simple,
    DdimUniform,
    Beta,
    LinearQuadratic,
    KlOptimal,
}

/// Step count bounds.
pub const MIN_STEPS: i64 = 1;
pub const MAX_STEPS: i64 = 10_000;

/// Classifier-free guidance bounds.
pub const MIN_CFG: f64 = 0.0;
pub const MAX_CFG: f64 = 100.0;

/// Defaults used when an input cannot be salvaged.
pub const DEFAULT_STEPS: i64 = 20;
pub const DEFAULT_CFG: f64 = 7.0;

/// A validated sampler setup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplerConfig {
    pub sampler: String,
    pub scheduler: String,
    pub steps: i64,
    pub cfg: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sampler: Sampler::default().to_string(),
            scheduler: Scheduler::default().to_string(),
            steps: DEFAULT_STEPS,
            cfg: DEFAULT_CFG,
        }
    }
}

/// Names of every known sampler, in display order.
#[must_use]
pub fn sampler_names() -> Vec<String> {
    Sampler::iter().map(|s| s.to_string()).collect()
}

/// Names of every known scheduler, in display order.
#[must_use]
pub fn scheduler_names() -> Vec<String> {
    Scheduler::iter().map(|s| s.to_string()).collect()
}

/// Check a sampler/scheduler/steps/cfg tuple.
///
/// Unknown names are replaced individually by the default sampler (`euler`)
/// or scheduler (`normal`). Steps and cfg are clamped into their ranges; a
/// non-finite cfg becomes [`DEFAULT_CFG`].
#[must_use]
pub fn validate_combo(sampler: &str, scheduler: &str, steps: i64, cfg: f64) -> SamplerConfig {
    let sampler = sampler.parse::<Sampler>().unwrap_or_else(|_| {
        let fallback = Sampler::default();
        tracing::warn!("unknown sampler {sampler:?}, using {fallback}");
        fallback
    });

    let scheduler = scheduler.parse::<Scheduler>().unwrap_or_else(|_| {
        let fallback = Scheduler::default();
        tracing::warn!("unknown scheduler {scheduler:?}, using {fallback}");
        fallback
    });

    let clamped_steps = steps.clamp(MIN_STEPS, MAX_STEPS);
    if clamped_steps != steps {
        tracing::warn!("steps {steps} out of range, clamped to {clamped_steps}");
    }

    let clamped_cfg = if cfg.is_finite() {
        cfg.clamp(MIN_CFG, MAX_CFG)
    } else {
        DEFAULT_CFG
    };

    SamplerConfig {
        sampler: sampler.to_string(),
        scheduler: scheduler.to_string(),
        steps: clamped_steps,
        cfg: clamped_cfg,
    }
}
