//! Runtime configuration.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::image::BatchFailurePolicy;

/// Prefix of the environment variables read by [`Config::from_env`].
pub const ENV_PREFIX: &str = "NODEKIT_";

/// Configuration shared by every node invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory receiving saved images.
    pub output_dir: PathBuf,

    /// Directory receiving preview images.
    pub temp_dir: PathBuf,

    /// What the batch saver does when a single image fails.
    pub failure_policy: BatchFailurePolicy,
}

impl Default for Config {
    fn default() -> Self {
        let base = dirs::cache_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            output_dir: PathBuf::from("output"),
            temp_dir: base.join("comfy-nodekit").join("temp"),
            failure_policy: BatchFailurePolicy::default(),
        }
    }
}

/// Environment overrides, all optional.
#[derive(Debug, Default, Deserialize)]
struct EnvOverrides {
    output_dir: Option<PathBuf>,
    temp_dir: Option<PathBuf>,
    failure_policy: Option<BatchFailurePolicy>,
}

impl Config {
    /// Configuration with explicit directories and the default failure policy.
    #[must_use]
    pub fn with_dirs(output_dir: impl Into<PathBuf>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            temp_dir: temp_dir.into(),
            failure_policy: BatchFailurePolicy::default(),
        }
    }

    /// Defaults overridden by `NODEKIT_OUTPUT_DIR`, `NODEKIT_TEMP_DIR` and
    /// `NODEKIT_FAILURE_POLICY` (`skip_and_report` or `abort_on_first_error`).
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let overrides = envy::prefixed(ENV_PREFIX)
            .from_env::<EnvOverrides>()
            .map_err(|err| Error::invalid("environment", err.to_string()))?;

        Ok(Self::default().merged(overrides))
    }

    fn merged(self, overrides: EnvOverrides) -> Self {
        Self {
            output_dir: overrides.output_dir.unwrap_or(self.output_dir),
            temp_dir: overrides.temp_dir.unwrap_or(self.temp_dir),
            failure_policy: overrides.failure_policy.unwrap_or(self.failure_policy),
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory is empty or both directories coincide.
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(Error::invalid("output_dir", "must not be empty"));
        }

        if self.temp_dir.as_os_str().is_empty() {
            return Err(Error::invalid("temp_dir", "must not be empty"));
        }

        if self.output_dir == self.temp_dir {
            return Err(Error::invalid(
                "temp_dir",
                "must differ from output_dir",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_shared_dir() {
        let config = Config::with_dirs("images", "images");
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(Config::with_dirs("", "tmp").validate().is_err());
    }

    #[test]
    fn test_merge_overrides() {
        let merged = Config::with_dirs("out", "tmp").merged(EnvOverrides {
            output_dir: Some(PathBuf::from("elsewhere")),
            temp_dir: None,
            failure_policy: Some(BatchFailurePolicy::AbortOnFirstError),
        });

        assert_eq!(merged.output_dir, PathBuf::from("elsewhere"));
        assert_eq!(merged.temp_dir, PathBuf::from("tmp"));
        assert_eq!(merged.failure_policy, BatchFailurePolicy::AbortOnFirstError);
    }

    #[test]
    fn test_policy_env_names() {
        let overrides: EnvOverrides = envy::from_iter([(
            "FAILURE_POLICY".to_string(),
            "abort_on_first_error".to_string(),
        )])
        .unwrap();
        assert_eq!(
            overrides.failure_policy,
            Some(BatchFailurePolicy::AbortOnFirstError)
        );
    }
}
