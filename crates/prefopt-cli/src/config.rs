//! Input configuration for the command-line driver.

use std::path::Path;

use anyhow::Context;
use prefopt_core::{DpoConfig, PreferenceLogProbs};
use serde::{Deserialize, Serialize};

/// Log probs of the worked example: the policy favours the rejected response.
pub const EXAMPLE_SAMPLE: PreferenceLogProbs = PreferenceLogProbs {
    policy_chosen: -1.5,
    ref_chosen: -1.2,
    policy_rejected: -1.0,
    ref_rejected: -1.8,
};

fn example_sample() -> PreferenceLogProbs {
    EXAMPLE_SAMPLE
}

/// Combined configuration for a single evaluation.
///
/// ```yaml
/// dpo:
///   beta: 0.1
/// sample:
///   policy_chosen: -1.5
///   ref_chosen: -1.2
///   policy_rejected: -1.0
///   ref_rejected: -1.8
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    /// DPO hyperparameters.
    #[serde(default)]
    pub dpo: DpoConfig,

    /// Preference pair to evaluate. All four fields are required when present.
    #[serde(default = "example_sample")]
    pub sample: PreferenceLogProbs,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            dpo: DpoConfig::default(),
            sample: EXAMPLE_SAMPLE,
        }
    }
}

impl DemoConfig {
    /// Load a configuration from a YAML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_is_worked_example() {
        let config = DemoConfig::default();
        assert_eq!(config.dpo.beta, 0.1);
        assert_eq!(config.sample, EXAMPLE_SAMPLE);
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            "dpo:\n  beta: 0.5\nsample:\n  policy_chosen: -0.5\n  ref_chosen: -1.0\n  policy_rejected: -2.0\n  ref_rejected: -1.5\n",
        );

        let config = DemoConfig::from_file(file.path()).unwrap();
        assert_eq!(config.dpo.beta, 0.5);
        assert_eq!(config.sample, PreferenceLogProbs::new(-0.5, -1.0, -2.0, -1.5));
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let file = write_config("dpo:\n  beta: 0.25\n");

        let config = DemoConfig::from_file(file.path()).unwrap();
        assert_eq!(config.dpo.beta, 0.25);
        assert_eq!(config.sample, EXAMPLE_SAMPLE);
    }

    #[test]
    fn test_load_incomplete_sample_fails() {
        let file = write_config("sample:\n  policy_chosen: -0.5\n");
        assert!(DemoConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = DemoConfig::from_file(Path::new("/nonexistent/prefopt.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/prefopt.yaml"));
    }
}
