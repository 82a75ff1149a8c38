//! Search configuration.

use pt_types::{ParameterBounds, TuneResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Range used when drawing a restart's initial degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DegreeSampling {
    /// `[degree_min, degree_max)`: the upper bound is never drawn, although
    /// neighbor moves may still reach it.
    #[default]
    HalfOpen,
    /// `[degree_min, degree_max]`.
    Inclusive,
}

/// What to do when the classifier fails for a parameter pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Score the candidate `-inf` so it is never adopted and never becomes best.
    #[default]
    Reject,
    /// Stop the whole search with the evaluation error.
    Abort,
}

/// Top-level configuration for one search run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SearchConfig {
    /// Search-space bounds and neighbor step sizes.
    pub bounds: ParameterBounds,

    pub degree_sampling: DegreeSampling,

    pub failure_policy: FailurePolicy,

    /// Seed for restart sampling. `None` draws from OS entropy, so every run
    /// may land on a different answer.
    pub seed: Option<u64>,
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bounds(mut self, bounds: ParameterBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_degree_sampling(mut self, sampling: DegreeSampling) -> Self {
        self.degree_sampling = sampling;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> TuneResult<()> {
        self.bounds.validate()
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> TuneResult<Self> {
        let path = path.as_ref();
        tracing::info!("Loading search configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pt_types::TuneError;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.degree_sampling, DegreeSampling::HalfOpen);
        assert_eq!(config.failure_policy, FailurePolicy::Reject);
        assert_eq!(config.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_chain() {
        let config = SearchConfig::new()
            .with_seed(9)
            .with_degree_sampling(DegreeSampling::Inclusive)
            .with_failure_policy(FailurePolicy::Abort);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.degree_sampling, DegreeSampling::Inclusive);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn partial_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"seed": 3, "degree_sampling": "inclusive", "bounds": {{"c_max": 10.0}}}}"#
        )
        .unwrap();

        let config = SearchConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.degree_sampling, DegreeSampling::Inclusive);
        assert_eq!(config.bounds.c_max, 10.0);
        assert_eq!(config.bounds.c_min, 0.5);
        assert_eq!(config.failure_policy, FailurePolicy::Reject);
    }

    #[test]
    fn invalid_json_bounds_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"bounds": {{"degree_min": 9, "degree_max": 2}}}}"#).unwrap();
        let err = SearchConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, TuneError::Config(_)));
    }
}
