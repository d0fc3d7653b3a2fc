//! Top-level configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{InferenceConfig, LearningConfig, ObservabilityConfig, TrainingConfig};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`SPN_*`)
/// 2. Config file passed to [`SpnConfig::load`]
/// 3. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SpnConfig {
    pub learning: LearningConfig,
    pub training: TrainingConfig,
    pub inference: InferenceConfig,
    pub observability: ObservabilityConfig,
}

impl SpnConfig {
    /// Load configuration: defaults, then `path` (if given), then `SPN_*` env vars.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = path {
            Self::merge_toml_file(&mut config, path)?;
            tracing::debug!(path = %path.display(), "merged config file");
        }

        Self::apply_env_overrides(&mut config);
        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &SpnConfig) -> Result<(), ConfigError> {
        if let Some(s) = config.learning.significance {
            if !(s > 0.0 && s < 1.0) {
                return Err(ConfigError::ValidationFailed {
                    field: "learning.significance".to_string(),
                    message: "must be strictly between 0.0 and 1.0".to_string(),
                });
            }
        }
        if let Some(k) = config.learning.cluster_count {
            if k < 2 {
                return Err(ConfigError::ValidationFailed {
                    field: "learning.cluster_count".to_string(),
                    message: "must be at least 2".to_string(),
                });
            }
        }
        if let Some(eta) = config.training.learning_rate {
            if !(eta.is_finite() && eta > 0.0) {
                return Err(ConfigError::ValidationFailed {
                    field: "training.learning_rate".to_string(),
                    message: "must be a positive finite number".to_string(),
                });
            }
        }
        if let Some(l2) = config.training.l2 {
            if !(l2.is_finite() && l2 >= 0.0) {
                return Err(ConfigError::ValidationFailed {
                    field: "training.l2".to_string(),
                    message: "must be a non-negative finite number".to_string(),
                });
            }
        }
        if config.training.batch_size == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "training.batch_size".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut SpnConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: SpnConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins only where it has a `Some` value.
    fn merge(base: &mut SpnConfig, other: &SpnConfig) {
        // Learning
        if other.learning.cluster_count.is_some() {
            base.learning.cluster_count = other.learning.cluster_count;
        }
        if other.learning.significance.is_some() {
            base.learning.significance = other.learning.significance;
        }
        if other.learning.kmeans_max_iterations.is_some() {
            base.learning.kmeans_max_iterations = other.learning.kmeans_max_iterations;
        }

        // Training
        if other.training.learning_rate.is_some() {
            base.training.learning_rate = other.training.learning_rate;
        }
        if other.training.l2.is_some() {
            base.training.l2 = other.training.l2;
        }
        if other.training.batch_size.is_some() {
            base.training.batch_size = other.training.batch_size;
        }
        if other.training.mode.is_some() {
            base.training.mode = other.training.mode;
        }

        // Inference
        if other.inference.store.is_some() {
            base.inference.store = other.inference.store;
        }

        // Observability
        if other.observability.log_level.is_some() {
            base.observability.log_level = other.observability.log_level.clone();
        }
    }

    fn apply_env_overrides(config: &mut SpnConfig) {
        if let Ok(val) = std::env::var("SPN_LEARNING_CLUSTER_COUNT") {
            if let Ok(v) = val.parse::<usize>() {
                config.learning.cluster_count = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SPN_LEARNING_SIGNIFICANCE") {
            if let Ok(v) = val.parse::<f64>() {
                config.learning.significance = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SPN_TRAINING_LEARNING_RATE") {
            if let Ok(v) = val.parse::<f64>() {
                config.training.learning_rate = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SPN_TRAINING_L2") {
            if let Ok(v) = val.parse::<f64>() {
                config.training.l2 = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SPN_TRAINING_BATCH_SIZE") {
            if let Ok(v) = val.parse::<usize>() {
                config.training.batch_size = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SPN_TRAINING_MODE") {
            if let Ok(v) = val.parse() {
                config.training.mode = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SPN_INFERENCE_STORE") {
            if let Ok(v) = val.parse::<bool>() {
                config.inference.store = Some(v);
            }
        }
    }
}
