//! Parameter training configuration.

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::types::InferenceMode;

/// Configuration for discriminative / generative weight updates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TrainingConfig {
    /// Gradient step size (eta). Default: 0.1.
    pub learning_rate: Option<f64>,
    /// L2 weight penalty propagated to every node. Default: 0.0.
    pub l2: Option<f64>,
    /// Examples aggregated per update. Default: 1.
    pub batch_size: Option<usize>,
    /// "soft" | "hard". Default: "soft".
    pub mode: Option<InferenceMode>,
}

impl TrainingConfig {
    pub fn effective_learning_rate(&self) -> f64 {
        self.learning_rate.unwrap_or(defaults::DEFAULT_LEARNING_RATE)
    }

    pub fn effective_l2(&self) -> f64 {
        self.l2.unwrap_or(defaults::DEFAULT_L2)
    }

    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.unwrap_or(defaults::DEFAULT_BATCH_SIZE)
    }

    pub fn effective_mode(&self) -> InferenceMode {
        self.mode.unwrap_or_default()
    }
}
