//! Structure learning configuration.

use serde::{Deserialize, Serialize};

use super::defaults;

/// Configuration for the structure learner.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LearningConfig {
    /// Number of instance clusters tried when no independence is found. Default: 2.
    pub cluster_count: Option<usize>,
    /// p-value below which two variables are considered dependent. Default: 0.05.
    pub significance: Option<f64>,
    /// Lloyd iteration cap for k-means. Default: 100.
    pub kmeans_max_iterations: Option<usize>,
}

impl LearningConfig {
    pub fn effective_cluster_count(&self) -> usize {
        self.cluster_count.unwrap_or(defaults::DEFAULT_CLUSTER_COUNT)
    }

    pub fn effective_significance(&self) -> f64 {
        self.significance.unwrap_or(defaults::DEFAULT_SIGNIFICANCE)
    }

    pub fn effective_kmeans_max_iterations(&self) -> usize {
        self.kmeans_max_iterations
            .unwrap_or(defaults::DEFAULT_KMEANS_MAX_ITERATIONS)
    }
}
