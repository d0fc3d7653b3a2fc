use serde::{Deserialize, Serialize};

use super::defaults;

/// Evaluation settings applied to newly created nodes.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct InferenceConfig {
    /// Initial store (memoization) flag of new nodes. Default: true.
    pub store: Option<bool>,
}

impl InferenceConfig {
    pub fn effective_store(&self) -> bool {
        self.store.unwrap_or(defaults::DEFAULT_STORE)
    }
}
