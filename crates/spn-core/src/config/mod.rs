//! Configuration system.
//! TOML-based, 3-layer resolution: env > file > defaults.

pub mod defaults;
pub mod inference_config;
pub mod learning_config;
pub mod observability_config;
pub mod spn_config;
pub mod training_config;

pub use inference_config::InferenceConfig;
pub use learning_config::LearningConfig;
pub use observability_config::ObservabilityConfig;
pub use spn_config::SpnConfig;
pub use training_config::TrainingConfig;
