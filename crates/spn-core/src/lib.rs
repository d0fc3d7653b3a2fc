//! # spn-core
//!
//! Foundation crate for the sum-product network workspace.
//! Defines the evidence and variable types, errors, config, and tracing setup.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod errors;
pub mod tracing;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::SpnConfig;
pub use errors::{ConfigError, GraphError, LearnError};
pub use types::{InferenceMode, Scope, VarSet, Variable};
