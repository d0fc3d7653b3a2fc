//! Error handling for the SPN workspace.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod graph_error;
pub mod learn_error;

pub use config_error::ConfigError;
pub use graph_error::{GraphError, GraphResult};
pub use learn_error::{LearnError, LearnResult};
