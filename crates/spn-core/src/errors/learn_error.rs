//! Structure-learning errors. Degenerate data is handled by fallbacks, not errors.

use super::GraphError;

/// Errors raised by structure learning on malformed input.
#[derive(Debug, thiserror::Error)]
pub enum LearnError {
    #[error("cannot learn over an empty scope")]
    EmptyScope,

    #[error("instance {instance} has no value for variable {var}")]
    MissingValue { instance: usize, var: usize },

    #[error("instance {instance}: variable {var} = {value} exceeds arity {categories}")]
    CategoryOutOfRange {
        instance: usize,
        var: usize,
        value: usize,
        categories: usize,
    },

    #[error("variable {var} declares zero categories")]
    ZeroArity { var: usize },

    #[error("cluster count must be at least 2, got {count}")]
    InvalidClusterCount { count: usize },

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
}

pub type LearnResult<T> = Result<T, LearnError>;
