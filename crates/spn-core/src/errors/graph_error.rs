//! Node graph errors: structural invariant violations are fatal to the call.

/// Errors raised by graph construction and validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("unknown node handle {index}")]
    UnknownNode { index: usize },

    #[error("edge {parent} -> {child} would create a cycle")]
    CycleDetected { parent: usize, child: usize },

    #[error("sum node {node} requires identical child scopes: expected {expected:?}, found {found:?}")]
    ScopeMismatch {
        node: usize,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("product node {node} children overlap on variables {vars:?}")]
    OverlappingScope { node: usize, vars: Vec<usize> },

    #[error("node {node} scope {found:?} is not the union of its children {expected:?}")]
    ScopeNotUnion {
        node: usize,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("leaf node {node} cannot have children")]
    LeafChildren { node: usize },

    #[error("node {node} accepts at most {limit} children")]
    ChildLimit { node: usize, limit: usize },

    #[error("sum node {node} requires a weight for every child")]
    MissingWeight { node: usize },

    #[error("node {node} is not a sum node and takes no weights")]
    UnexpectedWeight { node: usize },

    #[error("invalid weight {weight} on node {node}: must be finite and non-negative")]
    InvalidWeight { node: usize, weight: f64 },

    #[error("leaf over variable {var} needs a non-empty distribution")]
    EmptyDistribution { var: usize },

    #[error("invalid probability {prob} in leaf over variable {var}: must be finite and non-negative")]
    InvalidProbability { var: usize, prob: f64 },

    #[error("indicator value {value} out of range for variable {var} with {categories} categories")]
    IndicatorOutOfRange {
        var: usize,
        value: usize,
        categories: usize,
    },

    #[error("node {node} already has parents; adding this child would change its scope")]
    AttachedScopeChange { node: usize },

    #[error("graph contains {count} cycle(s)")]
    Cyclic { count: usize },
}

pub type GraphResult<T> = Result<T, GraphError>;
