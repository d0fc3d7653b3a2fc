//! Per-node memoization (DP) tables.
//!
//! A cache key is an evaluation context plus a numeric slot. Contexts
//! multiplex independent evaluations (soft vs. log-soft, correct vs. expected,
//! one slot per training example) onto the same shared subgraph.
//!
//! Keys are a caller contract: two unrelated evaluations that share a
//! `(context, slot)` pair read each other's cached values. Nothing detects this.

use rustc_hash::FxHashMap;

/// Evaluation context of a cached value or derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Context {
    /// Sum-product value.
    #[default]
    Soft,
    /// Sum-product value in log space.
    LogSoft,
    /// Max-product value.
    Max,
    /// Value under the correct (label + features) evidence.
    Correct,
    /// Value under the expected (features only) evidence.
    Expected,
    /// ∂S/∂node under the correct evidence.
    CorrectNode,
    /// ∂S/∂node under the expected evidence.
    ExpectedNode,
    /// ∂S/∂w under the correct evidence.
    CorrectWeight,
    /// ∂S/∂w under the expected evidence.
    ExpectedWeight,
}

/// Key into a node's DP or derivative table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CacheKey {
    pub context: Context,
    pub slot: u32,
}

impl CacheKey {
    pub const fn new(context: Context, slot: u32) -> Self {
        Self { context, slot }
    }

    pub const fn soft(slot: u32) -> Self {
        Self::new(Context::Soft, slot)
    }

    pub const fn log_soft(slot: u32) -> Self {
        Self::new(Context::LogSoft, slot)
    }

    pub const fn max(slot: u32) -> Self {
        Self::new(Context::Max, slot)
    }
}

/// A node's memoized values.
pub type DpTable = FxHashMap<CacheKey, f64>;
