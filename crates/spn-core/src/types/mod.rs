//! Shared value types: evidence, variables, inference mode, collections.

pub mod collections;
pub mod mode;
pub mod varset;

pub use mode::InferenceMode;
pub use varset::{Scope, VarSet, Variable};
