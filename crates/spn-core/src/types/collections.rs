//! Re-exports of performance-oriented collection types.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;
pub use std::collections::BTreeMap;

/// SmallVec sized for node fan-out (learned networks rarely exceed 4 children).
pub type SmallVec4<T> = SmallVec<[T; 4]>;
