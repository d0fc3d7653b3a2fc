//! # spn-learn
//!
//! Structure learning for sum-product networks. `GensLearner` recursively
//! splits the variable scope by independence (product nodes) and the
//! instances by clustering (sum nodes) until single variables remain.
//! The independence test and clusterer are trait seams with chi-square and
//! k-means defaults.

pub mod clustering;
pub mod columns;
pub mod gens;
pub mod independence;

pub use clustering::{Clusterer, KMeans};
pub use columns::VarColumn;
pub use gens::GensLearner;
pub use independence::{ChiSquareTest, IndependenceTest};
