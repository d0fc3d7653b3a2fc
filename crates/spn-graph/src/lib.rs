//! # spn-graph
//!
//! The node graph runtime of a sum-product network. Nodes live in an arena
//! (`Network`) and are addressed by stable `NodeId` handles, so a node can be
//! shared by several parents without ownership cycles.
//! Memoized soft / log-soft / max-product inference, breadth-first derivative
//! propagation, and generative / discriminative weight updates all run over
//! the same arena using the iterative orderings in [`traversal`].

pub mod cache;
pub mod dag;
pub mod derive;
pub mod inference;
pub mod kind;
pub mod network;
pub mod node;
pub mod storer;
pub mod trainer;
pub mod traversal;
pub mod update;

pub use cache::{CacheKey, Context};
pub use derive::{DeriveCtx, DeriveKeys, Route};
pub use inference::EvalTable;
pub use kind::{Categorical, Indicator, NodeKind};
pub use network::Network;
pub use node::{Node, NodeId};
pub use storer::{DiscKeys, DiscStorer};
pub use trainer::DiscTrainer;
