//! Arena-resident node record and its stable handle.

use std::collections::BTreeSet;
use std::fmt;

use rustc_hash::FxHashMap;
use spn_core::types::collections::SmallVec4;

use crate::cache::{CacheKey, DpTable};
use crate::kind::NodeKind;

/// Stable handle to a node in a [`Network`](crate::Network).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A vertex of the network.
///
/// Values live in `dp` and obey the store flag. Derivatives live in their own
/// tables and are always kept, so gradient passes work with memoization off.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) children: SmallVec4<NodeId>,
    pub(crate) parents: Vec<NodeId>,
    pub(crate) scope: BTreeSet<usize>,
    pub(crate) dp: DpTable,
    pub(crate) node_grads: FxHashMap<CacheKey, f64>,
    /// Share of `node_grads` already pushed to the children.
    pub(crate) forwarded: FxHashMap<CacheKey, f64>,
    pub(crate) weight_grads: FxHashMap<CacheKey, Vec<f64>>,
    pub(crate) stores: bool,
    pub(crate) root: bool,
    pub(crate) label: Option<String>,
    pub(crate) l2: f64,
    pub(crate) updates: u64,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, scope: BTreeSet<usize>, stores: bool) -> Self {
        Self {
            kind,
            children: SmallVec4::new(),
            parents: Vec::new(),
            scope,
            dp: DpTable::default(),
            node_grads: FxHashMap::default(),
            forwarded: FxHashMap::default(),
            weight_grads: FxHashMap::default(),
            stores,
            root: false,
            label: None,
            l2: 0.0,
            updates: 0,
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    pub fn scope(&self) -> &BTreeSet<usize> {
        &self.scope
    }

    /// Sum weights, parallel to `children()`.
    pub fn weights(&self) -> Option<&[f64]> {
        self.kind.weights()
    }

    pub fn stores(&self) -> bool {
        self.stores
    }

    pub fn is_root(&self) -> bool {
        self.root
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn l2(&self) -> f64 {
        self.l2
    }

    /// Number of parameter-update applications this node has received.
    pub fn update_count(&self) -> u64 {
        self.updates
    }

    /// ∂S/∂node recorded under `key`, 0 if none.
    pub fn derivative(&self, key: CacheKey) -> f64 {
        self.node_grads.get(&key).copied().unwrap_or(0.0)
    }

    /// ∂S/∂wᵢ recorded under `key` (sum nodes only).
    pub fn weight_derivatives(&self, key: CacheKey) -> Option<&[f64]> {
        self.weight_grads.get(&key).map(Vec::as_slice)
    }

    pub(crate) fn scope_vec(&self) -> Vec<usize> {
        self.scope.iter().copied().collect()
    }
}
