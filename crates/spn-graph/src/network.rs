//! The node arena: construction, edges, scope bookkeeping, and DP tables.

use std::collections::BTreeSet;
use std::ops::Index;

use spn_core::config::InferenceConfig;
use spn_core::errors::{GraphError, GraphResult};
use spn_core::Variable;

use crate::cache::CacheKey;
use crate::dag;
use crate::kind::{Categorical, Indicator, NodeKind};
use crate::node::{Node, NodeId};
use crate::traversal;

/// Arena owning every node of one or more sum-product networks.
///
/// Handles are never invalidated: nodes are only ever appended. Indexing with a
/// handle from another arena panics, like indexing a `Vec` out of bounds.
#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) nodes: Vec<Node>,
    default_store: bool,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<NodeId> for Network {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

impl Network {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            default_store: true,
        }
    }

    /// Arena whose new nodes start with the configured store flag.
    pub fn with_config(config: &InferenceConfig) -> Self {
        Self {
            nodes: Vec::new(),
            default_store: config.effective_store(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }

    fn check(&self, id: NodeId) -> GraphResult<()> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(GraphError::UnknownNode { index: id.index() })
        }
    }

    fn push(&mut self, kind: NodeKind, scope: BTreeSet<usize>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::new(kind, scope, self.default_store));
        id
    }

    // ---- Constructors ----

    /// Categorical leaf over `var`.
    pub fn leaf(&mut self, var: usize, probs: Vec<f64>) -> GraphResult<NodeId> {
        if probs.is_empty() {
            return Err(GraphError::EmptyDistribution { var });
        }
        if let Some(&prob) = probs.iter().find(|p| !(p.is_finite() && **p >= 0.0)) {
            return Err(GraphError::InvalidProbability { var, prob });
        }
        Ok(self.push(
            NodeKind::Leaf(Categorical { var, probs }),
            BTreeSet::from([var]),
        ))
    }

    /// Sum node without children; attach them with [`Network::add_weighted_child`].
    pub fn sum(&mut self) -> NodeId {
        self.push(
            NodeKind::Sum {
                weights: Vec::new(),
            },
            BTreeSet::new(),
        )
    }

    pub fn product(&mut self) -> NodeId {
        self.push(NodeKind::Product, BTreeSet::new())
    }

    /// Product gated by `label == value`: child 0 is `inner`, child 1 a one-hot
    /// indicator leaf over `label` created here.
    pub fn product_indicator(
        &mut self,
        inner: NodeId,
        label: Variable,
        value: usize,
    ) -> GraphResult<NodeId> {
        self.check(inner)?;
        if value >= label.categories {
            return Err(GraphError::IndicatorOutOfRange {
                var: label.id,
                value,
                categories: label.categories,
            });
        }
        if self[inner].scope.contains(&label.id) {
            return Err(GraphError::OverlappingScope {
                node: inner.index(),
                vars: vec![label.id],
            });
        }
        let mut probs = vec![0.0; label.categories];
        probs[value] = 1.0;
        let indicator = self.leaf(label.id, probs)?;
        let id = self.push(
            NodeKind::ProductIndicator(Indicator {
                var: label.id,
                value,
            }),
            BTreeSet::new(),
        );
        self.attach(id, inner, None)?;
        self.attach(id, indicator, None)?;
        Ok(id)
    }

    // ---- Edges ----

    /// Append `child` to a product or product-indicator node.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> GraphResult<()> {
        self.attach(parent, child, None)
    }

    /// Append `child` to a sum node with mixture weight `weight`.
    pub fn add_weighted_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        weight: f64,
    ) -> GraphResult<()> {
        self.attach(parent, child, Some(weight))
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, weight: Option<f64>) -> GraphResult<()> {
        self.check(parent)?;
        self.check(child)?;
        let node = parent.index();
        let p = &self[parent];

        match (&p.kind, weight) {
            (NodeKind::Leaf(_), _) => return Err(GraphError::LeafChildren { node }),
            (NodeKind::Sum { .. }, None) => return Err(GraphError::MissingWeight { node }),
            (NodeKind::Sum { .. }, Some(w)) if !(w.is_finite() && w >= 0.0) => {
                return Err(GraphError::InvalidWeight { node, weight: w })
            }
            (NodeKind::Product | NodeKind::ProductIndicator(_), Some(_)) => {
                return Err(GraphError::UnexpectedWeight { node })
            }
            _ => {}
        }
        if let Some(limit) = p.kind.child_limit() {
            if p.children.len() >= limit {
                return Err(GraphError::ChildLimit { node, limit });
            }
        }
        if dag::would_create_cycle(self, parent, child) {
            return Err(GraphError::CycleDetected {
                parent: node,
                child: child.index(),
            });
        }

        let child_scope = &self[child].scope;
        let scope = if p.kind.is_sum() {
            if p.children.is_empty() {
                child_scope.clone()
            } else if *child_scope != p.scope {
                return Err(GraphError::ScopeMismatch {
                    node,
                    expected: p.scope_vec(),
                    found: child_scope.iter().copied().collect(),
                });
            } else {
                p.scope.clone()
            }
        } else {
            let overlap: Vec<usize> = p.scope.intersection(child_scope).copied().collect();
            if !overlap.is_empty() {
                return Err(GraphError::OverlappingScope {
                    node,
                    vars: overlap,
                });
            }
            p.scope.union(child_scope).copied().collect()
        };
        if !p.parents.is_empty() && scope != p.scope {
            return Err(GraphError::AttachedScopeChange { node });
        }

        let p = &mut self.nodes[node];
        p.children.push(child);
        p.scope = scope;
        if let (NodeKind::Sum { weights }, Some(w)) = (&mut p.kind, weight) {
            weights.push(w);
        }
        self.nodes[child.index()].parents.push(parent);
        Ok(())
    }

    // ---- Labels ----

    pub fn set_label(&mut self, id: NodeId, label: impl Into<String>) {
        self.nodes[id.index()].label = Some(label.into());
    }

    pub fn find_label(&self, label: &str) -> Option<NodeId> {
        self.node_ids().find(|&id| self[id].label() == Some(label))
    }

    // ---- DP tables ----

    /// Cache `value` at `id` unless storing is disabled there.
    pub fn store(&mut self, id: NodeId, key: CacheKey, value: f64) {
        let node = &mut self.nodes[id.index()];
        if node.stores {
            node.dp.insert(key, value);
        }
    }

    /// Cached value at `id`; always `None` while storing is disabled.
    pub fn stored(&self, id: NodeId, key: CacheKey) -> Option<f64> {
        let node = &self[id];
        if node.stores {
            node.dp.get(&key).copied()
        } else {
            None
        }
    }

    /// Set the store flag on every node reachable from `root`.
    pub fn set_store(&mut self, root: NodeId, enabled: bool) {
        for id in traversal::reachable(self, root) {
            self.nodes[id.index()].stores = enabled;
        }
    }

    /// Clear `key` at `id`, or the whole table on `None`.
    pub fn reset_dp(&mut self, id: NodeId, key: Option<CacheKey>) {
        let dp = &mut self.nodes[id.index()].dp;
        match key {
            Some(key) => {
                dp.remove(&key);
            }
            None => dp.clear(),
        }
    }

    /// [`Network::reset_dp`] on every node reachable from `root`.
    pub fn rreset_dp(&mut self, root: NodeId, key: Option<CacheKey>) {
        for id in traversal::reachable(self, root) {
            self.reset_dp(id, key);
        }
    }

    // ---- Parameters ----

    pub fn set_l2(&mut self, root: NodeId, l2: f64) {
        for id in traversal::reachable(self, root) {
            self.nodes[id.index()].l2 = l2;
        }
    }

    pub fn l2(&self, id: NodeId) -> f64 {
        self[id].l2
    }

    pub fn update_count(&self, id: NodeId) -> u64 {
        self[id].updates
    }

    /// Rescale every reachable sum's weights and leaf's probabilities to sum to 1.
    /// An all-zero vector becomes uniform.
    pub fn normalize(&mut self, root: NodeId) {
        for id in traversal::reachable(self, root) {
            match &mut self.nodes[id.index()].kind {
                NodeKind::Sum { weights } => normalize_in_place(weights),
                NodeKind::Leaf(c) => normalize_in_place(&mut c.probs),
                NodeKind::Product | NodeKind::ProductIndicator(_) => {}
            }
        }
    }

    /// Overwrite a sum's weights; length must match its children.
    pub fn set_weights(&mut self, id: NodeId, new: Vec<f64>) -> GraphResult<()> {
        self.check(id)?;
        let node = &mut self.nodes[id.index()];
        let count = node.children.len();
        match &mut node.kind {
            NodeKind::Sum { weights } => {
                if new.len() != count {
                    return Err(GraphError::MissingWeight { node: id.index() });
                }
                if let Some(&w) = new.iter().find(|w| !(w.is_finite() && **w >= 0.0)) {
                    return Err(GraphError::InvalidWeight {
                        node: id.index(),
                        weight: w,
                    });
                }
                *weights = new;
                Ok(())
            }
            _ => Err(GraphError::UnexpectedWeight { node: id.index() }),
        }
    }

    // ---- Validation ----

    /// Re-check every structural invariant over the graph reachable from `root`.
    pub fn validate(&self, root: NodeId) -> GraphResult<()> {
        self.check(root)?;
        let cycles = dag::find_cycles(self);
        if !cycles.is_empty() {
            return Err(GraphError::Cyclic {
                count: cycles.len(),
            });
        }

        for id in traversal::reachable(self, root) {
            let node = &self[id];
            let index = id.index();
            let children = node.children();

            if let Some(limit) = node.kind.child_limit() {
                if children.len() > limit {
                    return Err(GraphError::ChildLimit { node: index, limit });
                }
            }

            match &node.kind {
                NodeKind::Leaf(c) => {
                    if c.probs.is_empty() {
                        return Err(GraphError::EmptyDistribution { var: c.var });
                    }
                    if let Some(&prob) = c.probs.iter().find(|p| !(p.is_finite() && **p >= 0.0)) {
                        return Err(GraphError::InvalidProbability { var: c.var, prob });
                    }
                    continue;
                }
                NodeKind::Sum { weights } => {
                    if weights.len() != children.len() {
                        return Err(GraphError::MissingWeight { node: index });
                    }
                    if let Some(&w) = weights.iter().find(|w| !(w.is_finite() && **w >= 0.0)) {
                        return Err(GraphError::InvalidWeight {
                            node: index,
                            weight: w,
                        });
                    }
                    for &c in children {
                        if self[c].scope != node.scope {
                            return Err(GraphError::ScopeMismatch {
                                node: index,
                                expected: node.scope_vec(),
                                found: self[c].scope_vec(),
                            });
                        }
                    }
                }
                NodeKind::Product | NodeKind::ProductIndicator(_) => {
                    let mut seen = BTreeSet::new();
                    for &c in children {
                        let overlap: Vec<usize> = self[c]
                            .scope
                            .iter()
                            .copied()
                            .filter(|v| !seen.insert(*v))
                            .collect();
                        if !overlap.is_empty() {
                            return Err(GraphError::OverlappingScope {
                                node: index,
                                vars: overlap,
                            });
                        }
                    }
                }
            }

            if !children.is_empty() {
                let union: BTreeSet<usize> = children
                    .iter()
                    .flat_map(|&c| self[c].scope.iter().copied())
                    .collect();
                if union != node.scope {
                    return Err(GraphError::ScopeNotUnion {
                        node: index,
                        expected: union.into_iter().collect(),
                        found: node.scope_vec(),
                    });
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn normalize_in_place(values: &mut [f64]) {
    let total: f64 = values.iter().sum();
    if total > 0.0 {
        for v in values.iter_mut() {
            *v /= total;
        }
    } else if !values.is_empty() {
        let uniform = 1.0 / values.len() as f64;
        values.fill(uniform);
    }
}
