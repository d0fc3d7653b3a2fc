//! Sum-product and max-product evaluation.
//!
//! All evaluators walk a children-first order with an explicit stack, so deep
//! learned networks never recurse. `soft` and `log_soft` memoize into the DP
//! tables and stop descending at nodes that already hold a value for the key.

use rustc_hash::FxHashMap;
use spn_core::types::collections::SmallVec4;
use spn_core::{InferenceMode, VarSet};

use crate::cache::CacheKey;
use crate::kind::NodeKind;
use crate::network::Network;
use crate::node::NodeId;
use crate::traversal;

/// How sums and products combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Semiring {
    Sum,
    LogSum,
    Max,
}

impl From<InferenceMode> for Semiring {
    fn from(mode: InferenceMode) -> Self {
        match mode {
            InferenceMode::Soft => Self::Sum,
            InferenceMode::Hard => Self::Max,
        }
    }
}

/// Values of every node reachable from one root under one evidence, plus the
/// maximizing child of each sum node when evaluated in max-product.
#[derive(Debug, Clone, Default)]
pub struct EvalTable {
    values: FxHashMap<NodeId, f64>,
    choices: FxHashMap<NodeId, usize>,
}

impl EvalTable {
    /// Value of `id`; 0 for nodes outside the evaluated graph.
    pub fn value(&self, id: NodeId) -> f64 {
        self.values.get(&id).copied().unwrap_or(0.0)
    }

    /// Index of the maximizing child of sum node `id` (max-product only).
    pub fn choice(&self, id: NodeId) -> Option<usize> {
        self.choices.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Network {
    /// Memoized sum-product value of `root` under `evidence`, cached under `key`.
    pub fn soft(&mut self, root: NodeId, evidence: &VarSet, key: CacheKey) -> f64 {
        self.evaluate_cached(root, evidence, key, Semiring::Sum)
    }

    /// Memoized sum-product value in the log domain.
    pub fn log_soft(&mut self, root: NodeId, evidence: &VarSet, key: CacheKey) -> f64 {
        self.evaluate_cached(root, evidence, key, Semiring::LogSum)
    }

    /// Sum-product value, bypassing the DP tables.
    pub fn value(&self, root: NodeId, evidence: &VarSet) -> f64 {
        self.evaluate(root, evidence, Semiring::Sum).value(root)
    }

    /// Max-product value, bypassing the DP tables.
    pub fn max(&self, root: NodeId, evidence: &VarSet) -> f64 {
        self.evaluate(root, evidence, Semiring::Max).value(root)
    }

    /// Most probable completion of `evidence` and its max-product value.
    ///
    /// Follows the recorded maximizing child at sums and every child elsewhere.
    /// Observed variables keep their values; unobserved leaves take their most
    /// probable category.
    pub fn arg_max(&self, root: NodeId, evidence: &VarSet) -> (VarSet, f64) {
        let table = self.evaluate(root, evidence, Semiring::Max);
        let mut assignment = evidence.clone();
        let mut visited = rustc_hash::FxHashSet::default();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let node = &self[id];
            match &node.kind {
                NodeKind::Leaf(c) => {
                    if !assignment.contains(c.var) {
                        assignment.insert(c.var, c.mode().0);
                    }
                }
                NodeKind::Sum { .. } => {
                    if let Some(&child) = table.choice(id).and_then(|i| node.children.get(i)) {
                        stack.push(child);
                    }
                }
                NodeKind::Product | NodeKind::ProductIndicator(_) => {
                    stack.extend(node.children.iter().rev().copied());
                }
            }
        }
        (assignment, table.value(root))
    }

    /// Un-memoized evaluation of every node reachable from `root`.
    pub fn eval_table(&self, root: NodeId, evidence: &VarSet, mode: InferenceMode) -> EvalTable {
        self.evaluate(root, evidence, mode.into())
    }

    pub(crate) fn evaluate(&self, root: NodeId, evidence: &VarSet, semiring: Semiring) -> EvalTable {
        let mut table = EvalTable::default();
        for id in traversal::top_sort_tarjan(self, root) {
            let (value, choice) = self.local_value(id, evidence, semiring, |c| table.value(c));
            table.values.insert(id, value);
            if let Some(i) = choice {
                table.choices.insert(id, i);
            }
        }
        table
    }

    fn evaluate_cached(
        &mut self,
        root: NodeId,
        evidence: &VarSet,
        key: CacheKey,
        semiring: Semiring,
    ) -> f64 {
        if let Some(v) = self.stored(root, key) {
            return v;
        }
        let order = traversal::post_order_pruned(self, root, |id| self.stored(id, key).is_none());
        let mut values: FxHashMap<NodeId, f64> = FxHashMap::default();
        for id in order {
            let value = match self.stored(id, key) {
                Some(v) => v,
                None => {
                    let (v, _) = self.local_value(id, evidence, semiring, |c| {
                        values.get(&c).copied().unwrap_or(0.0)
                    });
                    self.store(id, key, v);
                    v
                }
            };
            values.insert(id, value);
        }
        values.get(&root).copied().unwrap_or(0.0)
    }

    /// Value of one node from its children's values, with the maximizing child
    /// index for sums under max-product.
    pub(crate) fn local_value<F>(
        &self,
        id: NodeId,
        evidence: &VarSet,
        semiring: Semiring,
        child: F,
    ) -> (f64, Option<usize>)
    where
        F: Fn(NodeId) -> f64,
    {
        let node = &self[id];
        match &node.kind {
            NodeKind::Leaf(c) => {
                let p = match evidence.get(c.var) {
                    Some(v) => c.prob(v),
                    None if semiring == Semiring::Max => c.mode().1,
                    None => c.mass(),
                };
                if semiring == Semiring::LogSum {
                    (p.ln(), None)
                } else {
                    (p, None)
                }
            }
            NodeKind::Sum { weights } => {
                let terms = node.children.iter().zip(weights);
                match semiring {
                    Semiring::Sum => (terms.map(|(&c, w)| w * child(c)).sum::<f64>(), None),
                    Semiring::LogSum => (log_sum_exp(terms.map(|(&c, w)| w.ln() + child(c))), None),
                    Semiring::Max => {
                        let mut best: Option<(usize, f64)> = None;
                        for (i, (&c, w)) in terms.enumerate() {
                            let v = w * child(c);
                            if best.map_or(true, |(_, b)| v > b) {
                                best = Some((i, v));
                            }
                        }
                        match best {
                            Some((i, v)) => (v, Some(i)),
                            None => (0.0, None),
                        }
                    }
                }
            }
            NodeKind::Product => {
                let values = node.children.iter().map(|&c| child(c));
                if semiring == Semiring::LogSum {
                    (values.sum::<f64>(), None)
                } else {
                    (values.product::<f64>(), None)
                }
            }
            NodeKind::ProductIndicator(ind) => {
                // The inner value is read in both branches so it is always computed.
                let inner = node.children.first().map_or(
                    if semiring == Semiring::LogSum { 0.0 } else { 1.0 },
                    |&c| child(c),
                );
                if ind.is_open(evidence.get(ind.var)) {
                    (inner, None)
                } else if semiring == Semiring::LogSum {
                    (f64::NEG_INFINITY, None)
                } else {
                    (0.0, None)
                }
            }
        }
    }
}

/// log Σ exp(tᵢ), stable for large magnitudes; -inf for no terms.
pub(crate) fn log_sum_exp<I>(terms: I) -> f64
where
    I: Iterator<Item = f64>,
{
    let terms: SmallVec4<f64> = terms.collect();
    let max = terms.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    max + terms.iter().map(|t| (t - max).exp()).sum::<f64>().ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_sum_exp_handles_empty_and_large() {
        assert_eq!(log_sum_exp(std::iter::empty()), f64::NEG_INFINITY);
        let v = log_sum_exp([1000.0, 1000.0].into_iter());
        assert!((v - (1000.0 + 2f64.ln())).abs() < 1e-9);
        assert_eq!(log_sum_exp([f64::NEG_INFINITY].into_iter()), f64::NEG_INFINITY);
    }

    #[test]
    fn leaf_value_observed_unobserved_and_out_of_range() {
        let mut net = Network::new();
        let a = net.leaf(0, vec![0.2, 0.8]).unwrap();
        assert_eq!(net.value(a, &VarSet::from([(0, 1)])), 0.8);
        assert_eq!(net.value(a, &VarSet::from([(0, 7)])), 0.0);
        assert!((net.value(a, &VarSet::new()) - 1.0).abs() < 1e-12);
        assert_eq!(net.max(a, &VarSet::new()), 0.8);
    }

    #[test]
    fn evidence_outside_scope_is_ignored() {
        let mut net = Network::new();
        let a = net.leaf(0, vec![0.2, 0.8]).unwrap();
        let ev = VarSet::from([(0, 0), (5, 1)]);
        assert_eq!(net.value(a, &ev), 0.2);
    }

    #[test]
    fn soft_memoizes_under_key() {
        let mut net = Network::new();
        let a = net.leaf(0, vec![0.2, 0.8]).unwrap();
        let key = CacheKey::soft(3);
        let v = net.soft(a, &VarSet::from([(0, 1)]), key);
        assert_eq!(v, 0.8);
        assert_eq!(net.stored(a, key), Some(0.8));
        // A different evidence under the same key reads the cached value.
        assert_eq!(net.soft(a, &VarSet::from([(0, 0)]), key), 0.8);
    }

    #[test]
    fn closed_indicator_still_caches_inner() {
        let mut net = Network::new();
        let inner = net.leaf(1, vec![0.4, 0.6]).unwrap();
        let pi = net
            .product_indicator(inner, spn_core::Variable::new(0, 2), 1)
            .unwrap();
        let key = CacheKey::default();
        let v = net.soft(pi, &VarSet::from([(0, 0), (1, 1)]), key);
        assert_eq!(v, 0.0);
        assert_eq!(net.stored(inner, key), Some(0.6));

        net.rreset_dp(pi, Some(key));
        let v = net.soft(pi, &VarSet::from([(1, 1)]), key);
        assert_eq!(v, 0.6);
        assert_eq!(net.log_soft(pi, &VarSet::from([(0, 0)]), CacheKey::log_soft(0)), f64::NEG_INFINITY);
    }
}
