//! Breadth-first derivative propagation.
//!
//! Each dequeued node pushes ∂S/∂node down to its children (accumulated in the
//! child under the node key) and records ∂S/∂w for its own weights, then tells
//! the driver which children to enqueue next. A node reached again through
//! another parent only forwards what arrived since its previous dequeue.

use std::collections::VecDeque;

use spn_core::types::collections::SmallVec4;
use spn_core::{InferenceMode, VarSet};

use crate::cache::CacheKey;
use crate::inference::EvalTable;
use crate::kind::NodeKind;
use crate::network::Network;
use crate::node::NodeId;
use crate::traversal;

/// Which children a derived node forwards the traversal to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Halt,
    All,
    Only(usize),
}

/// Derivative table keys of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeriveKeys {
    pub node: CacheKey,
    pub weight: CacheKey,
}

/// Inputs shared by every node of one derivative pass.
#[derive(Debug, Clone, Copy)]
pub struct DeriveCtx<'a> {
    pub keys: DeriveKeys,
    pub evidence: &'a VarSet,
    /// Node values backing the pass: sum-product in soft mode, max-product in hard.
    pub values: &'a EvalTable,
    pub mode: InferenceMode,
}

impl Network {
    /// Mark `root` as a derivative source: ∂S/∂root = 1.
    pub fn rootify(&mut self, root: NodeId, node_key: CacheKey) {
        let node = &mut self.nodes[root.index()];
        node.node_grads.insert(node_key, 1.0);
        node.root = true;
    }

    /// Drop derivatives stored under `key` on every node reachable from `root`.
    pub fn reset_derivatives(&mut self, root: NodeId, key: CacheKey) {
        for id in traversal::reachable(self, root) {
            let node = &mut self.nodes[id.index()];
            node.node_grads.remove(&key);
            node.forwarded.remove(&key);
            node.weight_grads.remove(&key);
        }
    }

    /// Derive one node: distribute its derivative to its children and weights.
    pub fn derive(&mut self, id: NodeId, ctx: &DeriveCtx<'_>) -> Route {
        let node = &self[id];
        let d = node.derivative(ctx.keys.node);
        let delta = d - node.forwarded.get(&ctx.keys.node).copied().unwrap_or(0.0);
        let children: SmallVec4<NodeId> = node.children.clone();
        let values: SmallVec4<f64> = children.iter().map(|&c| ctx.values.value(c)).collect();

        match &node.kind {
            NodeKind::Leaf(_) => Route::Halt,
            NodeKind::Sum { weights } => {
                let weights = weights.clone();
                match ctx.mode {
                    InferenceMode::Soft => {
                        let grads = values.iter().map(|v| d * v).collect();
                        for (&c, w) in children.iter().zip(&weights) {
                            self.accumulate(c, ctx.keys.node, w * delta);
                        }
                        let node = &mut self.nodes[id.index()];
                        node.weight_grads.insert(ctx.keys.weight, grads);
                        node.forwarded.insert(ctx.keys.node, d);
                        Route::All
                    }
                    InferenceMode::Hard => {
                        let Some(best) = first_arg_max(&weights, &values) else {
                            return Route::Halt;
                        };
                        let mut grads = vec![0.0; children.len()];
                        grads[best] = d * values[best];
                        self.accumulate(children[best], ctx.keys.node, weights[best] * delta);
                        let node = &mut self.nodes[id.index()];
                        node.weight_grads.insert(ctx.keys.weight, grads);
                        node.forwarded.insert(ctx.keys.node, d);
                        Route::Only(best)
                    }
                }
            }
            NodeKind::Product => {
                for (i, &c) in children.iter().enumerate() {
                    let others: f64 = values
                        .iter()
                        .enumerate()
                        .filter(|&(j, _)| j != i)
                        .map(|(_, v)| v)
                        .product();
                    self.accumulate(c, ctx.keys.node, delta * others);
                }
                self.nodes[id.index()].forwarded.insert(ctx.keys.node, d);
                Route::All
            }
            NodeKind::ProductIndicator(ind) => {
                if !ind.is_open(ctx.evidence.get(ind.var)) {
                    return Route::Halt;
                }
                if let Some(&inner) = children.first() {
                    self.accumulate(inner, ctx.keys.node, delta);
                }
                if let (Some(&indicator), Some(&inner_value)) = (children.get(1), values.first()) {
                    self.accumulate(indicator, ctx.keys.node, delta * inner_value);
                }
                self.nodes[id.index()].forwarded.insert(ctx.keys.node, d);
                Route::Only(0)
            }
        }
    }

    /// Breadth-first derivative pass from `root`. Stops right after deriving
    /// `bound`. A node shared by several parents is derived once per dequeue,
    /// and each dequeue forwards only the derivative not yet forwarded.
    pub fn root_derive(&mut self, root: NodeId, ctx: &DeriveCtx<'_>, bound: Option<NodeId>) {
        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            let route = self.derive(id, ctx);
            if bound == Some(id) {
                return;
            }
            let children = self[id].children();
            match route {
                Route::Halt => {}
                Route::All => queue.extend(children.iter().copied()),
                Route::Only(i) => {
                    if let Some(&c) = children.get(i) {
                        queue.push_back(c);
                    }
                }
            }
        }
    }

    fn accumulate(&mut self, id: NodeId, key: CacheKey, delta: f64) {
        *self.nodes[id.index()].node_grads.entry(key).or_insert(0.0) += delta;
    }
}

/// Index maximizing wᵢ·vᵢ; the first wins ties.
pub(crate) fn first_arg_max(weights: &[f64], values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, (w, v)) in weights.iter().zip(values).enumerate() {
        let score = w * v;
        if best.map_or(true, |(_, b)| score > b) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}
