//! Generative and discriminative weight updates.

use rustc_hash::FxHashSet;
use tracing::warn;

use crate::cache::CacheKey;
use crate::kind::NodeKind;
use crate::network::{normalize_in_place, Network};
use crate::node::NodeId;
use crate::storer::DiscStorer;

impl Network {
    /// Generative gradient step with the weight partials stored under `weight_key`.
    ///
    /// No visited guard: a node reachable along k paths is stepped k times.
    /// Sum nodes apply wᵢ += η(gᵢ − 2λwᵢ), clamp at 0, and renormalize.
    pub fn gen_update(&mut self, root: NodeId, eta: f64, weight_key: CacheKey) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            self.gen_step(id, eta, weight_key);
            stack.extend(self[id].children().iter().copied());
        }
    }

    fn gen_step(&mut self, id: NodeId, eta: f64, weight_key: CacheKey) {
        let node = &mut self.nodes[id.index()];
        node.updates += 1;
        let l2 = node.l2;
        if let NodeKind::Sum { weights } = &mut node.kind {
            let grads = node.weight_grads.get(&weight_key);
            for (i, w) in weights.iter_mut().enumerate() {
                let g = grads.and_then(|g| g.get(i)).copied().unwrap_or(0.0);
                *w = (*w + eta * (g - 2.0 * l2 * *w)).max(0.0);
            }
            normalize_in_place(weights);
        }
    }

    /// Discriminative gradient step for one example; each node is stepped once.
    ///
    /// Sum nodes apply wᵢ += η(∂Sc/∂wᵢ / Sc − ∂Se/∂wᵢ / Se − 2λwᵢ), clamped at 0.
    pub fn disc_update(&mut self, root: NodeId, eta: f64, storer: &DiscStorer) {
        self.disc_update_batch(root, eta, std::slice::from_ref(storer), 1);
    }

    /// Discriminative step averaged over the first `range` storers (at most all
    /// of them), applied once per node.
    pub fn disc_update_batch(
        &mut self,
        root: NodeId,
        eta: f64,
        storers: &[DiscStorer],
        range: usize,
    ) {
        let batch = &storers[..range.min(storers.len())];
        if batch.is_empty() {
            return;
        }
        let objectives: Vec<(f64, f64)> = batch.iter().map(|s| s.objective(self)).collect();
        for (s, &(sc, se)) in batch.iter().zip(&objectives) {
            if sc <= 0.0 || se <= 0.0 {
                warn!(root = %s.root(), sc, se, "zero likelihood example; its terms are skipped");
            }
        }

        let mut visited = FxHashSet::default();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            self.disc_step(id, eta, batch, &objectives);
            stack.extend(self[id].children().iter().copied());
        }
    }

    fn disc_step(&mut self, id: NodeId, eta: f64, batch: &[DiscStorer], objectives: &[(f64, f64)]) {
        let node = &mut self.nodes[id.index()];
        node.updates += 1;
        let l2 = node.l2;
        let scale = 1.0 / batch.len() as f64;
        if let NodeKind::Sum { weights } = &mut node.kind {
            let grads = &node.weight_grads;
            let partial = |key: CacheKey, i: usize| {
                grads.get(&key).and_then(|g| g.get(i)).copied().unwrap_or(0.0)
            };
            for (i, w) in weights.iter_mut().enumerate() {
                let mut delta = 0.0;
                for (s, &(sc, se)) in batch.iter().zip(objectives) {
                    delta += ratio(partial(s.keys().correct_weight, i), sc)
                        - ratio(partial(s.keys().expected_weight, i), se);
                }
                *w = (*w + eta * (delta * scale - 2.0 * l2 * *w)).max(0.0);
            }
        }
    }
}

fn ratio(partial: f64, value: f64) -> f64 {
    if value > 0.0 {
        partial / value
    } else {
        0.0
    }
}
