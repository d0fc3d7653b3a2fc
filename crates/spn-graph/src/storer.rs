//! Per-example bundle for discriminative training.

use spn_core::{InferenceMode, VarSet};
use tracing::trace;

use crate::cache::{CacheKey, Context};
use crate::derive::{DeriveCtx, DeriveKeys};
use crate::network::Network;
use crate::node::NodeId;

/// The six cache keys one training example uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscKeys {
    pub correct: CacheKey,
    pub expected: CacheKey,
    pub correct_node: CacheKey,
    pub expected_node: CacheKey,
    pub correct_weight: CacheKey,
    pub expected_weight: CacheKey,
}

impl DiscKeys {
    /// Keys for example slot `slot`. Distinct slots never collide.
    pub const fn for_slot(slot: u32) -> Self {
        Self {
            correct: CacheKey::new(Context::Correct, slot),
            expected: CacheKey::new(Context::Expected, slot),
            correct_node: CacheKey::new(Context::CorrectNode, slot),
            expected_node: CacheKey::new(Context::ExpectedNode, slot),
            correct_weight: CacheKey::new(Context::CorrectWeight, slot),
            expected_weight: CacheKey::new(Context::ExpectedWeight, slot),
        }
    }

    pub(crate) fn all(&self) -> [CacheKey; 6] {
        [
            self.correct,
            self.expected,
            self.correct_node,
            self.expected_node,
            self.correct_weight,
            self.expected_weight,
        ]
    }
}

impl Default for DiscKeys {
    fn default() -> Self {
        Self::for_slot(0)
    }
}

/// One example against one root: `correct` holds the label and features,
/// `expected` only the features. Owns keys and a handle, never nodes.
#[derive(Debug, Clone)]
pub struct DiscStorer {
    root: NodeId,
    correct: VarSet,
    expected: VarSet,
    store: bool,
    keys: DiscKeys,
    mode: InferenceMode,
}

impl DiscStorer {
    pub fn new(
        root: NodeId,
        correct: VarSet,
        expected: VarSet,
        keys: DiscKeys,
        mode: InferenceMode,
    ) -> Self {
        Self {
            root,
            correct,
            expected,
            store: true,
            keys,
            mode,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn correct_set(&self) -> &VarSet {
        &self.correct
    }

    pub fn expected_set(&self) -> &VarSet {
        &self.expected
    }

    pub fn set_correct_set(&mut self, correct: VarSet) {
        self.correct = correct;
    }

    pub fn set_expected_set(&mut self, expected: VarSet) {
        self.expected = expected;
    }

    pub fn keys(&self) -> &DiscKeys {
        &self.keys
    }

    pub fn mode(&self) -> InferenceMode {
        self.mode
    }

    pub fn stores(&self) -> bool {
        self.store
    }

    /// Whether `correct` / `expected` may reuse values cached under the storer's keys.
    pub fn set_store(&mut self, store: bool) {
        self.store = store;
    }

    /// Soft value under the correct evidence (Sc).
    pub fn correct(&self, net: &mut Network) -> f64 {
        self.soft_value(net, &self.correct, self.keys.correct)
    }

    /// Soft value under the expected evidence (Se).
    pub fn expected(&self, net: &mut Network) -> f64 {
        self.soft_value(net, &self.expected, self.keys.expected)
    }

    fn soft_value(&self, net: &mut Network, evidence: &VarSet, key: CacheKey) -> f64 {
        if self.store {
            if let Some(v) = net.stored(self.root, key) {
                return v;
            }
        }
        net.rreset_dp(self.root, Some(key));
        net.soft(self.root, evidence, key)
    }

    /// (Sc, Se) as seen by the update rule: soft values, or max-product values
    /// in hard mode.
    pub fn objective(&self, net: &mut Network) -> (f64, f64) {
        match self.mode {
            InferenceMode::Soft => (self.correct(net), self.expected(net)),
            InferenceMode::Hard => (
                net.max(self.root, &self.correct),
                net.max(self.root, &self.expected),
            ),
        }
    }

    /// Derivative pass under the correct evidence, stopping after `bound`.
    pub fn derive_correct(&self, net: &mut Network, bound: Option<NodeId>) {
        let keys = DeriveKeys {
            node: self.keys.correct_node,
            weight: self.keys.correct_weight,
        };
        self.derive_with(net, &self.correct, keys, bound);
    }

    /// Derivative pass under the expected evidence, stopping after `bound`.
    pub fn derive_expected(&self, net: &mut Network, bound: Option<NodeId>) {
        let keys = DeriveKeys {
            node: self.keys.expected_node,
            weight: self.keys.expected_weight,
        };
        self.derive_with(net, &self.expected, keys, bound);
    }

    /// Both derivative passes over the whole graph.
    pub fn derive(&self, net: &mut Network) {
        self.derive_correct(net, None);
        self.derive_expected(net, None);
    }

    fn derive_with(&self, net: &mut Network, evidence: &VarSet, keys: DeriveKeys, bound: Option<NodeId>) {
        let values = net.eval_table(self.root, evidence, self.mode);
        net.reset_derivatives(self.root, keys.node);
        net.reset_derivatives(self.root, keys.weight);
        net.rootify(self.root, keys.node);
        let ctx = DeriveCtx {
            keys,
            evidence,
            values: &values,
            mode: self.mode,
        };
        net.root_derive(self.root, &ctx, bound);
        trace!(
            root = %self.root,
            mode = self.mode.name(),
            nodes = values.len(),
            "derivative pass complete"
        );
    }

    /// Clear every value and derivative this storer's keys left in the graph.
    pub fn reset(&self, net: &mut Network) {
        for key in self.keys.all() {
            net.rreset_dp(self.root, Some(key));
            net.reset_derivatives(self.root, key);
        }
    }
}
