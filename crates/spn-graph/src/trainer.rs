//! Discriminative training driver.

use spn_core::config::TrainingConfig;
use spn_core::{InferenceMode, VarSet};
use tracing::{debug, info};

use crate::network::Network;
use crate::node::NodeId;
use crate::storer::{DiscKeys, DiscStorer};

/// Runs mini-batch discriminative gradient steps over labelled examples.
#[derive(Debug, Clone)]
pub struct DiscTrainer {
    learning_rate: f64,
    l2: f64,
    batch_size: usize,
    mode: InferenceMode,
}

impl Default for DiscTrainer {
    fn default() -> Self {
        Self::new(&TrainingConfig::default())
    }
}

impl DiscTrainer {
    pub fn new(config: &TrainingConfig) -> Self {
        Self {
            learning_rate: config.effective_learning_rate(),
            l2: config.effective_l2(),
            batch_size: config.effective_batch_size().max(1),
            mode: config.effective_mode(),
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn mode(&self) -> InferenceMode {
        self.mode
    }

    /// One pass over `examples` (`(correct, expected)` pairs).
    ///
    /// Returns the mean conditional log-likelihood log Sc − log Se measured
    /// before each batch's step. Examples with zero likelihood are skipped in
    /// the mean.
    pub fn train_epoch(&self, net: &mut Network, root: NodeId, examples: &[(VarSet, VarSet)]) -> f64 {
        net.set_l2(root, self.l2);
        let mut total = 0.0;
        let mut counted = 0usize;

        for (batch_index, chunk) in examples.chunks(self.batch_size).enumerate() {
            let storers: Vec<DiscStorer> = chunk
                .iter()
                .enumerate()
                .map(|(slot, (correct, expected))| {
                    DiscStorer::new(
                        root,
                        correct.clone(),
                        expected.clone(),
                        DiscKeys::for_slot(slot as u32),
                        self.mode,
                    )
                })
                .collect();

            for storer in &storers {
                storer.derive(net);
                let (sc, se) = storer.objective(net);
                if sc > 0.0 && se > 0.0 {
                    total += sc.ln() - se.ln();
                    counted += 1;
                }
            }

            match storers.as_slice() {
                [single] => net.disc_update(root, self.learning_rate, single),
                batch => net.disc_update_batch(root, self.learning_rate, batch, batch.len()),
            }
            for storer in &storers {
                storer.reset(net);
            }
            debug!(batch = batch_index, size = storers.len(), "applied discriminative step");
        }

        let mean = if counted == 0 {
            f64::NEG_INFINITY
        } else {
            total / counted as f64
        };
        info!(examples = examples.len(), mean_cll = mean, "epoch complete");
        mean
    }

    /// `epochs` passes; returns the per-epoch mean conditional log-likelihoods.
    pub fn train(
        &self,
        net: &mut Network,
        root: NodeId,
        examples: &[(VarSet, VarSet)],
        epochs: usize,
    ) -> Vec<f64> {
        (0..epochs)
            .map(|_| self.train_epoch(net, root, examples))
            .collect()
    }
}
