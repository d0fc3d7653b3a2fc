//! Recursive structure learning (Gens & Domingos schema).
//!
//! - one variable: frequency leaf;
//! - independent variable subsets: product over the subsets;
//! - otherwise: cluster the instances into a weighted sum, or fall back to a
//!   fully factorized model when clustering cannot split them.

use spn_core::config::LearningConfig;
use spn_core::errors::{LearnError, LearnResult};
use spn_core::{Scope, VarSet, Variable};
use spn_graph::{Network, NodeId};
use tracing::{debug, debug_span, trace};

use crate::clustering::{Clusterer, KMeans};
use crate::columns::{self, VarColumn};
use crate::independence::{ChiSquareTest, IndependenceTest};

/// Structure learner parameterised by its independence test and clusterer.
#[derive(Debug, Clone)]
pub struct GensLearner<T = ChiSquareTest, C = KMeans> {
    test: T,
    clusterer: C,
    cluster_count: usize,
}

impl Default for GensLearner {
    fn default() -> Self {
        Self::from_config(&LearningConfig::default())
    }
}

impl GensLearner {
    pub fn from_config(config: &LearningConfig) -> Self {
        Self {
            test: ChiSquareTest::from_config(config),
            clusterer: KMeans::from_config(config),
            cluster_count: config.effective_cluster_count(),
        }
    }
}

impl<T: IndependenceTest, C: Clusterer> GensLearner<T, C> {
    pub fn new(test: T, clusterer: C, cluster_count: usize) -> Self {
        Self {
            test,
            clusterer,
            cluster_count,
        }
    }

    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    /// Learn a network over `scope` from `data`, returning its root.
    ///
    /// Every instance must assign every scope variable an in-range category.
    pub fn learn(&self, net: &mut Network, scope: &Scope, data: &[VarSet]) -> LearnResult<NodeId> {
        if self.cluster_count < 2 {
            return Err(LearnError::InvalidClusterCount {
                count: self.cluster_count,
            });
        }
        columns::validate(scope, data)?;
        let root = self.learn_scope(net, scope, data)?;
        debug!(nodes = net.len(), root = %root, "structure learning complete");
        Ok(root)
    }

    fn learn_scope(&self, net: &mut Network, scope: &Scope, data: &[VarSet]) -> LearnResult<NodeId> {
        let span = debug_span!("learn_scope", vars = scope.len(), instances = data.len());
        let _enter = span.enter();

        if scope.len() == 1 {
            if let Some(variable) = scope.values().next() {
                return self.leaf(net, variable, data);
            }
        }

        let columns = columns::columns(scope, data)?;
        if data.is_empty() {
            trace!("no instances; factorizing");
            return self.factorized(net, scope, &columns);
        }
        let subsets = self.test.partition(&columns);
        if subsets.len() > 1 {
            debug!(subsets = subsets.len(), "independent subsets");
            return self.product(net, scope, data, subsets);
        }

        let k = self.cluster_count;
        if data.len() < k {
            trace!(k, "fewer instances than clusters; factorizing");
            return self.factorized(net, scope, &columns);
        }

        let rows: Vec<Vec<usize>> = (0..data.len())
            .map(|i| columns.iter().map(|c| c.values[i]).collect())
            .collect();
        let clusters: Vec<Vec<VarSet>> = self
            .clusterer
            .cluster(k, &rows)
            .into_iter()
            .map(|members| members.iter().filter_map(|&i| data.get(i).cloned()).collect::<Vec<_>>())
            .filter(|members| !members.is_empty())
            .collect();
        if clusters.len() <= 1 {
            trace!("clustering did not split the instances; factorizing");
            return self.factorized(net, scope, &columns);
        }

        debug!(clusters = clusters.len(), "instance clusters");
        let total = data.len() as f64;
        let sum = net.sum();
        for members in &clusters {
            let child = self.learn_scope(net, scope, members)?;
            net.add_weighted_child(sum, child, members.len() as f64 / total)?;
        }
        Ok(sum)
    }

    fn product(
        &self,
        net: &mut Network,
        scope: &Scope,
        data: &[VarSet],
        subsets: Vec<Vec<usize>>,
    ) -> LearnResult<NodeId> {
        let product = net.product();
        for subset in subsets {
            let sub_scope: Scope = subset
                .iter()
                .filter_map(|v| scope.get(v).map(|variable| (*v, *variable)))
                .collect();
            let projected: Vec<VarSet> = data
                .iter()
                .map(|row| row.project(subset.iter().copied()))
                .collect();
            let child = self.learn_scope(net, &sub_scope, &projected)?;
            net.add_child(product, child)?;
        }
        Ok(product)
    }

    /// A sum with one child: the product of per-variable frequency leaves.
    fn factorized(&self, net: &mut Network, scope: &Scope, columns: &[VarColumn]) -> LearnResult<NodeId> {
        let product = net.product();
        for column in columns {
            let leaf = net.leaf(column.var, column.frequencies())?;
            net.add_child(product, leaf)?;
        }
        let sum = net.sum();
        net.add_weighted_child(sum, product, 1.0)?;
        trace!(vars = scope.len(), "factorized node");
        Ok(sum)
    }

    fn leaf(&self, net: &mut Network, variable: &Variable, data: &[VarSet]) -> LearnResult<NodeId> {
        let column = VarColumn {
            var: variable.id,
            categories: variable.categories,
            values: data.iter().filter_map(|row| row.get(variable.id)).collect(),
        };
        Ok(net.leaf(variable.id, column.frequencies())?)
    }
}
