//! Variable independence partitioning.
//!
//! Two variables are dependent when a Pearson chi-square test on their
//! contingency table rejects independence at the configured significance.
//! Subsets are the connected components of the dependency graph.

use petgraph::unionfind::UnionFind;
use rustc_hash::FxHashMap;
use spn_core::config::LearningConfig;
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::columns::VarColumn;

/// Splits a set of variables into mutually independent subsets.
pub trait IndependenceTest {
    /// Groups of variable ids. A single group means no independence was found.
    fn partition(&self, columns: &[VarColumn]) -> Vec<Vec<usize>>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSquareTest {
    /// p-value below which a pair counts as dependent.
    pub significance: f64,
}

impl Default for ChiSquareTest {
    fn default() -> Self {
        Self::from_config(&LearningConfig::default())
    }
}

impl ChiSquareTest {
    pub fn new(significance: f64) -> Self {
        Self { significance }
    }

    pub fn from_config(config: &LearningConfig) -> Self {
        Self::new(config.effective_significance())
    }

    /// Pearson χ² statistic and degrees of freedom for two parallel columns.
    pub fn statistic(a: &VarColumn, b: &VarColumn) -> (f64, usize) {
        let (ra, rb) = (a.categories, b.categories);
        let mut table = vec![vec![0usize; rb]; ra];
        let mut rows = vec![0usize; ra];
        let mut cols = vec![0usize; rb];
        let mut n = 0usize;
        for (&x, &y) in a.values.iter().zip(&b.values) {
            if x < ra && y < rb {
                table[x][y] += 1;
                rows[x] += 1;
                cols[y] += 1;
                n += 1;
            }
        }

        let df = ra.saturating_sub(1) * rb.saturating_sub(1);
        if n == 0 {
            return (0.0, df);
        }
        let total = n as f64;
        let mut chi2 = 0.0;
        for (i, row) in table.iter().enumerate() {
            for (j, &observed) in row.iter().enumerate() {
                let expected = rows[i] as f64 * cols[j] as f64 / total;
                if expected > 0.0 {
                    let diff = observed as f64 - expected;
                    chi2 += diff * diff / expected;
                }
            }
        }
        (chi2, df)
    }

    /// Probability of a statistic at least this large under independence.
    pub fn p_value(&self, a: &VarColumn, b: &VarColumn) -> f64 {
        let (chi2, df) = Self::statistic(a, b);
        if df == 0 {
            return 1.0;
        }
        match ChiSquared::new(df as f64) {
            Ok(dist) => 1.0 - dist.cdf(chi2),
            Err(_) => 1.0,
        }
    }

    pub fn dependent(&self, a: &VarColumn, b: &VarColumn) -> bool {
        self.p_value(a, b) < self.significance
    }
}

impl IndependenceTest for ChiSquareTest {
    fn partition(&self, columns: &[VarColumn]) -> Vec<Vec<usize>> {
        let mut components = UnionFind::<usize>::new(columns.len());
        for i in 0..columns.len() {
            for j in (i + 1)..columns.len() {
                if self.dependent(&columns[i], &columns[j]) {
                    components.union(i, j);
                }
            }
        }

        // Columns arrive in ascending variable order, so groups come out
        // ordered by their smallest variable.
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut slot: FxHashMap<usize, usize> = FxHashMap::default();
        for (i, column) in columns.iter().enumerate() {
            let rep = components.find(i);
            let g = *slot.entry(rep).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[g].push(column.var);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(var: usize, values: Vec<usize>) -> VarColumn {
        VarColumn {
            var,
            categories: 2,
            values,
        }
    }

    #[test]
    fn balanced_table_has_zero_statistic() {
        let a = column(0, (0..40).map(|i| i % 2).collect());
        let b = column(1, (0..40).map(|i| (i / 2) % 2).collect());
        let (chi2, df) = ChiSquareTest::statistic(&a, &b);
        assert_eq!(df, 1);
        assert!(chi2.abs() < 1e-12);
        assert!((ChiSquareTest::default().p_value(&a, &b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn identical_columns_are_dependent() {
        let a = column(0, (0..40).map(|i| i % 2).collect());
        let b = column(1, a.values.clone());
        let (chi2, _) = ChiSquareTest::statistic(&a, &b);
        assert!((chi2 - 40.0).abs() < 1e-9);
        assert!(ChiSquareTest::new(0.05).dependent(&a, &b));
    }

    #[test]
    fn partition_groups_connected_components() {
        let x: Vec<usize> = (0..40).map(|i| i % 2).collect();
        let y: Vec<usize> = (0..40).map(|i| (i / 2) % 2).collect();
        let columns = vec![
            column(0, x.clone()),
            column(3, y.clone()),
            column(5, x),
            column(7, y),
        ];
        let groups = ChiSquareTest::new(0.05).partition(&columns);
        assert_eq!(groups, vec![vec![0, 5], vec![3, 7]]);
    }

    #[test]
    fn constant_column_is_independent() {
        let a = column(0, vec![1; 20]);
        let b = column(1, (0..20).map(|i| i % 2).collect());
        assert!(!ChiSquareTest::default().dependent(&a, &b));
    }
}
