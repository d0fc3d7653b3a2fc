use proptest::prelude::*;
use spn_core::{Scope, VarSet, Variable};
use spn_graph::Network;
use spn_learn::{Clusterer, GensLearner, KMeans};

fn scope(arities: &[usize]) -> Scope {
    arities
        .iter()
        .enumerate()
        .map(|(v, &k)| (v, Variable::new(v, k)))
        .collect()
}

fn dataset(arities: &[usize], raw: &[Vec<usize>]) -> Vec<VarSet> {
    raw.iter()
        .map(|row| {
            arities
                .iter()
                .enumerate()
                .map(|(v, &k)| (v, row[v] % k))
                .collect()
        })
        .collect()
}

proptest! {
    #[test]
    fn learned_networks_are_valid_distributions(
        arities in prop::collection::vec(2usize..4, 1..4),
        raw in prop::collection::vec(prop::collection::vec(0usize..16, 3), 0..40),
    ) {
        let data = dataset(&arities, &raw);
        let mut net = Network::new();
        let root = GensLearner::default().learn(&mut net, &scope(&arities), &data).unwrap();
        prop_assert_eq!(net.validate(root), Ok(()));
        prop_assert!((net.value(root, &VarSet::new()) - 1.0).abs() < 1e-9);

        // Every observed instance keeps positive probability.
        for row in &data {
            prop_assert!(net.value(root, row) > 0.0);
        }
    }

    #[test]
    fn kmeans_assigns_every_row_once(
        k in 1usize..5,
        rows in prop::collection::vec(prop::collection::vec(0usize..4, 2), 0..30),
    ) {
        let clusters = KMeans::default().cluster(k, &rows);
        prop_assert_eq!(clusters.len(), k);
        let mut seen: Vec<usize> = clusters.into_iter().flatten().collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..rows.len()).collect::<Vec<_>>());
    }
}
