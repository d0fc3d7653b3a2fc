use proptest::prelude::*;
use spn_core::VarSet;
use spn_graph::traversal::{top_sort_tarjan, top_sort_tarjan_rec};
use spn_graph::{CacheKey, Network, NodeId, NodeKind};

const MAX_VARS: usize = 4;
const MAX_COMPONENTS: usize = 3;

/// Mixture of `components` fully factorized products over `vars` binary
/// variables. Variable 0 uses one leaf shared by every component.
fn mixture(vars: usize, components: usize, probs: &[f64], weights: &[f64]) -> (Network, NodeId) {
    let mut net = Network::new();
    let shared = net.leaf(0, vec![probs[0], 1.0 - probs[0]]).unwrap();
    let root = net.sum();
    for c in 0..components {
        let p = net.product();
        net.add_child(p, shared).unwrap();
        for v in 1..vars {
            let q = probs[c * MAX_VARS + v];
            let leaf = net.leaf(v, vec![q, 1.0 - q]).unwrap();
            net.add_child(p, leaf).unwrap();
        }
        net.add_weighted_child(root, p, weights[c]).unwrap();
    }
    (net, root)
}

fn evidence(vars: usize, bits: &[usize]) -> VarSet {
    (0..vars).map(|v| (v, bits[v])).collect()
}

proptest! {
    #[test]
    fn sum_value_is_weighted_child_sum(
        vars in 1..=MAX_VARS,
        components in 1..=MAX_COMPONENTS,
        probs in prop::collection::vec(0.05f64..0.95, MAX_VARS * MAX_COMPONENTS),
        weights in prop::collection::vec(0.05f64..1.0, MAX_COMPONENTS),
        bits in prop::collection::vec(0usize..2, MAX_VARS),
    ) {
        let (mut net, root) = mixture(vars, components, &probs, &weights);
        net.normalize(root);
        let ev = evidence(vars, &bits);
        let w = net[root].weights().unwrap().to_vec();
        let expected: f64 = net[root]
            .children()
            .iter()
            .zip(&w)
            .map(|(&c, w)| w * net.value(c, &ev))
            .sum();
        prop_assert!((net.value(root, &ev) - expected).abs() < 1e-9);
    }

    #[test]
    fn product_value_is_child_product(
        vars in 1..=MAX_VARS,
        probs in prop::collection::vec(0.05f64..0.95, MAX_VARS * MAX_COMPONENTS),
        bits in prop::collection::vec(0usize..2, MAX_VARS),
    ) {
        let (net, root) = mixture(vars, 1, &probs, &[1.0]);
        let product = net[root].children()[0];
        let ev = evidence(vars, &bits);
        let expected: f64 = net[product].children().iter().map(|&c| net.value(c, &ev)).product();
        prop_assert!((net.value(product, &ev) - expected).abs() < 1e-9);
    }

    #[test]
    fn log_soft_agrees_with_soft(
        vars in 1..=MAX_VARS,
        components in 1..=MAX_COMPONENTS,
        probs in prop::collection::vec(0.05f64..0.95, MAX_VARS * MAX_COMPONENTS),
        weights in prop::collection::vec(0.05f64..1.0, MAX_COMPONENTS),
        bits in prop::collection::vec(0usize..2, MAX_VARS),
    ) {
        let (mut net, root) = mixture(vars, components, &probs, &weights);
        let ev = evidence(vars, &bits);
        let soft = net.soft(root, &ev, CacheKey::soft(0));
        let log = net.log_soft(root, &ev, CacheKey::log_soft(0));
        prop_assert!((log - soft.ln()).abs() < 1e-9);
    }

    #[test]
    fn normalize_makes_every_sum_stochastic(
        components in 1..=MAX_COMPONENTS,
        probs in prop::collection::vec(0.05f64..0.95, MAX_VARS * MAX_COMPONENTS),
        weights in prop::collection::vec(0.0f64..10.0, MAX_COMPONENTS),
    ) {
        let (mut net, root) = mixture(MAX_VARS, components, &probs, &weights);
        net.normalize(root);
        for id in net.node_ids() {
            if let NodeKind::Sum { weights } = net[id].kind() {
                prop_assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            }
        }
        prop_assert!(net.validate(root).is_ok());
    }

    #[test]
    fn rreset_leaves_nothing_stored(
        vars in 1..=MAX_VARS,
        components in 1..=MAX_COMPONENTS,
        probs in prop::collection::vec(0.05f64..0.95, MAX_VARS * MAX_COMPONENTS),
        weights in prop::collection::vec(0.05f64..1.0, MAX_COMPONENTS),
        slot in 0u32..8,
    ) {
        let (mut net, root) = mixture(vars, components, &probs, &weights);
        let key = CacheKey::soft(slot);
        net.soft(root, &VarSet::new(), key);
        net.rreset_dp(root, Some(key));
        for id in top_sort_tarjan(&net, root) {
            prop_assert_eq!(net.stored(id, key), None);
        }
    }

    #[test]
    fn orderings_put_children_first(
        vars in 1..=MAX_VARS,
        components in 1..=MAX_COMPONENTS,
        probs in prop::collection::vec(0.05f64..0.95, MAX_VARS * MAX_COMPONENTS),
        weights in prop::collection::vec(0.05f64..1.0, MAX_COMPONENTS),
    ) {
        let (net, root) = mixture(vars, components, &probs, &weights);
        for order in [top_sort_tarjan(&net, root), top_sort_tarjan_rec(&net, root)] {
            let position: std::collections::HashMap<NodeId, usize> =
                order.iter().enumerate().map(|(i, &id)| (id, i)).collect();
            prop_assert_eq!(position.len(), order.len());
            for &id in &order {
                for child in net[id].children() {
                    prop_assert!(position[child] < position[&id]);
                }
            }
        }
    }
}
