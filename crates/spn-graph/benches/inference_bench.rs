//! Criterion benchmarks for spn-graph inference and updates.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use spn_core::{InferenceMode, VarSet};
use spn_graph::{CacheKey, DiscKeys, DiscStorer, Network, NodeId};

const VARS: usize = 16;
const COMPONENTS: usize = 8;

/// Sum of products of sums: every variable gets a two-leaf mixture per component.
fn build() -> (Network, NodeId) {
    let mut net = Network::new();
    let root = net.sum();
    for c in 0..COMPONENTS {
        let p = net.product();
        for v in 0..VARS {
            let bias = ((c * VARS + v) % 7) as f64 / 10.0 + 0.1;
            let a = net.leaf(v, vec![bias, 1.0 - bias]).unwrap();
            let b = net.leaf(v, vec![1.0 - bias, bias]).unwrap();
            let s = net.sum();
            net.add_weighted_child(s, a, 0.5).unwrap();
            net.add_weighted_child(s, b, 0.5).unwrap();
            net.add_child(p, s).unwrap();
        }
        net.add_weighted_child(root, p, 1.0 / COMPONENTS as f64).unwrap();
    }
    (net, root)
}

fn half_observed() -> VarSet {
    (0..VARS).step_by(2).map(|v| (v, v % 2)).collect()
}

fn bench_inference(c: &mut Criterion) {
    let (mut net, root) = build();
    let ev = half_observed();

    c.bench_function("value", |b| b.iter(|| net.value(black_box(root), &ev)));
    c.bench_function("max", |b| b.iter(|| net.max(black_box(root), &ev)));
    c.bench_function("arg_max", |b| b.iter(|| net.arg_max(black_box(root), &ev)));
    c.bench_function("soft_cold", |b| {
        b.iter(|| {
            net.rreset_dp(root, None);
            net.soft(black_box(root), &ev, CacheKey::default())
        })
    });
    c.bench_function("log_soft_cold", |b| {
        b.iter(|| {
            net.rreset_dp(root, None);
            net.log_soft(black_box(root), &ev, CacheKey::log_soft(0))
        })
    });
}

fn bench_training_step(c: &mut Criterion) {
    let (mut net, root) = build();
    let mut correct = half_observed();
    correct.insert(1, 0);
    let storer = DiscStorer::new(
        root,
        correct,
        half_observed(),
        DiscKeys::for_slot(0),
        InferenceMode::Soft,
    );

    c.bench_function("derive_and_disc_update", |b| {
        b.iter(|| {
            storer.derive(&mut net);
            net.disc_update(root, 0.01, &storer);
            storer.reset(&mut net);
        })
    });
}

criterion_group!(benches, bench_inference, bench_training_step);
criterion_main!(benches);
