//! Children-before-parents orderings of the graph reachable from a root.
//!
//! The iterative orderings are the defaults used by every engine; the
//! recursive one is kept for small graphs and cross-checking.

use rustc_hash::FxHashSet;

use crate::network::Network;
use crate::node::NodeId;

/// Recursive DFS post-order. Recursion depth equals the graph depth.
pub fn top_sort_tarjan_rec(net: &Network, root: NodeId) -> Vec<NodeId> {
    fn visit(net: &Network, id: NodeId, visited: &mut FxHashSet<NodeId>, order: &mut Vec<NodeId>) {
        if !visited.insert(id) {
            return;
        }
        for &child in net[id].children() {
            visit(net, child, visited, order);
        }
        order.push(id);
    }

    let mut visited = FxHashSet::default();
    let mut order = Vec::new();
    visit(net, root, &mut visited, &mut order);
    order
}

/// Iterative DFS post-order.
pub fn top_sort_tarjan(net: &Network, root: NodeId) -> Vec<NodeId> {
    post_order(net, root, |_| true, |_| true)
}

/// [`top_sort_tarjan`], calling `f` as each node is emitted. Returning `false`
/// stops the traversal; the order emitted so far (including that node) is returned.
pub fn top_sort_tarjan_with<F>(net: &Network, root: NodeId, f: F) -> Vec<NodeId>
where
    F: FnMut(NodeId) -> bool,
{
    post_order(net, root, |_| true, f)
}

/// Post-order that emits nodes failing `expand` without descending into them.
pub fn post_order_pruned<E>(net: &Network, root: NodeId, expand: E) -> Vec<NodeId>
where
    E: FnMut(NodeId) -> bool,
{
    post_order(net, root, expand, |_| true)
}

/// Every node reachable from `root`, children first.
pub fn reachable(net: &Network, root: NodeId) -> Vec<NodeId> {
    top_sort_tarjan(net, root)
}

fn post_order<E, F>(net: &Network, root: NodeId, mut expand: E, mut emit: F) -> Vec<NodeId>
where
    E: FnMut(NodeId) -> bool,
    F: FnMut(NodeId) -> bool,
{
    let mut order = Vec::new();
    // discovered: children pushed; finalized: emitted.
    let mut discovered = FxHashSet::default();
    let mut finalized = FxHashSet::default();
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        if finalized.contains(&id) {
            continue;
        }
        if discovered.contains(&id) || !expand(id) {
            finalized.insert(id);
            order.push(id);
            if !emit(id) {
                break;
            }
            continue;
        }
        discovered.insert(id);
        stack.push(id);
        // Reverse so the first child is expanded first.
        for &child in net[id].children().iter().rev() {
            if !discovered.contains(&child) {
                stack.push(child);
            }
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    /// r -> [b, a], a -> [b]: b is pushed by r before a is expanded.
    fn shared_child() -> (Network, NodeId, NodeId, NodeId) {
        let mut net = Network::new();
        let b = net.leaf(0, vec![0.5, 0.5]).unwrap();
        let a = net.sum();
        net.add_weighted_child(a, b, 1.0).unwrap();
        let r = net.sum();
        net.add_weighted_child(r, b, 0.5).unwrap();
        net.add_weighted_child(r, a, 0.5).unwrap();
        (net, r, a, b)
    }

    #[test]
    fn shared_child_precedes_every_parent() {
        let (net, r, a, b) = shared_child();
        assert_eq!(top_sort_tarjan(&net, r), vec![b, a, r]);
        assert_eq!(top_sort_tarjan_rec(&net, r), vec![b, a, r]);
    }

    #[test]
    fn halting_returns_partial_order() {
        let (net, r, _, b) = shared_child();
        let order = top_sort_tarjan_with(&net, r, |id| id != b);
        assert_eq!(order, vec![b]);
    }

    #[test]
    fn pruned_nodes_are_not_expanded() {
        let (net, r, a, _) = shared_child();
        let order = post_order_pruned(&net, r, |id| id != a);
        // `a` is emitted as-is, its child still comes in through `r`.
        assert_eq!(order.len(), 3);
        assert_eq!(order.last(), Some(&r));

        let order = post_order_pruned(&net, r, |id| id != r);
        assert_eq!(order, vec![r]);
    }

    #[test]
    fn reachable_skips_unrelated_nodes() {
        let (mut net, r, _, _) = shared_child();
        let stray = net.product();
        let found = reachable(&net, r);
        assert_eq!(found.len(), 3);
        assert!(!found.contains(&stray));
    }
}
