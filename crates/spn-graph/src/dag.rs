//! Cycle detection over the node arena.
//!
//! `Network` implements petgraph's visit traits (children are the outgoing
//! neighbors), so `Dfs` and `tarjan_scc` run on the arena directly.

use std::collections::HashSet;
use std::iter::{Copied, Map};
use std::ops::Range;
use std::slice;

use petgraph::algo::tarjan_scc;
use petgraph::visit::{
    Dfs, GraphBase, IntoNeighbors, IntoNodeIdentifiers, NodeIndexable, Visitable,
};

use crate::network::Network;
use crate::node::NodeId;

impl GraphBase for Network {
    type EdgeId = (crate::node::NodeId, crate::node::NodeId);
    type NodeId = crate::node::NodeId;
}

impl Visitable for Network {
    type Map = HashSet<NodeId>;

    fn visit_map(&self) -> Self::Map {
        HashSet::with_capacity(self.len())
    }

    fn reset_map(&self, map: &mut Self::Map) {
        map.clear();
    }
}

impl NodeIndexable for Network {
    fn node_bound(&self) -> usize {
        self.len()
    }

    fn to_index(&self, a: NodeId) -> usize {
        a.index()
    }

    fn from_index(&self, i: usize) -> NodeId {
        NodeId::new(i)
    }
}

impl<'a> IntoNeighbors for &'a Network {
    type Neighbors = Copied<slice::Iter<'a, NodeId>>;

    fn neighbors(self, a: NodeId) -> Self::Neighbors {
        self[a].children().iter().copied()
    }
}

impl IntoNodeIdentifiers for &Network {
    type NodeIdentifiers = Map<Range<usize>, fn(usize) -> NodeId>;

    fn node_identifiers(self) -> Self::NodeIdentifiers {
        (0..self.len()).map(NodeId::new as fn(usize) -> NodeId)
    }
}

/// Whether adding the edge `parent -> child` would close a cycle.
pub fn would_create_cycle(net: &Network, parent: NodeId, child: NodeId) -> bool {
    if parent == child {
        return true;
    }
    // The edge closes a cycle iff the parent is already reachable from the child.
    has_path(net, child, parent)
}

/// DFS reachability: can `to` be reached from `from` along child edges?
pub fn has_path(net: &Network, from: NodeId, to: NodeId) -> bool {
    let mut dfs = Dfs::new(net, from);
    while let Some(node) = dfs.next(net) {
        if node == to {
            return true;
        }
    }
    false
}

/// Strongly connected components with more than one node, plus self-loops.
pub fn find_cycles(net: &Network) -> Vec<Vec<NodeId>> {
    tarjan_scc(net)
        .into_iter()
        .filter(|scc| scc.len() > 1 || scc.iter().any(|&n| net[n].children().contains(&n)))
        .collect()
}
