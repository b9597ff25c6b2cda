//! Minimum spanning forests: Kruskal and parallel filter-Kruskal.
//!
//! Filter-Kruskal splits the candidates around a pivot length, solves the
//! light half, then throws away every heavy candidate whose endpoints the
//! light half already joined before recursing on what is left. A discarded
//! edge is always bridged by lighter edges chosen earlier, so the result has
//! the same weight as plain Kruskal. Partition and filter are independent
//! per edge and run on the context's pool.

use gw_core::ExecContext;
use gw_core::timing::Timer;
use gw_core::{EdgeId, NodeId};
use tracing::debug;

use crate::edge::Edge;
use crate::error::GraphResult;
use crate::network::Network;
use crate::union_find::UnionFind;

/// Below this many candidates filter-Kruskal hands over to plain Kruskal.
pub const SEQUENTIAL_THRESHOLD: usize = 150_000;

/// A candidate line for the spanning forest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub edge: EdgeId,
    pub ends: [NodeId; 2],
    pub length: f64,
}

impl From<&Edge> for Candidate {
    fn from(edge: &Edge) -> Self {
        Self {
            edge: edge.id,
            ends: edge.nodes,
            length: edge.length,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MstAlgorithm {
    Kruskal,
    FilterKruskal,
}

#[derive(Debug, Clone)]
pub struct SpanningForest {
    pub edges: Vec<EdgeId>,
    pub total_length: f64,
    pub algorithm: MstAlgorithm,
}

/// Classic Kruskal: sort ascending (stable), keep each edge that joins two
/// groups.
pub fn kruskal(mut candidates: Vec<Candidate>, uf: &mut UnionFind<NodeId>, out: &mut Vec<Candidate>) {
    candidates.sort_by(|a, b| a.length.total_cmp(&b.length));
    for c in candidates {
        let [a, b] = c.ends;
        if a != b && !uf.connected(a, b) {
            uf.union(a, b);
            out.push(c);
        }
    }
}

/// Filter-Kruskal with a configurable hand-over threshold.
pub fn filter_kruskal(
    ctx: &ExecContext,
    mut candidates: Vec<Candidate>,
    uf: &mut UnionFind<NodeId>,
    out: &mut Vec<Candidate>,
    threshold: usize,
) {
    if candidates.len() <= threshold.max(1) {
        kruskal(candidates, uf, out);
        return;
    }

    let mid = candidates.len() / 2;
    let (_, pivot, _) =
        candidates.select_nth_unstable_by(mid, |a, b| a.length.total_cmp(&b.length));
    let pivot = pivot.length;

    let (light, heavy) = ctx.par_partition(candidates, |c| c.length <= pivot);
    if heavy.is_empty() {
        // every length sits at or below the pivot; splitting would not shrink
        kruskal(light, uf, out);
        return;
    }
    filter_kruskal(ctx, light, uf, out, threshold);

    let heavy = {
        let uf: &UnionFind<NodeId> = uf;
        ctx.par_filter(heavy, |c| !uf.same_set(c.ends[0], c.ends[1]))
    };
    filter_kruskal(ctx, heavy, uf, out, threshold);
}

/// Spanning forest of `nodes` over `candidates`, without touching the network.
pub fn spanning_forest(
    ctx: &ExecContext,
    nodes: &[NodeId],
    candidates: Vec<Candidate>,
    threshold: usize,
) -> SpanningForest {
    let algorithm = if candidates.len() <= threshold {
        MstAlgorithm::Kruskal
    } else {
        MstAlgorithm::FilterKruskal
    };
    debug!(candidates = candidates.len(), ?algorithm, "building spanning forest");

    let mut uf = UnionFind::new(nodes.iter().copied());
    let mut chosen = Vec::with_capacity(nodes.len().saturating_sub(1));
    match algorithm {
        MstAlgorithm::Kruskal => kruskal(candidates, &mut uf, &mut chosen),
        MstAlgorithm::FilterKruskal => filter_kruskal(ctx, candidates, &mut uf, &mut chosen, threshold),
    }

    SpanningForest {
        total_length: chosen.iter().map(|c| c.length).sum(),
        edges: chosen.into_iter().map(|c| c.edge).collect(),
        algorithm,
    }
}

/// Pick a minimum spanning forest out of `edges` and attach it.
pub fn build_spanning_forest(
    ctx: &ExecContext,
    network: &mut Network,
    edges: &[EdgeId],
) -> GraphResult<SpanningForest> {
    let timer = Timer::start("mst");
    let candidates = edges
        .iter()
        .map(|&e| network.try_edge(e).map(Candidate::from))
        .collect::<GraphResult<Vec<_>>>()?;
    let forest = spanning_forest(ctx, &network.node_ids(), candidates, SEQUENTIAL_THRESHOLD);
    for &e in &forest.edges {
        network.attach(e)?;
    }
    debug!(
        edges = forest.edges.len(),
        total_length = forest.total_length,
        "spanning forest attached"
    );
    timer.stop_and_log();
    Ok(forest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use proptest::prelude::*;

    fn points_network(points: &[(f64, f64)]) -> (Network, Vec<EdgeId>) {
        let mut net = Network::new();
        for &(x, y) in points {
            net.add_node(x, y, 1.0).unwrap();
        }
        let edges = net.add_complete_graph().unwrap();
        (net, edges)
    }

    fn candidates(net: &Network, edges: &[EdgeId]) -> Vec<Candidate> {
        edges.iter().map(|e| Candidate::from(net.edge(*e).unwrap())).collect()
    }

    #[test]
    fn square_with_diagonals() {
        let (mut net, edges) = points_network(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let ctx = ExecContext::sequential(1);
        let forest = build_spanning_forest(&ctx, &mut net, &edges).unwrap();
        assert_eq!(forest.algorithm, MstAlgorithm::Kruskal);
        assert_eq!(forest.edges.len(), 3);
        assert!((forest.total_length - 3.0).abs() < 1e-12);
        assert_eq!(net.attached_edges().count(), 3);

        let g = Graph::new(&net, net.node_ids()).unwrap();
        assert!(g.is_acyclic());
        assert_eq!(g.component_count(), 1);
    }

    #[test]
    fn equal_lengths_terminate() {
        let (net, edges) = points_network(&[(0.0, 0.0), (1.0, 0.0), (0.5, 0.866_025_403_784_438_6)]);
        let ctx = ExecContext::sequential(1);
        let forest = spanning_forest(&ctx, &net.node_ids(), candidates(&net, &edges), 1);
        assert_eq!(forest.edges.len(), 2);
    }

    #[test]
    fn forest_over_disconnected_candidates() {
        let mut net = Network::new();
        let n: Vec<NodeId> = (0..4).map(|i| net.add_node(i as f64, 0.0, 0.0).unwrap()).collect();
        let e1 = net.add_edge(n[0], n[1], 1.0).unwrap();
        let e2 = net.add_edge(n[2], n[3], 1.0).unwrap();
        let ctx = ExecContext::sequential(1);
        let forest = build_spanning_forest(&ctx, &mut net, &[e1, e2]).unwrap();
        assert_eq!(forest.edges, vec![e1, e2]);
    }

    proptest! {
        #[test]
        fn filter_kruskal_matches_kruskal(
            points in proptest::collection::vec((0.0f64..10.0, 0.0f64..10.0), 2..25),
            threshold in 1usize..20,
        ) {
            let (net, edges) = points_network(&points);
            let nodes = net.node_ids();
            let seq = ExecContext::sequential(1);
            let par = ExecContext::new(3, 1).unwrap();

            let plain = spanning_forest(&seq, &nodes, candidates(&net, &edges), usize::MAX);
            let filtered = spanning_forest(&par, &nodes, candidates(&net, &edges), threshold);

            prop_assert_eq!(plain.algorithm, MstAlgorithm::Kruskal);
            prop_assert_eq!(plain.edges.len(), nodes.len() - 1);
            prop_assert_eq!(filtered.edges.len(), nodes.len() - 1);
            prop_assert!((plain.total_length - filtered.total_length).abs() < 1e-9);

            let mut uf = UnionFind::new(nodes.iter().copied());
            for e in &filtered.edges {
                let [a, b] = net.edge(*e).unwrap().nodes;
                prop_assert!(uf.union(a, b), "cycle in forest");
            }
        }
    }
}
