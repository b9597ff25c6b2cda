//! Views with no reachability guarantee.

use gw_core::NodeId;

use crate::connected::ConnectedGraph;
use crate::error::GraphResult;
use crate::graph::Graph;
use crate::network::Network;

/// A node set that may fall apart into several components.
#[derive(Debug, Clone)]
pub struct DisjointGraph {
    graph: Graph,
}

impl DisjointGraph {
    pub fn new(network: &Network, nodes: impl IntoIterator<Item = NodeId>) -> GraphResult<Self> {
        Ok(Self {
            graph: Graph::new(network, nodes)?,
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn nodes(&self) -> &[NodeId] {
        self.graph.nodes()
    }

    /// One connected view per component, in order of first node.
    pub fn connected_subgraphs(&self) -> Vec<ConnectedGraph> {
        self.components()
            .into_iter()
            .map(|nodes| ConnectedGraph::from_graph(self.graph.subgraph(&nodes)))
            .collect()
    }

    /// Node groups of each component.
    pub fn components(&self) -> Vec<Vec<NodeId>> {
        self.graph.union_find().disjoint_sets()
    }

    /// The component with the most nodes; the first one wins a tie.
    pub fn largest_subgraph(&self) -> Option<ConnectedGraph> {
        let mut best: Option<Vec<NodeId>> = None;
        for c in self.components() {
            if best.as_ref().is_none_or(|b| c.len() > b.len()) {
                best = Some(c);
            }
        }
        best.map(|nodes| ConnectedGraph::from_graph(self.graph.subgraph(&nodes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::NetworkBuilder;

    #[test]
    fn splits_into_components() {
        let mut b = NetworkBuilder::new();
        let n: Vec<NodeId> = (0..7).map(|i| b.add_node(i as f64, 0.0, 1.0)).collect();
        b.add_line(n[0], n[1], 1.0);
        b.add_line(n[2], n[3], 1.0);
        b.add_line(n[3], n[4], 1.0);
        b.add_line(n[5], n[6], 1.0);
        let net = b.build().unwrap();

        // leave n[6] out: n[5] is isolated inside the view
        let dg = DisjointGraph::new(&net, n[..6].to_vec()).unwrap();
        let subs = dg.connected_subgraphs();
        let sizes: Vec<usize> = subs.iter().map(|s| s.len()).collect();
        assert_eq!(sizes, vec![2, 3, 1]);
        assert_eq!(subs[1].graph().edge_count(), 2);

        let largest = dg.largest_subgraph().unwrap();
        assert_eq!(largest.nodes(), &[n[2], n[3], n[4]]);
    }

    #[test]
    fn empty_view_has_no_components() {
        let net = NetworkBuilder::new().build().unwrap();
        let dg = DisjointGraph::new(&net, Vec::new()).unwrap();
        assert!(dg.connected_subgraphs().is_empty());
        assert!(dg.largest_subgraph().is_none());
    }
}
