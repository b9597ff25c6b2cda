//! Generator site selection inside a cluster.

use gw_core::NodeId;

use crate::connected::{ConnectedGraph, EdgeMetric};
use crate::network::Network;

impl ConnectedGraph {
    /// Median node of the longest path.
    pub fn site_median(&self) -> NodeId {
        self.median_node()
    }

    /// Site away from neighbouring clusters.
    ///
    /// For each border node take the node farthest from it by hop count. One
    /// candidate is used as is; otherwise the two farthest candidates are
    /// joined and the site is the median of the path between them. `None`
    /// when nothing leaves the cluster.
    pub fn site_on_premises(&self, network: &Network) -> Option<NodeId> {
        let mut farthest: Vec<(NodeId, f64)> = self
            .border_nodes(network)
            .into_iter()
            .filter_map(|b| self.farthest_node_from(b, EdgeMetric::Hops))
            .collect();

        match farthest.len() {
            0 => None,
            1 => Some(farthest[0].0),
            len => {
                farthest.sort_by(|a, b| a.1.total_cmp(&b.1));
                let (pen, _) = farthest[len - 2];
                let (ult, _) = farthest[len - 1];
                if pen == ult {
                    return Some(pen);
                }
                Some(self.path_between(pen, ult).map_or(pen, |p| p.median()))
            }
        }
    }
}
