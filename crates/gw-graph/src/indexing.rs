//! Dense node indices for matrix work over a graph view.

use gw_core::NodeId;

use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;

/// Row/column index of every node in a view, in the view's own order.
///
/// Views hold arbitrary subsets of the network, so node ids are sparse here
/// even though they are contiguous in the network itself.
#[derive(Debug, Clone)]
pub struct IndexMap {
    len: usize,
    /// Sized to the largest member slot + 1; `None` for non-members.
    node_to_idx: Vec<Option<usize>>,
}

impl IndexMap {
    pub fn from_graph(graph: &Graph) -> Self {
        let nodes = graph.nodes();
        let size = nodes.iter().map(|n| n.slot() + 1).max().unwrap_or(0);
        let mut node_to_idx = vec![None; size];
        for (i, n) in nodes.iter().enumerate() {
            node_to_idx[n.slot()] = Some(i);
        }
        Self {
            len: nodes.len(),
            node_to_idx,
        }
    }

    pub fn node_count(&self) -> usize {
        self.len
    }

    pub fn node_idx(&self, id: NodeId) -> GraphResult<usize> {
        self.node_to_idx
            .get(id.slot())
            .copied()
            .flatten()
            .ok_or(GraphError::UnknownNode { node: id })
    }
}
