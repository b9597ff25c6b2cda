//! Ordered edge walks through a graph view.

use gw_core::{EdgeId, NodeId};

use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;

/// An edge sequence with its node sequence (`edges.len() + 1` nodes).
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    nodes: Vec<NodeId>,
    edges: Vec<EdgeId>,
    lengths: Vec<f64>,
    length: f64,
}

impl Path {
    /// A path with no edges, sitting on `start`.
    pub fn trivial(start: NodeId) -> Self {
        Self {
            nodes: vec![start],
            edges: Vec::new(),
            lengths: Vec::new(),
            length: 0.0,
        }
    }

    /// Walk `edges` from `start`, recovering the node order.
    pub fn from_edges(graph: &Graph, start: NodeId, edges: &[EdgeId]) -> GraphResult<Self> {
        let mut nodes = Vec::with_capacity(edges.len() + 1);
        let mut lengths = Vec::with_capacity(edges.len());
        nodes.push(start);
        let mut cur = start;
        for &e in edges {
            let info = graph.try_edge_info(e)?;
            cur = info
                .other(cur)
                .ok_or(GraphError::InvalidNodeRef { edge: e, node: cur })?;
            nodes.push(cur);
            lengths.push(info.length);
        }
        Ok(Self {
            nodes,
            edges: edges.to_vec(),
            length: lengths.iter().sum(),
            lengths,
        })
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn start(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn end(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Walk until the running length first exceeds `threshold × length`, then
    /// return whichever endpoint of the crossing edge is nearer the mark. An
    /// exact tie goes to the far endpoint.
    pub fn partition(&self, threshold: f64) -> NodeId {
        let target = self.length * threshold;
        let mut total = 0.0;
        for (i, len) in self.lengths.iter().enumerate() {
            let prev = total;
            total += len;
            if total > target {
                return if total - target <= target - prev {
                    self.nodes[i + 1]
                } else {
                    self.nodes[i]
                };
            }
        }
        if self.length == 0.0 {
            self.start()
        } else {
            self.end()
        }
    }

    pub fn median(&self) -> NodeId {
        self.partition(0.5)
    }
}
