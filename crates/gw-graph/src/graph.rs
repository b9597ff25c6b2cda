//! Adjacency view over a subset of the network's nodes.

use std::collections::{HashMap, HashSet, VecDeque};

use gw_core::{EdgeId, NodeId};

use crate::error::{GraphError, GraphResult};
use crate::network::Network;
use crate::union_find::UnionFind;

/// One adjacency entry: the neighbour, the edge leading to it and its length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjacent {
    pub node: NodeId,
    pub edge: EdgeId,
    pub length: f64,
}

/// Endpoints and length of an induced edge, copied out of the network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeInfo {
    pub ends: [NodeId; 2],
    pub length: f64,
}

impl EdgeInfo {
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.ends[0] == node {
            Some(self.ends[1])
        } else if self.ends[1] == node {
            Some(self.ends[0])
        } else {
            None
        }
    }
}

/// A node set plus the attached edges whose endpoints both lie in the set.
///
/// The view is a snapshot: after the network is attached/detached it must be
/// rebuilt with [`Graph::reset`] (see [`Graph::is_stale`]).
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<NodeId>,
    members: HashSet<NodeId>,
    adjacency: HashMap<NodeId, Vec<Adjacent>>,
    edge_order: Vec<EdgeId>,
    edges: HashMap<EdgeId, EdgeInfo>,
    revision: u64,
}

impl Graph {
    /// Restrict the network to `nodes`. Duplicates are dropped, order kept.
    pub fn new(network: &Network, nodes: impl IntoIterator<Item = NodeId>) -> GraphResult<Self> {
        let mut members = HashSet::new();
        let mut ordered = Vec::new();
        for n in nodes {
            network.try_node(n)?;
            if members.insert(n) {
                ordered.push(n);
            }
        }
        let mut graph = Self {
            nodes: ordered,
            members,
            adjacency: HashMap::new(),
            edge_order: Vec::new(),
            edges: HashMap::new(),
            revision: network.revision(),
        };
        graph.fill_adjacency(network);
        Ok(graph)
    }

    /// Rebuild adjacency against the network's current edge set.
    pub fn reset(&mut self, network: &Network) {
        self.fill_adjacency(network);
        self.revision = network.revision();
    }

    /// Has the network changed structurally since this view was built?
    pub fn is_stale(&self, network: &Network) -> bool {
        self.revision != network.revision()
    }

    fn fill_adjacency(&mut self, network: &Network) {
        self.adjacency.clear();
        self.edges.clear();
        self.edge_order.clear();

        for &n in &self.nodes {
            let mut list = Vec::new();
            for &e in network.nodes[n.slot()].edges() {
                let edge = &network.edges[e.slot()];
                let Some(other) = edge.other(n) else { continue };
                if !self.members.contains(&other) {
                    continue;
                }
                list.push(Adjacent {
                    node: other,
                    edge: e,
                    length: edge.length,
                });
                if !self.edges.contains_key(&e) {
                    self.edges.insert(
                        e,
                        EdgeInfo {
                            ends: edge.nodes,
                            length: edge.length,
                        },
                    );
                    self.edge_order.push(e);
                }
            }
            self.adjacency.insert(n, list);
        }
    }

    /// Restrict this view further without going back to the network.
    /// Nodes outside the view are ignored.
    pub fn subgraph(&self, nodes: &[NodeId]) -> Graph {
        let mut members = HashSet::new();
        let ordered: Vec<NodeId> = nodes
            .iter()
            .copied()
            .filter(|n| self.contains(*n) && members.insert(*n))
            .collect();

        let mut adjacency = HashMap::with_capacity(ordered.len());
        let mut edge_order = Vec::new();
        let mut edges = HashMap::new();
        for &n in &ordered {
            let list: Vec<Adjacent> = self
                .neighbors(n)
                .iter()
                .filter(|a| members.contains(&a.node))
                .copied()
                .collect();
            for a in &list {
                if !edges.contains_key(&a.edge) {
                    edges.insert(a.edge, self.edges[&a.edge]);
                    edge_order.push(a.edge);
                }
            }
            adjacency.insert(n, list);
        }

        Graph {
            nodes: ordered,
            members,
            adjacency,
            edge_order,
            edges,
            revision: self.revision,
        }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.members.contains(&node)
    }

    /// Induced edges, in first-seen order.
    pub fn edge_ids(&self) -> &[EdgeId] {
        &self.edge_order
    }

    pub fn edge_count(&self) -> usize {
        self.edge_order.len()
    }

    pub fn edge_info(&self, edge: EdgeId) -> Option<&EdgeInfo> {
        self.edges.get(&edge)
    }

    pub fn try_edge_info(&self, edge: EdgeId) -> GraphResult<&EdgeInfo> {
        self.edge_info(edge).ok_or(GraphError::UnknownEdge { edge })
    }

    pub fn neighbors(&self, node: NodeId) -> &[Adjacent] {
        self.adjacency.get(&node).map_or(&[], Vec::as_slice)
    }

    /// Degree inside the view.
    pub fn degree(&self, node: NodeId) -> usize {
        self.neighbors(node).len()
    }

    /// Breadth-first walk from `source`, calling `visit(edge, from, to)` for
    /// each tree edge in discovery order.
    pub fn traverse<F>(&self, source: NodeId, mut visit: F)
    where
        F: FnMut(EdgeId, NodeId, NodeId),
    {
        if !self.contains(source) {
            return;
        }
        let mut seen = HashSet::from([source]);
        let mut queue = VecDeque::from([source]);
        while let Some(front) = queue.pop_front() {
            for adj in self.neighbors(front) {
                if seen.insert(adj.node) {
                    visit(adj.edge, front, adj.node);
                    queue.push_back(adj.node);
                }
            }
        }
    }

    /// Nodes reachable from `source`, in BFS order (source first).
    pub fn reachable_from(&self, source: NodeId) -> Vec<NodeId> {
        if !self.contains(source) {
            return Vec::new();
        }
        let mut order = vec![source];
        self.traverse(source, |_, _, to| order.push(to));
        order
    }

    pub fn total_edge_length(&self) -> f64 {
        self.edge_order.iter().map(|e| self.edges[e].length).sum()
    }

    /// Number of connected components inside the view.
    pub fn component_count(&self) -> usize {
        self.union_find().disjoint_sets().len()
    }

    /// A forest has exactly `nodes − components` edges.
    pub fn is_acyclic(&self) -> bool {
        self.edge_count() + self.component_count() == self.len()
    }

    pub(crate) fn union_find(&self) -> UnionFind<NodeId> {
        let mut uf = UnionFind::new(self.nodes.iter().copied());
        for e in &self.edge_order {
            let [a, b] = self.edges[e].ends;
            uf.union(a, b);
        }
        uf
    }
}
