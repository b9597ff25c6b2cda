//! The node/edge arena that every graph view is taken over.

use gw_core::{EdgeId, NodeId};

use crate::edge::Edge;
use crate::error::{GraphError, GraphResult};
use crate::geometry::Point;
use crate::node::Node;

/// Owns every node and edge, addressed by id.
///
/// `revision` increments on every effective attach/detach so that views
/// built from an earlier topology can tell they are stale.
#[derive(Debug, Clone, Default)]
pub struct Network {
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    revision: u64,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            nodes,
            edges,
            revision: 0,
        }
    }

    /// Add a node and return its id.
    pub fn add_node(&mut self, x: f64, y: f64, load: f64) -> GraphResult<NodeId> {
        let id = NodeId::from_index(self.nodes.len() as u32);
        let position = Point::new(x, y);
        if !position.is_finite() {
            return Err(GraphError::InvalidCoordinate { node: id });
        }
        if !load.is_finite() || load < 0.0 {
            return Err(GraphError::InvalidLoad { node: id, load });
        }
        self.nodes.push(Node::new(id, position, load));
        Ok(id)
    }

    /// Add a detached edge of the given length.
    ///
    /// Self-loops are accepted and flagged impossible; they can never attach.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, length: f64) -> GraphResult<EdgeId> {
        let id = EdgeId::from_index(self.edges.len() as u32);
        for n in [a, b] {
            if self.node(n).is_none() {
                return Err(GraphError::InvalidNodeRef { edge: id, node: n });
            }
        }
        if !length.is_finite() || length < 0.0 {
            return Err(GraphError::InvalidLength { edge: id, length });
        }
        self.edges.push(Edge::new(id, a, b, length));
        Ok(id)
    }

    /// Add a detached edge whose length is the straight-line distance.
    pub fn add_edge_between(&mut self, a: NodeId, b: NodeId) -> GraphResult<EdgeId> {
        let length = self.euclidean_distance(a, b)?;
        self.add_edge(a, b, length)
    }

    /// Candidate edges for every unordered node pair (the complete graph),
    /// all detached.
    pub fn add_complete_graph(&mut self) -> GraphResult<Vec<EdgeId>> {
        let n = self.nodes.len();
        let mut ids = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                let a = NodeId::from_index(i as u32);
                let b = NodeId::from_index(j as u32);
                ids.push(self.add_edge_between(a, b)?);
            }
        }
        Ok(ids)
    }

    /// Record the edge on both endpoints. Returns whether anything changed.
    ///
    /// Attaching twice, or attaching a self-loop, is a no-op.
    pub fn attach(&mut self, id: EdgeId) -> GraphResult<bool> {
        let edge = self
            .edges
            .get(id.slot())
            .ok_or(GraphError::UnknownEdge { edge: id })?;
        if edge.attached || !edge.is_possible() {
            return Ok(false);
        }
        let [a, b] = edge.nodes;
        for n in [a, b] {
            let node = &mut self.nodes[n.slot()];
            if !node.edges.contains(&id) {
                node.edges.push(id);
            }
        }
        self.edges[id.slot()].attached = true;
        self.revision += 1;
        Ok(true)
    }

    /// Remove the edge from both endpoints. Detaching a detached edge is a no-op.
    pub fn detach(&mut self, id: EdgeId) -> GraphResult<bool> {
        let edge = self
            .edges
            .get(id.slot())
            .ok_or(GraphError::UnknownEdge { edge: id })?;
        if !edge.attached {
            return Ok(false);
        }
        let [a, b] = edge.nodes;
        for n in [a, b] {
            self.nodes[n.slot()].edges.retain(|e| *e != id);
        }
        self.edges[id.slot()].attached = false;
        self.revision += 1;
        Ok(true)
    }

    /// Change a node's demand. Not a structural change.
    pub fn set_load(&mut self, id: NodeId, load: f64) -> GraphResult<()> {
        if !load.is_finite() || load < 0.0 {
            return Err(GraphError::InvalidLoad { node: id, load });
        }
        let node = self
            .nodes
            .get_mut(id.slot())
            .ok_or(GraphError::UnknownNode { node: id })?;
        node.load = load;
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.slot())
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.slot())
    }

    pub fn try_node(&self, id: NodeId) -> GraphResult<&Node> {
        self.node(id).ok_or(GraphError::UnknownNode { node: id })
    }

    pub fn try_edge(&self, id: EdgeId) -> GraphResult<&Edge> {
        self.edge(id).ok_or(GraphError::UnknownEdge { edge: id })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    pub fn attached_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| e.attached)
    }

    /// Attached neighbours of a node as `(neighbour, edge)` pairs.
    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, EdgeId)> + '_ {
        self.node(id)
            .map(|n| n.edges.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(move |e| {
                let edge = &self.edges[e.slot()];
                edge.other(id).map(|other| (other, edge.id))
            })
    }

    /// Is there an attached edge directly joining `a` and `b`?
    pub fn has_edge_between(&self, a: NodeId, b: NodeId) -> bool {
        self.neighbors(a).any(|(n, _)| n == b)
    }

    pub fn euclidean_distance(&self, a: NodeId, b: NodeId) -> GraphResult<f64> {
        Ok(self.try_node(a)?.euclidean_distance(self.try_node(b)?))
    }

    pub fn position(&self, id: NodeId) -> GraphResult<Point> {
        Ok(self.try_node(id)?.position)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn total_load(&self) -> f64 {
        self.nodes.iter().map(|n| n.load).sum()
    }
}
