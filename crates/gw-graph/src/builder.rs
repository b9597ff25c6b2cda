//! Incremental network builder.

use gw_core::{EdgeId, NodeId};

use crate::edge::Edge;
use crate::error::GraphResult;
use crate::geometry::Point;
use crate::network::Network;
use crate::node::Node;
use crate::validate;

/// Builder for constructing a network from external records.
///
/// Use `add_node` and `add_line` to describe the network, then call
/// `build()` to validate it and attach every line.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    next_node_id: u32,
    next_edge_id: u32,
}

impl NetworkBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its ID.
    pub fn add_node(&mut self, x: f64, y: f64, load: f64) -> NodeId {
        let id = NodeId::from_index(self.next_node_id);
        self.next_node_id += 1;
        self.nodes.push(Node::new(id, Point::new(x, y), load));
        id
    }

    /// Add a line between two nodes.
    ///
    /// Lines added here are attached by `build()`.
    pub fn add_line(&mut self, a: NodeId, b: NodeId, length: f64) -> EdgeId {
        let id = EdgeId::from_index(self.next_edge_id);
        self.next_edge_id += 1;
        self.edges.push(Edge::new(id, a, b, length));
        id
    }

    /// Add a line with a nominal voltage.
    pub fn add_line_with_voltage(
        &mut self,
        a: NodeId,
        b: NodeId,
        length: f64,
        voltage: Option<f64>,
    ) -> EdgeId {
        let id = self.add_line(a, b, length);
        self.edges[id.slot()].voltage = voltage;
        id
    }

    /// Update the demand at a node before building.
    pub fn set_load(&mut self, node: NodeId, load: f64) {
        if let Some(n) = self.nodes.get_mut(node.slot()) {
            n.load = load;
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Validate and build the network, attaching every possible line.
    pub fn build(self) -> GraphResult<Network> {
        validate::validate_structure(&self.nodes, &self.edges)?;

        let ids: Vec<EdgeId> = self.edges.iter().map(|e| e.id).collect();
        let mut network = Network::from_parts(self.nodes, self.edges);
        for id in ids {
            network.attach(id)?;
        }

        validate::validate_incidence(&network)?;
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;

    #[test]
    fn builder_basic() {
        let mut builder = NetworkBuilder::new();
        let n1 = builder.add_node(0.0, 0.0, 1.0);
        let n2 = builder.add_node(1.0, 0.0, 2.0);
        let e1 = builder.add_line(n1, n2, 1.0);

        assert_eq!(n1.index(), 0);
        assert_eq!(n2.index(), 1);
        assert_eq!(e1.index(), 0);
        assert_eq!(builder.node_count(), 2);
        assert_eq!(builder.edge_count(), 1);
    }

    #[test]
    fn builder_build_attaches_lines() {
        let mut builder = NetworkBuilder::new();
        let n1 = builder.add_node(0.0, 0.0, 0.0);
        let n2 = builder.add_node(1.0, 0.0, 1.0);
        let n3 = builder.add_node(2.0, 0.0, 1.0);
        let e1 = builder.add_line(n1, n2, 1.0);
        builder.add_line_with_voltage(n2, n3, 1.0, Some(345.0));

        let net = builder.build().unwrap();
        assert_eq!(net.nodes().len(), 3);
        assert_eq!(net.attached_edges().count(), 2);
        assert_eq!(net.node(n2).unwrap().degree(), 2);
        assert!(net.edge(e1).unwrap().is_attached());
        assert_eq!(net.edges()[1].voltage, Some(345.0));
    }

    #[test]
    fn builder_self_loop_stays_detached() {
        let mut builder = NetworkBuilder::new();
        let n1 = builder.add_node(0.0, 0.0, 0.0);
        let e = builder.add_line(n1, n1, 0.0);
        let net = builder.build().unwrap();
        assert!(!net.edge(e).unwrap().is_attached());
    }

    #[test]
    fn builder_rejects_dangling_line() {
        let mut builder = NetworkBuilder::new();
        let n1 = builder.add_node(0.0, 0.0, 0.0);
        builder.add_line(n1, NodeId::from_index(7), 1.0);
        assert!(matches!(
            builder.build(),
            Err(GraphError::InvalidNodeRef { .. })
        ));
    }
}
