//! Network validation logic.

use crate::edge::Edge;
use crate::error::{GraphError, GraphResult};
use crate::network::Network;
use crate::node::Node;

/// Validate the raw records: ids match slots, references exist, values are sane.
pub(crate) fn validate_structure(nodes: &[Node], edges: &[Edge]) -> GraphResult<()> {
    for (i, node) in nodes.iter().enumerate() {
        if node.id.slot() != i {
            return Err(GraphError::NonContiguousId {
                what: "node",
                index: node.id.slot(),
                slot: i,
            });
        }
        if !node.position.is_finite() {
            return Err(GraphError::InvalidCoordinate { node: node.id });
        }
        if !node.load.is_finite() || node.load < 0.0 {
            return Err(GraphError::InvalidLoad {
                node: node.id,
                load: node.load,
            });
        }
    }

    for (i, edge) in edges.iter().enumerate() {
        if edge.id.slot() != i {
            return Err(GraphError::NonContiguousId {
                what: "edge",
                index: edge.id.slot(),
                slot: i,
            });
        }
        for &n in &edge.nodes {
            if n.slot() >= nodes.len() {
                return Err(GraphError::InvalidNodeRef {
                    edge: edge.id,
                    node: n,
                });
            }
        }
        if !edge.length.is_finite() || edge.length < 0.0 {
            return Err(GraphError::InvalidLength {
                edge: edge.id,
                length: edge.length,
            });
        }
    }

    Ok(())
}

/// Every attached edge is listed exactly once on both endpoints, and every
/// incidence entry points to an attached edge touching that node.
pub(crate) fn validate_incidence(network: &Network) -> GraphResult<()> {
    for edge in network.attached_edges() {
        for &n in &edge.nodes {
            let listed = network.nodes[n.slot()]
                .edges
                .iter()
                .filter(|e| **e == edge.id)
                .count();
            if listed != 1 {
                return Err(GraphError::InconsistentIncidence {
                    edge: edge.id,
                    node: n,
                });
            }
        }
    }

    for node in &network.nodes {
        for &e in &node.edges {
            let ok = network
                .edges
                .get(e.slot())
                .is_some_and(|edge| edge.attached && edge.touches(node.id));
            if !ok {
                return Err(GraphError::InconsistentIncidence {
                    edge: e,
                    node: node.id,
                });
            }
        }
    }

    Ok(())
}
