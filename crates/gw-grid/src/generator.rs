//! Power sources.

use gw_core::{GenId, NodeId};
use gw_graph::{BoundingBox, ConnectedGraph, Network};

/// A source bound to one node of the grid's graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    pub id: GenId,
    pub node: NodeId,
    pub capacity: f64,
    pub fuel: Option<String>,
}

impl Generator {
    pub fn within(&self, network: &Network, bounds: &BoundingBox) -> bool {
        network.node(self.node).is_some_and(|n| n.within(bounds))
    }

    /// Distance along `graph` from this generator to `other`.
    pub fn distance_to(&self, graph: &ConnectedGraph, other: NodeId) -> Option<f64> {
        graph.manhattan_distance(self.node, other)
    }
}

/// A generator to be placed when a grid is assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSpec {
    pub node: NodeId,
    pub capacity: f64,
    pub fuel: Option<String>,
}

impl GeneratorSpec {
    pub fn new(node: NodeId, capacity: f64) -> Self {
        Self {
            node,
            capacity,
            fuel: None,
        }
    }

    pub fn with_fuel(mut self, fuel: impl Into<String>) -> Self {
        self.fuel = Some(fuel.into());
        self
    }
}
