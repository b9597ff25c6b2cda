//! Transmission lines.

use gw_core::{EdgeId, NodeId};

/// Conductor resistance in ohm/km (ACSR "Quail"); lengths are treated as km.
pub const RESISTANCE_PER_KM: f64 = 0.4247;

/// Flows are in kA, so I²R comes out a factor 1e3 too large for MW.
pub const LOSS_SCALE: f64 = 1e-3;

/// An undirected line between two nodes.
///
/// An edge starts detached; attaching it records it on both endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub nodes: [NodeId; 2],
    pub length: f64,
    pub voltage: Option<f64>,
    pub(crate) attached: bool,
}

impl Edge {
    pub(crate) fn new(id: EdgeId, a: NodeId, b: NodeId, length: f64) -> Self {
        Self {
            id,
            nodes: [a, b],
            length,
            voltage: None,
            attached: false,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// A self-loop can be described but never built.
    pub fn is_possible(&self) -> bool {
        self.nodes[0] != self.nodes[1]
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// The endpoint opposite `node`, if `node` is an endpoint.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.nodes[0] == node {
            Some(self.nodes[1])
        } else if self.nodes[1] == node {
            Some(self.nodes[0])
        } else {
            None
        }
    }

    /// Total series resistance of the line.
    pub fn resistance(&self) -> f64 {
        line_resistance(self.length)
    }

    /// Resistive (Joule) loss for a given flow.
    pub fn loss(&self, flow: f64) -> f64 {
        line_loss(self.length, flow)
    }
}

pub fn line_resistance(length: f64) -> f64 {
    length * RESISTANCE_PER_KM
}

/// `flow² · R/km · length · scale`
pub fn line_loss(length: f64, flow: f64) -> f64 {
    flow * flow * RESISTANCE_PER_KM * length * LOSS_SCALE
}
