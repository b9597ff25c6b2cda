//! Network nodes (buses / substations).

use gw_core::{EdgeId, NodeId};

use crate::geometry::{BoundingBox, Point};

/// A node: position, demand and the attached edges incident to it.
///
/// The incidence list holds edge ids only; the edge itself lives in the
/// owning [`Network`](crate::Network) and is shared by both endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub position: Point,
    pub(crate) load: f64,
    pub(crate) edges: Vec<EdgeId>,
}

impl Node {
    pub(crate) fn new(id: NodeId, position: Point, load: f64) -> Self {
        Self {
            id,
            position,
            load,
            edges: Vec::new(),
        }
    }

    /// Non-negative demand drawn at this node.
    pub fn load(&self) -> f64 {
        self.load
    }

    /// Attached edges incident to this node, in attach order.
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn degree(&self) -> usize {
        self.edges.len()
    }

    pub fn euclidean_distance(&self, other: &Node) -> f64 {
        self.position.distance(&other.position)
    }

    pub fn within(&self, bounds: &BoundingBox) -> bool {
        bounds.contains(self.position)
    }
}
