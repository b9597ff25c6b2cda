//! Graph-specific error types.

use gw_core::{EdgeId, GwError, NodeId};
use thiserror::Error;

/// Network construction, validation and graph-view errors.
#[derive(Error, Debug)]
pub enum GraphError {
    /// A connected view was requested over zero nodes.
    #[error("Graph requires at least one node")]
    EmptyNodeSet,

    /// A node id that is not in the network (or not in the view).
    #[error("Node {node} does not exist")]
    UnknownNode { node: NodeId },

    /// An edge id that is not in the network (or not in the view).
    #[error("Edge {edge} does not exist")]
    UnknownEdge { edge: EdgeId },

    /// An edge refers to a node that doesn't exist.
    #[error("Edge {edge} refers to non-existent node {node}")]
    InvalidNodeRef { edge: EdgeId, node: NodeId },

    /// Edge length is negative or not finite.
    #[error("Edge {edge} has invalid length {length}")]
    InvalidLength { edge: EdgeId, length: f64 },

    /// Node coordinates are not finite.
    #[error("Node {node} has non-finite coordinates")]
    InvalidCoordinate { node: NodeId },

    /// Node demand is negative or not finite.
    #[error("Node {node} has invalid load {load}")]
    InvalidLoad { node: NodeId, load: f64 },

    /// Ids are expected to equal their arena slot.
    #[error("{what} id {index} stored at slot {slot}")]
    NonContiguousId {
        what: &'static str,
        index: usize,
        slot: usize,
    },

    /// An attached edge is missing from one of its endpoint incidence lists.
    #[error("Edge {edge} is attached but not listed on node {node}")]
    InconsistentIncidence { edge: EdgeId, node: NodeId },

    #[error(transparent)]
    Core(#[from] GwError),
}

pub type GraphResult<T> = Result<T, GraphError>;
