//! Error types for grid operations.

use gw_core::{GenId, GwError, NodeId};
use gw_graph::GraphError;
use thiserror::Error;

/// Errors raised while building or mutating a grid.
///
/// Only caller-contract breaches end up here. An undersupplied generator or
/// a congestion search that finds nothing is a normal outcome.
#[derive(Error, Debug)]
pub enum GridError {
    #[error("Grid requires at least one node")]
    NoNodes,

    #[error("Generator at node {node} draws {load} but can supply only {capacity}")]
    GeneratorOverloaded {
        node: NodeId,
        load: f64,
        capacity: f64,
    },

    #[error("Generator node {node} cannot carry a load of its own ({load})")]
    GeneratorSiteLoad { node: NodeId, load: f64 },

    #[error("Generator node {node} is not part of the grid")]
    GeneratorOffGraph { node: NodeId },

    #[error("Generator {id} does not exist")]
    UnknownGenerator { id: GenId },

    #[error("Invalid generator capacity {capacity}")]
    InvalidCapacity { capacity: f64 },

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

pub type GridResult<T> = Result<T, GridError>;

impl From<GwError> for GridError {
    fn from(e: GwError) -> Self {
        GridError::Graph(GraphError::Core(e))
    }
}
