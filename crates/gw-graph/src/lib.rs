//! gw-graph: network and graph layer for gridworks.
//!
//! Provides:
//! - The node/edge arena (`Network`) and an incremental validating builder
//! - Union-find, graph views (`Graph`, `ConnectedGraph`, `DisjointGraph`) and paths
//! - Minimum spanning forests (Kruskal / parallel filter-Kruskal)
//! - Graph-distance k-means++ clustering and generator siting
//! - Resilience metrics over the adjacency matrix
//!
//! # Example
//!
//! ```
//! use gw_graph::{ConnectedGraph, NetworkBuilder};
//!
//! let mut builder = NetworkBuilder::new();
//! let a = builder.add_node(0.0, 0.0, 0.0);
//! let b = builder.add_node(1.0, 0.0, 1.0);
//! let c = builder.add_node(2.0, 0.0, 1.0);
//! builder.add_line(a, b, 1.0);
//! builder.add_line(b, c, 1.0);
//! let network = builder.build().unwrap();
//!
//! let graph = ConnectedGraph::new(&network, network.node_ids()).unwrap();
//! assert_eq!(graph.manhattan_distance(a, c), Some(2.0));
//! assert_eq!(graph.median_node(), b);
//! ```

pub mod builder;
pub mod cluster;
pub mod connected;
pub mod disjoint;
pub mod edge;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod indexing;
pub mod mst;
pub mod network;
pub mod node;
pub mod path;
pub mod resilience;
mod siting;
pub mod union_find;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::NetworkBuilder;
pub use cluster::{Cluster, Clustering};
pub use connected::{ConnectedGraph, EdgeMetric, PathTree};
pub use disjoint::DisjointGraph;
pub use edge::Edge;
pub use error::{GraphError, GraphResult};
pub use geometry::{BoundingBox, Point, line_point_distance};
pub use graph::{Adjacent, EdgeInfo, Graph};
pub use indexing::IndexMap;
pub use mst::{Candidate, MstAlgorithm, SpanningForest, build_spanning_forest};
pub use network::Network;
pub use node::Node;
pub use path::Path;
pub use resilience::Resilience;
pub use union_find::UnionFind;
