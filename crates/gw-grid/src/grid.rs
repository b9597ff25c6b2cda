//! The grid aggregate: network, connected graph, generators and flow cache.

use std::collections::HashSet;

use gw_core::{EdgeId, GenId, NodeId};
use gw_graph::{ConnectedGraph, DisjointGraph, Network};
use tracing::{debug, warn};

use crate::config::GridConfig;
use crate::error::{GridError, GridResult};
use crate::flow::FlowReport;
use crate::generator::{Generator, GeneratorSpec};

/// Generators over a connected graph, with a flow cache that is recomputed
/// in full on demand.
///
/// Every structural mutation goes through the grid so that the graph's
/// adjacency and path cache and the cached flows are dropped together.
#[derive(Debug, Clone)]
pub struct Grid {
    pub(crate) network: Network,
    pub(crate) graph: ConnectedGraph,
    pub(crate) generators: Vec<Generator>,
    pub(crate) loads: Vec<NodeId>,
    pub(crate) config: GridConfig,
    pub(crate) flows: Option<FlowReport>,
}

impl Grid {
    /// A grid over `nodes`, which the caller asserts are connected.
    pub fn new(
        network: Network,
        nodes: impl IntoIterator<Item = NodeId>,
        config: GridConfig,
    ) -> GridResult<Self> {
        let graph = ConnectedGraph::new(&network, nodes).map_err(|e| match e {
            gw_graph::GraphError::EmptyNodeSet => GridError::NoNodes,
            other => other.into(),
        })?;
        let mut grid = Self {
            network,
            graph,
            generators: Vec::new(),
            loads: Vec::new(),
            config,
            flows: None,
        };
        grid.refresh_loads();
        Ok(grid)
    }

    /// Keep only the largest connected component of `network`, then place
    /// the generators that sit on it. Generators elsewhere are dropped.
    pub fn from_network(
        network: Network,
        generators: Vec<GeneratorSpec>,
        config: GridConfig,
    ) -> GridResult<Self> {
        let component = DisjointGraph::new(&network, network.node_ids())?
            .largest_subgraph()
            .ok_or(GridError::NoNodes)?;
        debug!(
            nodes = component.len(),
            of = network.nodes().len(),
            "selected largest component"
        );
        let mut grid = Self::new(network, component.nodes().to_vec(), config)?;

        let mut dropped = 0;
        for spec in generators {
            if !grid.graph.contains(spec.node) {
                dropped += 1;
                continue;
            }
            grid.add_generator(spec)?;
        }
        if dropped > 0 {
            warn!(dropped, "generators outside the largest component were dropped");
        }
        Ok(grid)
    }

    /// Place a generator. Its node must be on the graph and must not draw
    /// more than the generator can supply. The site's own load is zeroed, so
    /// all remaining demand sits on `loads`.
    pub fn add_generator(&mut self, spec: GeneratorSpec) -> GridResult<GenId> {
        if !self.graph.contains(spec.node) {
            return Err(GridError::GeneratorOffGraph { node: spec.node });
        }
        if !spec.capacity.is_finite() || spec.capacity < 0.0 {
            return Err(GridError::InvalidCapacity {
                capacity: spec.capacity,
            });
        }
        let load = self.network.try_node(spec.node)?.load();
        if load > spec.capacity {
            return Err(GridError::GeneratorOverloaded {
                node: spec.node,
                load,
                capacity: spec.capacity,
            });
        }
        if load > 0.0 {
            debug!(node = %spec.node, load, "generator site load zeroed");
            self.network.set_load(spec.node, 0.0)?;
        }

        let id = GenId::from_index(self.generators.len() as u32);
        self.generators.push(Generator {
            id,
            node: spec.node,
            capacity: spec.capacity,
            fuel: spec.fuel,
        });
        self.refresh_loads();
        self.flows = None;
        Ok(id)
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn graph(&self) -> &ConnectedGraph {
        &self.graph
    }

    pub fn generators(&self) -> &[Generator] {
        &self.generators
    }

    pub fn generator(&self, id: GenId) -> GridResult<&Generator> {
        self.generators
            .get(id.slot())
            .ok_or(GridError::UnknownGenerator { id })
    }

    /// Non-generator nodes with positive demand.
    pub fn loads(&self) -> &[NodeId] {
        &self.loads
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn nodes(&self) -> &[NodeId] {
        self.graph.nodes()
    }

    pub fn is_generator_node(&self, node: NodeId) -> bool {
        self.generators.iter().any(|g| g.node == node)
    }

    /// Summed generator capacity.
    pub fn capacity(&self) -> f64 {
        self.generators.iter().map(|g| g.capacity).sum()
    }

    /// Summed demand of the load nodes.
    pub fn node_load(&self) -> f64 {
        self.loads
            .iter()
            .filter_map(|n| self.network.node(*n))
            .map(|n| n.load())
            .sum()
    }

    pub(crate) fn refresh_loads(&mut self) {
        let gens: HashSet<NodeId> = self.generators.iter().map(|g| g.node).collect();
        self.loads = self
            .graph
            .nodes()
            .iter()
            .copied()
            .filter(|n| !gens.contains(n))
            .filter(|n| self.network.node(*n).is_some_and(|node| node.load() > 0.0))
            .collect();
    }

    /// Drop everything derived from the topology.
    fn invalidate(&mut self) {
        self.graph.reset(&self.network);
        self.flows = None;
    }

    /// Attach an existing edge. Both endpoints must be on the grid.
    pub fn attach_edge(&mut self, edge: EdgeId) -> GridResult<bool> {
        for n in self.network.try_edge(edge)?.nodes {
            if !self.graph.contains(n) {
                return Err(GridError::Graph(gw_graph::GraphError::UnknownNode { node: n }));
            }
        }
        let changed = self.network.attach(edge)?;
        if changed {
            self.invalidate();
        }
        Ok(changed)
    }

    pub fn detach_edge(&mut self, edge: EdgeId) -> GridResult<bool> {
        let changed = self.network.detach(edge)?;
        if changed {
            self.invalidate();
        }
        Ok(changed)
    }

    /// Build a new line between two grid nodes and attach it.
    pub fn add_line(&mut self, from: NodeId, to: NodeId, length: f64) -> GridResult<EdgeId> {
        for n in [from, to] {
            if !self.graph.contains(n) {
                return Err(GridError::Graph(gw_graph::GraphError::UnknownNode { node: n }));
            }
        }
        let edge = self.network.add_edge(from, to, length)?;
        self.attach_edge(edge)?;
        Ok(edge)
    }

    /// Change a generator's capacity.
    pub fn grow_generator(&mut self, id: GenId, capacity: f64) -> GridResult<()> {
        if !capacity.is_finite() || capacity < 0.0 {
            return Err(GridError::InvalidCapacity { capacity });
        }
        let generator = self
            .generators
            .get_mut(id.slot())
            .ok_or(GridError::UnknownGenerator { id })?;
        generator.capacity = capacity;
        self.flows = None;
        Ok(())
    }

    /// Change a node's demand. Generator nodes carry no load of their own.
    pub fn set_load(&mut self, node: NodeId, load: f64) -> GridResult<()> {
        if let Some(g) = self.generators.iter().find(|g| g.node == node) {
            if load > g.capacity {
                return Err(GridError::GeneratorOverloaded {
                    node,
                    load,
                    capacity: g.capacity,
                });
            }
            if load > 0.0 {
                return Err(GridError::GeneratorSiteLoad { node, load });
            }
        }
        self.network.set_load(node, load)?;
        self.refresh_loads();
        self.flows = None;
        Ok(())
    }

    /// Drop cached paths and recompute flows.
    pub fn reset(&mut self) -> &FlowReport {
        self.invalidate();
        self.calculate_flows()
    }

    /// Current flows, if they have been computed since the last mutation.
    pub fn flows(&self) -> Option<&FlowReport> {
        self.flows.as_ref()
    }

    /// Cached flows, computing them if needed.
    pub fn ensure_flows(&mut self) -> &FlowReport {
        let report = match self.flows.take() {
            Some(report) => report,
            None => self.compute_flows(),
        };
        self.flows.insert(report)
    }

    /// Distance between the median nodes of two groups, along the grid.
    pub fn group_distance(&self, a: &ConnectedGraph, b: &ConnectedGraph) -> Option<f64> {
        self.graph
            .manhattan_distance(a.median_node(), b.median_node())
    }

    /// Generator nearest to `node` along the grid.
    pub fn nearest_generator(&self, node: NodeId) -> Option<&Generator> {
        let tree = self.graph.tree(node)?;
        self.generators
            .iter()
            .filter_map(|g| tree.length_to(g.node).map(|d| (g, d)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(g, _)| g)
    }
}
