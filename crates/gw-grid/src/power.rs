//! Adding and growing generators where demand goes unmet.

use gw_core::timing::Timer;
use gw_core::{ExecContext, GwError, NodeId, nearly_equal};
use gw_graph::{ConnectedGraph, DisjointGraph};
use tracing::{debug, info};

use crate::error::GridResult;
use crate::generator::GeneratorSpec;
use crate::grid::Grid;

impl Grid {
    /// Load nodes whose supply falls short of their demand.
    pub fn unserved_nodes(&mut self) -> Vec<NodeId> {
        let report = self.ensure_flows();
        report
            .unserved
            .iter()
            .filter(|(node, short)| {
                let supplied = report.supplied.get(*node).copied().unwrap_or(0.0);
                **short > 0.0 && !nearly_equal(supplied, supplied + **short)
            })
            .map(|(node, _)| *node)
            .collect()
    }

    /// Unserved nodes grouped into connected pieces.
    pub fn unserved_components(&mut self) -> GridResult<Vec<ConnectedGraph>> {
        let unserved = self.unserved_nodes();
        Ok(DisjointGraph::new(&self.network, unserved)?.connected_subgraphs())
    }

    /// Cover every unserved component larger than the build threshold with
    /// new generators, one per `nodes_per_cluster` nodes, each sited at its
    /// cluster's median. Returns how many were built.
    pub fn build_generators_for_unserved(
        &mut self,
        ctx: &ExecContext,
        nodes_per_cluster: usize,
    ) -> GridResult<usize> {
        if nodes_per_cluster == 0 {
            return Err(GwError::InvalidArg {
                what: "nodes_per_cluster",
            }
            .into());
        }
        let timer = Timer::start("build_generators");
        let threshold = self.config.build.build_threshold;
        let capacity = (nodes_per_cluster as f64).min(self.config.build.max_build_power);
        let max_iterations = self.config.cluster.max_iterations;

        let big: Vec<ConnectedGraph> = self
            .unserved_components()?
            .into_iter()
            .filter(|cg| cg.len() > threshold)
            .collect();

        let mut built = 0;
        for component in &big {
            let k = component.len().div_ceil(nodes_per_cluster);
            let clustering = component.cluster(ctx, k, max_iterations);
            debug!(
                nodes = component.len(),
                demand = component.demand(&self.network),
                k,
                iterations = clustering.iterations,
                "clustered unserved component"
            );

            for cluster in clustering.clusters {
                if cluster.members.is_empty() {
                    continue;
                }
                let site = ConnectedGraph::new(&self.network, cluster.members)?.site_median();
                if self.is_generator_node(site) {
                    continue;
                }
                // a generator never also draws load
                self.set_load(site, 0.0)?;
                self.add_generator(GeneratorSpec::new(site, capacity))?;
                built += 1;
            }
        }

        self.calculate_flows();
        info!(built, capacity, "generators built for unserved demand");
        timer.stop_and_log();
        Ok(built)
    }

    /// For each unserved component at or below the build threshold, grow the
    /// nearest generator by the component's size, capped by the configured
    /// step and ceiling. Capacity is never reduced. Returns how many grew.
    pub fn grow_generators_for_unserved(&mut self) -> GridResult<usize> {
        let threshold = self.config.build.build_threshold;
        let small: Vec<ConnectedGraph> = self
            .unserved_components()?
            .into_iter()
            .filter(|cg| cg.len() <= threshold)
            .collect();

        let mut grown = 0;
        for component in &small {
            let nearest = self
                .generators
                .iter()
                .filter_map(|g| {
                    self.graph
                        .manhattan_distance_from_group(&self.network, g.node, component)
                        .map(|d| (g.id, g.capacity, d))
                })
                .min_by(|a, b| a.2.total_cmp(&b.2));
            let Some((id, capacity, _)) = nearest else {
                continue;
            };

            let build = &self.config.build;
            let next = (capacity + component.len() as f64)
                .min(build.max_grow_power)
                .min(capacity + build.grow_step)
                .max(capacity);
            if next != capacity {
                self.grow_generator(id, next)?;
                grown += 1;
                debug!(generator = %id, from = capacity, to = next, "generator grown");
            }
            self.calculate_flows();
        }

        self.ensure_flows();
        info!(grown, "generators grown for unserved demand");
        Ok(grown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use gw_core::GenId;
    use gw_graph::NetworkBuilder;

    fn line(n: usize, generator: Option<f64>) -> Grid {
        let mut b = NetworkBuilder::new();
        let nodes: Vec<NodeId> = (0..n)
            .map(|i| {
                let load = if i == 0 && generator.is_some() { 0.0 } else { 1.0 };
                b.add_node(i as f64, 0.0, load)
            })
            .collect();
        for w in nodes.windows(2) {
            b.add_line(w[0], w[1], 1.0);
        }
        let gens = generator
            .map(|cap| vec![GeneratorSpec::new(nodes[0], cap)])
            .unwrap_or_default();
        Grid::from_network(b.build().unwrap(), gens, GridConfig::default()).unwrap()
    }

    #[test]
    fn grows_nearest_generator() {
        let mut grid = line(4, Some(2.0));
        assert_eq!(grid.unserved_nodes().len(), 3);
        assert_eq!(grid.grow_generators_for_unserved().unwrap(), 1);
        assert_eq!(grid.generator(GenId::from_index(0)).unwrap().capacity, 5.0);
        assert!(grid.unserved_nodes().is_empty());
        assert_eq!(grid.grow_generators_for_unserved().unwrap(), 0);
    }

    #[test]
    fn grow_is_capped_by_step() {
        let mut grid = line(12, Some(1.0));
        grid.grow_generators_for_unserved().unwrap();
        assert_eq!(grid.capacity(), 6.0);
    }

    #[test]
    fn small_components_are_not_built_on() {
        let mut grid = line(4, Some(2.0));
        let ctx = ExecContext::sequential(7);
        assert_eq!(grid.build_generators_for_unserved(&ctx, 10).unwrap(), 0);
        assert_eq!(grid.generators().len(), 1);
    }

    #[test]
    fn builds_generators_on_a_dark_grid() {
        let mut grid = line(30, None);
        let ctx = ExecContext::sequential(7);
        let built = grid.build_generators_for_unserved(&ctx, 10).unwrap();
        assert!((1..=3).contains(&built), "{built}");
        assert_eq!(grid.generators().len(), built);
        for g in grid.generators() {
            assert_eq!(g.capacity, 10.0);
            assert_eq!(grid.network().node(g.node).unwrap().load(), 0.0);
            assert!(!grid.loads().contains(&g.node));
        }
        assert!(grid.flows().is_some());
        assert!(grid.build_generators_for_unserved(&ctx, 0).is_err());
    }
}
