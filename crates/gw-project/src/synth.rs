//! Synthetic layouts for experiments.

use gw_core::ExecContext;
use gw_core::timing::timed;
use gw_graph::{Network, build_spanning_forest};
use gw_grid::{Grid, GridConfig};
use rand::Rng;
use tracing::info;

/// Side of the square random layouts are drawn in.
pub const LAYOUT_SIDE: f64 = 10.0;

/// `n` unit-load nodes placed uniformly in the square, joined by the minimum
/// spanning tree of their complete graph.
pub fn random_network(ctx: &ExecContext, n: usize) -> crate::ProjectResult<Network> {
    let mut rng = ctx.rng();
    let mut network = Network::new();
    for _ in 0..n {
        let x = rng.gen_range(0.0..LAYOUT_SIDE);
        let y = rng.gen_range(0.0..LAYOUT_SIDE);
        network.add_node(x, y, 1.0)?;
    }

    let candidates = timed("complete_graph", || network.add_complete_graph())?;
    let forest = build_spanning_forest(ctx, &mut network, &candidates)?;
    info!(
        nodes = n,
        candidates = candidates.len(),
        edges = forest.edges.len(),
        length = forest.total_length,
        "random layout built"
    );
    Ok(network)
}

/// A generator-less grid over a fresh random layout.
pub fn random_grid(ctx: &ExecContext, n: usize, config: GridConfig) -> crate::ProjectResult<Grid> {
    let network = random_network(ctx, n)?;
    let nodes = network.node_ids();
    Ok(Grid::new(network, nodes, config)?)
}
