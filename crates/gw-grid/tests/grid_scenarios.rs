//! End-to-end grid scenarios.

use gw_core::{ExecContext, NodeId};
use gw_graph::{Network, NetworkBuilder, build_spanning_forest};
use gw_grid::{GeneratorSpec, Grid, GridConfig};

/// `n` scattered nodes joined by their minimum spanning tree.
fn scattered_tree(n: usize) -> Network {
    let mut net = Network::new();
    for i in 0..n {
        let x = ((i * 37) % 101) as f64 / 10.0;
        let y = ((i * 53) % 97) as f64 / 9.7;
        net.add_node(x, y, 1.0).unwrap();
    }
    let candidates = net.add_complete_graph().unwrap();
    let ctx = ExecContext::sequential(3);
    build_spanning_forest(&ctx, &mut net, &candidates).unwrap();
    net
}

fn line(capacity: f64) -> (Grid, Vec<NodeId>) {
    let mut b = NetworkBuilder::new();
    let n: Vec<NodeId> = (0..4)
        .map(|i| b.add_node(i as f64, 0.0, if i == 0 { 0.0 } else { 1.0 }))
        .collect();
    for w in n.windows(2) {
        b.add_line(w[0], w[1], 1.0);
    }
    let grid = Grid::from_network(
        b.build().unwrap(),
        vec![GeneratorSpec::new(n[0], capacity)],
        GridConfig::default(),
    )
    .unwrap();
    (grid, n)
}

#[test]
fn line_flows_step_down() {
    let (mut grid, _) = line(4.0);
    let mut flows: Vec<f64> = grid.calculate_flows().flows.values().copied().collect();
    flows.sort_by(f64::total_cmp);
    assert_eq!(flows, vec![1.0, 2.0, 3.0]);
}

#[test]
fn undersupplied_line_scales_uniformly() {
    let (mut grid, _) = line(2.0);
    let report = grid.calculate_flows().clone();
    let mut flows: Vec<f64> = report.flows.values().copied().collect();
    flows.sort_by(f64::total_cmp);
    for (got, full) in flows.iter().zip([1.0, 2.0, 3.0]) {
        assert!((got - full * 2.0 / 3.0).abs() < 1e-12);
    }
    assert!(report.frequency_deviation < 0.0);
}

#[test]
fn single_generator_edges_sum_to_demand() {
    let mut net = scattered_tree(40);
    let hub = NodeId::from_index(0);
    net.set_load(hub, 0.0).unwrap();
    let mut grid = Grid::from_network(
        net,
        vec![GeneratorSpec::new(hub, 1_000.0)],
        GridConfig::default(),
    )
    .unwrap();
    let demand = grid.node_load();
    let touching: Vec<_> = grid
        .network()
        .node(hub)
        .unwrap()
        .edges()
        .to_vec();
    let report = grid.calculate_flows();
    let out: f64 = touching.iter().map(|e| report.flow(*e)).sum();
    assert!((out - demand).abs() < 1e-9, "{out} vs {demand}");
    assert_eq!(report.total_unserved(), 0.0);
}

#[test]
fn dark_grid_is_lit_by_build_then_grow() {
    let ctx = ExecContext::sequential(11);
    let mut grid = Grid::from_network(scattered_tree(60), Vec::new(), GridConfig::default()).unwrap();
    assert_eq!(grid.unserved_nodes().len(), 60);

    let built = grid.build_generators_for_unserved(&ctx, 10).unwrap();
    assert!(built > 0);
    assert!(grid.unserved_nodes().len() < 60);

    for _ in 0..20 {
        if grid.grow_generators_for_unserved().unwrap() == 0 {
            break;
        }
    }
    let summary = grid.summary();
    assert_eq!(summary.generators, grid.generators().len());
    assert_eq!(summary.reach, 60);
}

#[test]
fn congestion_candidates_are_well_formed() {
    let ctx = ExecContext::sequential(5);
    let mut net = scattered_tree(80);
    let (west, east) = (NodeId::from_index(0), NodeId::from_index(40));
    net.set_load(west, 0.0).unwrap();
    net.set_load(east, 0.0).unwrap();
    let mut grid = Grid::from_network(
        net,
        vec![GeneratorSpec::new(west, 500.0), GeneratorSpec::new(east, 500.0)],
        GridConfig::default(),
    )
    .unwrap();

    let reliefs = grid.reduce_congestion(&ctx).unwrap();
    assert!(!reliefs.is_empty());
    for relief in &reliefs {
        assert_ne!(relief.line.from, relief.line.to);
        assert!(!relief.source.is_empty());
        assert!(!relief.target.contains(&relief.line.from));
        // line plus the walk back to whichever generator it was aimed at
        let back = grid
            .generators()
            .iter()
            .filter_map(|g| grid.graph().manhattan_distance(relief.line.to, g.node))
            .any(|d| (relief.line.length + d - relief.distance).abs() < 1e-9);
        assert!(back, "{relief:?}");
    }

    let before = grid.network().edges().len();
    let ctx = ExecContext::new(2, 5).unwrap();
    let again = grid.reduce_congestion(&ctx).unwrap();
    assert_eq!(again, reliefs);
    for relief in again.iter().filter(|r| r.line.length < 0.5) {
        grid.add_line(relief.line.from, relief.line.to, relief.line.length)
            .unwrap();
    }
    assert!(grid.network().edges().len() >= before);
    let report = grid.reset();
    assert!(report.total_unserved() < 1e-9);
}
