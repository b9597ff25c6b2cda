//! Turn dataset records into a grid.

use std::collections::HashMap;

use gw_core::NodeId;
use gw_graph::NetworkBuilder;
use gw_grid::{GeneratorSpec, Grid};
use tracing::{debug, info, warn};

use crate::ProjectResult;
use crate::schema::Dataset;

/// Points with no peak load on record draw this much.
pub const DEFAULT_LOAD: f64 = 1.0;

/// Build a grid from the dataset's lines, loads and sources.
///
/// Only points touched by a line become nodes. The grid keeps the largest
/// connected component; loads and sources off it are dropped. Source nodes
/// draw no load, and sources without capacity are ignored.
pub fn build_grid(dataset: &Dataset) -> ProjectResult<Grid> {
    let mut builder = NetworkBuilder::new();
    let mut nodes: HashMap<u64, NodeId> = HashMap::new();
    let points = dataset.points_by_id();

    for line in &dataset.lines {
        let mut ends = [None, None];
        for (slot, point_id) in ends.iter_mut().zip([line.left, line.right]) {
            let Some(&point) = points.get(&point_id) else {
                continue;
            };
            let node = *nodes
                .entry(point_id)
                .or_insert_with(|| builder.add_node(point.x, point.y, 0.0));
            *slot = Some((node, point));
        }
        let [Some((a, pa)), Some((b, pb))] = ends else {
            warn!(line = line.id, "line endpoint missing, skipped");
            continue;
        };
        let length = line
            .length
            .unwrap_or_else(|| ((pa.x - pb.x).powi(2) + (pa.y - pb.y).powi(2)).sqrt());
        builder.add_line_with_voltage(a, b, length, line.voltage);
    }

    let mut unplaced_loads = 0;
    for load in &dataset.loads {
        match nodes.get(&load.point) {
            Some(node) => builder.set_load(*node, load.max_peak_load.unwrap_or(DEFAULT_LOAD)),
            None => unplaced_loads += 1,
        }
    }

    let mut generators = Vec::new();
    for source in &dataset.sources {
        if source.capacity <= 0.0 {
            continue;
        }
        let Some(node) = nodes.get(&source.point) else {
            debug!(source = source.id, "source not on any line");
            continue;
        };
        builder.set_load(*node, 0.0);
        let mut spec = GeneratorSpec::new(*node, source.capacity);
        if let Some(fuel) = &source.fuel {
            spec = spec.with_fuel(fuel.clone());
        }
        generators.push(spec);
    }
    if unplaced_loads > 0 {
        warn!(unplaced_loads, "loads not on any line were dropped");
    }

    let network = builder.build()?;
    let grid = Grid::from_network(network, generators, dataset.grid.clone())?;
    info!(
        dataset = %dataset.name,
        nodes = grid.nodes().len(),
        loads = grid.loads().len(),
        generators = grid.generators().len(),
        "grid assembled"
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{LineRecord, LoadRecord, PointRecord, SourceRecord};

    fn line(id: u64, left: u64, right: u64) -> LineRecord {
        LineRecord {
            id,
            left,
            right,
            length: None,
            voltage: None,
        }
    }

    /// Two islands: 1-2-3 (with the source) and 4-5.
    fn islands() -> Dataset {
        let mut d = Dataset::new("islands");
        for id in 1..=6 {
            d.points.push(PointRecord {
                id,
                x: id as f64,
                y: 0.0,
                name: None,
            });
        }
        d.lines = vec![line(1, 1, 2), line(2, 2, 3), line(3, 4, 5)];
        d.sources = vec![
            SourceRecord {
                id: 1,
                point: 1,
                capacity: 10.0,
                fuel: Some("hydro".to_string()),
                name: None,
            },
            SourceRecord {
                id: 2,
                point: 4,
                capacity: 10.0,
                fuel: None,
                name: None,
            },
            SourceRecord {
                id: 3,
                point: 3,
                capacity: 0.0,
                fuel: None,
                name: None,
            },
        ];
        d.loads = vec![
            LoadRecord {
                point: 1,
                max_peak_load: Some(4.0),
            },
            LoadRecord {
                point: 2,
                max_peak_load: None,
            },
            LoadRecord {
                point: 3,
                max_peak_load: Some(2.5),
            },
            LoadRecord {
                point: 6,
                max_peak_load: Some(9.0),
            },
        ];
        d
    }

    #[test]
    fn largest_island_with_defaults() {
        let mut grid = build_grid(&islands()).unwrap();
        assert_eq!(grid.nodes().len(), 3);
        assert_eq!(grid.generators().len(), 1);
        assert_eq!(grid.generators()[0].fuel.as_deref(), Some("hydro"));
        // source point draws nothing; point 2 defaults to 1
        assert_eq!(grid.node_load(), DEFAULT_LOAD + 2.5);
        assert_eq!(grid.calculate_flows().total_unserved(), 0.0);
    }

    #[test]
    fn line_length_from_positions() {
        let grid = build_grid(&islands()).unwrap();
        let edge = &grid.network().edges()[0];
        assert_eq!(edge.length, 1.0);
    }

    #[test]
    fn dangling_endpoints_and_duplicate_points() {
        let mut d = islands();
        // a later duplicate of point 3 must not move it
        d.points.push(PointRecord {
            id: 3,
            x: 50.0,
            y: 0.0,
            name: None,
        });
        d.lines.push(line(4, 3, 99));
        assert_eq!(d.points_by_id()[&3].x, 3.0);

        let grid = build_grid(&d).unwrap();
        assert_eq!(grid.nodes().len(), 3);
        assert_eq!(grid.network().edges().len(), 3);
        assert_eq!(grid.network().edges()[1].length, 1.0);
    }
}
