//! Congestion relief: propose a new line that gives a busy stretch of the
//! grid a shorter way back to a generator.

use gw_core::{EdgeId, ExecContext, NodeId};
use gw_graph::{ConnectedGraph, DisjointGraph, Network, Point, line_point_distance};
use tracing::{debug, info};

use crate::error::GridResult;
use crate::flow::FlowReport;
use crate::grid::Grid;

/// A straight line that could be built between two nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateLine {
    pub from: NodeId,
    pub to: NodeId,
    pub length: f64,
}

/// Best relief found for one congested subgraph.
#[derive(Debug, Clone, PartialEq)]
pub struct CongestionRelief {
    /// Nodes of the congested subgraph
    pub source: Vec<NodeId>,
    /// Neighbourhood of the generator it was connected towards
    pub target: Vec<NodeId>,
    /// `from` is on the source side, `to` on the target side
    pub line: CandidateLine,
    /// Line length plus path length from `to` back to the generator
    pub distance: f64,
}

impl Grid {
    /// Edges whose flow falls in the configured band of distinct flow values.
    pub fn congested_edges(&self, report: &FlowReport) -> Vec<EdgeId> {
        let cfg = &self.config.congestion;
        let mut keys: Vec<f64> = report.flows.values().copied().collect();
        keys.sort_by(f64::total_cmp);
        keys.dedup();
        if keys.is_empty() || cfg.bands == 0 {
            return Vec::new();
        }

        let len = keys.len();
        let lo = cfg.band_start * len / cfg.bands;
        let hi = (cfg.band_end * len / cfg.bands).min(len - 1);
        if lo > hi {
            return Vec::new();
        }
        let (min, max) = (keys[lo], keys[hi]);
        report
            .flows
            .iter()
            .filter(|(_, f)| **f >= min && **f <= max)
            .map(|(e, _)| *e)
            .collect()
    }

    /// Search for one relief line per congested subgraph. Subgraphs with no
    /// feasible line are left out; an empty result is a normal outcome.
    pub fn reduce_congestion(&mut self, ctx: &ExecContext) -> GridResult<Vec<CongestionRelief>> {
        let report = self.ensure_flows().clone();
        let edges = self.congested_edges(&report);
        if edges.is_empty() {
            debug!("no congested edges");
            return Ok(Vec::new());
        }

        let mut endpoints = Vec::with_capacity(edges.len() * 2);
        for e in &edges {
            endpoints.extend(self.network.try_edge(*e)?.nodes);
        }
        endpoints.sort();
        endpoints.dedup();

        let sources: Vec<(ConnectedGraph, usize)> = DisjointGraph::new(&self.network, endpoints)?
            .connected_subgraphs()
            .into_iter()
            .filter_map(|src| {
                let median = src.median_node();
                let generator = self.nearest_generator(median)?;
                let hops = self.graph.hop_distance(median, generator.node)?;
                Some((src, hops))
            })
            .collect();
        debug!(edges = edges.len(), sources = sources.len(), "congested subgraphs");

        let grid = &*self;
        let found = ctx.par_map(&sources, |(src, hops)| grid.relieve(src, *hops));

        let mut reliefs = Vec::new();
        for relief in found {
            reliefs.extend(relief?);
        }
        info!(candidates = reliefs.len(), "congestion relief search done");
        Ok(reliefs)
    }

    /// Try every generator as a target for `src`; keep the shortest result.
    fn relieve(&self, src: &ConnectedGraph, hops: usize) -> GridResult<Option<CongestionRelief>> {
        let net = &self.network;
        let cfg = &self.config.congestion;
        let steps = hops.saturating_sub(cfg.expansion_slack);

        let mut best: Option<CongestionRelief> = None;
        for generator in &self.generators {
            let tgt = ConnectedGraph::new(net, [generator.node])?.expand(net, steps)?;

            let Some(direct) = closest_pair(net, src.nodes(), tgt.nodes()) else {
                continue;
            };
            if direct.from == direct.to {
                continue;
            }

            let near = self.nodes_near(net.position(direct.from)?, net.position(direct.to)?, cfg.corridor_width);
            let pool = near
                .into_iter()
                .chain(src.nodes().iter().copied())
                .chain(tgt.nodes().iter().copied());

            // Everything joined to src on one side, to tgt on the other.
            let mut src_side = Vec::new();
            let mut tgt_side = Vec::new();
            let mut bridged = false;
            for cg in DisjointGraph::new(net, pool)?.connected_subgraphs() {
                let on_src = cg.nodes().iter().any(|n| src.contains(*n));
                let on_tgt = cg.nodes().iter().any(|n| tgt.contains(*n));
                match (on_src, on_tgt) {
                    (true, true) => {
                        bridged = true;
                        break;
                    }
                    (true, false) => src_side.extend_from_slice(cg.nodes()),
                    (false, true) => tgt_side.extend_from_slice(cg.nodes()),
                    (false, false) => {}
                }
            }
            if bridged {
                continue;
            }

            let Some(line) = closest_pair(net, &src_side, &tgt_side) else {
                continue;
            };
            let Some(back) = self.graph.manhattan_distance(line.to, generator.node) else {
                continue;
            };
            let distance = line.length + back;
            if best.as_ref().is_none_or(|b| distance < b.distance) {
                best = Some(CongestionRelief {
                    source: src.nodes().to_vec(),
                    target: tgt.nodes().to_vec(),
                    line,
                    distance,
                });
            }
        }

        if let Some(b) = &best {
            debug!(from = %b.line.from, to = %b.line.to, length = b.line.length, distance = b.distance, "relief candidate");
        }
        Ok(best)
    }

    /// Grid nodes within `width` of the line through `p1` and `p2`, limited
    /// to the segment's bounding box grown by `width`.
    pub fn nodes_near(&self, p1: Point, p2: Point, width: f64) -> Vec<NodeId> {
        let (min_x, max_x) = (p1.x.min(p2.x) - width, p1.x.max(p2.x) + width);
        let (min_y, max_y) = (p1.y.min(p2.y) - width, p1.y.max(p2.y) + width);
        self.nodes()
            .iter()
            .copied()
            .filter(|n| {
                let Some(node) = self.network.node(*n) else {
                    return false;
                };
                let p = node.position;
                if p.x < min_x || p.x > max_x || p.y < min_y || p.y > max_y {
                    return false;
                }
                line_point_distance(p, p1, p2) <= width
            })
            .collect()
    }
}

/// Straight-line closest pair between two node sets; first pair wins ties.
pub(crate) fn closest_pair(network: &Network, a: &[NodeId], b: &[NodeId]) -> Option<CandidateLine> {
    let mut best: Option<CandidateLine> = None;
    for &from in a {
        let Some(p) = network.node(from) else { continue };
        for &to in b {
            let Some(q) = network.node(to) else { continue };
            let length = p.euclidean_distance(q);
            if best.is_none_or(|c| length < c.length) {
                best = Some(CandidateLine { from, to, length });
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::generator::GeneratorSpec;
    use gw_graph::NetworkBuilder;

    /// A U-shaped chain: bottom row out to x = 4, top row back to x = 0.
    /// Generator at the bottom-left corner.
    fn u_grid() -> (Grid, Vec<NodeId>) {
        let mut b = NetworkBuilder::new();
        let mut n = Vec::new();
        for x in 0..5 {
            n.push(b.add_node(x as f64, 0.0, if x == 0 { 0.0 } else { 1.0 }));
        }
        for x in (0..5).rev() {
            n.push(b.add_node(x as f64, 2.0, 1.0));
        }
        for w in n.windows(2) {
            b.add_line(w[0], w[1], 1.0);
        }
        let grid = Grid::from_network(
            b.build().unwrap(),
            vec![GeneratorSpec::new(n[0], 20.0)],
            GridConfig::default(),
        )
        .unwrap();
        (grid, n)
    }

    #[test]
    fn band_selection_on_distinct_values() {
        let (mut grid, n) = u_grid();
        let report = grid.ensure_flows().clone();
        // flows 9..1 along the chain; keys[5..=7] = 6, 7, 8
        let picked = grid.congested_edges(&report);
        assert_eq!(picked.len(), 3);
        for e in picked {
            let f = report.flow(e);
            assert!((6.0..=8.0).contains(&f), "{f}");
            let edge = grid.network().edge(e).unwrap();
            assert!(!edge.touches(n[0]));
        }
    }

    #[test]
    fn no_generators_means_no_relief() {
        let mut b = NetworkBuilder::new();
        let n: Vec<NodeId> = (0..4).map(|i| b.add_node(i as f64, 0.0, 1.0)).collect();
        for w in n.windows(2) {
            b.add_line(w[0], w[1], 1.0);
        }
        let mut grid = Grid::from_network(b.build().unwrap(), Vec::new(), GridConfig::default()).unwrap();
        let ctx = ExecContext::sequential(1);
        assert!(grid.reduce_congestion(&ctx).unwrap().is_empty());
    }

    #[test]
    fn adjacent_source_and_target_is_infeasible() {
        // the congested stretch already touches the generator
        let (mut grid, _) = u_grid();
        let ctx = ExecContext::sequential(1);
        assert!(grid.reduce_congestion(&ctx).unwrap().is_empty());
    }

    #[test]
    fn far_end_gets_a_line_back_towards_the_generator() {
        // Chain out along y = 0 and back along y = 2; the tail n9 dips
        // towards n1. Only the lightest edge (n8-n9) counts as congested.
        let mut b = NetworkBuilder::new();
        let points = [
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (3.0, 0.0),
            (4.0, 0.0),
            (4.0, 2.0),
            (3.0, 2.0),
            (2.0, 2.0),
            (1.0, 2.0),
            (1.0, 1.5),
        ];
        let n: Vec<NodeId> = points
            .iter()
            .enumerate()
            .map(|(i, (x, y))| b.add_node(*x, *y, if i == 0 { 0.0 } else { 1.0 }))
            .collect();
        for w in n.windows(2) {
            b.add_line(w[0], w[1], 1.0);
        }
        let mut config = GridConfig::default();
        config.congestion.band_start = 0;
        config.congestion.band_end = 0;
        let mut grid = Grid::from_network(
            b.build().unwrap(),
            vec![GeneratorSpec::new(n[0], 20.0)],
            config,
        )
        .unwrap();

        let reliefs = grid.reduce_congestion(&ExecContext::sequential(1)).unwrap();
        assert_eq!(reliefs.len(), 1);
        let relief = &reliefs[0];

        let mut source = relief.source.clone();
        source.sort();
        assert_eq!(source, vec![n[8], n[9]]);
        assert!(relief.target.contains(&n[0]));
        assert!(relief.target.contains(&n[5]));
        assert!(!relief.target.contains(&n[7]));

        // 1.5 across to n1, then one unit back along the chain
        assert_eq!((relief.line.from, relief.line.to), (n[9], n[1]));
        assert!((relief.line.length - 1.5).abs() < 1e-12);
        assert!((relief.distance - 2.5).abs() < 1e-12);

        grid.add_line(relief.line.from, relief.line.to, relief.line.length)
            .unwrap();
        let report = grid.reset();
        assert!(report.total_unserved() < 1e-12);
        assert_eq!(grid.graph().hop_distance(n[9], n[0]), Some(2));
    }

    #[test]
    fn corridor_filter() {
        let (grid, n) = u_grid();
        let mut near = grid.nodes_near(Point::new(0.0, 0.0), Point::new(4.0, 0.0), 0.75);
        near.sort();
        assert_eq!(near, n[..5].to_vec());
        let wide = grid.nodes_near(Point::new(0.0, 0.0), Point::new(4.0, 0.0), 2.0);
        assert_eq!(wide.len(), 10);
    }

    #[test]
    fn closest_pair_first_wins() {
        let (grid, n) = u_grid();
        let line = closest_pair(grid.network(), &n[1..3], &n[7..]).unwrap();
        assert_eq!((line.from, line.to), (n[1], n[8]));
        assert_eq!(line.length, 2.0);
        assert!(closest_pair(grid.network(), &[], &n).is_none());
    }
}
