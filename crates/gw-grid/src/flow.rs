//! Fractional multi-source flow allocation.
//!
//! Each load splits its demand across the generators that reach it in
//! proportion to the inverse resistance of the path to each (parallel
//! resistors). Each generator then scales everything asked of it by
//! `min(1, capacity / demand)`, and every routed share is added onto each
//! edge of its path. Flows are a superposition of independently routed
//! shares; nothing is conserved at nodes.

use std::collections::BTreeMap;

use gw_core::timing::Timer;
use gw_core::{EdgeId, GenId, NodeId, clamp_non_negative};
use gw_graph::edge::{RESISTANCE_PER_KM, line_loss};
use tracing::{debug, info};

use crate::config::FlowConfig;
use crate::grid::Grid;

/// Flows, losses and supply computed in one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowReport {
    /// Power carried per edge
    pub flows: BTreeMap<EdgeId, f64>,
    /// Resistive loss per flow-carrying edge
    pub losses: BTreeMap<EdgeId, f64>,
    /// Power delivered per load node
    pub supplied: BTreeMap<NodeId, f64>,
    /// Demand left unmet per load node
    pub unserved: BTreeMap<NodeId, f64>,
    /// Applied scale factor per generator
    pub ratios: BTreeMap<GenId, f64>,
    /// Droop estimate of the frequency offset (Hz)
    pub frequency_deviation: f64,
}

/// One equal-width slice of the flow range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowBand {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

impl FlowReport {
    pub fn total_loss(&self) -> f64 {
        self.losses.values().sum()
    }

    pub fn total_unserved(&self) -> f64 {
        self.unserved.values().sum()
    }

    pub fn flow(&self, edge: EdgeId) -> f64 {
        self.flows.get(&edge).copied().unwrap_or(0.0)
    }

    pub fn max_flow(&self) -> f64 {
        self.flows.values().copied().fold(0.0, f64::max)
    }

    /// Split `[min, max]` into `n` equal bands and count the edges in each.
    /// The top band is widened by one so the maximum lands inside it.
    pub fn histogram(&self, n: usize) -> Vec<FlowBand> {
        if n == 0 {
            return Vec::new();
        }
        let min = self.flows.values().copied().reduce(f64::min).unwrap_or(0.0);
        let max = self.flows.values().copied().reduce(f64::max).unwrap_or(0.0);

        let mut splits: Vec<f64> = (0..n)
            .map(|i| (max - min) * i as f64 / n as f64 + min)
            .collect();
        splits.push(max + 1.0);

        splits
            .windows(2)
            .map(|w| FlowBand {
                lower: w[0],
                upper: w[1],
                count: self
                    .flows
                    .values()
                    .filter(|f| **f >= w[0] && **f < w[1])
                    .count(),
            })
            .collect()
    }
}

/// `Δf = (P_r − P_l) / (P_r / (f·droop) + P_l·k_lr)`; negative when load
/// outruns generation. Degenerate inputs give 0.
pub fn frequency_deviation(load: f64, rated: f64, config: &FlowConfig) -> f64 {
    let numerator = rated - load;
    let denominator = rated / (config.base_frequency_hz * config.droop) + load * config.load_damping;
    let df = numerator / denominator;
    if df.is_finite() {
        df
    } else {
        debug!(load, rated, "frequency estimate undefined, using 0");
        0.0
    }
}

impl Grid {
    /// Per-generator fraction of `node`'s demand, from inverse path
    /// resistance. Fractions sum to 1 whenever any generator reaches the node.
    ///
    /// Generators sitting on zero-resistance paths take the whole demand in
    /// equal parts.
    pub fn fractional_share(&self, node: NodeId) -> Vec<(GenId, f64)> {
        let reach: Vec<(GenId, f64)> = self
            .generators
            .iter()
            .filter_map(|g| {
                let len = self.graph.tree(g.node)?.length_to(node)?;
                Some((g.id, len * RESISTANCE_PER_KM))
            })
            .collect();
        shares_from_resistance(&reach)
    }

    /// Recompute flows from scratch and cache them.
    pub fn calculate_flows(&mut self) -> &FlowReport {
        let report = self.compute_flows();
        self.flows.insert(report)
    }

    pub(crate) fn compute_flows(&self) -> FlowReport {
        let timer = Timer::start("flows");

        // generator -> [(node, demand share, route)]
        let mut groups: Vec<Vec<(NodeId, f64, Vec<EdgeId>)>> = vec![Vec::new(); self.generators.len()];
        let trees: Vec<_> = self
            .generators
            .iter()
            .map(|g| self.graph.tree(g.node))
            .collect();

        for &node in &self.loads {
            let demand = self.network.node(node).map_or(0.0, |n| n.load());
            for (gen_id, frac) in self.fractional_share(node) {
                let Some(tree) = &trees[gen_id.slot()] else { continue };
                let Some(route) = tree.route_to(node) else { continue };
                groups[gen_id.slot()].push((node, demand * frac, route));
            }
        }

        let mut report = FlowReport::default();
        for &node in &self.loads {
            report.supplied.insert(node, 0.0);
        }

        for (g, demands) in self.generators.iter().zip(&groups) {
            let total: f64 = demands.iter().map(|(_, d, _)| d).sum();
            let ratio = if total > 0.0 {
                (g.capacity / total).min(1.0)
            } else {
                1.0
            };
            report.ratios.insert(g.id, ratio);

            for (node, demand, route) in demands {
                let delivered = demand * ratio;
                *report.supplied.entry(*node).or_insert(0.0) += delivered;
                for e in route {
                    *report.flows.entry(*e).or_insert(0.0) += delivered;
                }
            }
        }

        for (&e, &flow) in &report.flows {
            let length = self.network.edge(e).map_or(0.0, |edge| edge.length);
            report.losses.insert(e, line_loss(length, flow));
        }

        for &node in &self.loads {
            let demand = self.network.node(node).map_or(0.0, |n| n.load());
            let supplied = report.supplied.get(&node).copied().unwrap_or(0.0);
            report
                .unserved
                .insert(node, clamp_non_negative(demand - supplied));
        }

        let load = self.node_load() + report.total_loss();
        let rated = self.capacity();
        report.frequency_deviation = frequency_deviation(load, rated, &self.config.flow);

        info!(
            edges = report.flows.len(),
            load,
            rated,
            loss = report.total_loss(),
            deviation_hz = report.frequency_deviation,
            "flows calculated"
        );
        timer.stop_and_log();
        report
    }
}

/// Normalise inverse resistances into shares.
pub(crate) fn shares_from_resistance(reach: &[(GenId, f64)]) -> Vec<(GenId, f64)> {
    if reach.is_empty() {
        return Vec::new();
    }
    let shorted: Vec<GenId> = reach
        .iter()
        .filter(|(_, r)| *r <= 0.0)
        .map(|(g, _)| *g)
        .collect();
    if !shorted.is_empty() {
        let share = 1.0 / shorted.len() as f64;
        return shorted.into_iter().map(|g| (g, share)).collect();
    }
    let weights: Vec<f64> = reach.iter().map(|(_, r)| 1.0 / r).collect();
    let sum: f64 = weights.iter().sum();
    reach
        .iter()
        .zip(weights)
        .map(|((g, _), w)| (*g, w / sum))
        .collect()
}
