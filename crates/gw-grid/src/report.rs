//! Summary figures for a solved grid.

use std::fmt;

use gw_core::constants::base_frequency;
use gw_core::units::{Frequency, Power};
use gw_core::{ExecContext, as_hz, as_mw, hz, mw, ratio_or_zero};
use gw_graph::Resilience;

use crate::error::GridResult;
use crate::grid::Grid;

/// Totals reported after a flow calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSummary {
    /// Node demand plus transmission loss
    pub total_load: Power,
    pub node_load: Power,
    pub transmission_loss: Power,
    /// Loss as a percentage of total load
    pub loss_percent: f64,
    /// Delivered power over generated power, in `[0, 1]`
    pub efficiency: f64,
    pub capacity: Power,
    /// Base frequency plus deviation
    pub frequency: Frequency,
    pub deviation: Frequency,
    pub generators: usize,
    /// Nodes on the grid
    pub reach: usize,
    pub unserved: Power,
}

impl Grid {
    /// `(loss, percent of total load)`.
    pub fn transmission_loss(&mut self) -> (f64, f64) {
        let node_load = self.node_load();
        let loss = self.ensure_flows().total_loss();
        (loss, 100.0 * ratio_or_zero(loss, node_load + loss))
    }

    pub fn summary(&mut self) -> GridSummary {
        let node_load = self.node_load();
        let capacity = self.capacity();
        let generators = self.generators.len();
        let reach = self.graph.len();
        let report = self.ensure_flows();

        let loss = report.total_loss();
        let total = node_load + loss;
        let supplied: f64 = report.supplied.values().sum();
        let deviation = report.frequency_deviation;

        GridSummary {
            total_load: mw(total),
            node_load: mw(node_load),
            transmission_loss: mw(loss),
            loss_percent: 100.0 * ratio_or_zero(loss, total),
            efficiency: ratio_or_zero(supplied, supplied + loss).clamp(0.0, 1.0),
            capacity: mw(capacity),
            frequency: base_frequency() + hz(deviation),
            deviation: hz(deviation),
            generators,
            reach,
            unserved: mw(report.total_unserved()),
        }
    }

    /// Structural resilience of the grid's graph.
    pub fn resilience(&self) -> GridResult<Resilience> {
        Ok(Resilience::new(self.graph.graph())?)
    }

    /// Drakos J-metric of the grid's graph.
    pub fn resiliency(&self, ctx: &ExecContext, mu: f64) -> GridResult<f64> {
        Ok(self.resilience()?.j(ctx, mu))
    }
}

impl fmt::Display for GridSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\tTotal load: {:.2}", as_mw(self.total_load))?;
        writeln!(f, "\t\tNodes: {:.2}", as_mw(self.node_load))?;
        writeln!(
            f,
            "\t\tTx losses: {:.2} ({:.2}%)",
            as_mw(self.transmission_loss),
            self.loss_percent
        )?;
        writeln!(
            f,
            "\tFrequency: {:.2} Hz ({:+.2} Hz)",
            as_hz(self.frequency),
            as_hz(self.deviation)
        )?;
        writeln!(
            f,
            "\tPower: {:.2} ({} gens)",
            as_mw(self.capacity),
            self.generators
        )?;
        writeln!(f, "\tEfficiency: {:.1}%", 100.0 * self.efficiency)?;
        write!(
            f,
            "\tReach: {} nodes, unserved {:.2}",
            self.reach,
            as_mw(self.unserved)
        )
    }
}
