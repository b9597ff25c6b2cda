//! Power grid model over a connected network.
//!
//! A [`Grid`] places generators on the largest connected piece of a
//! [`gw_graph::Network`] and computes per-line power flows by fractional
//! multi-source allocation: every load splits its demand across the
//! generators in proportion to inverse path resistance, and each generator
//! scales what it is asked for down to its capacity. On top of the flows the
//! crate provides a droop-control frequency estimate, a congestion relief
//! search, and operations that build or grow generators where demand is
//! unmet.

pub mod config;
pub mod congestion;
pub mod error;
pub mod flow;
pub mod generator;
pub mod grid;
pub mod power;
pub mod report;

pub use config::{BuildConfig, ClusterConfig, CongestionConfig, FlowConfig, GridConfig};
pub use congestion::{CandidateLine, CongestionRelief};
pub use error::{GridError, GridResult};
pub use flow::{FlowBand, FlowReport, frequency_deviation};
pub use generator::{Generator, GeneratorSpec};
pub use grid::Grid;
pub use report::GridSummary;
