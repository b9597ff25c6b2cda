//! Tunables for flow, congestion search and generator placement.

use serde::{Deserialize, Serialize};

/// All grid tunables. Missing fields fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub flow: FlowConfig,
    pub congestion: CongestionConfig,
    pub build: BuildConfig,
    pub cluster: ClusterConfig,
}

/// Droop-control frequency estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Nominal frequency (Hz)
    pub base_frequency_hz: f64,
    /// Generator droop (per unit)
    pub droop: f64,
    /// Load damping `k_lr`
    pub load_damping: f64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            base_frequency_hz: gw_core::constants::BASE_FREQUENCY_HZ,
            droop: 0.05,
            load_damping: 0.02,
        }
    }
}

/// Which flow band counts as congested, and how wide to search for relief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CongestionConfig {
    /// Number of equal-width bands over the distinct flow values
    pub bands: usize,
    /// First selected band (inclusive)
    pub band_start: usize,
    /// Last selected band (inclusive)
    pub band_end: usize,
    /// Max perpendicular distance of an intermediate node from a candidate line
    pub corridor_width: f64,
    /// Hops subtracted from the source-to-generator distance when growing targets
    pub expansion_slack: usize,
}

impl Default for CongestionConfig {
    fn default() -> Self {
        Self {
            bands: 10,
            band_start: 6,
            band_end: 8,
            corridor_width: 0.75,
            expansion_slack: 3,
        }
    }
}

/// Limits for new and grown generators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub max_build_power: f64,
    pub max_grow_power: f64,
    /// Largest capacity increase in one grow step
    pub grow_step: f64,
    /// Unserved components above this many nodes get new generators;
    /// smaller ones grow an existing one
    pub build_threshold: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            max_build_power: 300.0,
            max_grow_power: 200.0,
            grow_step: 5.0,
            build_threshold: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub max_iterations: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            max_iterations: gw_graph::cluster::MAX_ITERATIONS,
        }
    }
}
