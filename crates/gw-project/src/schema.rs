//! Dataset records: the immutable ground truth a grid is assembled from.

use std::collections::HashMap;

use gw_grid::GridConfig;
use serde::{Deserialize, Serialize};

/// Newest dataset version this crate reads.
pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub points: Vec<PointRecord>,
    #[serde(default)]
    pub lines: Vec<LineRecord>,
    #[serde(default)]
    pub sources: Vec<SourceRecord>,
    #[serde(default)]
    pub loads: Vec<LoadRecord>,
    /// Grid tunables; anything omitted keeps its default
    #[serde(default)]
    pub grid: GridConfig,
}

/// A located point; `x` is longitude, `y` latitude.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointRecord {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A transmission line between two points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineRecord {
    pub id: u64,
    pub left: u64,
    pub right: u64,
    /// Straight-line distance between the endpoints when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,
}

/// A power plant sitting on a point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRecord {
    pub id: u64,
    pub point: u64,
    /// Operating capacity; plants at zero are ignored
    pub capacity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Demand drawn at a point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoadRecord {
    pub point: u64,
    /// Treated as 1 when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_peak_load: Option<f64>,
}

impl Dataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: LATEST_VERSION,
            name: name.into(),
            points: Vec::new(),
            lines: Vec::new(),
            sources: Vec::new(),
            loads: Vec::new(),
            grid: GridConfig::default(),
        }
    }

    /// Points keyed by id. On a duplicate id the first record wins.
    pub fn points_by_id(&self) -> HashMap<u64, &PointRecord> {
        let mut index = HashMap::with_capacity(self.points.len());
        for p in &self.points {
            index.entry(p.id).or_insert(p);
        }
        index
    }
}
