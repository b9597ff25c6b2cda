//! Named study regions and dataset filtering.

use std::collections::HashSet;

use gw_graph::{BoundingBox, Point};

use crate::schema::Dataset;

pub const NH_VT: BoundingBox = BoundingBox {
    north: 44.1793,
    south: 43.8583,
    east: -71.8985,
    west: -72.2598,
};

pub const NEW_ENGLAND: BoundingBox = BoundingBox {
    north: 47.45,
    south: 40.94,
    east: -66.85,
    west: -73.45,
};

pub const NE_CENTRAL: BoundingBox = BoundingBox {
    north: 45.01,
    south: 42.71,
    east: -71.01,
    west: -73.25,
};

pub const MICHIGAN: BoundingBox = BoundingBox {
    north: 45.82,
    south: 41.80,
    east: -82.72,
    west: -86.12,
};

pub const REGIONS: [(&str, BoundingBox); 4] = [
    ("NH_VT", NH_VT),
    ("NEW_ENGLAND", NEW_ENGLAND),
    ("NE_CENTRAL", NE_CENTRAL),
    ("MICHIGAN", MICHIGAN),
];

/// Look a region up by name, ignoring case.
pub fn region(name: &str) -> Option<BoundingBox> {
    REGIONS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, b)| *b)
}

impl Dataset {
    /// Lines with both ends strictly inside `bounds`, plus the points,
    /// sources and loads that sit on them.
    pub fn within(&self, bounds: &BoundingBox) -> Dataset {
        let inside: HashSet<u64> = self
            .points
            .iter()
            .filter(|p| bounds.contains(Point::new(p.x, p.y)))
            .map(|p| p.id)
            .collect();

        let lines: Vec<_> = self
            .lines
            .iter()
            .filter(|l| inside.contains(&l.left) && inside.contains(&l.right))
            .cloned()
            .collect();
        let used: HashSet<u64> = lines.iter().flat_map(|l| [l.left, l.right]).collect();

        Dataset {
            version: self.version,
            name: self.name.clone(),
            points: self
                .points
                .iter()
                .filter(|p| used.contains(&p.id))
                .cloned()
                .collect(),
            lines,
            sources: self
                .sources
                .iter()
                .filter(|s| used.contains(&s.point))
                .cloned()
                .collect(),
            loads: self
                .loads
                .iter()
                .filter(|l| used.contains(&l.point))
                .cloned()
                .collect(),
            grid: self.grid.clone(),
        }
    }

    /// Keep only sources whose fuel tag is one of `fuels` (case-insensitive).
    /// An empty list keeps every source.
    pub fn with_fuels(mut self, fuels: &[String]) -> Dataset {
        if fuels.is_empty() {
            return self;
        }
        self.sources.retain(|s| {
            s.fuel
                .as_deref()
                .is_some_and(|f| fuels.iter().any(|want| want.eq_ignore_ascii_case(f)))
        });
        self
    }
}
