//! Dataset validation.

use std::collections::HashSet;

use crate::schema::{Dataset, LATEST_VERSION};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: u64, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: u64, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_dataset(dataset: &Dataset) -> Result<(), ValidationError> {
    if dataset.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: dataset.version,
        });
    }

    let mut point_ids = HashSet::new();
    for point in &dataset.points {
        if !point_ids.insert(point.id) {
            return Err(ValidationError::DuplicateId {
                id: point.id,
                context: "points".to_string(),
            });
        }
        if !point.x.is_finite() || !point.y.is_finite() {
            return Err(invalid(
                format!("point {} position", point.id),
                format!("({}, {})", point.x, point.y),
                "must be finite",
            ));
        }
    }

    let mut line_ids = HashSet::new();
    for line in &dataset.lines {
        if !line_ids.insert(line.id) {
            return Err(ValidationError::DuplicateId {
                id: line.id,
                context: "lines".to_string(),
            });
        }
        for end in [line.left, line.right] {
            if !point_ids.contains(&end) {
                return Err(ValidationError::MissingReference {
                    id: end,
                    context: format!("line {}", line.id),
                });
            }
        }
        if let Some(length) = line.length {
            check_non_negative(format!("line {} length", line.id), length)?;
        }
        if let Some(voltage) = line.voltage {
            check_non_negative(format!("line {} voltage", line.id), voltage)?;
        }
    }

    let mut source_ids = HashSet::new();
    for source in &dataset.sources {
        if !source_ids.insert(source.id) {
            return Err(ValidationError::DuplicateId {
                id: source.id,
                context: "sources".to_string(),
            });
        }
        if !point_ids.contains(&source.point) {
            return Err(ValidationError::MissingReference {
                id: source.point,
                context: format!("source {}", source.id),
            });
        }
        check_non_negative(format!("source {} capacity", source.id), source.capacity)?;
    }

    for load in &dataset.loads {
        if !point_ids.contains(&load.point) {
            return Err(ValidationError::MissingReference {
                id: load.point,
                context: "load point".to_string(),
            });
        }
        if let Some(peak) = load.max_peak_load {
            check_non_negative(format!("load at point {}", load.point), peak)?;
        }
    }

    let cfg = &dataset.grid;
    if cfg.flow.droop <= 0.0 {
        return Err(invalid("grid.flow.droop", cfg.flow.droop, "must be positive"));
    }
    if cfg.flow.base_frequency_hz <= 0.0 {
        return Err(invalid(
            "grid.flow.base_frequency_hz",
            cfg.flow.base_frequency_hz,
            "must be positive",
        ));
    }
    let congestion = &cfg.congestion;
    if congestion.bands == 0 || congestion.band_start > congestion.band_end {
        return Err(invalid(
            "grid.congestion",
            format!(
                "{}..={} of {}",
                congestion.band_start, congestion.band_end, congestion.bands
            ),
            "band range must be non-empty",
        ));
    }

    Ok(())
}

fn check_non_negative(field: String, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be finite and non-negative"))
    }
}

fn invalid(
    field: impl Into<String>,
    value: impl ToString,
    reason: &str,
) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{LineRecord, LoadRecord, PointRecord, SourceRecord};

    fn pt(id: u64, x: f64, y: f64) -> PointRecord {
        PointRecord {
            id,
            x,
            y,
            name: None,
        }
    }

    fn small() -> Dataset {
        let mut d = Dataset::new("small");
        d.points = vec![pt(1, 0.0, 0.0), pt(2, 1.0, 0.0)];
        d.lines = vec![LineRecord {
            id: 10,
            left: 1,
            right: 2,
            length: None,
            voltage: Some(115.0),
        }];
        d.sources = vec![SourceRecord {
            id: 20,
            point: 1,
            capacity: 5.0,
            fuel: Some("hydro".to_string()),
            name: None,
        }];
        d.loads = vec![LoadRecord {
            point: 2,
            max_peak_load: None,
        }];
        d
    }

    #[test]
    fn valid_dataset_passes() {
        validate_dataset(&small()).unwrap();
    }

    #[test]
    fn duplicate_point_rejected() {
        let mut d = small();
        d.points.push(pt(1, 3.0, 3.0));
        assert!(matches!(
            validate_dataset(&d),
            Err(ValidationError::DuplicateId { id: 1, .. })
        ));
    }

    #[test]
    fn dangling_line_rejected() {
        let mut d = small();
        d.lines[0].right = 99;
        assert!(matches!(
            validate_dataset(&d),
            Err(ValidationError::MissingReference { id: 99, .. })
        ));
    }

    #[test]
    fn negative_capacity_rejected() {
        let mut d = small();
        d.sources[0].capacity = -1.0;
        assert!(matches!(
            validate_dataset(&d),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn future_version_rejected() {
        let mut d = small();
        d.version = LATEST_VERSION + 1;
        assert!(matches!(
            validate_dataset(&d),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn empty_band_range_rejected() {
        let mut d = small();
        d.grid.congestion.band_start = 9;
        d.grid.congestion.band_end = 2;
        assert!(validate_dataset(&d).is_err());
    }
}
