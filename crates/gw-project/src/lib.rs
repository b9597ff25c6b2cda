//! gw-project: dataset records, loading and grid assembly.

pub mod assemble;
pub mod regions;
pub mod schema;
pub mod synth;
pub mod validate;

pub use assemble::build_grid;
pub use regions::{REGIONS, region};
pub use schema::*;
pub use synth::{random_grid, random_network};
pub use validate::{ValidationError, validate_dataset};

use gw_graph::GraphError;
use gw_grid::GridError;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<GraphError> for ProjectError {
    fn from(e: GraphError) -> Self {
        ProjectError::Grid(e.into())
    }
}

pub fn load_yaml(path: &std::path::Path) -> ProjectResult<Dataset> {
    let content = std::fs::read_to_string(path)?;
    let dataset: Dataset = serde_yaml::from_str(&content)?;
    validate_dataset(&dataset)?;
    Ok(dataset)
}

pub fn save_yaml(path: &std::path::Path, dataset: &Dataset) -> ProjectResult<()> {
    validate_dataset(dataset)?;
    let content = serde_yaml::to_string(dataset)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ProjectResult<Dataset> {
    let content = std::fs::read_to_string(path)?;
    let dataset: Dataset = serde_json::from_str(&content)?;
    validate_dataset(&dataset)?;
    Ok(dataset)
}

pub fn save_json(path: &std::path::Path, dataset: &Dataset) -> ProjectResult<()> {
    validate_dataset(dataset)?;
    let content = serde_json::to_string_pretty(dataset)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load by extension: `.json` as JSON, anything else as YAML.
pub fn load_dataset(path: &std::path::Path) -> ProjectResult<Dataset> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_json(path),
        _ => load_yaml(path),
    }
}
