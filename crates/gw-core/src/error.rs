use thiserror::Error;

pub type GwResult<T> = Result<T, GwError>;

/// Failures shared by every layer: bad arguments and worker pool setup.
#[derive(Error, Debug)]
pub enum GwError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}
