//! gw-core: shared foundation for gridworks.
//!
//! Contains:
//! - ids (stable compact IDs for nodes, edges and generators)
//! - error (shared error types)
//! - numeric (tolerances + float helpers)
//! - units (uom SI types + constructors for reporting)
//! - timing (phase timers)
//! - context (explicit execution context: worker pool + seeded RNG)

pub mod context;
pub mod error;
pub mod ids;
pub mod numeric;
pub mod timing;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use context::ExecContext;
pub use error::{GwError, GwResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
