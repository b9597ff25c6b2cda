//! Lightweight phase timing.
//!
//! Timers are cheap to create; elapsed times are only reported when timing
//! is enabled via the `GW_TIMING` environment variable or programmatically.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable performance timing globally.
pub fn enable_timing() {
    ENABLED.store(true, Ordering::Relaxed);
}

/// Check if timing is enabled.
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed) || std::env::var("GW_TIMING").is_ok()
}

/// A simple timer that measures elapsed time.
pub struct Timer {
    label: &'static str,
    start: Instant,
    enabled: bool,
}

impl Timer {
    /// Create and start a new timer with the given label.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
            enabled: is_enabled(),
        }
    }

    /// Stop the timer and return elapsed time in seconds.
    /// If timing is disabled, returns None.
    pub fn stop(self) -> Option<f64> {
        if self.enabled {
            Some(self.start.elapsed().as_secs_f64())
        } else {
            None
        }
    }

    /// Stop the timer and log the result if enabled.
    pub fn stop_and_log(self) {
        let label = self.label;
        if let Some(elapsed) = self.stop() {
            tracing::info!(phase = label, elapsed_s = elapsed, "phase finished");
        }
    }
}

/// Run `f` as a named phase, logging its duration when timing is enabled.
pub fn timed<R>(label: &'static str, f: impl FnOnce() -> R) -> R {
    let timer = Timer::start(label);
    let out = f();
    timer.stop_and_log();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_reports_when_enabled() {
        enable_timing();
        let t = Timer::start("test");
        let elapsed = t.stop();
        assert!(elapsed.is_some());
        assert!(elapsed.unwrap() >= 0.0);
    }

    #[test]
    fn timed_returns_value() {
        assert_eq!(timed("add", || 2 + 2), 4);
    }
}
