//! Progress reporting
//!
//! A run reports fractions in `[0, 1]` followed by the terminal sentinel
//! [`PROGRESS_DONE`]. Readers poll [`SharedProgress`] without blocking the
//! jobs; the last writer wins.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

/// Terminal progress value reported once a run has finished or aborted
pub const PROGRESS_DONE: f32 = 2.0;

/// Fraction reported before any layer job starts
pub const PROGRESS_START: f32 = 0.05;

/// Receiver of progress updates
pub trait ProgressSink: Send + Sync {
    fn report(&self, fraction: f32, message: &str);
}

/// Sink that drops every update
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _fraction: f32, _message: &str) {}
}

/// Lock-light progress cell shared between the jobs and a poller
#[derive(Debug)]
pub struct SharedProgress {
    fraction: AtomicU32,
    message: Mutex<String>,
}

impl SharedProgress {
    pub fn new() -> Self {
        Self {
            fraction: AtomicU32::new(0f32.to_bits()),
            message: Mutex::new(String::new()),
        }
    }

    pub fn fraction(&self) -> f32 {
        f32::from_bits(self.fraction.load(Ordering::Relaxed))
    }

    pub fn message(&self) -> String {
        self.message.lock().clone()
    }

    pub fn is_done(&self) -> bool {
        self.fraction() >= PROGRESS_DONE
    }
}

impl Default for SharedProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for SharedProgress {
    fn report(&self, fraction: f32, message: &str) {
        self.fraction.store(fraction.to_bits(), Ordering::Relaxed);
        let mut current = self.message.lock();
        current.clear();
        current.push_str(message);
    }
}

/// Where a layer job sits within the whole run
#[derive(Debug, Clone)]
pub struct ProgressContext {
    pub layer_index: usize,
    pub layer_count: usize,
    pub layer_name: String,
}

impl ProgressContext {
    pub fn new(layer_index: usize, layer_count: usize, layer_name: impl Into<String>) -> Self {
        Self {
            layer_index,
            layer_count: layer_count.max(1),
            layer_name: layer_name.into(),
        }
    }

    /// Overall run fraction for a position inside this layer's work
    ///
    /// `row_fraction` is clamped to `[0, 1]`.
    pub fn fraction(&self, island_index: usize, island_count: usize, row_fraction: f64) -> f32 {
        let islands = island_count.max(1) as f64;
        let within_layer = (island_index as f64 + row_fraction.clamp(0.0, 1.0)) / islands;
        let overall = (self.layer_index as f64 + within_layer.min(1.0)) / self.layer_count as f64;
        (PROGRESS_START as f64 + (1.0 - PROGRESS_START as f64) * overall) as f32
    }

    pub fn area_message(&self, island_index: usize, island_count: usize) -> String {
        format!(
            "Area {} of {} for \"{}\"...",
            island_index + 1,
            island_count,
            self.layer_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_progress_last_writer_wins() {
        let progress = SharedProgress::new();
        assert_eq!(progress.fraction(), 0.0);
        progress.report(0.05, "Polygon Stipple Begins...");
        progress.report(0.5, "Area 1 of 2");
        assert_eq!(progress.fraction(), 0.5);
        assert_eq!(progress.message(), "Area 1 of 2");
        assert!(!progress.is_done());
        progress.report(PROGRESS_DONE, "Polygon Stipple Ends");
        assert!(progress.is_done());
    }

    #[test]
    fn test_fraction_is_monotonic_within_layer() {
        let ctx = ProgressContext::new(1, 2, "solder-stipple");
        let mut last = 0.0f32;
        for island in 0..3 {
            for step in 0..=10 {
                let f = ctx.fraction(island, 3, step as f64 / 10.0);
                assert!(f >= last, "{f} < {last}");
                last = f;
            }
        }
        assert!((ctx.fraction(0, 3, 0.0) - 0.525).abs() < 1e-6);
        assert!((last - 1.0).abs() < 1e-6);
        assert_eq!(ctx.area_message(0, 3), "Area 1 of 3 for \"solder-stipple\"...");
    }
}
