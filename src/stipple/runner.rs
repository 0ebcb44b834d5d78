//! Job orchestration
//!
//! A run takes one validated [`WorkOrder`] and processes every target side in
//! parallel, one rayon task per layer. Jobs share the board through per-layer
//! locks and a single cancellation token; progress is funnelled through one
//! [`ProgressSink`].

use super::cancel::CancelToken;
use super::keepout::build_keepouts;
use super::lattice::compute_stipples;
use super::order::{LayerSide, StippleMode, WorkOrder};
use super::progress::{ProgressContext, ProgressSink, PROGRESS_DONE, PROGRESS_START};
use super::template::read_template;
use super::writer::{clear_layer, write_regions};
use crate::board::Board;
use crate::error::{Result, StippleError};
use crate::geometry::{union, PolygonWithHoles};
use parking_lot::Mutex;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Lifecycle of a stipple run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// Outcome of one layer job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LayerReport {
    /// Stipple layer written (or that would have been written)
    pub layer: String,
    pub islands: usize,
    pub regions_written: usize,
    pub polygons_removed: usize,
    /// A required layer was missing, so nothing was done
    pub skipped: bool,
}

impl LayerReport {
    fn new(side: LayerSide) -> Self {
        Self {
            layer: side.stipple_layer().to_string(),
            ..Self::default()
        }
    }

    fn skipped(side: LayerSide) -> Self {
        Self {
            skipped: true,
            ..Self::new(side)
        }
    }

    fn changed_board(&self) -> bool {
        self.regions_written > 0 || self.polygons_removed > 0
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub state: JobState,
    pub layers: Vec<LayerReport>,
    pub elapsed_ms: u64,
}

/// `HH:MM:SS` rendering of a duration
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Run a work order to completion or cancellation on the calling thread
///
/// Layer jobs run in parallel. The sink first receives [`PROGRESS_START`]
/// and finally [`PROGRESS_DONE`].
pub fn run_work_order(
    board: &Board,
    order: &WorkOrder,
    cancel: &CancelToken,
    progress: &dyn ProgressSink,
) -> RunSummary {
    let start = Instant::now();
    info!(mode = ?order.mode, layers = ?order.target_layer_names(), "Polygon stipple begins");
    progress.report(PROGRESS_START, "Polygon Stipple Begins...");

    let layer_count = order.targets.len();
    let layers: Vec<LayerReport> = order
        .targets
        .par_iter()
        .enumerate()
        .map(|(index, side)| {
            let context = ProgressContext::new(index, layer_count, side.stipple_layer());
            run_layer(board, order, *side, &context, cancel, progress)
        })
        .collect();

    if layers.iter().any(LayerReport::changed_board) {
        board.mark_dirty();
    }

    let elapsed = start.elapsed();
    let state = if cancel.is_cancelled() {
        progress.report(PROGRESS_DONE, "Polygon Stipple Aborted");
        JobState::Cancelled
    } else {
        progress.report(PROGRESS_DONE, "Polygon Stipple Ends");
        JobState::Completed
    };
    info!(state = ?state, "Polygon stipple ends: elapsed time is {}", format_elapsed(elapsed));

    RunSummary {
        state,
        layers,
        elapsed_ms: elapsed.as_millis() as u64,
    }
}

fn run_layer(
    board: &Board,
    order: &WorkOrder,
    side: LayerSide,
    context: &ProgressContext,
    cancel: &CancelToken,
    progress: &dyn ProgressSink,
) -> LayerReport {
    if order.mode == StippleMode::DeleteAll {
        return match board.find_layer_by_name(side.stipple_layer()) {
            Some(layer) => LayerReport {
                polygons_removed: clear_layer(board, layer),
                ..LayerReport::new(side)
            },
            None => {
                warn!(layer = side.stipple_layer(), "Stipple layer not found");
                LayerReport::skipped(side)
            }
        };
    }

    let Some(perimeter) = board.find_layer_by_name(side.perimeter_layer()) else {
        warn!(layer = side.perimeter_layer(), "Perimeter layer not found");
        return LayerReport::skipped(side);
    };
    let template = read_template(&board.layer(perimeter), order.mode.only_selected(), cancel);
    let outlines = match template {
        Ok(outlines) => outlines,
        Err(StippleError::Cancelled) => return LayerReport::new(side),
        Err(e) => {
            warn!(layer = side.perimeter_layer(), error = %e, "Template read failed");
            return LayerReport::skipped(side);
        }
    };
    let shapes: Vec<PolygonWithHoles> = outlines.into_iter().map(PolygonWithHoles::from).collect();
    let islands = union(&shapes);

    let Some(target) = board.find_layer_by_name(side.stipple_layer()) else {
        warn!(layer = side.stipple_layer(), "Stipple layer not found");
        return LayerReport::skipped(side);
    };

    let params = order.params(side);
    let keepouts = build_keepouts(board, side, params.trace);
    let regions = compute_stipples(&islands, &keepouts, params, progress, context, cancel);

    let mut report = LayerReport {
        islands: islands.len(),
        ..LayerReport::new(side)
    };
    if cancel.is_cancelled() && regions.is_empty() {
        return report;
    }
    let written = write_regions(board, target, &regions, order.mode.replaces_existing());
    report.regions_written = written.regions;
    report.polygons_removed = written.removed;
    info!(
        layer = side.stipple_layer(),
        islands = report.islands,
        regions = written.regions,
        overlays = written.overlays,
        removed = written.removed,
        "Layer stippled"
    );
    report
}

/// A stipple run executing on its own thread
pub struct StippleJob {
    cancel: CancelToken,
    state: Arc<Mutex<JobState>>,
    handle: JoinHandle<RunSummary>,
}

impl StippleJob {
    /// Start `order` on a background thread
    pub fn spawn(board: Arc<Board>, order: WorkOrder, progress: Arc<dyn ProgressSink>) -> Self {
        let cancel = CancelToken::new();
        let state = Arc::new(Mutex::new(JobState::Running));

        let handle = {
            let cancel = cancel.clone();
            let state = Arc::clone(&state);
            thread::spawn(move || {
                let summary = run_work_order(&board, &order, &cancel, progress.as_ref());
                *state.lock() = summary.state;
                summary
            })
        };

        Self {
            cancel,
            state,
            handle,
        }
    }

    /// Ask the run to stop at its next cancellation check
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn state(&self) -> JobState {
        *self.state.lock()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the run and return its summary
    pub fn join(self) -> Result<RunSummary> {
        self.handle.join().map_err(|_| StippleError::WorkerPanicked)
    }
}
