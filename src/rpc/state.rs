//! Server state management for the stipple server

use super::protocol::Notification;
use crate::board::Board;
use crate::settings::{default_prefs_path, StippleDefaults};
use crate::stipple::{JobState, RunSummary, SharedProgress, StippleJob};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// In-memory state: loaded board, background job and stored defaults
pub struct ServerState {
    pub board_path: Option<PathBuf>,
    pub board: Option<Arc<Board>>,
    pub job: Option<StippleJob>,
    pub progress: Arc<SharedProgress>,
    pub last_summary: Option<RunSummary>,
    pub prefs_path: Option<PathBuf>,
    pub defaults: StippleDefaults,
}

impl ServerState {
    /// State using the preferences file in the home directory
    pub fn new() -> Self {
        Self::with_prefs_path(default_prefs_path())
    }

    pub fn with_prefs_path(prefs_path: Option<PathBuf>) -> Self {
        let defaults = prefs_path
            .as_deref()
            .map(StippleDefaults::load_or_create)
            .unwrap_or_default();
        Self {
            board_path: None,
            board: None,
            job: None,
            progress: Arc::new(SharedProgress::new()),
            last_summary: None,
            prefs_path,
            defaults,
        }
    }

    /// Check if a board is loaded
    pub fn is_board_loaded(&self) -> bool {
        self.board.is_some()
    }

    pub fn is_job_running(&self) -> bool {
        self.job.as_ref().is_some_and(|job| !job.is_finished())
    }

    pub fn job_state(&self) -> JobState {
        match (&self.job, &self.last_summary) {
            (Some(job), _) => job.state(),
            (None, Some(summary)) => summary.state,
            (None, None) => JobState::Idle,
        }
    }

    /// Collect a finished background run, producing its completion notification
    pub fn poll_finished_job(&mut self) -> Option<Notification> {
        if !self.job.as_ref()?.is_finished() {
            return None;
        }
        let job = self.job.take()?;
        let result = match job.join() {
            Ok(summary) => {
                info!(
                    state = ?summary.state,
                    elapsed_ms = summary.elapsed_ms,
                    "Stipple run finished"
                );
                let result = serde_json::json!({ "status": "ok", "summary": &summary });
                self.last_summary = Some(summary);
                result
            }
            Err(e) => {
                warn!(error = %e, "Stipple run failed");
                serde_json::json!({ "status": "error", "message": e.to_string() })
            }
        };
        Some(Notification::new("stippleComplete", result))
    }

    /// Cancel and wait for any running job
    pub fn stop_job(&mut self) {
        if let Some(job) = self.job.take() {
            job.cancel();
            match job.join() {
                Ok(summary) => self.last_summary = Some(summary),
                Err(e) => warn!(error = %e, "Stipple run failed"),
            }
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}
