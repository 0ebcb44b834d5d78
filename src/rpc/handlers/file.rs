//! File operations: Load, Save, Close

use crate::board::Board;
use crate::rpc::protocol::{error_codes, Response};
use crate::rpc::state::ServerState;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Handle Load request - reads a JSON board file
pub fn handle_load(
    state: &mut ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize)]
    struct LoadParams {
        file_path: String,
    }

    let params: LoadParams = match params.and_then(|p| serde_json::from_value(p).ok()) {
        Some(p) => p,
        None => {
            return Response::error(id, error_codes::INVALID_PARAMS,
                "Invalid params: expected {file_path: string}".to_string());
        }
    };

    if state.is_job_running() {
        return Response::error(id, error_codes::JOB_RUNNING,
            "A stipple run is in progress. Cancel it first.".to_string());
    }

    info!(path = %params.file_path, "Loading board");
    let start = Instant::now();

    let board = match Board::load(&params.file_path) {
        Ok(board) => board,
        Err(e) => return Response::error(id, error_codes::LOAD_FAILED, e.to_string()),
    };

    let layers: Vec<String> = board.layer_names().map(str::to_string).collect();
    let result = serde_json::json!({
        "status": "ok",
        "layers": layers,
        "vias": board.vias().len(),
        "elements": board.elements().len(),
        "elapsed_ms": start.elapsed().as_millis() as u64,
    });

    state.stop_job();
    state.board_path = Some(PathBuf::from(params.file_path));
    state.board = Some(Arc::new(board));
    state.last_summary = None;

    Response::success(id, result)
}

/// Handle Save request - writes the board back to its file or a new path
pub fn handle_save(
    state: &mut ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize, Default)]
    struct SaveParams {
        #[serde(default)]
        file_path: Option<String>,
    }

    let params: SaveParams = params
        .and_then(|p| serde_json::from_value(p).ok())
        .unwrap_or_default();

    let Some(board) = state.board.as_ref() else {
        return Response::error(id, error_codes::NO_BOARD_LOADED,
            "No board loaded. Call Load first.".to_string());
    };
    if state.is_job_running() {
        return Response::error(id, error_codes::JOB_RUNNING,
            "A stipple run is in progress. Wait for it to finish.".to_string());
    }

    let path = match params.file_path.map(PathBuf::from).or_else(|| state.board_path.clone()) {
        Some(path) => path,
        None => {
            return Response::error(id, error_codes::INVALID_PARAMS,
                "No file path to save to".to_string());
        }
    };

    if let Err(e) = board.save(&path) {
        return Response::error(id, error_codes::SAVE_FAILED, e.to_string());
    }

    Response::success(id, serde_json::json!({
        "status": "ok",
        "file_path": path.display().to_string(),
        "dirty": board.is_dirty(),
    }))
}

/// Handle Close request - cancels any run and drops the board
pub fn handle_close(state: &mut ServerState, id: Option<serde_json::Value>) -> Response {
    state.stop_job();
    state.board = None;
    state.board_path = None;
    state.last_summary = None;
    info!("Board closed");
    Response::success(id, serde_json::json!({ "status": "ok" }))
}
