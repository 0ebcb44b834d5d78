//! Stipple handlers: GetDefaults, PercentFill, Stipple, GetProgress, Cancel

use crate::rpc::protocol::{error_codes, Response};
use crate::rpc::state::ServerState;
use crate::settings::StippleDefaults;
use crate::stipple::{
    percent_fill, ProgressSink, StippleJob, StippleMode, StippleRequest, WorkOrder,
};
use serde::Deserialize;
use tracing::info;

/// Parameter as typed: a JSON string or number, absent meaning the stored default
fn field_text(value: Option<serde_json::Value>, default: i64) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => default.to_string(),
    }
}

/// Handle GetDefaults request - returns the stored trace/pitch defaults
pub fn handle_get_defaults(state: &ServerState, id: Option<serde_json::Value>) -> Response {
    Response::success(id, serde_json::json!({
        "defaults": state.defaults,
        "component_fill": percent_fill(
            state.defaults.component_trace as f64,
            state.defaults.component_pitch as f64,
        ),
        "solder_fill": percent_fill(
            state.defaults.solder_trace as f64,
            state.defaults.solder_pitch as f64,
        ),
    }))
}

/// Handle PercentFill request - fill estimate for both sides
pub fn handle_percent_fill(
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    let params: StippleDefaults = match params.and_then(|p| serde_json::from_value(p).ok()) {
        Some(p) => p,
        None => {
            return Response::error(id, error_codes::INVALID_PARAMS,
                "Invalid params: expected {component_trace, component_pitch, solder_trace, solder_pitch}".to_string());
        }
    };

    let component = percent_fill(params.component_trace as f64, params.component_pitch as f64);
    let solder = percent_fill(params.solder_trace as f64, params.solder_pitch as f64);
    Response::success(id, serde_json::json!({
        "component_fill": component,
        "solder_fill": solder,
        "message": format!("Comp. Fill={component:2}%, Solder Fill={solder:2}%"),
    }))
}

/// Handle Stipple request - validates the input and starts a background run
pub fn handle_stipple(
    state: &mut ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize)]
    struct StippleParams {
        #[serde(default)]
        mode: Option<StippleMode>,
        #[serde(default)]
        component_trace: Option<serde_json::Value>,
        #[serde(default)]
        component_pitch: Option<serde_json::Value>,
        #[serde(default)]
        solder_trace: Option<serde_json::Value>,
        #[serde(default)]
        solder_pitch: Option<serde_json::Value>,
        #[serde(default = "default_true")]
        save_defaults: bool,
    }

    fn default_true() -> bool {
        true
    }

    let params: StippleParams = match params.map(serde_json::from_value) {
        Some(Ok(p)) => p,
        Some(Err(e)) => {
            return Response::error(id, error_codes::INVALID_PARAMS, format!("Invalid params: {e}"));
        }
        None => {
            return Response::error(id, error_codes::INVALID_PARAMS,
                "Invalid params: expected {mode, component_trace, ...}".to_string());
        }
    };

    let Some(board) = state.board.clone() else {
        return Response::error(id, error_codes::NO_BOARD_LOADED,
            "No board loaded. Call Load first.".to_string());
    };
    if state.is_job_running() {
        return Response::error(id, error_codes::JOB_RUNNING,
            "A stipple run is already in progress".to_string());
    }

    let defaults = state.defaults;
    let request = StippleRequest {
        mode: params.mode,
        component_trace: field_text(params.component_trace, defaults.component_trace),
        component_pitch: field_text(params.component_pitch, defaults.component_pitch),
        solder_trace: field_text(params.solder_trace, defaults.solder_trace),
        solder_pitch: field_text(params.solder_pitch, defaults.solder_pitch),
    };
    let order = match WorkOrder::from_input(&request) {
        Ok(order) => order,
        Err(e) => {
            let code = if e.is_validation() {
                error_codes::VALIDATION_FAILED
            } else {
                error_codes::INVALID_PARAMS
            };
            return Response::error(id, code, e.to_string());
        }
    };

    // Entered values become the new defaults
    state.defaults = StippleDefaults {
        component_trace: request.component_trace.trim().parse().unwrap_or(defaults.component_trace),
        component_pitch: request.component_pitch.trim().parse().unwrap_or(defaults.component_pitch),
        solder_trace: request.solder_trace.trim().parse().unwrap_or(defaults.solder_trace),
        solder_pitch: request.solder_pitch.trim().parse().unwrap_or(defaults.solder_pitch),
    };
    if params.save_defaults {
        if let Some(path) = state.prefs_path.as_deref() {
            state.defaults.store(path);
        }
    }

    // Collect a finished previous run before starting over
    if let Some(previous) = state.job.take() {
        if let Ok(summary) = previous.join() {
            state.last_summary = Some(summary);
        }
    }

    info!(mode = ?order.mode, "Starting stipple run");
    state.progress.report(0.0, "Stipple Progress");
    let layers = order.target_layer_names();
    let mode = order.mode;
    state.job = Some(StippleJob::spawn(board, order, state.progress.clone()));

    Response::success(id, serde_json::json!({
        "status": "started",
        "mode": mode,
        "layers": layers,
    }))
}

/// Handle GetProgress request - polls the shared progress cell
pub fn handle_get_progress(state: &ServerState, id: Option<serde_json::Value>) -> Response {
    Response::success(id, serde_json::json!({
        "state": state.job_state(),
        "fraction": state.progress.fraction(),
        "message": state.progress.message(),
        "done": state.progress.is_done(),
        "summary": &state.last_summary,
    }))
}

/// Handle Cancel request - asks a running job to stop
pub fn handle_cancel(state: &ServerState, id: Option<serde_json::Value>) -> Response {
    match &state.job {
        Some(job) if !job.is_finished() => {
            job.cancel();
            info!("Stipple run cancel requested");
            Response::success(id, serde_json::json!({ "status": "cancelling" }))
        }
        _ => Response::success(id, serde_json::json!({ "status": "idle" })),
    }
}
