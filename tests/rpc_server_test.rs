use pcb_stipple::board::Board;
use pcb_stipple::rpc::{dispatch, error_codes, Request, Response, ServerState};
use serde_json::{json, Value};
use std::path::Path;
use std::thread;
use std::time::Duration;

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "tests/data/sample_board.json";

    fn call(state: &mut ServerState, method: &str, params: Value) -> Response {
        let request = Request {
            id: Some(json!(1)),
            method: method.to_string(),
            params: if params.is_null() { None } else { Some(params) },
        };
        dispatch(state, request)
    }

    fn error_code(response: &Response) -> Option<i32> {
        response.error.as_ref().map(|e| e.code)
    }

    fn state_in(dir: &Path) -> ServerState {
        ServerState::with_prefs_path(Some(dir.join(".pcb").join("stipple_prefs")))
    }

    fn wait_for_completion(state: &mut ServerState) -> Value {
        for _ in 0..600 {
            if let Some(notification) = state.poll_finished_job() {
                assert_eq!(notification.method, "stippleComplete");
                return notification.result;
            }
            thread::sleep(Duration::from_millis(50));
        }
        panic!("stipple run did not finish");
    }

    #[test]
    fn test_requires_loaded_board() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());

        let response = call(&mut state, "Stipple", json!({ "mode": "Both" }));
        assert_eq!(error_code(&response), Some(error_codes::NO_BOARD_LOADED));
        let response = call(&mut state, "Save", Value::Null);
        assert_eq!(error_code(&response), Some(error_codes::NO_BOARD_LOADED));
    }

    #[test]
    fn test_unknown_method_and_bad_params() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());

        let response = call(&mut state, "Frobnicate", Value::Null);
        assert_eq!(error_code(&response), Some(error_codes::METHOD_NOT_FOUND));
        let response = call(&mut state, "Load", json!({ "path": FIXTURE }));
        assert_eq!(error_code(&response), Some(error_codes::INVALID_PARAMS));
        let response = call(&mut state, "Load", json!({ "file_path": "tests/data/missing.json" }));
        assert_eq!(error_code(&response), Some(error_codes::LOAD_FAILED));
    }

    #[test]
    fn test_defaults_and_percent_fill() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        assert!(dir.path().join(".pcb").join("stipple_prefs").exists());

        let response = call(&mut state, "GetDefaults", Value::Null);
        let result = response.result.expect("defaults");
        assert_eq!(result["defaults"]["component_pitch"], 4500);
        assert_eq!(result["defaults"]["solder_pitch"], 7000);

        let response = call(&mut state, "PercentFill", json!({
            "component_trace": 7, "component_pitch": 70,
            "solder_trace": 700, "solder_pitch": 4500
        }));
        let result = response.result.expect("fill");
        assert_eq!(result["component_fill"], 18);
        assert_eq!(result["solder_fill"], 28);
        assert_eq!(result["message"], "Comp. Fill=18%, Solder Fill=28%");
    }

    #[test]
    fn test_validation_errors_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        assert!(call(&mut state, "Load", json!({ "file_path": FIXTURE })).error.is_none());

        let response = call(&mut state, "Stipple", json!({ "mode": "TopOnly", "component_trace": "abc" }));
        assert_eq!(error_code(&response), Some(error_codes::VALIDATION_FAILED));

        let response = call(&mut state, "Stipple", json!({ "component_trace": "10" }));
        assert_eq!(error_code(&response), Some(error_codes::VALIDATION_FAILED));

        let response = call(&mut state, "Stipple", json!({
            "mode": "BottomOnly", "solder_trace": 100, "solder_pitch": 100
        }));
        let error = response.error.expect("pitch must exceed trace");
        assert_eq!(error.code, error_codes::VALIDATION_FAILED);
        assert!(error.message.contains("solder pitch"));

        let response = call(&mut state, "Stipple", json!({
            "mode": "TopOnly",
            "component_trace": "10000000000000000",
            "component_pitch": "36000000000000000"
        }));
        let error = response.error.expect("oversized trace");
        assert_eq!(error.code, error_codes::VALIDATION_FAILED);
        assert!(error.message.contains("Component Trace must not exceed"));

        assert!(state.job.is_none());
    }

    #[test]
    fn test_stipple_run_progress_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        assert!(call(&mut state, "Load", json!({ "file_path": FIXTURE })).error.is_none());

        let response = call(&mut state, "Stipple", json!({
            "mode": "Both",
            "component_trace": "10", "component_pitch": "100",
            "solder_trace": 10, "solder_pitch": 100
        }));
        let result = response.result.expect("run started");
        assert_eq!(result["status"], "started");
        assert_eq!(result["layers"], json!(["comp-perim", "solder-perim"]));

        let finished = wait_for_completion(&mut state);
        assert_eq!(finished["status"], "ok");
        assert_eq!(finished["summary"]["state"], "Completed");

        let progress = call(&mut state, "GetProgress", Value::Null).result.expect("progress");
        assert_eq!(progress["state"], "Completed");
        assert_eq!(progress["done"], true);
        assert_eq!(progress["message"], "Polygon Stipple Ends");

        // Entered values become the stored defaults
        assert_eq!(state.defaults.component_trace, 10);
        let prefs = std::fs::read_to_string(dir.path().join(".pcb").join("stipple_prefs")).unwrap();
        assert!(prefs.contains("SolderPitch = 100"));

        let out = dir.path().join("stippled.json");
        let response = call(&mut state, "Save", json!({ "file_path": out.display().to_string() }));
        assert_eq!(response.result.expect("saved")["dirty"], true);

        let saved = Board::load(&out).unwrap();
        let comp = saved.find_layer_by_name("comp-stipple").unwrap();
        assert!(!saved.layer(comp).polygons().is_empty());

        let response = call(&mut state, "Cancel", Value::Null);
        assert_eq!(response.result.expect("idle")["status"], "idle");
        let response = call(&mut state, "Close", Value::Null);
        assert!(response.error.is_none());
        assert!(!state.is_board_loaded());
    }
}
