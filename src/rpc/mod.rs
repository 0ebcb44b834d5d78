//! Stipple server module - line-delimited JSON-RPC over stdin/stdout
//!
//! # Module Structure
//! - `protocol` - JSON-RPC request/response types
//! - `state` - Server state management
//! - `handlers` - Request handlers organized by functionality

pub mod handlers;
pub mod protocol;
pub mod state;

// Re-export key types for convenience
pub use protocol::{error_codes, ErrorResponse, Notification, Request, Response};
pub use state::ServerState;

use handlers::*;

/// Route one request to its handler
pub fn dispatch(state: &mut ServerState, request: Request) -> Response {
    match request.method.as_str() {
        "Load" => handle_load(state, request.id, request.params),
        "GetDefaults" => handle_get_defaults(state, request.id),
        "PercentFill" => handle_percent_fill(request.id, request.params),
        "Stipple" => handle_stipple(state, request.id, request.params),
        "GetProgress" => handle_get_progress(state, request.id),
        "Cancel" => handle_cancel(state, request.id),
        "Save" => handle_save(state, request.id, request.params),
        "Close" => handle_close(state, request.id),
        _ => Response::error(
            request.id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", request.method),
        ),
    }
}
