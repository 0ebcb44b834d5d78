use anyhow::Context;
use pcb_stipple::rpc::{dispatch, error_codes, Request, Response, ServerState};
use std::io::{self, BufRead, Write};
use tracing::{error, info, warn};

fn write_line<T: serde::Serialize>(stdout: &mut impl Write, message: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string(message).context("Failed to serialize response")?;
    writeln!(stdout, "{}", json)?;
    stdout.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    pcb_stipple::init_logging()?;
    info!("Starting stipple server...");

    let mut state = ServerState::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        // Report runs that finished since the last request
        if let Some(notification) = state.poll_finished_job() {
            write_line(&mut stdout, &notification)?;
        }

        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("Error reading stdin: {}", e);
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let request: Request = match serde_json::from_str(&line) {
            Ok(req) => req,
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                let response = Response::error(None, error_codes::PARSE_ERROR, format!("Parse error: {}", e));
                write_line(&mut stdout, &response)?;
                continue;
            }
        };

        let response = dispatch(&mut state, request);
        write_line(&mut stdout, &response)?;
    }

    state.stop_job();
    info!("Shutting down...");
    Ok(())
}
