//! Cross-hatched ground-plane generation for printed circuit boards
//!
//! Template polygons drawn on the `comp-perim` / `solder-perim` layers are
//! merged into islands, covered with a staggered lattice of diamond cut-outs
//! and written to the `comp-stipple` / `solder-stipple` layers. Vias, pins,
//! pads and copper lines get solid clearance overlays.
//!
//! # Module Structure
//! - `geometry` - Integer polygons, boolean operations and keepout shapes
//! - `board` - Shared board model with per-layer locks and JSON persistence
//! - `stipple` - Work orders, lattice generation, board writer and job runner
//! - `settings` - Stored trace/pitch defaults
//! - `rpc` - JSON-RPC request handling for the `stipple_server` binary
//! - `error` - Library error type

pub mod board;
pub mod error;
pub mod geometry;
pub mod rpc;
pub mod settings;
pub mod stipple;

pub use board::Board;
pub use error::{Result, StippleError};
pub use stipple::{run_work_order, CancelToken, StippleJob, StippleMode, WorkOrder};

/// Install the global tracing subscriber
///
/// Logs go to stderr so stdout stays reserved for RPC traffic. The filter
/// comes from `RUST_LOG` and defaults to `info`.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))?;
    Ok(())
}
