//! Stipple engine
//!
//! Turns template polygons on the perimeter layers into cross-hatched
//! polygons on the stipple layers.
//!
//! # Submodules
//! - `order` - Modes, sides, parameters, input validation and fill estimate
//! - `cancel` - Cooperative cancellation token
//! - `progress` - Progress sink trait and the shared progress cell
//! - `template` - Reads template outlines from a perimeter layer
//! - `keepout` - Clearance shapes around vias, pins, pads and lines
//! - `lattice` - Island stippling: diamond lattice, container and overlays
//! - `writer` - Writes stippled regions back into a board layer
//! - `runner` - Per-layer parallel jobs and the background job handle

mod cancel;
mod keepout;
mod lattice;
mod order;
mod progress;
mod runner;
mod template;
mod writer;

pub use cancel::CancelToken;
pub use keepout::build_keepouts;
pub use lattice::{compute_stipples, LatticeGeometry, StippledRegion};
pub use order::{
    percent_fill, percent_open, LayerSide, StippleMode, StippleParams, StippleRequest, WorkOrder,
    CENTIMIL, MAX_PARAMETER,
};
pub use progress::{
    NoProgress, ProgressContext, ProgressSink, SharedProgress, PROGRESS_DONE, PROGRESS_START,
};
pub use runner::{format_elapsed, run_work_order, JobState, LayerReport, RunSummary, StippleJob};
pub use template::read_template;
pub use writer::{clear_layer, write_regions, WriteSummary};
