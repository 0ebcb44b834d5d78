//! Error types for stipple generation
//!
//! Only input validation and board file I/O can fail. Geometry never fails:
//! degenerate shapes simply produce empty results. Cancellation has its own
//! variant so that a cancelled template read can be told apart from a
//! successful one.

use crate::stipple::LayerSide;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for the stipple pipeline and its collaborators
#[derive(Error, Debug)]
pub enum StippleError {
    /// A trace or pitch field could not be parsed as an integer
    #[error("Bad {field} parameter input: {value:?}")]
    InvalidParameter {
        /// The field that failed to parse.
        field: &'static str,
        /// The raw text that was entered.
        value: String,
    },

    /// No stipple mode was chosen
    #[error("No layer specification")]
    NoModeSelected,

    /// A trace or pitch value was negative
    #[error("{field} must not be negative (got {value})")]
    NegativeParameter {
        /// The offending field.
        field: &'static str,
        /// The value after parsing.
        value: i64,
    },

    /// A trace or pitch value is too large to lay out on a board
    #[error("{field} must not exceed {max} (got {value})")]
    ParameterTooLarge {
        /// The offending field.
        field: &'static str,
        /// The value in board units.
        value: i64,
        /// Largest accepted value in board units.
        max: i64,
    },

    /// The lattice would be degenerate or inverted
    #[error("{side} pitch {pitch} must be greater than trace {trace}")]
    PitchNotAboveTrace {
        /// Side whose parameters are inconsistent.
        side: LayerSide,
        /// Trace in board units.
        trace: i64,
        /// Pitch in board units.
        pitch: i64,
    },

    /// The operation observed the cancellation token
    #[error("Stipple operation cancelled")]
    Cancelled,

    /// The background stipple thread panicked before producing a summary
    #[error("Stipple worker thread panicked")]
    WorkerPanicked,

    /// Reading or writing a board file failed
    #[error("Board file I/O failed for {path}: {source}")]
    BoardIo {
        /// Path of the board file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A board file did not contain valid board JSON
    #[error("Board file {path} is malformed: {source}")]
    BoardFormat {
        /// Path of the board file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl StippleError {
    /// True for the errors a user can fix by correcting dialog input
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StippleError::InvalidParameter { .. }
                | StippleError::NoModeSelected
                | StippleError::NegativeParameter { .. }
                | StippleError::ParameterTooLarge { .. }
                | StippleError::PitchNotAboveTrace { .. }
        )
    }
}

/// Result alias for stipple operations
pub type Result<T> = std::result::Result<T, StippleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(StippleError::NoModeSelected.is_validation());
        assert!(StippleError::InvalidParameter {
            field: "Component Trace",
            value: "abc".to_string(),
        }
        .is_validation());
        assert!(!StippleError::Cancelled.is_validation());
    }

    #[test]
    fn test_messages() {
        let err = StippleError::PitchNotAboveTrace {
            side: LayerSide::Solder,
            trace: 700,
            pitch: 500,
        };
        assert_eq!(err.to_string(), "solder pitch 500 must be greater than trace 700");
    }
}
