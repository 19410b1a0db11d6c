//! Error types for genefield.
//!
//! Structural problems surface here, at the boundary that introduced them.
//! Per-tick numeric edge cases (coincident particles, flat datasets, empty
//! populations) never produce an error; the engines fall back to documented
//! constants instead.

use thiserror::Error;

/// A timeline or sampling request that violates a structural invariant.
///
/// Raised at construction time, never mid-simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A timeline needs at least one time point.
    #[error("timeline has no time points")]
    EmptyTimeline,
    /// A time point carries a NaN or infinite timestamp.
    #[error("time point '{id}' has a non-finite timestamp")]
    NonFiniteTimestamp {
        /// Id of the offending time point.
        id: String,
    },
    /// Two time points share the same id.
    #[error("duplicate time point id '{id}'")]
    DuplicateTimePoint {
        /// The repeated id.
        id: String,
    },
    /// Total duration must be finite and non-negative.
    #[error("invalid total duration {0}s")]
    InvalidDuration(f64),
    /// Frame rate must be finite and positive.
    #[error("invalid frame rate {0} fps")]
    InvalidFrameRate(f64),
}

/// Errors that can occur when loading or saving configuration and data files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write the file.
    #[error("failed to access file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid JSON for the expected shape.
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The file parsed but describes an invalid timeline.
    #[error("invalid timeline: {0}")]
    Validation(#[from] ValidationError),
}
