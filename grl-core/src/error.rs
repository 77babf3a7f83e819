//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum GrlError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// The name of the target update method is not `hard` or `soft`.
    #[error("Unknown target update method: {0}")]
    UnknownTargetUpdateMethod(String),

    /// Soft update requires `0 < tau < 1`.
    #[error("Soft update coefficient must be in (0, 1), got {0}")]
    InvalidSoftUpdateTau(f64),

    /// The replay buffer holds fewer transitions than requested.
    #[error("Requested {requested} transitions but the buffer holds {available}")]
    InsufficientTransitions {
        /// Batch size.
        requested: usize,

        /// Number of transitions in the buffer.
        available: usize,
    },

    /// Lengths of flat arrays are inconsistent with the declared shape.
    #[error("Shape mismatch in {name}: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Name of the array.
        name: String,

        /// Expected number of elements.
        expected: usize,

        /// Actual number of elements.
        actual: usize,
    },
}
