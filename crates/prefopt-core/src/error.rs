//! Error types for prefopt.
//!
//! The loss arithmetic itself never fails: non-finite inputs propagate as
//! `NaN`/`inf` per IEEE-754. Errors only arise from configuration checks and
//! from batch inputs whose shapes cannot be reconciled.

use thiserror::Error;

/// Result type alias for prefopt operations.
pub type Result<T> = std::result::Result<T, PrefOptError>;

/// Main error type for prefopt operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PrefOptError {
    /// Configuration errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input arrays cannot be broadcast to a common shape.
    #[error("Cannot broadcast shapes {shapes:?} together")]
    Broadcast {
        /// Shapes of the offending inputs, in argument order.
        shapes: Vec<Vec<usize>>,
    },

    /// Paired inputs have different lengths.
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// A reduction was requested over zero elements.
    #[error("Cannot reduce an empty batch")]
    EmptyBatch,
}
