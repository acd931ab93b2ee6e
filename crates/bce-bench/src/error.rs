//! Error types for stress runs

use bce_driver::{Direction, FpgaError};
use thiserror::Error;

/// Result type alias for stress runs
pub type Result<T> = std::result::Result<T, StressError>;

/// Why a worker thread stopped
#[derive(Debug, Error)]
pub enum StressError {
    /// Invalid run parameters
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Reason for rejection
        reason: String,
    },

    /// A copy failed
    #[error("thread {thread}: {direction} copy failed at iteration {iteration}: {source}")]
    Dma {
        /// Worker index
        thread: usize,
        /// Iteration that failed
        iteration: u64,
        /// Which engine the copy went through
        direction: Direction,
        /// Driver error
        source: FpgaError,
    },

    /// Read-back differs from what was written
    #[error("thread {thread} data diff at iteration {iteration}, first byte {first_diff}")]
    Mismatch {
        /// Worker index
        thread: usize,
        /// Iteration that failed
        iteration: u64,
        /// Index of the first differing byte
        first_diff: usize,
    },

    /// A worker panicked
    #[error("thread {thread} panicked")]
    Panicked {
        /// Worker index
        thread: usize,
    },
}

impl StressError {
    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
