//! Engine error types
//!
//! The analysis core has no fatal path of its own: insufficient history
//! yields sentinels, not errors. What can fail is the ambient machinery —
//! model fitting, sink delivery, configuration parsing.

use fiberwatch_ml::MlError;
use thiserror::Error;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by the engine and its collaborators
#[derive(Debug, Error)]
pub enum EngineError {
    /// Model fitting or scoring failed
    #[error("model error: {0}")]
    Model(#[from] MlError),

    /// A sink rejected an emission; never retried
    #[error("{sink} sink failed: {reason}")]
    Sink {
        /// Which sink failed
        sink: &'static str,
        /// Underlying cause
        reason: String,
    },

    /// An environment override could not be parsed
    #[error("invalid configuration for {key}: {reason}")]
    Config {
        /// Environment variable name
        key: &'static str,
        /// Parse failure detail
        reason: String,
    },
}
