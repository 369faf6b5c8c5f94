//! Error types for model fitting and scoring

use thiserror::Error;

/// Result type for model operations
pub type MlResult<T> = Result<T, MlError>;

/// Errors raised while fitting or scoring
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MlError {
    /// Training set was empty
    #[error("not enough samples to fit a model")]
    InsufficientData,

    /// Sample has no features, or more than [`crate::sample::MAX_FEATURES`]
    #[error("feature vector has an unsupported dimension")]
    InvalidFeature,

    /// Configuration value outside its valid range
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
