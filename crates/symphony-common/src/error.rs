//! Error types for the Symphony data model.

use thiserror::Error;

/// Result type alias using SymphonyError.
pub type SymphonyResult<T> = Result<T, SymphonyError>;

/// Errors raised while interpreting upstream labels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymphonyError {
    #[error("Unknown layer category: {0}")]
    UnknownCategory(String),

    #[error("Unknown improvement potential '{0}' (expected small, medium or large)")]
    UnknownImprovementPotential(String),

    #[error("Unknown difficulty '{0}' (expected low, medium or high)")]
    UnknownDifficulty(String),

    #[error("Invalid {field} flag {value} (expected true or false)")]
    InvalidFlag { field: &'static str, value: String },
}
