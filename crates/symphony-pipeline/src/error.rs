//! Error types for the merge pipeline.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Upstream document a pipeline input plays the role of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputRole {
    LayerMetadata,
    ImprovementAnalysis,
    ParameterMatches,
    LayerAvailability,
    ParameterTable,
}

impl InputRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputRole::LayerMetadata => "layer metadata",
            InputRole::ImprovementAnalysis => "improvement analysis",
            InputRole::ParameterMatches => "parameter matches",
            InputRole::LayerAvailability => "layer availability",
            InputRole::ParameterTable => "parameter availability table",
        }
    }
}

impl fmt::Display for InputRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that abort a pipeline run.
///
/// Per-layer lookup misses are never errors; they resolve to defaults and
/// are counted in the stage reports.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Missing {role} input: {} not found", path.display())]
    MissingInput { role: InputRole, path: PathBuf },

    #[error("Failed to read {role} input {}", path.display())]
    ReadInput {
        role: InputRole,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {role} input {}", path.display())]
    InvalidJson {
        role: InputRole,
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write {}", path.display())]
    WriteOutput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Output validation failed for {0} artifact(s)")]
    ValidationFailed(usize),
}

impl PipelineError {
    /// Input role behind a load failure, if any.
    pub fn input_role(&self) -> Option<InputRole> {
        match self {
            PipelineError::MissingInput { role, .. }
            | PipelineError::ReadInput { role, .. }
            | PipelineError::InvalidJson { role, .. } => Some(*role),
            _ => None,
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
