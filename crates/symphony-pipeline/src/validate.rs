//! Structural validation of the published artifacts.
//!
//! Only presence and container type are checked, not the fields of each
//! record.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::{InputRole, PipelineError, Result};

/// Top-level JSON container an artifact must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Array,
    Mapping,
}

impl ContainerKind {
    fn count(&self, value: &Value) -> Option<usize> {
        match (self, value) {
            (ContainerKind::Array, Value::Array(items)) => Some(items.len()),
            (ContainerKind::Mapping, Value::Object(entries)) => Some(entries.len()),
            _ => None,
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKind::Array => f.write_str("array"),
            ContainerKind::Mapping => f.write_str("mapping"),
        }
    }
}

/// An artifact the run is expected to leave behind.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedArtifact {
    pub label: String,
    pub path: PathBuf,
    pub kind: ContainerKind,
}

impl ExpectedArtifact {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>, kind: ContainerKind) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactStatus {
    pub label: String,
    pub path: PathBuf,
    pub kind: ContainerKind,
    pub exists: bool,
    pub parses: bool,
    /// Array items or mapping entries.
    pub record_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ArtifactStatus {
    pub fn is_valid(&self) -> bool {
        self.exists && self.parses
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationSummary {
    pub all_valid: bool,
    pub per_file: Vec<ArtifactStatus>,
}

impl ValidationSummary {
    pub fn failed_count(&self) -> usize {
        self.per_file.iter().filter(|s| !s.is_valid()).count()
    }

    pub fn into_result(self) -> Result<Self> {
        match self.failed_count() {
            0 => Ok(self),
            failed => Err(PipelineError::ValidationFailed(failed)),
        }
    }
}

/// The artifacts a complete run publishes.
///
/// The layer availability document lives in the intermediate directory but
/// is validated alongside the published files.
pub fn expected_artifacts(config: &PipelineConfig) -> Vec<ExpectedArtifact> {
    let mut artifacts = vec![
        ExpectedArtifact::new("merged layers", config.merged_layers_path(), ContainerKind::Array),
        ExpectedArtifact::new(
            "parameter availability table",
            config.output_path(&config.files.parameter_table),
            ContainerKind::Mapping,
        ),
        ExpectedArtifact::new(
            "layer availability",
            config.input_path(InputRole::LayerAvailability),
            ContainerKind::Mapping,
        ),
        ExpectedArtifact::new("summary statistics", config.summary_path(), ContainerKind::Mapping),
    ];
    if let Some(name) = &config.files.catalogue {
        artifacts.push(ExpectedArtifact::new(
            "catalogue",
            config.output_path(name),
            ContainerKind::Array,
        ));
    }
    artifacts
}

fn check(artifact: &ExpectedArtifact) -> ArtifactStatus {
    let mut status = ArtifactStatus {
        label: artifact.label.clone(),
        path: artifact.path.clone(),
        kind: artifact.kind,
        exists: artifact.path.is_file(),
        parses: false,
        record_count: None,
        error: None,
    };
    if !status.exists {
        status.error = Some("file not found".to_string());
        return status;
    }

    let parsed = fs::read_to_string(&artifact.path)
        .map_err(|e| e.to_string())
        .and_then(|content| serde_json::from_str::<Value>(&content).map_err(|e| e.to_string()));
    match parsed {
        Ok(value) => match artifact.kind.count(&value) {
            Some(count) => {
                status.parses = true;
                status.record_count = Some(count);
            }
            None => status.error = Some(format!("expected a JSON {}", artifact.kind)),
        },
        Err(e) => status.error = Some(e),
    }
    status
}

/// Check each artifact in order. Never fails; problems are in the summary.
pub fn validate(artifacts: &[ExpectedArtifact]) -> ValidationSummary {
    let per_file: Vec<ArtifactStatus> = artifacts.iter().map(check).collect();
    for status in &per_file {
        if status.is_valid() {
            info!(
                artifact = %status.label,
                records = status.record_count.unwrap_or(0),
                "Artifact valid"
            );
        } else {
            warn!(
                artifact = %status.label,
                path = %status.path.display(),
                error = status.error.as_deref().unwrap_or(""),
                "Artifact invalid"
            );
        }
    }
    ValidationSummary {
        all_valid: per_file.iter().all(ArtifactStatus::is_valid),
        per_file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statuses() {
        let dir = tempfile::tempdir().unwrap();
        let array = dir.path().join("layers.json");
        let wrong = dir.path().join("table.json");
        let broken = dir.path().join("broken.json");
        fs::write(&array, r#"[{"name": "Cod"}, {"name": "Herring"}]"#).unwrap();
        fs::write(&wrong, "[]").unwrap();
        fs::write(&broken, "{not json").unwrap();

        let summary = validate(&[
            ExpectedArtifact::new("layers", &array, ContainerKind::Array),
            ExpectedArtifact::new("table", &wrong, ContainerKind::Mapping),
            ExpectedArtifact::new("broken", &broken, ContainerKind::Mapping),
            ExpectedArtifact::new("absent", dir.path().join("absent.json"), ContainerKind::Array),
        ]);

        assert!(!summary.all_valid);
        assert_eq!(summary.failed_count(), 3);

        let layers = &summary.per_file[0];
        assert!(layers.exists && layers.parses);
        assert_eq!(layers.record_count, Some(2));

        let table = &summary.per_file[1];
        assert!(table.exists);
        assert!(!table.parses);
        assert_eq!(table.error.as_deref(), Some("expected a JSON mapping"));

        assert!(!summary.per_file[2].parses);

        let absent = &summary.per_file[3];
        assert!(!absent.exists);
        assert!(!absent.parses);
        assert_eq!(absent.record_count, None);

        assert!(matches!(
            summary.into_result(),
            Err(PipelineError::ValidationFailed(3))
        ));
    }

    #[test]
    fn test_expected_artifacts_without_catalogue() {
        let mut config = PipelineConfig::default();
        assert_eq!(expected_artifacts(&config).len(), 5);
        config.files.catalogue = None;
        let artifacts = expected_artifacts(&config);
        assert_eq!(artifacts.len(), 4);
        assert!(artifacts.iter().all(|a| a.label != "catalogue"));
    }
}
