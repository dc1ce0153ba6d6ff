//! Loading of the upstream JSON documents.
//!
//! Every input is read wholly into memory. A missing or unparseable file is
//! fatal and names the input role; per-entry gaps are left to the stages.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

use symphony_common::{
    AvailabilityDocument, ImprovementAnalysis, ImprovementAnalysisDocument, KeyedTable,
    LayerAvailability, ParameterAvailability, ParameterRef,
};

use crate::config::PipelineConfig;
use crate::error::{InputRole, PipelineError, Result};

/// Matched parameters per layer name, most relevant first.
pub type ParameterMatches = KeyedTable<Vec<ParameterRef>>;

/// Parameter availability table keyed by parameter code.
pub type ParameterTable = KeyedTable<ParameterAvailability>;

/// Largest tolerated gap between a stored index and its sub-index mean.
pub const DERIVED_INDEX_TOLERANCE: f64 = 1.0;

/// Read and parse one JSON input.
pub fn load_json<T: DeserializeOwned>(role: InputRole, path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            PipelineError::MissingInput {
                role,
                path: path.to_path_buf(),
            }
        } else {
            PipelineError::ReadInput {
                role,
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let parsed = serde_json::from_str(&content).map_err(|source| PipelineError::InvalidJson {
        role,
        path: path.to_path_buf(),
        source,
    })?;

    info!(role = %role, path = %path.display(), "Loaded input");
    Ok(parsed)
}

/// Raw metadata rows. Rows are kept as untyped JSON; the merge decides which
/// of them are real layers.
pub fn load_layer_metadata(path: &Path) -> Result<Vec<Value>> {
    let rows: Vec<Value> = load_json(InputRole::LayerMetadata, path)?;
    info!(rows = rows.len(), "Layer metadata rows loaded");
    Ok(rows)
}

pub fn load_improvement_analyses(path: &Path) -> Result<KeyedTable<ImprovementAnalysis>> {
    let document: ImprovementAnalysisDocument = load_json(InputRole::ImprovementAnalysis, path)?;
    info!(layers = document.layer_analyses.len(), "Improvement analyses loaded");
    Ok(document.layer_analyses)
}

pub fn load_parameter_matches(path: &Path) -> Result<ParameterMatches> {
    let matches: ParameterMatches = load_json(InputRole::ParameterMatches, path)?;
    info!(layers = matches.len(), "Parameter matches loaded");
    Ok(matches)
}

pub fn load_layer_availability(path: &Path) -> Result<KeyedTable<LayerAvailability>> {
    let document: AvailabilityDocument = load_json(InputRole::LayerAvailability, path)?;
    info!(layers = document.layer_availability.len(), "Layer availability loaded");
    Ok(document.layer_availability)
}

/// Load the parameter table and flag entries whose stored index disagrees
/// with their own sub-indexes.
pub fn load_parameter_table(path: &Path) -> Result<ParameterTable> {
    let table: ParameterTable = load_json(InputRole::ParameterTable, path)?;
    let inconsistent = check_parameter_table(&table);
    info!(
        parameters = table.len(),
        inconsistent,
        "Parameter availability table loaded"
    );
    Ok(table)
}

/// Count entries whose stored index drifts from the sub-index mean.
///
/// Entries with an unknown index or no sub-indexes are not checked.
pub fn check_parameter_table(table: &ParameterTable) -> usize {
    let mut inconsistent = 0;
    for (code, entry) in table.iter() {
        let Some(stored) = entry.parameter_availability_index else {
            continue;
        };
        if entry.sub_indexes.is_empty() {
            continue;
        }
        let derived = entry.derived_index();
        if (stored - derived).abs() > DERIVED_INDEX_TOLERANCE {
            warn!(
                code = %code,
                stored,
                derived,
                "Stored availability index differs from its sub-index mean"
            );
            inconsistent += 1;
        }
    }
    inconsistent
}

/// The four documents the merge joins.
#[derive(Debug, Clone, Default)]
pub struct MergeInputs {
    pub layer_metadata: Vec<Value>,
    pub improvement_analyses: KeyedTable<ImprovementAnalysis>,
    pub parameter_matches: ParameterMatches,
    pub layer_availability: KeyedTable<LayerAvailability>,
}

impl MergeInputs {
    /// Load all four merge inputs; the first missing one aborts.
    pub fn load(config: &PipelineConfig) -> Result<Self> {
        let layer_availability =
            load_layer_availability(&config.input_path(InputRole::LayerAvailability))?;
        Self::load_with_availability(config, layer_availability)
    }

    /// Load the three on-disk inputs and use an availability table computed
    /// in this run.
    pub fn load_with_availability(
        config: &PipelineConfig,
        layer_availability: KeyedTable<LayerAvailability>,
    ) -> Result<Self> {
        Ok(Self {
            layer_metadata: load_layer_metadata(&config.input_path(InputRole::LayerMetadata))?,
            improvement_analyses: load_improvement_analyses(
                &config.input_path(InputRole::ImprovementAnalysis),
            )?,
            parameter_matches: load_parameter_matches(
                &config.input_path(InputRole::ParameterMatches),
            )?,
            layer_availability,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_file_names_role() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = load_parameter_matches(&path).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingInput {
                role: InputRole::ParameterMatches,
                ..
            }
        ));
        assert!(err.to_string().contains("parameter matches"));
    }

    #[test]
    fn test_wrong_shape_is_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        fs::write(&path, r#"{"Name": "Cod"}"#).unwrap();
        let err = load_layer_metadata(&path).unwrap_err();
        assert_eq!(err.input_role(), Some(InputRole::LayerMetadata));
        assert!(matches!(err, PipelineError::InvalidJson { .. }));
    }

    #[test]
    fn test_analysis_document_without_layer_analyses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.json");
        fs::write(&path, r#"{"metadata": {"model": "x"}}"#).unwrap();
        assert!(load_improvement_analyses(&path).unwrap().is_empty());
    }

    #[test]
    fn test_check_parameter_table() {
        let table: ParameterTable = serde_json::from_value(json!({
            "GOOD": {"parameter_availability_index": 50.0, "horizontal_resolution_pct": 50.0,
                     "spatial_coverage_pct": 50.0, "time_coverage_pct": 50.0, "up_to_date_pct": 50.0},
            "DRIFT": {"parameter_availability_index": 90.0, "horizontal_resolution_pct": 10.0},
            "BARE": {"parameter_availability_index": 12.0},
            "NULL": {"parameter_availability_index": null, "up_to_date_pct": 80.0}
        }))
        .unwrap();
        assert_eq!(check_parameter_table(&table), 1);
    }
}
