//! Reference parameters and their availability scores.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Label used when a matched parameter carries none.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// A parameter matched to a layer, as produced by the matcher.
///
/// Keys other than `code` and `label` are kept so the match list can be
/// republished verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRef {
    pub code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ParameterRef {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: Some(label.into()),
            extra: Map::new(),
        }
    }

    pub fn label_or_unknown(&self) -> &str {
        self.label.as_deref().unwrap_or(UNKNOWN_LABEL)
    }
}

/// A matched parameter with its resolved availability index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDetail {
    pub code: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub availability_index: f64,
}

/// The four sub-indexes (0-100) the parameter availability index is built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubIndexes {
    #[serde(default, deserialize_with = "lenient_index", skip_serializing_if = "Option::is_none")]
    pub horizontal_resolution_pct: Option<f64>,

    #[serde(default, deserialize_with = "lenient_index", skip_serializing_if = "Option::is_none")]
    pub spatial_coverage_pct: Option<f64>,

    #[serde(default, deserialize_with = "lenient_index", skip_serializing_if = "Option::is_none")]
    pub time_coverage_pct: Option<f64>,

    #[serde(default, deserialize_with = "lenient_index", skip_serializing_if = "Option::is_none")]
    pub up_to_date_pct: Option<f64>,
}

impl SubIndexes {
    /// Mean of the four sub-indexes. An unknown sub-index counts as 0.
    pub fn availability_index(&self) -> f64 {
        let values = [
            self.horizontal_resolution_pct,
            self.spatial_coverage_pct,
            self.time_coverage_pct,
            self.up_to_date_pct,
        ];
        values.iter().map(|v| v.unwrap_or(0.0)).sum::<f64>() / values.len() as f64
    }

    /// True when none of the sub-indexes is known.
    pub fn is_empty(&self) -> bool {
        self.horizontal_resolution_pct.is_none()
            && self.spatial_coverage_pct.is_none()
            && self.time_coverage_pct.is_none()
            && self.up_to_date_pct.is_none()
    }
}

/// One entry of the parameter availability table (`p02_analysis.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterAvailability {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_label: Option<String>,

    /// Stored index. `None` when the scorer wrote `null` or a sentinel such
    /// as `"unknown"`.
    #[serde(default, deserialize_with = "lenient_index")]
    pub parameter_availability_index: Option<f64>,

    #[serde(flatten)]
    pub sub_indexes: SubIndexes,
}

impl ParameterAvailability {
    pub fn with_index(index: Option<f64>) -> Self {
        Self {
            parameter_availability_index: index,
            ..Default::default()
        }
    }

    /// Index recomputed from the sub-indexes.
    pub fn derived_index(&self) -> f64 {
        self.sub_indexes.availability_index()
    }
}

/// Accept a number, a numeric string, `null` or any other sentinel.
///
/// Anything that is not a finite number maps to `None`.
fn lenient_index<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite()))
}
