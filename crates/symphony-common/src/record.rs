//! The enriched per-layer record published to the browsing UI.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Difficulty, ImprovementPotential, ImprovementReasoning, ParameterDetail, ParameterRef};

/// Output keys added by the merge. Raw fields with these names are replaced.
pub const ENRICHMENT_KEYS: [&str; 9] = [
    "improvement_potential",
    "difficulty",
    "satellite",
    "digital_earth_sweden",
    "improvement_reasoning",
    "p02_parameters",
    "data_availability_index",
    "parameter_count",
    "parameter_details",
];

/// A layer's canonical-keyed metadata followed by every enrichment field.
///
/// Enrichment fields are never optional: a failed lookup fills them with
/// defaults so consumers never branch on field presence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedLayerRecord {
    #[serde(flatten)]
    pub fields: Map<String, Value>,

    pub improvement_potential: ImprovementPotential,
    pub difficulty: Difficulty,
    pub satellite: bool,
    pub digital_earth_sweden: bool,
    pub improvement_reasoning: ImprovementReasoning,
    pub p02_parameters: Vec<ParameterRef>,
    pub data_availability_index: f64,
    pub parameter_count: usize,
    pub parameter_details: Vec<ParameterDetail>,
}

impl MergedLayerRecord {
    /// Canonical `name` field, if present and a string.
    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    pub fn is_enrichment_key(key: &str) -> bool {
        ENRICHMENT_KEYS.contains(&key)
    }
}
