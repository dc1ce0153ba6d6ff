//! Layer classification and improvement assessment types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::{KeyedTable, SymphonyError};

/// Symphony category of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerCategory {
    Ecosystem,
    Pressure,
    SourceData,
}

impl LayerCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerCategory::Ecosystem => "Ecosystem",
            LayerCategory::Pressure => "Pressure",
            LayerCategory::SourceData => "SourceData",
        }
    }
}

impl fmt::Display for LayerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerCategory {
    type Err = SymphonyError;

    /// Parse a category label as written in the metadata sheets.
    ///
    /// Matching ignores case, whitespace and underscores, and accepts the
    /// plural "Pressures" used in some sheets.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "ecosystem" | "ecosystems" => Ok(LayerCategory::Ecosystem),
            "pressure" | "pressures" => Ok(LayerCategory::Pressure),
            "sourcedata" => Ok(LayerCategory::SourceData),
            _ => Err(SymphonyError::UnknownCategory(s.to_string())),
        }
    }
}

/// How much a layer could gain from better data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImprovementPotential {
    Small,
    #[default]
    Medium,
    Large,
}

impl ImprovementPotential {
    pub const ALL: [ImprovementPotential; 3] = [
        ImprovementPotential::Small,
        ImprovementPotential::Medium,
        ImprovementPotential::Large,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImprovementPotential::Small => "small",
            ImprovementPotential::Medium => "medium",
            ImprovementPotential::Large => "large",
        }
    }
}

impl FromStr for ImprovementPotential {
    type Err = SymphonyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" => Ok(ImprovementPotential::Small),
            "medium" => Ok(ImprovementPotential::Medium),
            "large" => Ok(ImprovementPotential::Large),
            _ => Err(SymphonyError::UnknownImprovementPotential(s.to_string())),
        }
    }
}

impl fmt::Display for ImprovementPotential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Perceived effort of implementing the improvement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Low,
    #[default]
    Medium,
    High,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Low, Difficulty::Medium, Difficulty::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Low => "low",
            Difficulty::Medium => "medium",
            Difficulty::High => "high",
        }
    }
}

impl FromStr for Difficulty {
    type Err = SymphonyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Difficulty::Low),
            "medium" => Ok(Difficulty::Medium),
            "high" => Ok(Difficulty::High),
            _ => Err(SymphonyError::UnknownDifficulty(s.to_string())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-text justifications attached to an improvement assessment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprovementReasoning {
    #[serde(default)]
    pub improvement_justification: String,
    #[serde(default)]
    pub difficulty_justification: String,
    #[serde(default)]
    pub satellite_justification: String,
    #[serde(default)]
    pub digital_earth_sweden_justification: String,
}

impl ImprovementReasoning {
    /// Read reasoning from an analysis value, returning how many fields held
    /// something other than a string.
    ///
    /// Absent and `null` fields are empty justifications. A reasoning value
    /// that is not an object counts as one invalid value.
    pub fn from_value(value: &Value) -> (Self, usize) {
        let mut reasoning = Self::default();
        let fields = match value {
            Value::Object(fields) => fields,
            Value::Null => return (reasoning, 0),
            _ => return (reasoning, 1),
        };

        let mut invalid = 0;
        for (key, slot) in [
            ("improvement_justification", &mut reasoning.improvement_justification),
            ("difficulty_justification", &mut reasoning.difficulty_justification),
            ("satellite_justification", &mut reasoning.satellite_justification),
            (
                "digital_earth_sweden_justification",
                &mut reasoning.digital_earth_sweden_justification,
            ),
        ] {
            match fields.get(key) {
                Some(Value::String(text)) => *slot = text.clone(),
                None | Some(Value::Null) => {}
                Some(_) => invalid += 1,
            }
        }
        (reasoning, invalid)
    }
}

/// One entry of the improvement analysis document.
///
/// The analysis is generated upstream, so values are kept as found and only
/// interpreted during the merge. A missing or `null` value resolves to its
/// default; a value of the wrong type or an unrecognized label is an error
/// the merge reports before falling back to the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImprovementAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improvement_potential: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satellite: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digital_earth_sweden: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<Value>,
}

impl ImprovementAnalysis {
    /// Parsed improvement potential, `Ok(None)` when the field is absent.
    pub fn parsed_potential(&self) -> Result<Option<ImprovementPotential>, SymphonyError> {
        match &self.improvement_potential {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(label)) => label.parse().map(Some),
            Some(other) => Err(SymphonyError::UnknownImprovementPotential(other.to_string())),
        }
    }

    /// Parsed difficulty, `Ok(None)` when the field is absent.
    pub fn parsed_difficulty(&self) -> Result<Option<Difficulty>, SymphonyError> {
        match &self.difficulty {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(label)) => label.parse().map(Some),
            Some(other) => Err(SymphonyError::UnknownDifficulty(other.to_string())),
        }
    }

    pub fn parsed_satellite(&self) -> Result<Option<bool>, SymphonyError> {
        parse_flag("satellite", self.satellite.as_ref())
    }

    pub fn parsed_digital_earth_sweden(&self) -> Result<Option<bool>, SymphonyError> {
        parse_flag("digital_earth_sweden", self.digital_earth_sweden.as_ref())
    }

    /// Reasoning with every justification present, plus the count of
    /// fields that were not strings.
    pub fn resolved_reasoning(&self) -> (ImprovementReasoning, usize) {
        match &self.reasoning {
            Some(value) => ImprovementReasoning::from_value(value),
            None => (ImprovementReasoning::default(), 0),
        }
    }
}

fn parse_flag(field: &'static str, value: Option<&Value>) -> Result<Option<bool>, SymphonyError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(*flag)),
        Some(other) => Err(SymphonyError::InvalidFlag {
            field,
            value: other.to_string(),
        }),
    }
}

/// The improvement analysis file: `{ "layer_analyses": { <layer>: {...} } }`.
///
/// Other top-level keys (run metadata written by the analyzer) are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImprovementAnalysisDocument {
    #[serde(default)]
    pub layer_analyses: KeyedTable<ImprovementAnalysis>,
}
