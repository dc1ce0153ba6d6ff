//! Cross-cutting statistics over the merged records.
//!
//! Purely observational: nothing in the pipeline reads them back.

use serde::{Deserialize, Serialize};

use symphony_common::{AvailabilityStatistics, Difficulty, ImprovementPotential, MergedLayerRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprovementCounts {
    pub small: usize,
    pub medium: usize,
    pub large: usize,
}

impl ImprovementCounts {
    fn add(&mut self, value: ImprovementPotential) {
        match value {
            ImprovementPotential::Small => self.small += 1,
            ImprovementPotential::Medium => self.medium += 1,
            ImprovementPotential::Large => self.large += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl DifficultyCounts {
    fn add(&mut self, value: Difficulty) {
        match value {
            Difficulty::Low => self.low += 1,
            Difficulty::Medium => self.medium += 1,
            Difficulty::High => self.high += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatelliteCounts {
    #[serde(rename = "true")]
    pub yes: usize,
    #[serde(rename = "false")]
    pub no: usize,
}

/// Contents of the summary statistics artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub total_layers: usize,
    pub improvement_potential: ImprovementCounts,
    pub difficulty: DifficultyCounts,
    pub satellite: SatelliteCounts,
    pub total_parameter_matches: usize,
    /// Statistics over layers with tracked data (index > 0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_availability: Option<AvailabilityStatistics>,
}

impl SummaryStatistics {
    pub fn from_records(records: &[MergedLayerRecord]) -> Self {
        let mut summary = SummaryStatistics {
            total_layers: records.len(),
            ..Default::default()
        };

        let mut tracked = Vec::new();
        for record in records {
            summary.improvement_potential.add(record.improvement_potential);
            summary.difficulty.add(record.difficulty);
            if record.satellite {
                summary.satellite.yes += 1;
            } else {
                summary.satellite.no += 1;
            }
            summary.total_parameter_matches += record.p02_parameters.len();
            if record.data_availability_index > 0.0 {
                tracked.push(record.data_availability_index);
            }
        }

        if !tracked.is_empty() {
            summary.data_availability = Some(AvailabilityStatistics::from_values(&tracked));
        }
        summary
    }
}
