//! Layer availability scores and the availability-by-layer document.

use serde::{Deserialize, Serialize};

use crate::{KeyedTable, ParameterDetail};

/// Round to 3 decimal places, the precision of every published index.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Availability of one layer, averaged over its matched parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerAvailability {
    #[serde(default)]
    pub data_availability_index: f64,
    #[serde(default)]
    pub parameter_count: usize,
    #[serde(default)]
    pub parameter_details: Vec<ParameterDetail>,
}

impl LayerAvailability {
    /// Score of a layer without matched parameters.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Descriptive statistics over a set of availability indexes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilityStatistics {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
}

impl AvailabilityStatistics {
    /// Compute statistics, each rounded to 3 decimals.
    ///
    /// `std_dev` is the sample standard deviation and is 0 for fewer than
    /// two values. An empty input yields all zeros.
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        let std_dev = if values.len() > 1 {
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            variance.sqrt()
        } else {
            0.0
        };

        Self {
            mean: round3(mean),
            median: round3(median),
            min: round3(sorted[0]),
            max: round3(sorted[sorted.len() - 1]),
            std_dev: round3(std_dev),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilityMetadata {
    pub description: String,
    pub calculation_method: String,
    pub total_layers: usize,
    pub total_parameters: usize,
    pub overall_statistics: AvailabilityStatistics,
}

/// The availability-by-layer file written by the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityDocument {
    #[serde(default)]
    pub metadata: AvailabilityMetadata,
    #[serde(default)]
    pub layer_availability: KeyedTable<LayerAvailability>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round3() {
        assert_eq!(round3(33.33333), 33.333);
        assert_eq!(round3(66.6666), 66.667);
        assert_eq!(round3(0.0), 0.0);
    }

    #[test]
    fn test_statistics_odd_count() {
        let stats = AvailabilityStatistics::from_values(&[10.0, 50.0, 30.0]);
        assert_eq!(stats.mean, 30.0);
        assert_eq!(stats.median, 30.0);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 50.0);
        assert_eq!(stats.std_dev, 20.0);
    }

    #[test]
    fn test_statistics_even_count_median() {
        let stats = AvailabilityStatistics::from_values(&[0.0, 10.0, 20.0, 40.0]);
        assert_eq!(stats.median, 15.0);
        assert_eq!(stats.mean, 17.5);
    }

    #[test]
    fn test_statistics_edge_cases() {
        assert_eq!(AvailabilityStatistics::from_values(&[]), AvailabilityStatistics::default());
        let single = AvailabilityStatistics::from_values(&[42.0]);
        assert_eq!(single.std_dev, 0.0);
        assert_eq!(single.median, 42.0);
    }

    #[test]
    fn test_document_tolerates_missing_metadata() {
        let doc: AvailabilityDocument = serde_json::from_str(
            r#"{"layer_availability": {"Cod": {"data_availability_index": 12.5}}}"#,
        )
        .unwrap();
        let cod = doc.layer_availability.get("Cod").unwrap();
        assert_eq!(cod.data_availability_index, 12.5);
        assert_eq!(cod.parameter_count, 0);
        assert!(cod.parameter_details.is_empty());
    }
}
