//! Layer availability aggregation.
//!
//! A layer's data availability index is the mean of the availability
//! indexes of its matched parameters. A parameter that is missing from the
//! reference table, or whose stored index is unknown, contributes 0 rather
//! than being left out: layers whose recommended parameters have no tracked
//! data are scored down instead of being inflated.

use serde::Serialize;
use tracing::{debug, info, warn};

use symphony_common::{
    round3, AvailabilityDocument, AvailabilityMetadata, AvailabilityStatistics, KeyedTable,
    LayerAvailability, ParameterDetail, ParameterRef,
};

use crate::sources::{ParameterMatches, ParameterTable};

pub const DOCUMENT_DESCRIPTION: &str =
    "Data availability index for Symphony layers based on P02 parameter availability";
pub const CALCULATION_METHOD: &str =
    "Average of parameter availability indexes for each layer (None values treated as 0)";

/// How a parameter code resolved against the reference table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// The table holds a numeric index.
    Indexed(f64),
    /// The code is known but its index is null or a sentinel.
    Unknown,
    /// The code is not in the table.
    Missing,
}

impl Resolution {
    /// Value used in the layer mean.
    pub fn value(&self) -> f64 {
        match self {
            Resolution::Indexed(v) => *v,
            Resolution::Unknown | Resolution::Missing => 0.0,
        }
    }
}

pub fn resolve_parameter(code: &str, table: &ParameterTable) -> Resolution {
    match table.get(code) {
        Some(entry) => match entry.parameter_availability_index {
            Some(index) => Resolution::Indexed(index),
            None => Resolution::Unknown,
        },
        None => Resolution::Missing,
    }
}

/// Compute one layer's availability from its ordered parameter list.
///
/// Duplicate codes are kept and weight the mean. An empty list yields
/// index 0.0 with no details.
pub fn compute_layer_availability(
    layer_name: &str,
    parameters: &[ParameterRef],
    table: &ParameterTable,
) -> LayerAvailability {
    if parameters.is_empty() {
        debug!(layer = %layer_name, "Layer has no matched parameters");
        return LayerAvailability::empty();
    }

    let parameter_details: Vec<ParameterDetail> = parameters
        .iter()
        .map(|param| ParameterDetail {
            code: param.code.clone(),
            label: param.label_or_unknown().to_string(),
            availability_index: resolve_parameter(&param.code, table).value(),
        })
        .collect();

    let total: f64 = parameter_details.iter().map(|d| d.availability_index).sum();
    let mean = total / parameter_details.len() as f64;

    LayerAvailability {
        data_availability_index: round3(mean),
        parameter_count: parameters.len(),
        parameter_details,
    }
}

/// Lookup outcomes collected while aggregating every layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregationReport {
    pub layers: usize,
    pub total_parameters: usize,
    /// `(layer, code)` pairs whose code is absent from the reference table.
    pub missing_codes: Vec<(String, String)>,
    /// References whose code is known but whose index is unknown.
    pub unknown_indexes: usize,
    pub layers_without_parameters: usize,
}

/// Aggregates layer availability against one parameter table.
pub struct AvailabilityAggregator<'a> {
    table: &'a ParameterTable,
}

impl<'a> AvailabilityAggregator<'a> {
    pub fn new(table: &'a ParameterTable) -> Self {
        Self { table }
    }

    pub fn compute(&self, layer_name: &str, parameters: &[ParameterRef]) -> LayerAvailability {
        compute_layer_availability(layer_name, parameters, self.table)
    }

    /// Score every layer of the match table, in match-table order.
    pub fn aggregate_all(&self, matches: &ParameterMatches) -> (AvailabilityDocument, AggregationReport) {
        let mut report = AggregationReport::default();
        let mut layer_availability = KeyedTable::new();

        for (layer_name, parameters) in matches.iter() {
            for param in parameters {
                match resolve_parameter(&param.code, self.table) {
                    Resolution::Missing => {
                        warn!(
                            layer = %layer_name,
                            code = %param.code,
                            "Matched parameter not found in availability table, counting as 0"
                        );
                        report
                            .missing_codes
                            .push((layer_name.to_string(), param.code.clone()));
                    }
                    Resolution::Unknown => report.unknown_indexes += 1,
                    Resolution::Indexed(_) => {}
                }
            }
            if parameters.is_empty() {
                report.layers_without_parameters += 1;
            }

            let availability = self.compute(layer_name, parameters);
            debug!(
                layer = %layer_name,
                parameters = availability.parameter_count,
                index = availability.data_availability_index,
                "Computed layer availability"
            );
            report.total_parameters += availability.parameter_count;
            layer_availability.insert(layer_name, availability);
        }
        report.layers = layer_availability.len();

        let indexes: Vec<f64> = layer_availability
            .values()
            .map(|a: &LayerAvailability| a.data_availability_index)
            .collect();
        let overall_statistics = AvailabilityStatistics::from_values(&indexes);

        info!(
            layers = report.layers,
            parameters = report.total_parameters,
            missing_codes = report.missing_codes.len(),
            unknown_indexes = report.unknown_indexes,
            mean = overall_statistics.mean,
            "Layer availability aggregated"
        );

        let document = AvailabilityDocument {
            metadata: AvailabilityMetadata {
                description: DOCUMENT_DESCRIPTION.to_string(),
                calculation_method: CALCULATION_METHOD.to_string(),
                total_layers: report.layers,
                total_parameters: report.total_parameters,
                overall_statistics,
            },
            layer_availability,
        };
        (document, report)
    }
}
