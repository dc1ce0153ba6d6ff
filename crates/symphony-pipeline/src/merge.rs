//! Dataset merge engine.
//!
//! Joins raw layer metadata with the improvement analysis, parameter matches
//! and layer availability into one record per valid layer. A lookup miss in
//! any of the joined documents resolves to [`ENRICHMENT_DEFAULTS`], so every
//! record carries every enrichment field.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

use symphony_common::{
    Difficulty, ImprovementAnalysis, ImprovementPotential, ImprovementReasoning, KeyedTable,
    LayerAvailability, MergedLayerRecord,
};

use crate::config::{KeyMapping, MergeConfig, ENRICHMENT_DEFAULTS};
use crate::sources::{MergeInputs, ParameterMatches};

/// Why a raw metadata row did not become a layer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NotARecord,
    MissingName,
    PlaceholderName,
    SchemaRow,
    NameTooLong,
    CategoryExcluded,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NotARecord => "not a key-value record",
            SkipReason::MissingName => "missing name",
            SkipReason::PlaceholderName => "placeholder name",
            SkipReason::SchemaRow => "schema row",
            SkipReason::NameTooLong => "name too long",
            SkipReason::CategoryExcluded => "category excluded",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts collected during one merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergeReport {
    pub processed_count: usize,
    pub skipped_count: usize,
    pub skipped_by_reason: BTreeMap<SkipReason, usize>,
    /// Original keys kept under their own name, with occurrence counts.
    pub unmapped_keys: BTreeMap<String, usize>,
    /// Raw keys replaced by an enrichment field of the same name.
    pub shadowed_keys: BTreeMap<String, usize>,
    pub missing_improvement: usize,
    pub missing_matches: usize,
    pub missing_availability: usize,
    /// Analysis values of the wrong type or with an unrecognized label.
    pub invalid_values: usize,
}

impl MergeReport {
    fn skip(&mut self, row: usize, reason: SkipReason, name: Option<&str>) {
        self.skipped_count += 1;
        *self.skipped_by_reason.entry(reason).or_insert(0) += 1;
        match name {
            Some(name) => debug!(row, reason = %reason, name = %truncate(name, 60), "Skipped metadata row"),
            None => debug!(row, reason = %reason, "Skipped metadata row"),
        }
    }

    pub fn skipped(&self, reason: SkipReason) -> usize {
        self.skipped_by_reason.get(&reason).copied().unwrap_or(0)
    }
}

/// Records in input order plus the run counts.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub records: Vec<MergedLayerRecord>,
    pub report: MergeReport,
}

/// Resolved improvement fields of one layer.
struct Improvement {
    potential: ImprovementPotential,
    difficulty: Difficulty,
    satellite: bool,
    digital_earth_sweden: bool,
    reasoning: ImprovementReasoning,
}

pub struct MergeEngine<'a> {
    config: &'a MergeConfig,
    key_mapping: KeyMapping,
}

impl<'a> MergeEngine<'a> {
    pub fn new(config: &'a MergeConfig) -> Self {
        Self {
            config,
            key_mapping: KeyMapping::with_overrides(&config.key_mapping),
        }
    }

    pub fn merge_inputs(&self, inputs: &MergeInputs) -> MergeOutcome {
        self.merge(
            &inputs.layer_metadata,
            &inputs.improvement_analyses,
            &inputs.parameter_matches,
            &inputs.layer_availability,
        )
    }

    /// Merge every valid metadata row, keeping input order.
    pub fn merge(
        &self,
        layer_metadata: &[Value],
        improvement_analyses: &KeyedTable<ImprovementAnalysis>,
        parameter_matches: &ParameterMatches,
        layer_availability: &KeyedTable<LayerAvailability>,
    ) -> MergeOutcome {
        let mut report = MergeReport::default();
        let mut records = Vec::new();

        for (row, entry) in layer_metadata.iter().enumerate() {
            let (fields, name) = match self.check_entry(entry) {
                Ok(valid) => valid,
                Err((reason, name)) => {
                    report.skip(row, reason, name);
                    continue;
                }
            };

            let category = fields.get(&self.config.category_field).and_then(Value::as_str);
            if !self.config.category_filter.admits(category) {
                report.skip(row, SkipReason::CategoryExcluded, Some(name));
                continue;
            }

            let canonical = self.rename_fields(fields, name, &mut report);
            let improvement = self.improvement(name, improvement_analyses, &mut report);

            let p02_parameters = match parameter_matches.get(name) {
                Some(params) => params.clone(),
                None => {
                    debug!(layer = %name, "No parameter matches for layer");
                    report.missing_matches += 1;
                    Vec::new()
                }
            };

            let availability = match layer_availability.get(name) {
                Some(availability) => availability.clone(),
                None => {
                    debug!(layer = %name, "No availability entry for layer, using defaults");
                    report.missing_availability += 1;
                    ENRICHMENT_DEFAULTS.availability()
                }
            };

            records.push(MergedLayerRecord {
                fields: canonical,
                improvement_potential: improvement.potential,
                difficulty: improvement.difficulty,
                satellite: improvement.satellite,
                digital_earth_sweden: improvement.digital_earth_sweden,
                improvement_reasoning: improvement.reasoning,
                p02_parameters,
                data_availability_index: availability.data_availability_index,
                parameter_count: availability.parameter_count,
                parameter_details: availability.parameter_details,
            });
            report.processed_count += 1;

            if report.processed_count % self.config.progress_interval.max(1) == 0 {
                debug!(processed = report.processed_count, "Merging layers");
            }
        }

        if !report.unmapped_keys.is_empty() {
            let keys: Vec<&str> = report.unmapped_keys.keys().map(String::as_str).collect();
            warn!(keys = ?keys, "Metadata fields without a key mapping were kept unchanged");
        }
        info!(
            processed = report.processed_count,
            skipped = report.skipped_count,
            missing_improvement = report.missing_improvement,
            missing_matches = report.missing_matches,
            missing_availability = report.missing_availability,
            "Merge complete"
        );

        MergeOutcome { records, report }
    }

    /// Validity filter: a record with a usable name.
    fn check_entry<'v>(
        &self,
        entry: &'v Value,
    ) -> Result<(&'v Map<String, Value>, &'v str), (SkipReason, Option<&'v str>)> {
        let fields = entry.as_object().ok_or((SkipReason::NotARecord, None))?;
        let name = fields
            .get(&self.config.name_field)
            .and_then(Value::as_str)
            .ok_or((SkipReason::MissingName, None))?;

        if self
            .config
            .placeholder_names
            .iter()
            .any(|placeholder| placeholder.as_str() == name.trim())
        {
            return Err((SkipReason::PlaceholderName, Some(name)));
        }
        if self
            .config
            .schema_row_prefixes
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
        {
            return Err((SkipReason::SchemaRow, Some(name)));
        }
        if name.chars().count() > self.config.max_name_length {
            return Err((SkipReason::NameTooLong, Some(name)));
        }
        Ok((fields, name))
    }

    /// Rewrite original keys to canonical keys, keeping field order.
    fn rename_fields(
        &self,
        fields: &Map<String, Value>,
        layer: &str,
        report: &mut MergeReport,
    ) -> Map<String, Value> {
        let mut canonical = Map::new();
        for (key, value) in fields {
            let target = match self.key_mapping.canonical(key) {
                Some(mapped) => mapped,
                None => {
                    let seen = report.unmapped_keys.entry(key.clone()).or_insert(0);
                    if *seen == 0 {
                        warn!(key = %key, layer = %layer, "Unmapped metadata field");
                    }
                    *seen += 1;
                    key.as_str()
                }
            };

            if MergedLayerRecord::is_enrichment_key(target) {
                warn!(key = %key, layer = %layer, "Metadata field replaced by enrichment value");
                *report.shadowed_keys.entry(key.clone()).or_insert(0) += 1;
                continue;
            }
            canonical.insert(target.to_string(), value.clone());
        }
        canonical
    }

    fn improvement(
        &self,
        layer: &str,
        analyses: &KeyedTable<ImprovementAnalysis>,
        report: &mut MergeReport,
    ) -> Improvement {
        let defaults = &ENRICHMENT_DEFAULTS;
        let Some(analysis) = analyses.get(layer) else {
            debug!(layer = %layer, "No improvement analysis for layer, using defaults");
            report.missing_improvement += 1;
            return Improvement {
                potential: defaults.improvement_potential,
                difficulty: defaults.difficulty,
                satellite: defaults.satellite,
                digital_earth_sweden: defaults.digital_earth_sweden,
                reasoning: defaults.reasoning(),
            };
        };

        let potential = match analysis.parsed_potential() {
            Ok(value) => value.unwrap_or(defaults.improvement_potential),
            Err(e) => {
                warn!(layer = %layer, error = %e, "Invalid improvement potential, using default");
                report.invalid_values += 1;
                defaults.improvement_potential
            }
        };
        let difficulty = match analysis.parsed_difficulty() {
            Ok(value) => value.unwrap_or(defaults.difficulty),
            Err(e) => {
                warn!(layer = %layer, error = %e, "Invalid difficulty, using default");
                report.invalid_values += 1;
                defaults.difficulty
            }
        };

        let satellite = match analysis.parsed_satellite() {
            Ok(value) => value.unwrap_or(defaults.satellite),
            Err(e) => {
                warn!(layer = %layer, error = %e, "Invalid satellite flag, using default");
                report.invalid_values += 1;
                defaults.satellite
            }
        };
        let digital_earth_sweden = match analysis.parsed_digital_earth_sweden() {
            Ok(value) => value.unwrap_or(defaults.digital_earth_sweden),
            Err(e) => {
                warn!(layer = %layer, error = %e, "Invalid Digital Earth Sweden flag, using default");
                report.invalid_values += 1;
                defaults.digital_earth_sweden
            }
        };

        let (reasoning, invalid_reasoning) = analysis.resolved_reasoning();
        if invalid_reasoning > 0 {
            warn!(
                layer = %layer,
                fields = invalid_reasoning,
                "Non-text reasoning values replaced with empty justifications"
            );
            report.invalid_values += invalid_reasoning;
        }

        Improvement {
            potential,
            difficulty,
            satellite,
            digital_earth_sweden,
            reasoning,
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
