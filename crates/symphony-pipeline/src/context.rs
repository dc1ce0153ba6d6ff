//! One pipeline run over a fixed working directory.

use tracing::info;

use symphony_common::AvailabilityDocument;

use crate::availability::{AggregationReport, AvailabilityAggregator};
use crate::config::PipelineConfig;
use crate::error::{InputRole, Result};
use crate::merge::{MergeEngine, MergeReport};
use crate::publish::{publish_all, write_json, PassThrough};
use crate::sources::{load_parameter_matches, load_parameter_table, MergeInputs};
use crate::summary::SummaryStatistics;
use crate::validate::{expected_artifacts, validate, ValidationSummary};

/// Result of the availability stage.
#[derive(Debug, Clone)]
pub struct AvailabilityRun {
    pub document: AvailabilityDocument,
    pub report: AggregationReport,
}

/// Result of the merge stage.
#[derive(Debug, Clone)]
pub struct MergeRun {
    pub report: MergeReport,
    pub summary: SummaryStatistics,
    pub published: usize,
}

/// Result of a complete run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub availability: AggregationReport,
    pub merge: MergeRun,
    pub validation: ValidationSummary,
}

/// Explicit state handed between the stages of a run.
pub struct PipelineContext {
    config: PipelineConfig,
}

impl PipelineContext {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Score every matched layer and write the availability document.
    pub fn compute_availability(&self) -> Result<AvailabilityRun> {
        let table = load_parameter_table(&self.config.input_path(InputRole::ParameterTable))?;
        let matches = load_parameter_matches(&self.config.input_path(InputRole::ParameterMatches))?;

        let (document, report) = AvailabilityAggregator::new(&table).aggregate_all(&matches);
        write_json(&self.config.input_path(InputRole::LayerAvailability), &document)?;

        Ok(AvailabilityRun { document, report })
    }

    /// Merge using the availability document already on disk.
    pub fn merge_from_disk(&self) -> Result<MergeRun> {
        let inputs = MergeInputs::load(&self.config)?;
        self.merge_with(&inputs)
    }

    /// Merge, write the layer records, publish pass-through artifacts and
    /// write the summary.
    pub fn merge_with(&self, inputs: &MergeInputs) -> Result<MergeRun> {
        let outcome = MergeEngine::new(&self.config.merge).merge_inputs(inputs);
        write_json(&self.config.merged_layers_path(), &outcome.records)?;

        let published = publish_all(&self.pass_through())?;

        let summary = SummaryStatistics::from_records(&outcome.records);
        write_json(&self.config.summary_path(), &summary)?;

        Ok(MergeRun {
            report: outcome.report,
            summary,
            published,
        })
    }

    pub fn validate_outputs(&self) -> ValidationSummary {
        validate(&expected_artifacts(&self.config))
    }

    /// Availability, merge, publish and validate in one pass.
    ///
    /// The availability document is handed to the merge in memory as well as
    /// written to disk.
    pub fn run(&self) -> Result<RunOutcome> {
        let availability = self.compute_availability()?;
        let inputs = MergeInputs::load_with_availability(
            &self.config,
            availability.document.layer_availability,
        )?;
        let merge = self.merge_with(&inputs)?;
        let validation = self.validate_outputs();

        info!(
            layers = merge.summary.total_layers,
            published = merge.published,
            all_valid = validation.all_valid,
            "Pipeline run complete"
        );
        Ok(RunOutcome {
            availability: availability.report,
            merge,
            validation,
        })
    }

    fn pass_through(&self) -> Vec<PassThrough> {
        let mut artifacts = vec![PassThrough {
            source: self.config.input_path(InputRole::ParameterTable),
            destination: self.config.output_path(&self.config.files.parameter_table),
        }];
        if let (Some(source), Some(name)) =
            (self.config.catalogue_source(), self.config.files.catalogue.as_ref())
        {
            artifacts.push(PassThrough {
                source,
                destination: self.config.output_path(name),
            });
        }
        artifacts
    }
}
