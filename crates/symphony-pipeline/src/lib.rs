//! Symphony layer pipeline.
//!
//! Turns the upstream analysis documents into the files the Symphony layer
//! explorer reads:
//!
//! - per-layer data availability from matched parameters
//! - one merged record per valid layer, enriched with improvement analysis,
//!   parameter matches and availability
//! - pass-through publication of the parameter table and catalogue
//! - structural validation and summary statistics of the outputs
//!
//! The library never installs a tracing subscriber; the binary does.

pub mod availability;
pub mod config;
pub mod context;
pub mod error;
pub mod merge;
pub mod publish;
pub mod report;
pub mod sources;
pub mod summary;
pub mod validate;

// Re-exports
pub use availability::{
    compute_layer_availability, resolve_parameter, AggregationReport, AvailabilityAggregator,
    Resolution,
};
pub use config::{
    CategoryFilter, EnrichmentDefaults, FilesConfig, KeyMapping, MergeConfig, PathsConfig,
    PipelineConfig, DEFAULT_KEY_MAPPING, ENRICHMENT_DEFAULTS,
};
pub use context::{AvailabilityRun, MergeRun, PipelineContext, RunOutcome};
pub use error::{InputRole, PipelineError, Result};
pub use merge::{MergeEngine, MergeOutcome, MergeReport, SkipReason};
pub use report::RunReport;
pub use sources::{MergeInputs, ParameterMatches, ParameterTable};
pub use summary::SummaryStatistics;
pub use validate::{
    expected_artifacts, validate, ArtifactStatus, ContainerKind, ExpectedArtifact,
    ValidationSummary,
};
