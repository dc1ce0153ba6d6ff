//! Symphony layer merger.
//!
//! Computes per-layer data availability, merges the upstream analysis
//! documents into the published layer file and validates the published
//! artifacts.

mod config;
mod config_loader;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use symphony_pipeline::{
    AggregationReport, CategoryFilter, MergeReport, PipelineContext, RunReport,
    SummaryStatistics, ValidationSummary,
};

use config::{LoggingConfig, MergerConfig, Overrides};

#[derive(Parser, Debug)]
#[command(name = "symphony-merger")]
#[command(about = "Builds the published Symphony layer data files", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Configuration file path (defaults and SYMPHONY_* variables if absent)
    #[arg(short, long, global = true, env = "SYMPHONY_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the hand-maintained inputs
    #[arg(long, global = true)]
    source_dir: Option<PathBuf>,

    /// Directory holding generated inputs and intermediate results
    #[arg(long, global = true)]
    intermediate_dir: Option<PathBuf>,

    /// Directory the published artifacts are written to
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Which layer categories to publish
    #[arg(long, global = true, value_enum)]
    categories: Option<Categories>,

    /// Report format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log format
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// Compute layer availability from the parameter matches
    Availability,
    /// Merge the inputs on disk, publish and validate
    Merge,
    /// Validate the published artifacts only
    Validate,
    /// Availability, merge, publish and validate in one pass
    Run,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Categories {
    All,
    EcosystemPressure,
}

impl From<Categories> for CategoryFilter {
    fn from(value: Categories) -> Self {
        match value {
            Categories::All => CategoryFilter::All,
            Categories::EcosystemPressure => CategoryFilter::ecosystem_and_pressure(),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        }
    }
}

impl GlobalArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            source_dir: self.source_dir.clone(),
            intermediate_dir: self.intermediate_dir.clone(),
            output_dir: self.output_dir.clone(),
            category_filter: self.categories.map(CategoryFilter::from),
            log_level: self.log_level.clone(),
            log_format: self.log_format.map(|f| f.as_str().to_string()),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Configuration comes before tracing: it decides the log level.
    let config = match MergerConfig::load(cli.global.config.as_deref())
        .and_then(|config| config.with_overrides(cli.global.overrides()))
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(&config.logging) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(cli.command, cli.global.format, &config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            warn!("Published artifacts failed validation");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "Symphony merger failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let level = match logging.level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if logging.format == "pretty" {
        tracing::subscriber::set_global_default(builder.pretty().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    }
    Ok(())
}

/// Reports of a complete run, for JSON output.
#[derive(Serialize)]
struct RunJson<'a> {
    availability: &'a AggregationReport,
    merge: &'a MergeReport,
    summary: &'a SummaryStatistics,
    validation: &'a ValidationSummary,
}

/// Execute one command. Returns whether the published artifacts are valid.
fn run(command: Commands, format: OutputFormat, config: &MergerConfig) -> Result<bool> {
    let pipeline = config.pipeline();
    info!(
        command = ?command,
        source_dir = %pipeline.paths.source_dir.display(),
        output_dir = %pipeline.paths.output_dir.display(),
        "Starting Symphony merger"
    );
    let context = PipelineContext::new(pipeline).context("Invalid pipeline configuration")?;

    match command {
        Commands::Availability => {
            let run = context
                .compute_availability()
                .context("Layer availability computation failed")?;
            emit(format, &run.report, RunReport::format_aggregation)?;
            Ok(true)
        }
        Commands::Merge => {
            let merge = context.merge_from_disk().context("Merge failed")?;
            let validation = context.validate_outputs();
            emit(format, &merge.report, RunReport::format_merge)?;
            emit(format, &merge.summary, RunReport::format_summary)?;
            emit(format, &validation, RunReport::format_validation)?;
            Ok(validation.all_valid)
        }
        Commands::Validate => {
            let validation = context.validate_outputs();
            emit(format, &validation, RunReport::format_validation)?;
            Ok(validation.all_valid)
        }
        Commands::Run => {
            let outcome = context.run().context("Pipeline run failed")?;
            match format {
                OutputFormat::Json => {
                    let json = RunReport::format_json(&RunJson {
                        availability: &outcome.availability,
                        merge: &outcome.merge.report,
                        summary: &outcome.merge.summary,
                        validation: &outcome.validation,
                    })?;
                    println!("{json}");
                }
                OutputFormat::Table => {
                    println!("{}", RunReport::format_aggregation(&outcome.availability));
                    println!("{}", RunReport::format_merge(&outcome.merge.report));
                    println!("{}", RunReport::format_summary(&outcome.merge.summary));
                    println!("{}", RunReport::format_validation(&outcome.validation));
                }
            }
            Ok(outcome.validation.all_valid)
        }
    }
}

fn emit<T: Serialize>(format: OutputFormat, value: &T, table: fn(&T) -> String) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", table(value)),
        OutputFormat::Json => println!("{}", RunReport::format_json(value)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{input_tree, layout};

    fn config_for(root: &std::path::Path) -> MergerConfig {
        MergerConfig::default()
            .with_overrides(Overrides {
                source_dir: Some(root.join(layout::SOURCE_DIR)),
                intermediate_dir: Some(root.join(layout::INTERMEDIATE_DIR)),
                output_dir: Some(root.join(layout::OUTPUT_DIR)),
                ..Default::default()
            })
            .unwrap()
    }

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "symphony-merger",
            "run",
            "--categories",
            "all",
            "--format",
            "json",
            "--output-dir",
            "/tmp/out",
            "--log-format",
            "pretty",
        ])
        .unwrap();
        assert_eq!(cli.command, Commands::Run);
        assert_eq!(cli.global.categories, Some(Categories::All));
        assert_eq!(cli.global.format, OutputFormat::Json);
        assert_eq!(cli.global.output_dir, Some(PathBuf::from("/tmp/out")));

        let overrides = cli.global.overrides();
        assert_eq!(overrides.category_filter, Some(CategoryFilter::All));
        assert_eq!(overrides.log_format.as_deref(), Some("pretty"));
    }

    #[test]
    fn test_cli_rejects_unknown_strategy() {
        let result = Cli::try_parse_from(["symphony-merger", "merge", "--categories", "sources"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_categories_flag_values() {
        let cli =
            Cli::try_parse_from(["symphony-merger", "validate", "--categories", "ecosystem-pressure"])
                .unwrap();
        assert_eq!(cli.global.categories, Some(Categories::EcosystemPressure));
        assert_eq!(cli.global.format, OutputFormat::Table);
    }

    #[test]
    fn test_run_command_over_fixture_tree() {
        let tree = input_tree();
        let config = config_for(tree.path());
        assert!(run(Commands::Run, OutputFormat::Json, &config).unwrap());
        assert!(tree.path().join(layout::MERGED_LAYERS).is_file());
    }

    #[test]
    fn test_validate_command_reports_invalid_outputs() {
        let tree = input_tree();
        let config = config_for(tree.path());
        assert!(!run(Commands::Validate, OutputFormat::Table, &config).unwrap());
    }

    #[test]
    fn test_merge_command_needs_availability_file() {
        let tree = input_tree();
        let config = config_for(tree.path());
        assert!(run(Commands::Merge, OutputFormat::Table, &config).is_err());

        assert!(run(Commands::Availability, OutputFormat::Table, &config).unwrap());
        assert!(run(Commands::Merge, OutputFormat::Table, &config).unwrap());
    }
}
