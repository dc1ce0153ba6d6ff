//! Merger configuration.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use symphony_pipeline::{CategoryFilter, FilesConfig, MergeConfig, PathsConfig, PipelineConfig};

use crate::config_loader;

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `json` or `pretty`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

/// Top-level merger configuration (merger.yaml).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MergerConfig {
    pub paths: PathsConfig,
    pub files: FilesConfig,
    pub merge: MergeConfig,
    pub logging: LoggingConfig,
}

/// Command line values that take precedence over the file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source_dir: Option<PathBuf>,
    pub intermediate_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub category_filter: Option<CategoryFilter>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

impl MergerConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        config_loader::load_merger_config(path)
    }

    /// Built-in defaults with `SYMPHONY_*` environment overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(dir) = env::var("SYMPHONY_SOURCE_DIR") {
            config.paths.source_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("SYMPHONY_INTERMEDIATE_DIR") {
            config.paths.intermediate_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("SYMPHONY_OUTPUT_DIR") {
            config.paths.output_dir = PathBuf::from(dir);
        }
        if let Ok(categories) = env::var("SYMPHONY_CATEGORIES") {
            config.merge.category_filter = parse_category_filter(&categories)?;
        }
        if let Ok(level) = env::var("SYMPHONY_LOG_LEVEL") {
            config.logging.level = level.to_lowercase();
        }
        if let Ok(format) = env::var("SYMPHONY_LOG_FORMAT") {
            config.logging.format = format.to_lowercase();
        }

        config_loader::validate_merger_config(&config)?;
        Ok(config)
    }

    /// Load from the file if given, else from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_yaml(path),
            None => Self::from_env(),
        }
    }

    /// Apply command line overrides and re-validate.
    pub fn with_overrides(mut self, overrides: Overrides) -> Result<Self> {
        if let Some(dir) = overrides.source_dir {
            self.paths.source_dir = dir;
        }
        if let Some(dir) = overrides.intermediate_dir {
            self.paths.intermediate_dir = dir;
        }
        if let Some(dir) = overrides.output_dir {
            self.paths.output_dir = dir;
        }
        if let Some(filter) = overrides.category_filter {
            self.merge.category_filter = filter;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level.to_lowercase();
        }
        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }

        config_loader::validate_merger_config(&self)?;
        Ok(self)
    }

    /// The settings handed to the pipeline.
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            paths: self.paths.clone(),
            files: self.files.clone(),
            merge: self.merge.clone(),
        }
    }
}

/// Parse a category strategy name: `all` or `ecosystem-pressure`.
pub fn parse_category_filter(value: &str) -> Result<CategoryFilter> {
    match value.trim().to_lowercase().replace('_', "-").as_str() {
        "all" => Ok(CategoryFilter::All),
        "ecosystem-pressure" => Ok(CategoryFilter::ecosystem_and_pressure()),
        other => anyhow::bail!(
            "Unknown category strategy: {}. Must be one of: all, ecosystem-pressure",
            other
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category_filter() {
        assert_eq!(parse_category_filter("all").unwrap(), CategoryFilter::All);
        assert_eq!(
            parse_category_filter("Ecosystem_Pressure").unwrap(),
            CategoryFilter::ecosystem_and_pressure()
        );
        assert!(parse_category_filter("everything").is_err());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = MergerConfig::default()
            .with_overrides(Overrides {
                output_dir: Some(PathBuf::from("/srv/www/data")),
                category_filter: Some(CategoryFilter::All),
                log_level: Some("DEBUG".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.paths.output_dir, PathBuf::from("/srv/www/data"));
        assert_eq!(config.paths.source_dir, PathBuf::from("source-data"));
        assert_eq!(config.merge.category_filter, CategoryFilter::All);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_invalid_override_rejected() {
        let result = MergerConfig::default().with_overrides(Overrides {
            log_format: Some("xml".to_string()),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_pipeline_view() {
        let config = MergerConfig::default();
        let pipeline = config.pipeline();
        assert_eq!(pipeline.files.summary, "summary_statistics.json");
        assert_eq!(pipeline.merge.name_field, "Name");
    }
}
