//! Configuration loader for the Symphony merger
//!
//! Loads and validates the YAML run configuration (merger.yaml).
//!
//! Supports environment variable substitution using ${VAR} syntax.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::config::MergerConfig;

pub const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
pub const VALID_LOG_FORMATS: [&str; 2] = ["json", "pretty"];

// ============================================================================
// Loading Functions
// ============================================================================

/// Load and parse merger.yaml with environment variable substitution
pub fn load_merger_config<P: AsRef<Path>>(path: P) -> Result<MergerConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read merger config from {:?}", path.as_ref()))?;

    let config = parse_merger_config(&content)
        .with_context(|| format!("Invalid merger config {:?}", path.as_ref()))?;

    Ok(config)
}

/// Parse merger config YAML text. Absent sections take their defaults.
pub fn parse_merger_config(content: &str) -> Result<MergerConfig> {
    let expanded = expand_env_vars(content)?;

    let config: MergerConfig = if expanded.trim().is_empty() {
        MergerConfig::default()
    } else {
        serde_yaml::from_str(&expanded).with_context(|| "Failed to parse merger config YAML")?
    };

    validate_merger_config(&config)?;

    Ok(config)
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand environment variables in YAML content
/// Supports ${VAR} and ${VAR:-default} syntax
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::new();
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut var_expr = String::new();
            let mut brace_count = 1;

            while brace_count > 0 {
                match chars.next() {
                    Some('{') => {
                        brace_count += 1;
                        var_expr.push('{');
                    }
                    Some('}') => {
                        brace_count -= 1;
                        if brace_count > 0 {
                            var_expr.push('}');
                        }
                    }
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }

            let value = resolve_var_expr(&var_expr)?;
            result.push_str(&value);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Resolve variable expression (supports VAR and VAR:-default syntax)
fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}

// ============================================================================
// Validation
// ============================================================================

pub fn validate_merger_config(config: &MergerConfig) -> Result<()> {
    anyhow::ensure!(
        VALID_LOG_LEVELS.contains(&config.logging.level.as_str()),
        "Invalid log level: {}. Must be one of: {:?}",
        config.logging.level,
        VALID_LOG_LEVELS
    );

    anyhow::ensure!(
        VALID_LOG_FORMATS.contains(&config.logging.format.as_str()),
        "Invalid log format: {}. Must be one of: {:?}",
        config.logging.format,
        VALID_LOG_FORMATS
    );

    config
        .pipeline()
        .validate()
        .context("Invalid pipeline settings")?;

    Ok(())
}
