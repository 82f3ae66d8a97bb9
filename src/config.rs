//! Variant configuration.
//!
//! Handles loading, validating, and merging `variants.toml`. Stock defaults
//! are the base layer; a user file only needs the keys it wants to change.
//! Command-line flags override the loaded values afterwards (see `main.rs`).
//!
//! The configuration is an explicit value passed into generation and markup
//! functions. Nothing in the crate reads process-wide settings.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! widths = [400, 800, 1200, 1600]  # Variant widths in pixels, in srcset order
//! format = "webp"                  # Output format token (also the file extension)
//! quality = 85                     # Encoder quality (1-100)
//! extensions = ["png", "jpg", "jpeg"]  # Source files picked up by directory walks
//!
//! [converter]
//! command = "convert"              # Program name on PATH, or a path to it
//! args = ["{source}", "-resize", "{width}x", "-quality", "{quality}", "{output}"]
//! timeout_secs = 120               # Per-invocation timeout
//!
//! [processing]
//! max_processes = 4                # Max parallel conversions (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::Quality;
use crate::types::Format;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default config file name looked up by the CLI.
pub const CONFIG_FILENAME: &str = "variants.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VariantConfig {
    /// Default variant widths, in the order they appear in `srcset`.
    pub widths: Vec<u32>,
    /// Default output format.
    pub format: Format,
    /// Default encoder quality (1-100).
    pub quality: u32,
    /// Source extensions collected when walking a directory (case-insensitive).
    pub extensions: Vec<String>,
    /// External conversion command.
    pub converter: ConverterConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for VariantConfig {
    fn default() -> Self {
        Self {
            widths: vec![400, 800, 1200, 1600],
            format: Format::default(),
            quality: 85,
            extensions: vec!["png".into(), "jpg".into(), "jpeg".into()],
            converter: ConverterConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl VariantConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.widths.is_empty() {
            return Err(ConfigError::Validation("widths must not be empty".into()));
        }
        if self.widths.contains(&0) {
            return Err(ConfigError::Validation(
                "widths must be positive integers".into(),
            ));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::Validation("quality must be 1-100".into()));
        }
        if self.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "extensions must not be empty".into(),
            ));
        }
        self.converter.validate()
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }
}

/// How the external converter is invoked.
///
/// `args` is a template; each element may contain the placeholders
/// `{source}`, `{output}`, `{width}`, `{format}` and `{quality}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterConfig {
    pub command: String,
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            command: "convert".to_string(),
            args: ["{source}", "-resize", "{width}x", "-quality", "{quality}", "{output}"]
                .into_iter()
                .map(String::from)
                .collect(),
            timeout_secs: 120,
        }
    }
}

impl ConverterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command.trim().is_empty() {
            return Err(ConfigError::Validation(
                "converter.command must not be empty".into(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "converter.timeout_secs must be greater than 0".into(),
            ));
        }
        for required in ["{source}", "{output}"] {
            if !self.args.iter().any(|arg| arg.contains(required)) {
                return Err(ConfigError::Validation(format!(
                    "converter.args must reference {required}"
                )));
            }
        }
        Ok(())
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel converter invocations.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least 1
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(VariantConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<VariantConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: VariantConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is missing.
pub fn load_config(path: &Path) -> Result<VariantConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    let config = resolve_config(base, overlay)?;
    tracing::debug!(path = %path.display(), ?config, "loaded config");
    Ok(config)
}

/// Returns a fully-commented stock `variants.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# responsive-variants configuration
# =================================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Variant widths in pixels. Also the order of entries in generated srcsets.
widths = [400, 800, 1200, 1600]

# Output format token; doubles as the variant file extension.
# One of: webp, avif, png, jpg, jpeg, gif, jxl, tiff, heic
format = "webp"

# Encoder quality (1 = worst, 100 = best).
quality = 85

# Source file extensions picked up when generating for a directory.
extensions = ["png", "jpg", "jpeg"]

# ---------------------------------------------------------------------------
# External converter
# ---------------------------------------------------------------------------
[converter]
# Program name (looked up on PATH) or a path to the executable.
command = "convert"

# Argument template. Placeholders: {source} {output} {width} {format} {quality}
# The output path already carries the format as its extension.
args = ["{source}", "-resize", "{width}x", "-quality", "{quality}", "{output}"]

# Seconds before a single conversion is killed and reported as failed.
timeout_secs = 120

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel conversions.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
