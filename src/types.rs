//! Shared types used across naming, generation, markup and output.
//!
//! - [`Format`]: validated output encoding token (`webp`, `avif`, ...).
//! - [`VariantDescriptor`]: one (source, width, format) triple and its derived output path.
//! - [`GenerationRequest`]: the ordered set of variants a batch run will realize.
//! - [`Failure`] / [`FailureReason`]: per-item failures recorded in a batch summary.

use crate::naming::{self, NamingError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Format tokens the crate knows how to name and describe, with their MIME types.
const KNOWN_FORMATS: &[(&str, &str)] = &[
    ("webp", "image/webp"),
    ("avif", "image/avif"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("jxl", "image/jxl"),
    ("tiff", "image/tiff"),
    ("heic", "image/heic"),
];

/// Output encoding identifier, normalized to lowercase.
///
/// Doubles as the variant file extension, so `Format::new("AVIF")` names
/// files `*_800w.avif`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Format(String);

impl Format {
    pub fn new(token: &str) -> Result<Self, NamingError> {
        let normalized = token.trim().to_ascii_lowercase();
        if KNOWN_FORMATS.iter().any(|(name, _)| *name == normalized) {
            Ok(Self(normalized))
        } else {
            Err(NamingError::InvalidInput(format!(
                "unknown format `{token}` (expected one of: {})",
                known_format_names().join(", ")
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// MIME type for `<source type=...>`.
    pub fn mime_type(&self) -> &'static str {
        KNOWN_FORMATS
            .iter()
            .find(|(name, _)| *name == self.0)
            .map(|(_, mime)| *mime)
            .unwrap_or("application/octet-stream")
    }
}

fn known_format_names() -> Vec<&'static str> {
    KNOWN_FORMATS.iter().map(|(name, _)| *name).collect()
}

impl Default for Format {
    fn default() -> Self {
        Self("webp".to_string())
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Format {
    type Err = NamingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Format {
    type Error = NamingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Format> for String {
    fn from(format: Format) -> Self {
        format.0
    }
}

/// A single variant to realize: source image, target width and format.
///
/// The output path is derived on construction and never stored elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDescriptor {
    pub source: PathBuf,
    pub width: u32,
    pub format: Format,
    pub output: PathBuf,
}

impl VariantDescriptor {
    pub fn new(source: PathBuf, width: u32, format: Format) -> Result<Self, NamingError> {
        let output = naming::variant_file(&source, width, &format)?;
        Ok(Self {
            source,
            width,
            format,
            output,
        })
    }
}

/// Ordered variants to realize on disk, plus the force-overwrite flag.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub variants: Vec<VariantDescriptor>,
    pub force: bool,
}

/// Why a single source or variant could not be produced.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    #[error("source not found")]
    SourceNotFound,
    #[error("not an image (unsupported extension)")]
    SourceNotAnImage,
    #[error("unreadable: {message}")]
    Unreadable { message: String },
    #[error("conversion failed: {message}")]
    ConversionFailed {
        exit_code: Option<i32>,
        message: String,
    },
    #[error("conversion timed out after {secs}s")]
    TimedOut { secs: u64 },
    #[error("could not move output into place: {message}")]
    WriteFailed { message: String },
}

/// A recorded failure. `width` is `None` for discovery-time failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub source: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    pub reason: FailureReason,
}
