//! Parameter types for conversions.
//!
//! These structs describe *what* to produce, not *how*. They sit between the
//! batch generator (which decides which variants to create) and
//! [`operations`](super::operations) (which turns them into a command line for
//! the configured converter).
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 85). Clamped on construction.
//! - [`ConvertParams`]: One conversion: source, output path, target width, format, quality.

use crate::types::Format;
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Parameters for a single resize-and-encode conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub format: Format,
    pub quality: Quality,
}
