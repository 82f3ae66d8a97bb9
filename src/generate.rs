//! Batch variant generation.
//!
//! Takes a file or directory, discovers source images, and asks the external
//! converter to produce every configured width for each of them.
//!
//! ## Flow
//!
//! ```text
//! validate options ─▶ locate converter ─▶ discover sources ─▶ plan ─▶ realize (parallel)
//!        │                   │                   │                         │
//!   InvalidInput        ToolNotFound     per-source failures     generated / skipped / failed
//!      (fatal)             (fatal)          (recorded)                 (recorded)
//! ```
//!
//! Only the first two stages can abort a run. A missing converter is fatal
//! because no conversion could succeed; it is detected before any file is
//! touched, so an aborted run leaves nothing behind. Everything after that is
//! isolated per item: one failed source or width never stops the batch.
//!
//! ## Skipping
//!
//! A variant whose output file already exists is skipped unless
//! [`GenerateOptions::force`] is set. Existence is the only check; there is
//! no content comparison. Sources are never modified and nothing is deleted.
//!
//! ## Output Structure
//!
//! ```text
//! images/
//! ├── hero.jpg
//! ├── hero_400w.webp      # <basename>_<width>w.<format>, next to the source
//! ├── hero_800w.webp
//! └── team/
//!     ├── alice.png
//!     └── alice_400w.webp
//! ```
//!
//! ## Parallel Processing
//!
//! Each (source, width) pair is an independent subprocess writing a distinct
//! file, so pairs run in parallel on the [rayon](https://docs.rs/rayon) pool.
//! The summary lists failures in plan order regardless of completion order.

use crate::config::{ConverterConfig, VariantConfig};
use crate::imaging::{
    CommandRunner, ConvertParams, Quality, SystemRunner, convert, plan_conversion,
};
use crate::naming::{self, NamingError};
use crate::scan;
use crate::types::{Failure, FailureReason, Format, GenerationRequest, VariantDescriptor};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    InvalidInput(#[from] NamingError),
    #[error(
        "Conversion tool `{command}` not found. Install ImageMagick \
         (`apt install imagemagick`, `brew install imagemagick`, or https://imagemagick.org/script/download.php) \
         or set `converter.command` to your converter"
    )]
    ToolNotFound { command: String },
}

/// Options for one batch run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub widths: Vec<u32>,
    pub format: Format,
    pub quality: Quality,
    /// Overwrite variants that already exist.
    pub force: bool,
    /// Source extensions collected from directories.
    pub extensions: Vec<String>,
}

impl GenerateOptions {
    /// Build options from config defaults, with `force` off.
    pub fn from_config(config: &VariantConfig) -> Self {
        Self {
            widths: config.widths.clone(),
            format: config.format.clone(),
            quality: config.quality(),
            force: false,
            extensions: config.extensions.clone(),
        }
    }
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self::from_config(&VariantConfig::default())
    }
}

/// What happened to one planned variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Generated,
    Skipped,
    Failed { reason: FailureReason },
}

/// Progress events, sent as work completes.
#[derive(Debug, Clone)]
pub enum GenerateEvent {
    /// Discovery finished; `variants` items are about to be realized.
    Planned { sources: usize, variants: usize },
    /// A source could not be used at all.
    SourceFailed(Failure),
    /// One variant finished.
    VariantFinished {
        source: PathBuf,
        output: PathBuf,
        width: u32,
        outcome: Outcome,
    },
}

/// Aggregate result of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationSummary {
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<Failure>,
}

impl GenerationSummary {
    /// `true` when nothing failed.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn record_failure(&mut self, failure: Failure) {
        self.failed += 1;
        self.failures.push(failure);
    }

    fn record(&mut self, variant: &VariantDescriptor, outcome: Outcome) {
        match outcome {
            Outcome::Generated => self.generated += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed { reason } => self.record_failure(Failure {
                source: variant.source.clone(),
                width: Some(variant.width),
                reason,
            }),
        }
    }
}

/// Plan every (source, width) variant, in source order then width order.
///
/// A width repeated in `options.widths` would target the same file twice;
/// only its first occurrence is planned.
pub fn plan(sources: &[PathBuf], options: &GenerateOptions) -> Result<GenerationRequest, NamingError> {
    naming::validate_widths(&options.widths)?;
    let mut seen = HashSet::new();
    let mut variants = Vec::with_capacity(sources.len() * options.widths.len());
    for source in sources {
        for &width in &options.widths {
            let variant = VariantDescriptor::new(source.clone(), width, options.format.clone())?;
            if seen.insert(variant.output.clone()) {
                variants.push(variant);
            }
        }
    }
    Ok(GenerationRequest {
        variants,
        force: options.force,
    })
}

/// Generate variants for `path` using the system's converter.
pub fn generate(
    path: &Path,
    options: &GenerateOptions,
    converter: &ConverterConfig,
    events: Option<Sender<GenerateEvent>>,
) -> Result<GenerationSummary, GenerateError> {
    generate_with_runner(&SystemRunner::new(), path, options, converter, events)
}

/// Generate variants using a specific runner (allows testing with a mock).
pub fn generate_with_runner(
    runner: &impl CommandRunner,
    path: &Path,
    options: &GenerateOptions,
    converter: &ConverterConfig,
    events: Option<Sender<GenerateEvent>>,
) -> Result<GenerationSummary, GenerateError> {
    naming::validate_widths(&options.widths)?;

    let Some(program) = runner.locate(&converter.command) else {
        return Err(GenerateError::ToolNotFound {
            command: converter.command.clone(),
        });
    };
    tracing::debug!(program = %program.display(), "using converter");

    let discovery = scan::discover(path, &options.extensions);
    let request = plan(&discovery.sources, options)?;
    tracing::info!(
        path = %path.display(),
        sources = discovery.sources.len(),
        variants = request.variants.len(),
        force = request.force,
        "starting batch"
    );

    emit(
        &events,
        GenerateEvent::Planned {
            sources: discovery.sources.len(),
            variants: request.variants.len(),
        },
    );

    let mut summary = GenerationSummary::default();
    for failure in discovery.failures {
        emit(&events, GenerateEvent::SourceFailed(failure.clone()));
        summary.record_failure(failure);
    }

    let outcomes: Vec<Outcome> = request
        .variants
        .par_iter()
        .map_with(events, |events, variant| {
            let outcome = realize(runner, variant, request.force, options.quality, converter);
            emit(
                events,
                GenerateEvent::VariantFinished {
                    source: variant.source.clone(),
                    output: variant.output.clone(),
                    width: variant.width,
                    outcome: outcome.clone(),
                },
            );
            outcome
        })
        .collect();

    for (variant, outcome) in request.variants.iter().zip(outcomes) {
        summary.record(variant, outcome);
    }

    tracing::info!(
        generated = summary.generated,
        skipped = summary.skipped,
        failed = summary.failed,
        "batch finished"
    );
    Ok(summary)
}

fn emit(events: &Option<Sender<GenerateEvent>>, event: GenerateEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is listening.
        let _ = tx.send(event);
    }
}

/// Produce one variant, or explain why not.
fn realize(
    runner: &impl CommandRunner,
    variant: &VariantDescriptor,
    force: bool,
    quality: Quality,
    converter: &ConverterConfig,
) -> Outcome {
    if !force && variant.output.exists() {
        tracing::debug!(output = %variant.output.display(), "exists, skipping");
        return Outcome::Skipped;
    }

    // Only a successful rename ever creates the real target.
    let staged = naming::staging_file(&variant.output, std::process::id());
    let params = ConvertParams {
        source: variant.source.clone(),
        output: staged.clone(),
        width: variant.width,
        format: variant.format.clone(),
        quality,
    };
    let invocation = plan_conversion(&params, converter);
    tracing::debug!(command = %invocation, "converting");

    let result = convert(runner, &invocation, converter.timeout()).and_then(|()| {
        std::fs::rename(&staged, &variant.output).map_err(|e| FailureReason::WriteFailed {
            message: e.to_string(),
        })
    });

    match result {
        Ok(()) => Outcome::Generated,
        Err(reason) => {
            if staged.exists() {
                let _ = std::fs::remove_file(&staged);
            }
            tracing::warn!(
                source = %variant.source.display(),
                width = variant.width,
                %reason,
                "conversion failed"
            );
            Outcome::Failed { reason }
        }
    }
}
