//! CLI output formatting for the `generate` command.
//!
//! # Output Format
//!
//! Progress lines are printed as work completes, so their order follows the
//! worker pool, not the plan. The summary is printed once at the end and
//! lists failures in plan order.
//!
//! ```text
//! Found 2 images, 8 variants
//! photos/dawn_400w.webp: generated
//! photos/dawn_800w.webp: skipped (exists)
//! photos/dusk_400w.webp: failed (conversion failed: exit status 1: no decode delegate)
//! notes.txt: failed (not an image (unsupported extension))
//!
//! Generated 1, skipped 1, failed 2
//! Failures:
//!     notes.txt: not an image (unsupported extension)
//!     photos/dusk.jpg @ 400w: conversion failed: exit status 1: no decode delegate
//! ```
//!
//! # Architecture
//!
//! Each piece has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::generate::{GenerateEvent, GenerationSummary, Outcome};
use crate::types::Failure;

fn failure_line(failure: &Failure) -> String {
    match failure.width {
        Some(width) => format!(
            "{} @ {}w: {}",
            failure.source.display(),
            width,
            failure.reason
        ),
        None => format!("{}: {}", failure.source.display(), failure.reason),
    }
}

// ============================================================================
// Progress
// ============================================================================

/// Format a single progress event as display lines.
pub fn format_generate_event(event: &GenerateEvent) -> Vec<String> {
    match event {
        GenerateEvent::Planned { sources, variants } => {
            let noun = if *sources == 1 { "image" } else { "images" };
            vec![format!("Found {} {}, {} variants", sources, noun, variants)]
        }
        GenerateEvent::SourceFailed(failure) => vec![format!(
            "{}: failed ({})",
            failure.source.display(),
            failure.reason
        )],
        GenerateEvent::VariantFinished {
            output, outcome, ..
        } => {
            let status = match outcome {
                Outcome::Generated => "generated".to_string(),
                Outcome::Skipped => "skipped (exists)".to_string(),
                Outcome::Failed { reason } => format!("failed ({})", reason),
            };
            vec![format!("{}: {}", output.display(), status)]
        }
    }
}

/// Print a progress event to stdout.
pub fn print_generate_event(event: &GenerateEvent) {
    for line in format_generate_event(event) {
        println!("{}", line);
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Format the end-of-run summary.
pub fn format_summary(summary: &GenerationSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "Generated {}, skipped {}, failed {}",
        summary.generated, summary.skipped, summary.failed
    )];
    if !summary.failures.is_empty() {
        lines.push("Failures:".to_string());
        for failure in &summary.failures {
            lines.push(format!("    {}", failure_line(failure)));
        }
    }
    lines
}

/// Print the summary to stdout, preceded by a blank line.
pub fn print_summary(summary: &GenerationSummary) {
    println!();
    for line in format_summary(summary) {
        println!("{}", line);
    }
}
