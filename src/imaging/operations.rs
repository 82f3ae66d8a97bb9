//! High-level conversion operations.
//!
//! These functions combine the converter configuration with a runner: they
//! expand the argument template for one [`ConvertParams`], execute it, and
//! classify the result as success or a [`FailureReason`].

use super::backend::{CommandOutput, CommandRunner, Invocation, RunError};
use super::params::ConvertParams;
use crate::config::ConverterConfig;
use crate::types::FailureReason;
use std::time::Duration;

/// Longest stderr excerpt kept in a failure message.
const STDERR_EXCERPT: usize = 300;

fn placeholder_value(name: &str, params: &ConvertParams) -> Option<String> {
    match name {
        "source" => Some(params.source.to_string_lossy().into_owned()),
        "output" => Some(params.output.to_string_lossy().into_owned()),
        "width" => Some(params.width.to_string()),
        "format" => Some(params.format.to_string()),
        "quality" => Some(params.quality.value().to_string()),
        _ => None,
    }
}

/// Substitute `{name}` placeholders in a single pass.
///
/// Substituted values are never re-scanned, so a source path containing
/// `{output}` stays literal. Unknown `{...}` sequences are kept as-is.
pub fn expand_placeholders(template: &str, params: &ConvertParams) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let substituted = tail.find('}').and_then(|end| {
            placeholder_value(&tail[1..end], params).map(|value| (end, value))
        });
        match substituted {
            Some((end, value)) => {
                out.push_str(&value);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Plan a conversion without executing it.
pub fn plan_conversion(params: &ConvertParams, converter: &ConverterConfig) -> Invocation {
    Invocation {
        program: converter.command.clone(),
        args: converter
            .args
            .iter()
            .map(|arg| expand_placeholders(arg, params))
            .collect(),
    }
}

fn failure_message(output: &CommandOutput) -> String {
    let stderr = output.stderr.trim();
    let status = match output.status {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    };
    if stderr.is_empty() {
        status
    } else {
        let excerpt: String = stderr.chars().take(STDERR_EXCERPT).collect();
        format!("{}: {}", status, excerpt)
    }
}

/// Run one planned conversion and classify the outcome.
pub fn convert(
    runner: &impl CommandRunner,
    invocation: &Invocation,
    timeout: Duration,
) -> Result<(), FailureReason> {
    match runner.run(invocation, timeout) {
        Ok(output) if output.success() => Ok(()),
        Ok(output) => Err(FailureReason::ConversionFailed {
            exit_code: output.status,
            message: failure_message(&output),
        }),
        Err(RunError::TimedOut(limit)) => Err(FailureReason::TimedOut {
            secs: limit.as_secs(),
        }),
        Err(err) => Err(FailureReason::ConversionFailed {
            exit_code: None,
            message: err.to_string(),
        }),
    }
}
