//! Command runner trait and shared types.
//!
//! The [`CommandRunner`] trait is the only seam between the crate and the
//! operating system's process table. It supports two operations: locate a
//! program, and run it with arguments under a timeout.
//!
//! The production implementation is
//! [`SystemRunner`](super::system::SystemRunner). Tests use the recording
//! `MockRunner` in this module so no real converter is ever spawned.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Command not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

/// A fully expanded command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Trait for running external commands.
///
/// Implementations must be `Sync`: the batch generator shares one runner
/// across its worker pool.
pub trait CommandRunner: Sync {
    /// Resolve `program` to an executable path, or `None` if it cannot be found.
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// Run to completion, killing the process if it outlives `timeout`.
    fn run(&self, invocation: &Invocation, timeout: Duration) -> Result<CommandOutput, RunError>;
}
