//! Production [`CommandRunner`] backed by `std::process`.
//!
//! | Operation | Implementation |
//! |---|---|
//! | Locate | explicit paths are checked directly; bare names are searched on `PATH` |
//! | Run | `Command::spawn` with piped stdout/stderr, drained on reader threads |
//! | Timeout | `try_wait` polling; the child is killed and reaped once the deadline passes |
//!
//! A timeout too large to represent as an `Instant` means no deadline.
//!
//! Output is collected for at most [`DRAIN_GRACE`] after the child exits. A
//! grandchild that inherited the pipes can keep them open long after the
//! converter itself is gone; whatever was read by then is returned.

use super::backend::{CommandOutput, CommandRunner, Invocation, RunError};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How long to keep reading output once the child has exited.
pub const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Runs real processes. Stateless; one instance can be shared by any number of workers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

/// A pipe being read on its own thread, so a chatty child cannot block on a full pipe.
struct Drain {
    buf: Arc<Mutex<Vec<u8>>>,
    done: Receiver<()>,
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> Drain {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&buf);
    let (tx, done) = mpsc::channel();
    thread::spawn(move || {
        let mut chunk = [0u8; 8192];
        loop {
            match pipe.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    if let Ok(mut buf) = sink.lock() {
                        buf.extend_from_slice(&chunk[..n]);
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        let _ = tx.send(());
    });
    Drain { buf, done }
}

impl Drain {
    /// Wait for end of stream until `until`, then return what was read.
    fn collect(self, until: Instant) -> String {
        let _ = self
            .done
            .recv_timeout(until.saturating_duration_since(Instant::now()));
        let bytes = self.buf.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

fn collect(drain: Option<Drain>, until: Instant) -> String {
    drain.map(|d| d.collect(until)).unwrap_or_default()
}

impl CommandRunner for SystemRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        let candidate = Path::new(program);
        if candidate.components().count() > 1 {
            return is_executable(candidate).then(|| candidate.to_path_buf());
        }
        let paths = std::env::var_os("PATH")?;
        std::env::split_paths(&paths)
            .map(|dir| dir.join(program))
            .find(|path| is_executable(path))
    }

    fn run(&self, invocation: &Invocation, timeout: Duration) -> Result<CommandOutput, RunError> {
        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => RunError::NotFound(invocation.program.clone()),
                _ => RunError::Io(e),
            })?;

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let deadline = Instant::now().checked_add(timeout);
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                tracing::debug!(command = %invocation, "killing timed-out process");
                let _ = child.kill();
                let _ = child.wait();
                return Err(RunError::TimedOut(timeout));
            }
            thread::sleep(POLL_INTERVAL);
        };

        let drained_by = Instant::now() + DRAIN_GRACE;
        Ok(CommandOutput {
            status: status.code(),
            stdout: collect(stdout, drained_by),
            stderr: collect(stderr, drained_by),
        })
    }
}
