//! Source image discovery.
//!
//! Turns the path given to `generate` into an ordered list of source images.
//!
//! ## Rules
//!
//! - A **file** is processed alone. It must exist and carry an allowed
//!   extension, otherwise it is reported as a failure.
//! - A **directory** is walked recursively, sorted by file name. Files with
//!   an allowed extension (case-insensitive) become sources; everything else
//!   is ignored silently.
//! - Files that are **variants of a sibling source** (`photo_800w.png` next to
//!   `photo.jpg`) are ignored, so re-running on a directory never derives
//!   variants of variants even when the output format is itself an allowed
//!   source extension.
//! - Staging files a converter was writing into (`photo_800w.tmp-123.png`)
//!   are ignored.
//! - Entries the walker cannot read are reported as failures; the walk goes on.
//!
//! Discovery never fails as a whole: every problem becomes a [`Failure`] in
//! the returned [`Discovery`], and the batch continues with what was found.

use crate::naming::{parse_variant_name, staged_target_name};
use crate::types::{Failure, FailureReason};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Sources found under a path, plus discovery-time failures.
#[derive(Debug, Default)]
pub struct Discovery {
    pub sources: Vec<PathBuf>,
    pub failures: Vec<Failure>,
}

fn has_allowed_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(&ext)))
}

fn failure(source: &Path, reason: FailureReason) -> Failure {
    Failure {
        source: source.to_path_buf(),
        width: None,
        reason,
    }
}

/// Discover source images at `path`.
pub fn discover(path: &Path, extensions: &[String]) -> Discovery {
    if !path.exists() {
        return Discovery {
            sources: Vec::new(),
            failures: vec![failure(path, FailureReason::SourceNotFound)],
        };
    }

    if !path.is_dir() {
        return if has_allowed_extension(path, extensions) {
            Discovery {
                sources: vec![path.to_path_buf()],
                failures: Vec::new(),
            }
        } else {
            Discovery {
                sources: Vec::new(),
                failures: vec![failure(path, FailureReason::SourceNotAnImage)],
            }
        };
    }

    let mut discovery = Discovery::default();
    for entry in WalkDir::new(path).sort_by_file_name() {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file()
                    && has_allowed_extension(entry.path(), extensions)
                    && !is_staging(entry.path())
                {
                    discovery.sources.push(entry.into_path());
                }
            }
            Err(err) => {
                let source = err.path().unwrap_or(path).to_path_buf();
                tracing::warn!(path = %source.display(), error = %err, "skipping unreadable entry");
                discovery.failures.push(failure(
                    &source,
                    FailureReason::Unreadable {
                        message: err.to_string(),
                    },
                ));
            }
        }
    }

    discovery.sources = without_variants(discovery.sources);
    discovery
}

/// Drop files whose name marks them as a variant of another source in the same directory.
fn without_variants(sources: Vec<PathBuf>) -> Vec<PathBuf> {
    let stems: HashSet<(PathBuf, String)> = sources
        .iter()
        .filter_map(|p| Some((p.parent()?.to_path_buf(), stem_of(p)?)))
        .collect();

    sources
        .into_iter()
        .filter(|p| {
            let is_variant = p
                .file_name()
                .and_then(|n| parse_variant_name(&n.to_string_lossy()))
                .zip(p.parent())
                .is_some_and(|(parsed, dir)| stems.contains(&(dir.to_path_buf(), parsed.base)));
            if is_variant {
                tracing::debug!(path = %p.display(), "ignoring generated variant");
            }
            !is_variant
        })
        .collect()
}

fn is_staging(path: &Path) -> bool {
    let staging = path
        .file_name()
        .is_some_and(|n| staged_target_name(&n.to_string_lossy()).is_some());
    if staging {
        tracing::debug!(path = %path.display(), "ignoring staging file");
    }
    staging
}

fn stem_of(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}
