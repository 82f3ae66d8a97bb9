//! Shared test utilities.
//!
//! Builds throwaway source trees and inspects what a batch run left on disk.
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let tmp = write_sources(&["photo.png", "nested/hero.jpg"]);
//! // ... run generation against tmp.path() ...
//! assert_eq!(list_files(tmp.path()), vec!["nested/hero.jpg", "photo.png"]);
//! ```

use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

/// Create a temp directory containing placeholder files at the given relative paths.
///
/// The mock runner never decodes sources, so the content is irrelevant.
pub fn write_sources(files: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for file in files {
        let path = tmp.path().join(file);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "fake image").unwrap();
    }
    tmp
}

/// Path relative to `root`, always `/`-separated.
pub fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or_else(|_| panic!("{} is not under {}", path.display(), root.display()))
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Every file under `root`, relative and sorted.
pub fn list_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| relative(e.path(), root))
        .collect();
    files.sort();
    files
}
