//! Candidate discovery — pattern-filtered recursive scan for face crops.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("input directory not found: {0}")]
    RootNotFound(String),
    #[error("walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A discovered candidate image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    /// File stem, used only for logging.
    pub stem: String,
}

/// Enumerate `.jpg` files under `root` whose parent directory name contains
/// `pattern`.
///
/// Matches `**/*{pattern}*/*.jpg`: a file qualifies only when it sits
/// inside a subdirectory of the root (files directly at the root never
/// match), and an empty pattern matches every subdirectory. Results come
/// back in a deterministic name-sorted walk order.
pub fn scan(root: &Path, pattern: &str) -> Result<Vec<Candidate>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::RootNotFound(root.display().to_string()));
    }

    let mut candidates = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("jpg") {
            continue;
        }
        let Some(parent) = path.parent() else {
            continue;
        };
        if parent == root {
            continue;
        }
        let Some(dir_name) = parent.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !dir_name.contains(pattern) {
            continue;
        }

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        candidates.push(Candidate {
            path: path.to_path_buf(),
            stem,
        });
    }

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_scan_finds_jpgs_in_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("ashley/001.jpg"));
        touch(&dir.path().join("laura/002.jpg"));

        let candidates = scan(dir.path(), "").unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].stem, "001");
        assert_eq!(candidates[1].stem, "002");
    }

    #[test]
    fn test_scan_skips_files_at_the_root() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("loose.jpg"));
        touch(&dir.path().join("sub/kept.jpg"));

        let candidates = scan(dir.path(), "").unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].stem, "kept");
    }

    #[test]
    fn test_scan_filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("sub/a.png"));
        touch(&dir.path().join("sub/b.JPG"));
        touch(&dir.path().join("sub/c.jpg"));

        let candidates = scan(dir.path(), "").unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].stem, "c");
    }

    #[test]
    fn test_scan_pattern_filters_directory_names() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("ep01_ashley/a.jpg"));
        touch(&dir.path().join("ep01_laura/b.jpg"));
        touch(&dir.path().join("ep02_ashley/c.jpg"));

        let candidates = scan(dir.path(), "ashley").unwrap();
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|c| c
            .path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.contains("ashley"))));
    }

    #[test]
    fn test_scan_matches_nested_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("season1/ashley/a.jpg"));

        let candidates = scan(dir.path(), "ashley").unwrap();
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_scan_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            scan(&missing, ""),
            Err(ScanError::RootNotFound(_))
        ));
    }
}
