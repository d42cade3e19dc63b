//! Gallery artifact — one reference embedding per identity index.
//!
//! The gallery is produced offline by the training pipeline and stored as
//! JSON next to the ONNX model. Entry order defines the identity index
//! space; keeping it in sync with the identity-name list is up to whoever
//! builds both.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("gallery file not found: {0} — place gallery.json in trained_model/")]
    NotFound(String),
    #[error("failed to read gallery: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed gallery JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("gallery has no embeddings")]
    Empty,
    #[error("embedding {index} has dimension {got}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        got: usize,
        expected: usize,
    },
}

/// Per-identity reference embeddings, in identity-index order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gallery {
    pub embeddings: Vec<Vec<f32>>,
    /// Model version the embeddings were produced with (e.g., "w600k_r50").
    pub model_version: Option<String>,
}

impl Gallery {
    /// Load and validate a gallery JSON file.
    ///
    /// All embeddings must be non-empty and share one dimension.
    pub fn load(path: &str) -> Result<Self, GalleryError> {
        if !Path::new(path).exists() {
            return Err(GalleryError::NotFound(path.to_string()));
        }

        let raw = std::fs::read_to_string(path)?;
        let gallery: Gallery = serde_json::from_str(&raw)?;
        gallery.validate()?;

        tracing::info!(
            path,
            identities = gallery.len(),
            model_version = ?gallery.model_version,
            "loaded gallery"
        );

        Ok(gallery)
    }

    fn validate(&self) -> Result<(), GalleryError> {
        let Some(first) = self.embeddings.first() else {
            return Err(GalleryError::Empty);
        };
        let expected = first.len();
        if expected == 0 {
            return Err(GalleryError::DimensionMismatch {
                index: 0,
                got: 0,
                expected: 1,
            });
        }
        for (index, embedding) in self.embeddings.iter().enumerate() {
            if embedding.len() != expected {
                return Err(GalleryError::DimensionMismatch {
                    index,
                    got: embedding.len(),
                    expected,
                });
            }
        }
        Ok(())
    }

    /// Number of identities in the gallery.
    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_gallery(dir: &tempfile::TempDir, contents: &str) -> String {
        let path = dir.path().join("gallery.json");
        std::fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_load_valid_gallery() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_gallery(
            &dir,
            r#"{"embeddings": [[1.0, 0.0], [0.0, 1.0]], "model_version": "w600k_r50"}"#,
        );
        let gallery = Gallery::load(&path).unwrap();
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery.model_version.as_deref(), Some("w600k_r50"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json").to_string_lossy().into_owned();
        assert!(matches!(
            Gallery::load(&path),
            Err(GalleryError::NotFound(_))
        ));
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_gallery(&dir, "not json at all");
        assert!(matches!(Gallery::load(&path), Err(GalleryError::Parse(_))));
    }

    #[test]
    fn test_load_empty_gallery() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_gallery(&dir, r#"{"embeddings": [], "model_version": null}"#);
        assert!(matches!(Gallery::load(&path), Err(GalleryError::Empty)));
    }

    #[test]
    fn test_load_mismatched_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_gallery(
            &dir,
            r#"{"embeddings": [[1.0, 0.0], [0.0]], "model_version": null}"#,
        );
        assert!(matches!(
            Gallery::load(&path),
            Err(GalleryError::DimensionMismatch {
                index: 1,
                got: 1,
                expected: 2
            })
        ));
    }
}
