//! Classifier abstraction over a pre-trained face-recognition model.
//!
//! The recognition algorithm is a black box behind [`Classifier`]; the
//! routing logic only sees an identity index and a distance score.

use image::GrayImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("model file not found: {0} — place the ONNX model in trained_model/")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("gallery has no reference embeddings")]
    EmptyGallery,
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// Output of the classifier for one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Index into the externally-defined ordered identity-name list.
    pub index: usize,
    /// Distance score. Lower = more similar; 0 is a perfect match.
    pub distance: f32,
}

/// Strategy interface for the pre-trained recognition model.
///
/// Implementations classify a grayscale image as a whole; no face
/// detection or cropping happens behind this seam.
pub trait Classifier {
    fn classify(&mut self, image: &GrayImage) -> Result<Prediction, ClassifierError>;
}
