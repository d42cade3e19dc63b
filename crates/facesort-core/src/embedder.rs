//! ArcFace-style embedding classifier via ONNX Runtime.
//!
//! Embeds the whole (resized) grayscale image with the w600k_r50 model and
//! classifies it as the nearest gallery embedding under cosine similarity.
//! No face detection or alignment is performed; inputs are assumed to be
//! face crops already.

use crate::classifier::{Classifier, ClassifierError, Prediction};
use crate::gallery::Gallery;
use image::imageops::FilterType;
use image::GrayImage;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;

// --- Named constants ---
const INPUT_SIZE: usize = 112;
const PIXEL_MEAN: f32 = 127.5;
const PIXEL_STD: f32 = 127.5; // ArcFace uses symmetric normalization
const EMBEDDING_DIM: usize = 512;
/// Maps cosine dissimilarity onto the 0–100 distance range the match
/// policy expects: 0 = identical, 100 = orthogonal.
const DISTANCE_SCALE: f32 = 100.0;

/// ONNX-backed [`Classifier`] over a fixed gallery of identities.
pub struct EmbeddingClassifier {
    session: Session,
    gallery: Gallery,
}

impl EmbeddingClassifier {
    /// Load the ONNX model from the given path and pair it with a gallery.
    pub fn load(model_path: &str, gallery: Gallery) -> Result<Self, ClassifierError> {
        if !Path::new(model_path).exists() {
            return Err(ClassifierError::ModelNotFound(model_path.to_string()));
        }
        if gallery.is_empty() {
            return Err(ClassifierError::EmptyGallery);
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        tracing::info!(
            path = model_path,
            identities = gallery.len(),
            inputs = ?session.inputs().iter().map(|i| (i.name(), i.dtype())).collect::<Vec<_>>(),
            outputs = ?session.outputs().iter().map(|o| o.name()).collect::<Vec<_>>(),
            "loaded embedding model"
        );

        Ok(Self { session, gallery })
    }

    /// Run the model and return an L2-normalized embedding.
    fn embed(&mut self, image: &GrayImage) -> Result<Vec<f32>, ClassifierError> {
        let input = preprocess(image);

        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let (_, raw_data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::InferenceFailed(format!("embedding extraction: {e}")))?;

        let raw: Vec<f32> = raw_data.to_vec();

        if raw.len() != EMBEDDING_DIM {
            return Err(ClassifierError::InferenceFailed(format!(
                "expected {EMBEDDING_DIM}-dim embedding, got {}",
                raw.len()
            )));
        }

        let norm: f32 = raw.iter().map(|x| x * x).sum::<f32>().sqrt();
        let values = if norm > 0.0 {
            raw.iter().map(|x| x / norm).collect()
        } else {
            raw
        };

        Ok(values)
    }
}

impl Classifier for EmbeddingClassifier {
    fn classify(&mut self, image: &GrayImage) -> Result<Prediction, ClassifierError> {
        let probe = self.embed(image)?;
        nearest(&probe, &self.gallery.embeddings).ok_or(ClassifierError::EmptyGallery)
    }
}

/// Resize a grayscale crop to 112×112 and normalize into an NCHW float
/// tensor, replicating the single channel across all three inputs.
fn preprocess(image: &GrayImage) -> Array4<f32> {
    let size = INPUT_SIZE;
    let resized = image::imageops::resize(image, size as u32, size as u32, FilterType::Triangle);

    let mut tensor = Array4::<f32>::zeros((1, 3, size, size));
    for (x, y, pixel) in resized.enumerate_pixels() {
        let normalized = (pixel.0[0] as f32 - PIXEL_MEAN) / PIXEL_STD;
        let (x, y) = (x as usize, y as usize);
        tensor[[0, 0, y, x]] = normalized;
        tensor[[0, 1, y, x]] = normalized;
        tensor[[0, 2, y, x]] = normalized;
    }

    tensor
}

/// Nearest gallery entry by cosine similarity, mapped onto the distance
/// convention. Returns `None` only for an empty gallery.
fn nearest(probe: &[f32], gallery: &[Vec<f32>]) -> Option<Prediction> {
    let mut best_sim = f32::NEG_INFINITY;
    let mut best_index: Option<usize> = None;

    for (i, reference) in gallery.iter().enumerate() {
        let sim = cosine(probe, reference);
        if sim > best_sim {
            best_sim = sim;
            best_index = Some(i);
        }
    }

    best_index.map(|index| Prediction {
        index,
        distance: (1.0 - best_sim) * DISTANCE_SCALE,
    })
}

/// Cosine similarity in [-1, 1]. Higher = more similar.
fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom > 0.0 {
        dot / denom
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess_output_shape() {
        let image = GrayImage::from_pixel(64, 48, image::Luma([128]));
        let tensor = preprocess(&image);
        assert_eq!(tensor.shape(), &[1, 3, INPUT_SIZE, INPUT_SIZE]);
    }

    #[test]
    fn test_preprocess_normalization() {
        let image = GrayImage::from_pixel(INPUT_SIZE as u32, INPUT_SIZE as u32, image::Luma([128]));
        let tensor = preprocess(&image);
        let val = tensor[[0, 0, 0, 0]];
        let expected = (128.0 - PIXEL_MEAN) / PIXEL_STD;
        assert!((val - expected).abs() < 1e-6, "got {val}, expected {expected}");
    }

    #[test]
    fn test_preprocess_channels_identical() {
        let image = GrayImage::from_pixel(INPUT_SIZE as u32, INPUT_SIZE as u32, image::Luma([100]));
        let tensor = preprocess(&image);
        for y in 0..INPUT_SIZE {
            for x in 0..INPUT_SIZE {
                let r = tensor[[0, 0, y, x]];
                let g = tensor[[0, 1, y, x]];
                let b = tensor[[0, 2, y, x]];
                assert_eq!(r, g);
                assert_eq!(g, b);
            }
        }
    }

    #[test]
    fn test_cosine_identical() {
        let a = [1.0, 0.0, 0.0];
        assert!((cosine(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        assert!(cosine(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_nearest_picks_best_entry() {
        let probe = [1.0, 0.0, 0.0];
        let gallery = vec![
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
            vec![1.0, 0.0, 0.0],
        ];
        let prediction = nearest(&probe, &gallery).unwrap();
        assert_eq!(prediction.index, 2);
        assert!(prediction.distance.abs() < 1e-4);
    }

    #[test]
    fn test_nearest_distance_scale() {
        // Orthogonal reference: similarity 0 maps to distance 100.
        let prediction = nearest(&[1.0, 0.0], &[vec![0.0, 1.0]]).unwrap();
        assert_eq!(prediction.index, 0);
        assert!((prediction.distance - DISTANCE_SCALE).abs() < 1e-4);
    }

    #[test]
    fn test_nearest_empty_gallery() {
        assert!(nearest(&[1.0, 0.0], &[]).is_none());
    }
}
