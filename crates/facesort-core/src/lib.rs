//! facesort-core — batch face-crop classification and routing.
//!
//! Discovers candidate images, classifies each against a pre-trained
//! embedding model via ONNX Runtime, and routes confident matches into
//! per-identity output folders.

pub mod classifier;
pub mod embedder;
pub mod gallery;
pub mod policy;
pub mod review;
pub mod router;
pub mod scan;

pub use classifier::{Classifier, ClassifierError, Prediction};
pub use embedder::EmbeddingClassifier;
pub use gallery::{Gallery, GalleryError};
pub use policy::{Decision, MATCH_THRESHOLD, UNKNOWN_LABEL};
pub use review::{AutoAccept, MatchReview, ReviewAction};
pub use router::{RouteReport, Router, RouterConfig, RouterError};
pub use scan::{scan, Candidate, ScanError};
