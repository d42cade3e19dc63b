//! Batch classification router.
//!
//! Walks the candidate list once: classify, apply the confidence policy,
//! and copy confident matches into `{out_dir}/{label}/`. Misses are
//! discarded. Unreadable images are logged and skipped; everything else
//! is fatal and propagates.

use crate::classifier::{Classifier, ClassifierError};
use crate::policy::{self, Decision, PolicyError};
use crate::review::{MatchReview, ReviewAction};
use crate::scan::Candidate;
use chrono::Local;
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

/// Timestamp appended to output file names. Microsecond resolution keeps
/// repeat runs from colliding within a label directory.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.6f";

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("classifier: {0}")]
    Classifier(#[from] ClassifierError),
    #[error("policy: {0}")]
    Policy(#[from] PolicyError),
    #[error("failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    WriteImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Router configuration, fixed for one run.
pub struct RouterConfig {
    /// Ordered identity names; indices must line up with the classifier's
    /// index space (an external invariant — the gallery and this list are
    /// built together).
    pub names: Vec<String>,
    /// Output root; per-label directories are created beneath it.
    pub out_dir: PathBuf,
    /// Distance threshold for a confident match.
    pub threshold: f32,
}

impl RouterConfig {
    pub fn new(names: Vec<String>, out_dir: PathBuf) -> Self {
        Self {
            names,
            out_dir,
            threshold: policy::MATCH_THRESHOLD,
        }
    }
}

/// Per-run counters reported by [`Router::run`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RouteReport {
    /// Candidates that loaded and were classified.
    pub processed: usize,
    /// Images written to a label directory.
    pub written: usize,
    /// Confident matches left out by the review gate.
    pub skipped: usize,
    /// Candidates that failed to load.
    pub unreadable: usize,
    /// True when the run was stopped early by the review gate.
    pub quit: bool,
}

/// Batch classification router over an injected [`Classifier`].
pub struct Router<C> {
    classifier: C,
    config: RouterConfig,
    /// Labels whose output directory has been created this run.
    created: HashSet<String>,
}

impl<C: Classifier> Router<C> {
    pub fn new(classifier: C, config: RouterConfig) -> Self {
        Self {
            classifier,
            config,
            created: HashSet::new(),
        }
    }

    /// Process candidates in order.
    ///
    /// `progress` fires once per candidate before it is handled. The review
    /// gate is consulted only for confident matches; a [`ReviewAction::Quit`]
    /// stops the run immediately with whatever was counted so far.
    pub fn run<R: MatchReview>(
        &mut self,
        candidates: &[Candidate],
        review: &mut R,
        mut progress: impl FnMut(&Candidate),
    ) -> Result<RouteReport, RouterError> {
        let mut report = RouteReport::default();

        for candidate in candidates {
            progress(candidate);
            tracing::debug!(
                path = %candidate.path.display(),
                stem = %candidate.stem,
                "processing image"
            );

            let image = match image::open(&candidate.path) {
                Ok(image) => image,
                Err(err) => {
                    tracing::warn!(
                        path = %candidate.path.display(),
                        error = %err,
                        "failed to open image, skipping"
                    );
                    report.unreadable += 1;
                    continue;
                }
            };
            report.processed += 1;

            let gray = image.to_luma8();
            let prediction = self.classifier.classify(&gray)?;
            let decision = policy::decide(prediction, &self.config.names, self.config.threshold)?;
            tracing::debug!(
                label = %decision.label,
                confidence = decision.confidence,
                distance = prediction.distance,
                "classified"
            );

            if !decision.is_match() {
                continue;
            }

            match review.review(&candidate.path, &decision.label, decision.confidence) {
                ReviewAction::Skip => {
                    report.skipped += 1;
                    continue;
                }
                ReviewAction::Quit => {
                    report.quit = true;
                    return Ok(report);
                }
                ReviewAction::Accept => {}
            }

            let dest = self.placement(&decision)?;
            image
                .save(&dest)
                .map_err(|source| RouterError::WriteImage {
                    path: dest.clone(),
                    source,
                })?;
            tracing::debug!(path = %dest.display(), "wrote match");
            report.written += 1;
        }

        Ok(report)
    }

    /// Output path for a decision, creating the label directory the first
    /// time its label is seen this run.
    fn placement(&mut self, decision: &Decision) -> Result<PathBuf, RouterError> {
        let label_dir = self.config.out_dir.join(&decision.label);
        if !self.created.contains(&decision.label) {
            std::fs::create_dir_all(&label_dir).map_err(|source| RouterError::CreateDir {
                path: label_dir.clone(),
                source,
            })?;
            self.created.insert(decision.label.clone());
        }

        let timestamp = Local::now().format(TIMESTAMP_FORMAT);
        Ok(label_dir.join(format!("{}%_{}.jpg", decision.confidence, timestamp)))
    }
}
