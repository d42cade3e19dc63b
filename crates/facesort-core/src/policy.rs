//! Confidence policy — resolve a prediction into an output label.

use crate::classifier::Prediction;
use thiserror::Error;

/// Distance threshold for a confident match (strict less-than).
pub const MATCH_THRESHOLD: f32 = 80.0;

/// Sentinel label for predictions that miss the threshold.
pub const UNKNOWN_LABEL: &str = "unknown";

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("predicted identity index {index} is outside the {known} known names")]
    IndexOutOfRange { index: usize, known: usize },
}

/// Resolved routing decision for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Known identity name, or [`UNKNOWN_LABEL`].
    pub label: String,
    /// Displayed confidence percentage, `round(100 - distance)`.
    pub confidence: i32,
}

impl Decision {
    /// True when the image resolved to a known identity.
    pub fn is_match(&self) -> bool {
        self.label != UNKNOWN_LABEL
    }
}

/// Resolve a prediction against the ordered identity-name list.
///
/// A distance strictly below `threshold` resolves to the name at the
/// predicted index; anything else resolves to [`UNKNOWN_LABEL`]. The
/// confidence percentage is computed the same way on both branches, so a
/// below-threshold decision still carries one.
///
/// The name list is only indexed on the match branch; an out-of-range
/// index on a non-match resolves to unknown like any other miss.
pub fn decide(
    prediction: Prediction,
    names: &[String],
    threshold: f32,
) -> Result<Decision, PolicyError> {
    let confidence = (100.0 - prediction.distance).round() as i32;

    let label = if prediction.distance < threshold {
        names
            .get(prediction.index)
            .ok_or(PolicyError::IndexOutOfRange {
                index: prediction.index,
                known: names.len(),
            })?
            .clone()
    } else {
        UNKNOWN_LABEL.to_string()
    };

    Ok(Decision { label, confidence })
}
