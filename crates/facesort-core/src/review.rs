//! Review gate consulted before a confident match is written.

use std::path::Path;

/// What to do with a confident match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    /// Write the image into its label directory.
    Accept,
    /// Leave this image out and continue with the next candidate.
    Skip,
    /// Stop the whole run cleanly.
    Quit,
}

/// Gate consulted once per confident match, before the write.
///
/// The interactive CLI implements this with a terminal prompt; batch runs
/// use [`AutoAccept`].
pub trait MatchReview {
    fn review(&mut self, path: &Path, label: &str, confidence: i32) -> ReviewAction;
}

/// Accepts every match without interaction.
pub struct AutoAccept;

impl MatchReview for AutoAccept {
    fn review(&mut self, _path: &Path, _label: &str, _confidence: i32) -> ReviewAction {
        ReviewAction::Accept
    }
}
