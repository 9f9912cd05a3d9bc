//! Crossbreed heuristic
//!
//! Pure threshold comparison over the ranked prediction list. A scan is
//! flagged as a potential crossbreed when the top prediction is weak, or when
//! the runner-up is strong and close behind it.

use pawdentify_common::models::BreedPrediction;
use serde::Serialize;

/// Primary prediction below this confidence suggests the model could not
/// settle on a single breed.
pub const PRIMARY_CONFIDENCE_THRESHOLD: f64 = 0.70;

/// Runner-up must carry at least this much confidence to count as a
/// secondary-breed signal.
pub const SECONDARY_CONFIDENCE_THRESHOLD: f64 = 0.15;

/// Gap between the top two predictions below which they are considered
/// competing rather than one clear winner.
pub const CONFIDENCE_GAP_THRESHOLD: f64 = 0.30;

/// Derived analysis emitted when a scan is flagged
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CrossbreedAnalysis {
    pub primary_breed: String,
    pub primary_confidence: f64,
    pub secondary_breed: String,
    pub secondary_confidence: f64,
    pub confidence_gap: f64,
    /// `min(1.0, secondary/primary + 0.3)`
    pub crossbreed_likelihood: f64,
    /// Human-readable suggested mixed-breed label
    pub suggested_mix: String,
}

/// Evaluate the heuristic over a ranked prediction list.
///
/// Returns `None` when fewer than two predictions are present or when the
/// flag criteria do not fire. Deterministic, no side effects.
pub fn analyze(predictions: &[BreedPrediction]) -> Option<CrossbreedAnalysis> {
    if predictions.len() < 2 {
        return None;
    }

    let primary = &predictions[0];
    let secondary = &predictions[1];
    let gap = primary.confidence - secondary.confidence;

    let flagged = primary.confidence < PRIMARY_CONFIDENCE_THRESHOLD
        || (secondary.confidence > SECONDARY_CONFIDENCE_THRESHOLD
            && gap < CONFIDENCE_GAP_THRESHOLD);

    if !flagged {
        return None;
    }

    Some(CrossbreedAnalysis {
        primary_breed: primary.breed.clone(),
        primary_confidence: primary.confidence,
        secondary_breed: secondary.breed.clone(),
        secondary_confidence: secondary.confidence,
        confidence_gap: gap,
        crossbreed_likelihood: (secondary.confidence / primary.confidence + 0.3).min(1.0),
        suggested_mix: format!("{} x {} Mix", primary.breed, secondary.breed),
    })
}
