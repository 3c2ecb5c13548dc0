use thiserror::Error;

use crate::models::FeatureVector;

/// A feedback update collapsed the user vector to zero (or overflowed), so it cannot be
/// renormalized
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Feedback update produced a degenerate user vector")]
pub struct DegenerateVectorError;

/// Owns the evolving user preference vector
///
/// Updates are computed functionally by [`apply_feedback`](Self::apply_feedback) and only
/// become the current state through [`commit`](Self::commit).
#[derive(Debug, Clone)]
pub struct PreferenceTracker {
    current: FeatureVector,
    feedback_count: usize,
}

impl PreferenceTracker {
    /// Starts from the zero vector of the catalog's dimension
    pub fn new(dimension: usize) -> Self {
        Self {
            current: FeatureVector::zeros(dimension),
            feedback_count: 0,
        }
    }

    pub fn current(&self) -> &FeatureVector {
        &self.current
    }

    /// Number of updates committed so far
    pub fn feedback_count(&self) -> usize {
        self.feedback_count
    }

    /// Folds one like/dislike into the current vector and renormalizes.
    ///
    /// liked: (current + item) / 2, disliked: (current - item) / 2, then scaled to unit
    /// length. Fails instead of dividing by zero when the raw result is the zero vector.
    pub fn apply_feedback(
        &self,
        item_vector: &FeatureVector,
        liked: bool,
    ) -> Result<FeatureVector, DegenerateVectorError> {
        let raw = if liked {
            &self.current + item_vector
        } else {
            &self.current - item_vector
        }
        .scale(0.5);

        raw.normalized().ok_or(DegenerateVectorError)
    }

    /// Replaces the current vector with an accepted update
    pub fn commit(&mut self, vector: FeatureVector) {
        debug_assert_eq!(vector.dimension(), self.current.dimension());
        self.current = vector;
        self.feedback_count += 1;
    }

    /// Replaces the current vector without counting it as feedback
    pub fn reseed(&mut self, vector: FeatureVector) {
        debug_assert_eq!(vector.dimension(), self.current.dimension());
        self.current = vector;
    }
}
