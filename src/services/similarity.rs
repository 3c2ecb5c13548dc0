use crate::models::FeatureVector;

/// Cosine similarity between two vectors of the same dimension
///
/// cos(a, b) = (a . b) / (||a|| x ||b||), clamped to [-1, 1] to absorb rounding.
///
/// Returns exactly `0.0` when either vector has zero magnitude. That value is a fallback
/// for an undefined angle, not a computed result, so a zero user vector scores every
/// item as if it were orthogonal.
pub fn cosine_similarity(a: &FeatureVector, b: &FeatureVector) -> f64 {
    let magnitude_a = a.magnitude();
    let magnitude_b = b.magnitude();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    (a.dot(b) / (magnitude_a * magnitude_b)).clamp(-1.0, 1.0)
}
