use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Fixed-length feature vector for a catalog item or the user's preference
///
/// Catalog vectors are unit-normalized at rest. A user vector starts as all zeros
/// and becomes unit length after the first successful feedback update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Wraps raw components
    pub fn new(components: Vec<f64>) -> Self {
        Self(components)
    }

    /// Creates the zero vector of dimension `dimension`
    pub fn zeros(dimension: usize) -> Self {
        Self(vec![0.0; dimension])
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn components(&self) -> &[f64] {
        &self.0
    }

    pub fn dot(&self, other: &FeatureVector) -> f64 {
        debug_assert_eq!(self.dimension(), other.dimension());
        self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum()
    }

    /// Euclidean norm
    pub fn magnitude(&self) -> f64 {
        self.0.iter().map(|c| c * c).sum::<f64>().sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|c| *c == 0.0)
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }

    pub fn scale(&self, factor: f64) -> FeatureVector {
        Self(self.0.iter().map(|c| c * factor).collect())
    }

    /// Returns the unit-length vector with the same direction.
    ///
    /// `None` when the magnitude is zero or not finite, since the direction is undefined.
    pub fn normalized(&self) -> Option<FeatureVector> {
        let magnitude = self.magnitude();
        if magnitude == 0.0 || !magnitude.is_finite() {
            return None;
        }
        Some(self.scale(1.0 / magnitude))
    }
}

impl Add for &FeatureVector {
    type Output = FeatureVector;

    fn add(self, other: &FeatureVector) -> FeatureVector {
        debug_assert_eq!(self.dimension(), other.dimension());
        FeatureVector(self.0.iter().zip(other.0.iter()).map(|(a, b)| a + b).collect())
    }
}

impl Sub for &FeatureVector {
    type Output = FeatureVector;

    fn sub(self, other: &FeatureVector) -> FeatureVector {
        debug_assert_eq!(self.dimension(), other.dimension());
        FeatureVector(self.0.iter().zip(other.0.iter()).map(|(a, b)| a - b).collect())
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(components: Vec<f64>) -> Self {
        Self(components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros() {
        let v = FeatureVector::zeros(4);
        assert_eq!(v.dimension(), 4);
        assert!(v.is_zero());
        assert_eq!(v.magnitude(), 0.0);
    }

    #[test]
    fn test_dot_and_magnitude() {
        let a = FeatureVector::new(vec![3.0, 4.0]);
        let b = FeatureVector::new(vec![1.0, 0.0]);
        assert_eq!(a.dot(&b), 3.0);
        assert_eq!(a.magnitude(), 5.0);
    }

    #[test]
    fn test_normalized() {
        let v = FeatureVector::new(vec![3.0, 4.0]).normalized().unwrap();
        assert!((v.magnitude() - 1.0).abs() < 1e-12);
        assert!((v.components()[0] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_normalized_zero_vector_is_none() {
        assert!(FeatureVector::zeros(3).normalized().is_none());
    }

    #[test]
    fn test_add_sub_scale() {
        let a = FeatureVector::new(vec![1.0, 2.0]);
        let b = FeatureVector::new(vec![0.5, 0.5]);
        assert_eq!((&a + &b).components(), &[1.5, 2.5]);
        assert_eq!((&a - &b).components(), &[0.5, 1.5]);
        assert_eq!(a.scale(2.0).components(), &[2.0, 4.0]);
    }
}
