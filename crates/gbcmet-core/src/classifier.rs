//! The inference seam.
//!
//! The pipeline only needs a positive-class probability for one row; how the
//! model is stored or evaluated is up to the implementation.

use thiserror::Error;

use crate::features::FeatureVector;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("model returned invalid probability {0}")]
    InvalidProbability(f64),
    #[error("inference backend failed: {0}")]
    Backend(String),
}

/// A loaded binary classifier.
pub trait ProbabilityModel {
    /// Probability of the positive ("metastasis") class, in [0, 1].
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64, InferenceError>;
}

impl<M: ProbabilityModel + ?Sized> ProbabilityModel for &M {
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        (**self).predict_probability(features)
    }
}

impl<M: ProbabilityModel + ?Sized> ProbabilityModel for Box<M> {
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        (**self).predict_probability(features)
    }
}

/// Reject NaN and values outside [0, 1].
pub fn check_probability(p: f64) -> Result<f64, InferenceError> {
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(InferenceError::InvalidProbability(p))
    }
}
