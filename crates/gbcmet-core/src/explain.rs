//! Per-feature attribution of a single prediction.

use serde::Serialize;
use thiserror::Error;

use crate::features::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExplainError {
    #[error("tree {tree} has no cover statistics")]
    MissingCover { tree: usize },
    #[error("explanation unsupported: {0}")]
    Unsupported(String),
}

/// One feature's signed push away from the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Contribution {
    pub feature: &'static str,
    /// The feature's encoded value for this patient.
    pub value: f64,
    /// Signed contribution in model output (log-odds) units.
    pub contribution: f64,
}

/// Attribution of one prediction relative to the model's expected output.
///
/// `base_value + Σ contribution` equals the model's raw margin for the row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub base_value: f64,
    pub contributions: [Contribution; FEATURE_COUNT],
}

impl Explanation {
    /// Pair raw attributions (in [`FEATURE_NAMES`] order) with their features.
    pub fn new(base_value: f64, features: &FeatureVector, phi: [f64; FEATURE_COUNT]) -> Self {
        let values = features.as_array();
        let contributions = std::array::from_fn(|i| Contribution {
            feature: FEATURE_NAMES[i],
            value: values[i],
            contribution: phi[i],
        });
        Self {
            base_value,
            contributions,
        }
    }

    /// The margin the explanation adds up to.
    pub fn output_value(&self) -> f64 {
        self.base_value + self.contributions.iter().map(|c| c.contribution).sum::<f64>()
    }

    /// Largest absolute contribution first (waterfall order).
    pub fn sorted_by_magnitude(&self) -> Vec<Contribution> {
        let mut sorted = self.contributions.to_vec();
        sorted.sort_by(|a, b| {
            b.contribution
                .abs()
                .partial_cmp(&a.contribution.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted
    }
}

/// A model that can attribute its own predictions.
pub trait Explainer {
    fn explain(&self, features: &FeatureVector) -> Result<Explanation, ExplainError>;
}

impl<E: Explainer + ?Sized> Explainer for &E {
    fn explain(&self, features: &FeatureVector) -> Result<Explanation, ExplainError> {
        (**self).explain(features)
    }
}
