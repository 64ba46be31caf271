//! encode → infer → classify → (explain), once per interaction.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::classifier::{InferenceError, ProbabilityModel, check_probability};
use crate::encoder::{EncodeError, PatientInput};
use crate::explain::{Explainer, Explanation};
use crate::features::FeatureVector;
use crate::risk::{RiskLevel, format_percent};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    Encode(#[from] EncodeError),
    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),
}

/// Explanation result. A failed explanation never hides the prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExplanationOutcome {
    Available(Explanation),
    Unavailable { reason: String },
}

/// Everything shown to the user for one set of inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub features: FeatureVector,
    pub probability: f64,
    /// `probability` rendered as a percentage, e.g. `"30.00%"`.
    pub display_probability: String,
    pub risk: RiskLevel,
    pub recommendation: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<ExplanationOutcome>,
}

/// Runs assessments against a model that was loaded once at startup.
pub struct RiskPipeline<'m, M: ?Sized> {
    model: &'m M,
}

impl<'m, M: ProbabilityModel + ?Sized> RiskPipeline<'m, M> {
    pub fn new(model: &'m M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &'m M {
        self.model
    }

    /// Encode, score and classify one patient.
    pub fn assess(&self, input: &PatientInput) -> Result<Assessment, PipelineError> {
        let features = input.encode()?;
        self.assess_features(&features)
    }

    /// Score and classify an already-encoded row.
    pub fn assess_features(&self, features: &FeatureVector) -> Result<Assessment, PipelineError> {
        let probability = check_probability(self.model.predict_probability(features)?)?;
        let risk = RiskLevel::from_probability(probability);
        debug!(?features, probability, ?risk, "assessed");
        Ok(Assessment {
            features: *features,
            probability,
            display_probability: format_percent(probability),
            risk,
            recommendation: risk.recommendation(),
            explanation: None,
        })
    }
}

impl<'m, M: ProbabilityModel + Explainer + ?Sized> RiskPipeline<'m, M> {
    /// [`assess`](Self::assess) plus a per-feature attribution.
    pub fn assess_with_explanation(
        &self,
        input: &PatientInput,
    ) -> Result<Assessment, PipelineError> {
        let features = input.encode()?;
        let mut assessment = self.assess_features(&features)?;
        let outcome = match self.model.explain(&features) {
            Ok(explanation) => ExplanationOutcome::Available(explanation),
            Err(e) => {
                warn!(error = %e, "explanation unavailable");
                ExplanationOutcome::Unavailable {
                    reason: e.to_string(),
                }
            }
        };
        assessment.explanation = Some(outcome);
        Ok(assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explain::ExplainError;
    use crate::features::FEATURE_COUNT;
    use std::cell::Cell;

    /// Returns a fixed probability and counts calls.
    struct Fixed {
        p: f64,
        calls: Cell<usize>,
    }

    impl Fixed {
        fn new(p: f64) -> Self {
            Self {
                p,
                calls: Cell::new(0),
            }
        }
    }

    impl ProbabilityModel for Fixed {
        fn predict_probability(&self, _: &FeatureVector) -> Result<f64, InferenceError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.p)
        }
    }

    impl Explainer for Fixed {
        fn explain(&self, features: &FeatureVector) -> Result<Explanation, ExplainError> {
            Ok(Explanation::new(0.0, features, [0.1; FEATURE_COUNT]))
        }
    }

    struct NoExplain;

    impl ProbabilityModel for NoExplain {
        fn predict_probability(&self, _: &FeatureVector) -> Result<f64, InferenceError> {
            Ok(0.7)
        }
    }

    impl Explainer for NoExplain {
        fn explain(&self, _: &FeatureVector) -> Result<Explanation, ExplainError> {
            Err(ExplainError::MissingCover { tree: 3 })
        }
    }

    fn reference_patient() -> PatientInput {
        PatientInput::new(65, "Female", "T2", 0.10)
    }

    #[test]
    fn low_risk_scenario() {
        let model = Fixed::new(0.30);
        let a = RiskPipeline::new(&model).assess(&reference_patient()).unwrap();
        assert_eq!(a.features.as_array(), [65.0, 0.0, 2.0, 0.10]);
        assert_eq!(a.risk, RiskLevel::LowRisk);
        assert_eq!(a.display_probability, "30.00%");
        assert_eq!(a.recommendation, "Routine follow-up.");
        assert!(a.explanation.is_none());
    }

    #[test]
    fn high_risk_scenario() {
        let model = Fixed::new(0.60);
        let a = RiskPipeline::new(&model).assess(&reference_patient()).unwrap();
        assert_eq!(a.risk, RiskLevel::HighRisk);
        assert_eq!(a.display_probability, "60.00%");
    }

    #[test]
    fn repeated_assessment_is_identical() {
        let model = Fixed::new(0.42);
        let pipeline = RiskPipeline::new(&model);
        let first = pipeline.assess(&reference_patient()).unwrap();
        let second = pipeline.assess(&reference_patient()).unwrap();
        assert_eq!(first, second);
        assert_eq!(model.calls.get(), 2);
    }

    #[test]
    fn invalid_input_skips_inference() {
        let model = Fixed::new(0.5);
        let err = RiskPipeline::new(&model)
            .assess(&PatientInput::new(65, "Female", "T9", 0.1))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Encode(EncodeError::UnknownTStage(_))));
        assert_eq!(model.calls.get(), 0);
    }

    #[test]
    fn out_of_range_probability_is_an_error() {
        let model = Fixed::new(1.2);
        let err = RiskPipeline::new(&model)
            .assess(&reference_patient())
            .unwrap_err();
        assert_eq!(
            err,
            PipelineError::Inference(InferenceError::InvalidProbability(1.2))
        );
    }

    #[test]
    fn explanation_attached() {
        let model = Fixed::new(0.2);
        let a = RiskPipeline::new(&model)
            .assess_with_explanation(&reference_patient())
            .unwrap();
        match a.explanation {
            Some(ExplanationOutcome::Available(e)) => {
                assert!((e.output_value() - 0.4).abs() < 1e-12)
            }
            other => panic!("expected explanation, got {other:?}"),
        }
    }

    #[test]
    fn failed_explanation_keeps_prediction() {
        let a = RiskPipeline::new(&NoExplain)
            .assess_with_explanation(&reference_patient())
            .unwrap();
        assert_eq!(a.risk, RiskLevel::HighRisk);
        assert_eq!(a.display_probability, "70.00%");
        assert_eq!(
            a.explanation,
            Some(ExplanationOutcome::Unavailable {
                reason: "tree 3 has no cover statistics".into()
            })
        );
    }

    #[test]
    fn works_through_trait_objects() {
        let model: Box<dyn ProbabilityModel> = Box::new(Fixed::new(0.1));
        let a = RiskPipeline::new(model.as_ref())
            .assess(&reference_patient())
            .unwrap();
        assert_eq!(a.risk, RiskLevel::LowRisk);
    }

    #[test]
    fn assessment_json_shape() {
        let model = Fixed::new(0.6);
        let a = RiskPipeline::new(&model)
            .assess_with_explanation(&reference_patient())
            .unwrap();
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["risk"], "HIGH_RISK");
        assert_eq!(json["display_probability"], "60.00%");
        assert_eq!(json["features"]["T_Code"], 2);
        assert_eq!(json["explanation"]["status"], "available");
        assert_eq!(json["explanation"]["contributions"][3]["feature"], "LNR");
    }
}
