//! Model artifact selection by file type.

use std::path::Path;

use gbcmet_core::{
    ExplainError, Explainer, Explanation, FeatureVector, InferenceError, ProbabilityModel,
};
use gbcmet_model::{ModelError, ModelSummary, XgbModel};
#[cfg(feature = "onnx")]
use gbcmet_model::OnnxModel;

/// The classifier loaded at startup.
pub enum Backend {
    Xgb(XgbModel),
    #[cfg(feature = "onnx")]
    Onnx(OnnxModel),
}

impl Backend {
    /// `.onnx` files go to ONNX Runtime (when built with `onnx`), anything
    /// else is read as XGBoost JSON.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        #[cfg(feature = "onnx")]
        if path.extension().is_some_and(|ext| ext == "onnx") {
            return Ok(Self::Onnx(OnnxModel::load(path)?));
        }
        Ok(Self::Xgb(XgbModel::load(path)?))
    }

    /// Tree-ensemble metadata; `None` for opaque backends.
    pub fn summary(&self) -> Option<ModelSummary> {
        match self {
            Self::Xgb(m) => Some(m.summary()),
            #[cfg(feature = "onnx")]
            Self::Onnx(_) => None,
        }
    }
}

impl ProbabilityModel for Backend {
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        match self {
            Self::Xgb(m) => m.predict_probability(features),
            #[cfg(feature = "onnx")]
            Self::Onnx(m) => m.predict_probability(features),
        }
    }
}

impl Explainer for Backend {
    fn explain(&self, features: &FeatureVector) -> Result<Explanation, ExplainError> {
        match self {
            Self::Xgb(m) => m.explain(features),
            #[cfg(feature = "onnx")]
            Self::Onnx(m) => m.explain(features),
        }
    }
}
