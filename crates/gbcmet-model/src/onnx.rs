//! ONNX Runtime backend for classifiers exported with `onnxmltools`.
//!
//! Expects a single float input of shape `[N, 4]` and a `probabilities`
//! output of shape `[N, 2]` (export with `zipmap=False`).

use std::path::Path;
use std::sync::Mutex;

use gbcmet_core::classifier::check_probability;
use gbcmet_core::{
    ExplainError, Explainer, Explanation, FEATURE_COUNT, FeatureVector, InferenceError,
    ProbabilityModel,
};
use ort::session::Session;
use ort::value::Tensor;
use tracing::info;

use crate::error::ModelError;

const PROBABILITY_OUTPUT: &str = "probabilities";

/// Binary classifier evaluated by ONNX Runtime.
pub struct OnnxModel {
    // `Session::run` needs `&mut`.
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxModel {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        if !path.exists() {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }
        let session = Session::builder()?.commit_from_file(path)?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .ok_or_else(|| ModelError::Other("onnx model has no inputs".into()))?;
        let output_name = session
            .outputs()
            .iter()
            .map(|o| o.name().to_string())
            .find(|n| n == PROBABILITY_OUTPUT)
            .or_else(|| session.outputs().last().map(|o| o.name().to_string()))
            .ok_or_else(|| ModelError::Other("onnx model has no outputs".into()))?;

        info!(model = %path.display(), input = %input_name, output = %output_name, "loaded onnx model");
        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }
}

impl ProbabilityModel for OnnxModel {
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        let backend = |e: ort::Error| InferenceError::Backend(e.to_string());

        let row: Vec<f32> = features.as_array().iter().map(|&v| v as f32).collect();
        let input = Tensor::from_array(([1i64, FEATURE_COUNT as i64], row.into_boxed_slice()))
            .map_err(backend)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::Backend("onnx session lock poisoned".into()))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(backend)?;

        let (shape, data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(backend)?;
        let dims: &[i64] = shape;
        // [1, 2] → class 1 probability; [1] or [1, 1] → already positive-class.
        let p = match dims.last() {
            Some(&2) => data.get(1),
            _ => data.first(),
        }
        .copied()
        .ok_or_else(|| InferenceError::Backend(format!("empty output, shape {dims:?}")))?;

        check_probability(p as f64)
    }
}

impl Explainer for OnnxModel {
    fn explain(&self, _: &FeatureVector) -> Result<Explanation, ExplainError> {
        Err(ExplainError::Unsupported(
            "onnx models do not expose tree structure".into(),
        ))
    }
}
