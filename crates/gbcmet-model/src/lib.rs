//! Model backends: native XGBoost tree ensembles with TreeSHAP, optional ONNX Runtime.

mod error;
pub mod shap;
pub mod tree;
pub mod xgboost;

pub use error::ModelError;
pub use tree::{Node, Tree};
pub use xgboost::{DEFAULT_MODEL_FILE, ModelSummary, XgbModel};

#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
pub use onnx::OnnxModel;

#[cfg(test)]
mod fixtures;
