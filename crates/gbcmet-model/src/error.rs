use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model file not found: {0}")]
    NotFound(PathBuf),

    #[error("reading model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("model JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported booster {0:?} (expected gbtree or dart)")]
    UnsupportedBooster(String),

    #[error("unsupported objective {0:?}")]
    UnsupportedObjective(String),

    #[error("multi-class models are not supported (num_class = {0})")]
    MultiClass(usize),

    #[error("model features {found:?} do not match training columns {expected:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("model expects {found} features, encoder produces {expected}")]
    FeatureCount { expected: usize, found: usize },

    #[error("invalid base_score {0:?}")]
    InvalidBaseScore(String),

    #[error("tree {tree}: {reason}")]
    MalformedTree { tree: usize, reason: String },

    #[cfg(feature = "onnx")]
    #[error("onnx runtime error: {0}")]
    Onnx(#[from] ort::Error),

    #[error("{0}")]
    Other(String),
}
