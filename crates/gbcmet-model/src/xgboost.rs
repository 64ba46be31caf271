//! Native evaluation of XGBoost models saved as JSON.
//!
//! The artifact is what `Booster.save_model("xgboost_model.json")` writes.
//! Only binary logistic objectives are accepted: the pipeline needs a
//! probability for a single positive class.

use std::path::Path;

use gbcmet_core::classifier::check_probability;
use gbcmet_core::{
    ExplainError, Explainer, Explanation, FEATURE_COUNT, FEATURE_NAMES, FeatureVector,
    InferenceError, ProbabilityModel,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ModelError;
use crate::shap;
use crate::tree::{Node, Tree};

/// Conventional artifact name.
pub const DEFAULT_MODEL_FILE: &str = "xgboost_model.json";

const SUPPORTED_OBJECTIVES: &[&str] = &["binary:logistic", "reg:logistic", "binary:logitraw"];

// ── On-disk format ──

#[derive(Deserialize)]
struct Document {
    learner: Learner,
    #[serde(default)]
    version: Vec<u32>,
}

#[derive(Deserialize)]
struct Learner {
    #[serde(default)]
    feature_names: Vec<String>,
    gradient_booster: Booster,
    learner_model_param: LearnerParam,
    objective: ObjectiveSection,
}

#[derive(Deserialize)]
struct Booster {
    name: String,
    #[serde(default)]
    model: Option<TreeEnsemble>,
    /// DART wraps a plain gbtree and adds per-tree weights.
    #[serde(default)]
    gbtree: Option<Box<Booster>>,
    #[serde(default)]
    weight_drop: Vec<f64>,
}

#[derive(Deserialize)]
struct TreeEnsemble {
    trees: Vec<RawTree>,
    #[serde(default)]
    tree_info: Vec<i64>,
}

#[derive(Deserialize)]
struct LearnerParam {
    base_score: Scalar,
    #[serde(default)]
    num_class: Option<Scalar>,
    #[serde(default)]
    num_feature: Option<Scalar>,
}

#[derive(Deserialize)]
struct ObjectiveSection {
    name: String,
}

/// XGBoost writes learner parameters as strings, sometimes bracketed
/// (`"[5E-1]"`); older writers used bare numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(s) => s
                .trim()
                .trim_start_matches('[')
                .trim_end_matches(']')
                .trim()
                .parse()
                .ok(),
        }
    }

    fn raw(&self) -> String {
        match self {
            Scalar::Number(n) => n.to_string(),
            Scalar::Text(s) => s.clone(),
        }
    }
}

/// `default_left` is `0`/`1` in current writers and `true`/`false` in old ones.
#[derive(Deserialize, Clone, Copy)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(u8),
}

impl Flag {
    fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        }
    }
}

#[derive(Deserialize)]
struct RawTree {
    left_children: Vec<i64>,
    right_children: Vec<i64>,
    split_indices: Vec<i64>,
    split_conditions: Vec<f64>,
    #[serde(default)]
    default_left: Vec<Flag>,
    #[serde(default)]
    sum_hessian: Vec<f64>,
    /// `0` numerical, `1` categorical.
    #[serde(default)]
    split_type: Vec<u8>,
}

impl RawTree {
    fn into_tree(self, tree: usize) -> Result<Tree, ModelError> {
        let malformed = |reason: String| ModelError::MalformedTree { tree, reason };

        let n = self.left_children.len();
        let lengths = [
            ("right_children", self.right_children.len()),
            ("split_indices", self.split_indices.len()),
            ("split_conditions", self.split_conditions.len()),
        ];
        for (name, len) in lengths {
            if len != n {
                return Err(malformed(format!(
                    "{name} has {len} entries, left_children has {n}"
                )));
            }
        }
        if !self.default_left.is_empty() && self.default_left.len() != n {
            return Err(malformed(format!(
                "default_left has {} entries, expected {n}",
                self.default_left.len()
            )));
        }
        if let Some(i) = self.split_type.iter().position(|&t| t != 0) {
            return Err(malformed(format!("node {i} is a categorical split")));
        }
        // Attribution divides by every split node's cover.
        let has_cover = self.sum_hessian.len() == n
            && (0..n).all(|i| self.left_children[i] < 0 || self.sum_hessian[i] > 0.0);

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let cover = if has_cover { self.sum_hessian[i] } else { 0.0 };
            let left = self.left_children[i];
            if left < 0 {
                nodes.push(Node::Leaf {
                    value: self.split_conditions[i],
                    cover,
                });
                continue;
            }
            let right = self.right_children[i];
            let feature = self.split_indices[i];
            if right < 0 || feature < 0 {
                return Err(malformed(format!("node {i} is half a split")));
            }
            nodes.push(Node::Split {
                feature: feature as usize,
                threshold: self.split_conditions[i] as f32,
                left: left as usize,
                right: right as usize,
                default_left: self.default_left.get(i).is_some_and(|f| f.is_set()),
                cover,
            });
        }

        Tree::new(nodes, has_cover).map_err(malformed)
    }
}

// ── Runtime model ──

/// Metadata reported by `gbcmet inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub booster: String,
    pub objective: String,
    pub base_score: f64,
    pub num_trees: usize,
    pub num_nodes: usize,
    pub feature_names: Vec<String>,
    pub has_cover: bool,
    pub xgboost_version: Option<String>,
}

/// A gradient-boosted tree ensemble for binary classification.
///
/// Immutable after load; share it by reference.
#[derive(Debug, Clone)]
pub struct XgbModel {
    trees: Vec<Tree>,
    base_score: f64,
    base_margin: f64,
    booster: String,
    objective: String,
    feature_names: Vec<String>,
    version: Option<String>,
}

impl XgbModel {
    /// Load a model artifact. A missing file is reported as [`ModelError::NotFound`].
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        if !path.exists() {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        let model = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            trees = model.trees.len(),
            objective = %model.objective,
            "loaded model"
        );
        Ok(model)
    }

    /// Parse and validate a model from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let doc: Document = serde_json::from_str(json)?;
        let learner = doc.learner;

        let objective = learner.objective.name;
        if !SUPPORTED_OBJECTIVES.contains(&objective.as_str()) {
            return Err(ModelError::UnsupportedObjective(objective));
        }

        if let Some(num_class) = learner
            .learner_model_param
            .num_class
            .as_ref()
            .and_then(Scalar::as_f64)
            && num_class > 1.0
        {
            return Err(ModelError::MultiClass(num_class as usize));
        }

        check_feature_schema(
            &learner.feature_names,
            learner
                .learner_model_param
                .num_feature
                .as_ref()
                .and_then(Scalar::as_f64),
        )?;

        let base_param = &learner.learner_model_param.base_score;
        let base_score = base_param
            .as_f64()
            .filter(|p| *p > 0.0 && *p < 1.0)
            .ok_or_else(|| ModelError::InvalidBaseScore(base_param.raw()))?;

        let booster_name = learner.gradient_booster.name.clone();
        let (ensemble, weights) = unwrap_booster(learner.gradient_booster)?;

        if let Some(&group) = ensemble.tree_info.iter().find(|&&g| g != 0) {
            return Err(ModelError::MultiClass(group as usize + 1));
        }

        let mut trees = Vec::with_capacity(ensemble.trees.len());
        for (i, raw) in ensemble.trees.into_iter().enumerate() {
            let mut tree = raw.into_tree(i)?;
            if let Some(&w) = weights.get(i) {
                tree.scale_leaves(w);
            }
            trees.push(tree);
        }

        let version = (!doc.version.is_empty()).then(|| {
            doc.version
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(".")
        });

        Ok(Self {
            trees,
            base_score,
            base_margin: logit(base_score),
            booster: booster_name,
            objective,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            version,
        })
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Raw log-odds output for one row.
    pub fn margin(&self, features: &FeatureVector) -> f64 {
        let x = features.as_array();
        self.base_margin + self.trees.iter().map(|t| t.predict(&x)).sum::<f64>()
    }

    /// Model output (log-odds) with no feature information.
    pub fn expected_value(&self) -> f64 {
        self.base_margin + self.trees.iter().map(Tree::expected_value).sum::<f64>()
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            booster: self.booster.clone(),
            objective: self.objective.clone(),
            base_score: self.base_score,
            num_trees: self.trees.len(),
            num_nodes: self.trees.iter().map(Tree::len).sum(),
            feature_names: self.feature_names.clone(),
            has_cover: self.trees.iter().all(Tree::has_cover),
            xgboost_version: self.version.clone(),
        }
    }
}

impl ProbabilityModel for XgbModel {
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        check_probability(sigmoid(self.margin(features)))
    }
}

impl Explainer for XgbModel {
    fn explain(&self, features: &FeatureVector) -> Result<Explanation, ExplainError> {
        if let Some(tree) = self.trees.iter().position(|t| !t.has_cover()) {
            return Err(ExplainError::MissingCover { tree });
        }
        let x = features.as_array();
        let mut phi = [0.0; FEATURE_COUNT];
        for tree in &self.trees {
            shap::tree_shap(tree, &x, &mut phi);
        }
        Ok(Explanation::new(self.expected_value(), features, phi))
    }
}

/// The artifact must describe exactly the encoder's columns, in order.
fn check_feature_schema(names: &[String], num_feature: Option<f64>) -> Result<(), ModelError> {
    if let Some(n) = num_feature
        && n as usize != FEATURE_COUNT
    {
        return Err(ModelError::FeatureCount {
            expected: FEATURE_COUNT,
            found: n as usize,
        });
    }
    if names.is_empty() {
        warn!("model carries no feature names; assuming training column order");
        return Ok(());
    }
    if names.iter().map(String::as_str).ne(FEATURE_NAMES) {
        return Err(ModelError::FeatureMismatch {
            expected: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            found: names.to_vec(),
        });
    }
    Ok(())
}

fn unwrap_booster(booster: Booster) -> Result<(TreeEnsemble, Vec<f64>), ModelError> {
    match booster.name.as_str() {
        "gbtree" => booster
            .model
            .map(|m| (m, Vec::new()))
            .ok_or_else(|| ModelError::UnsupportedBooster("gbtree without model".into())),
        "dart" => {
            let weights = booster.weight_drop;
            let inner = booster
                .gbtree
                .ok_or_else(|| ModelError::UnsupportedBooster("dart without gbtree".into()))?;
            let (ensemble, _) = unwrap_booster(*inner)?;
            Ok((ensemble, weights))
        }
        other => Err(ModelError::UnsupportedBooster(other.to_string())),
    }
}

fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}
