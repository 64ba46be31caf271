pub mod classifier;
pub mod encoder;
pub mod explain;
pub mod features;
pub mod pipeline;
pub mod risk;
pub mod schema;

pub use classifier::{InferenceError, ProbabilityModel};
pub use encoder::{EncodeError, PatientInput, Sex, TStage, encode};
pub use explain::{Contribution, ExplainError, Explainer, Explanation};
pub use features::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector};
pub use pipeline::{Assessment, ExplanationOutcome, PipelineError, RiskPipeline};
pub use risk::{RISK_THRESHOLD, RiskLevel, format_percent};
pub use schema::input;
