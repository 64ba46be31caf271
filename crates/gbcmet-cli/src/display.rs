//! Text rendering of assessments.
//!
//! Mirrors the calculator page: input echo table, probability bar, risk
//! badge with recommendation, and an attribution waterfall.

use std::fmt::Write;

use arrow::util::pretty::pretty_format_batches;
use gbcmet_core::{
    Assessment, ExplanationOutcome, Explanation, FeatureVector, RISK_THRESHOLD, format_percent,
    input,
};
use gbcmet_model::ModelSummary;

const BAR_WIDTH: usize = 30;
const WATERFALL_WIDTH: usize = 24;

pub const TITLE: &str = "Prediction System for Gallbladder Cancer Distant Metastasis";
pub const FOOTER: &str = "For Research Use Only.";

// ── Public API ──

/// The "User Input Parameters" table.
pub fn render_inputs(features: &FeatureVector) -> anyhow::Result<String> {
    let batch = input::display_batch(features)?;
    Ok(pretty_format_batches(&[batch])?.to_string())
}

/// Full text card for one assessment.
pub fn render_assessment(assessment: &Assessment) -> anyhow::Result<String> {
    let mut out = String::new();

    writeln!(out, "=== {TITLE} ===")?;
    writeln!(out)?;
    writeln!(out, "1. User Input Parameters")?;
    writeln!(out, "{}", render_inputs(&assessment.features)?)?;
    writeln!(out)?;
    out.push_str(&render_result(assessment)?);

    if let Some(outcome) = &assessment.explanation {
        writeln!(out)?;
        out.push_str(&render_explanation(outcome)?);
    }

    writeln!(out)?;
    writeln!(out, "---")?;
    writeln!(out, "{FOOTER}")?;
    Ok(out)
}

/// Probability bar, badge and recommendation.
pub fn render_result(assessment: &Assessment) -> anyhow::Result<String> {
    let mut out = String::new();
    let badge = if assessment.risk.is_high() { "[!]" } else { "[ok]" };

    writeln!(out, "2. Prediction Result")?;
    writeln!(out, "  {}", progress_bar(assessment.probability, BAR_WIDTH))?;
    writeln!(
        out,
        "  {:<26} {}",
        "Predicted probability", assessment.display_probability
    )?;
    writeln!(
        out,
        "  {:<26} {} {} (threshold {})",
        "Risk",
        badge,
        assessment.risk.label(),
        format_percent(RISK_THRESHOLD)
    )?;
    writeln!(out, "  {:<26} {}", "Recommendation", assessment.recommendation)?;
    Ok(out)
}

/// Attribution waterfall, or the reason it is missing.
pub fn render_explanation(outcome: &ExplanationOutcome) -> anyhow::Result<String> {
    match outcome {
        ExplanationOutcome::Available(explanation) => render_waterfall(explanation),
        ExplanationOutcome::Unavailable { reason } => Ok(format!(
            "3. Feature Attribution\n  warning: attribution unavailable ({reason})\n"
        )),
    }
}

/// Model metadata for `gbcmet inspect`.
pub fn render_summary(summary: &ModelSummary) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(out, "{:<18} {}", "booster", summary.booster)?;
    writeln!(out, "{:<18} {}", "objective", summary.objective)?;
    writeln!(out, "{:<18} {}", "base_score", summary.base_score)?;
    writeln!(out, "{:<18} {}", "trees", summary.num_trees)?;
    writeln!(out, "{:<18} {}", "nodes", summary.num_nodes)?;
    writeln!(out, "{:<18} {}", "features", summary.feature_names.join(", "))?;
    writeln!(
        out,
        "{:<18} {}",
        "attribution",
        if summary.has_cover { "yes" } else { "no (cover missing)" }
    )?;
    if let Some(v) = &summary.xgboost_version {
        writeln!(out, "{:<18} {}", "xgboost", v)?;
    }
    Ok(out)
}

// ── Helpers ──

fn render_waterfall(explanation: &Explanation) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(out, "3. Feature Attribution (log-odds)")?;
    writeln!(out, "  {:<26} {:>+9.4}", "E[f(x)]", explanation.base_value)?;

    let sorted = explanation.sorted_by_magnitude();
    let scale = sorted
        .first()
        .map(|c| c.contribution.abs())
        .filter(|m| *m > 0.0)
        .unwrap_or(1.0);

    for c in &sorted {
        let label = format!("{} = {}", c.feature, c.value);
        let len = ((c.contribution.abs() / scale) * WATERFALL_WIDTH as f64).round() as usize;
        let glyph = if c.contribution >= 0.0 { '+' } else { '-' };
        let bar: String = std::iter::repeat_n(glyph, len).collect();
        writeln!(out, "  {:<26} {:>+9.4}  {}", label, c.contribution, bar)?;
    }

    writeln!(out, "  {:<26} {:>+9.4}", "f(x)", explanation.output_value())?;
    Ok(out)
}

/// `[#########.....................]` for a probability in [0, 1].
pub fn progress_bar(p: f64, width: usize) -> String {
    let filled = ((p.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbcmet_core::{
        ExplainError, Explainer, InferenceError, PatientInput, ProbabilityModel, RiskPipeline,
    };

    struct Fixed(f64);

    impl ProbabilityModel for Fixed {
        fn predict_probability(&self, _: &FeatureVector) -> Result<f64, InferenceError> {
            Ok(self.0)
        }
    }

    impl Explainer for Fixed {
        fn explain(&self, x: &FeatureVector) -> Result<Explanation, ExplainError> {
            Ok(Explanation::new(-0.2, x, [0.05, 0.0, -0.3, 0.6]))
        }
    }

    fn assess(p: f64, explain: bool) -> Assessment {
        let model = Fixed(p);
        let pipeline = RiskPipeline::new(&model);
        let input = PatientInput::new(65, "Female", "T2", 0.10);
        if explain {
            pipeline.assess_with_explanation(&input).unwrap()
        } else {
            pipeline.assess(&input).unwrap()
        }
    }

    #[test]
    fn progress_bar_bounds() {
        assert_eq!(progress_bar(0.0, 4), "[....]");
        assert_eq!(progress_bar(0.5, 4), "[##..]");
        assert_eq!(progress_bar(1.0, 4), "[####]");
        assert_eq!(progress_bar(1.7, 4), "[####]");
    }

    #[test]
    fn input_table_shows_labels() {
        let x = gbcmet_core::encode(65, "Female", "T2", 0.1).unwrap();
        let table = render_inputs(&x).unwrap();
        assert!(table.contains("Age_Numeric"));
        assert!(table.contains("Female"));
        assert!(table.contains("T2"));
        assert!(table.contains("0.1"));
    }

    #[test]
    fn low_risk_card() {
        let card = render_assessment(&assess(0.30, false)).unwrap();
        assert!(card.contains("30.00%"));
        assert!(card.contains("Low Risk"));
        assert!(card.contains("Routine follow-up."));
        assert!(card.contains("54.60%"));
        assert!(!card.contains("Feature Attribution"));
        assert!(card.ends_with("For Research Use Only.\n"));
    }

    #[test]
    fn high_risk_card() {
        let card = render_assessment(&assess(0.60, false)).unwrap();
        assert!(card.contains("60.00%"));
        assert!(card.contains("[!] High Risk"));
        assert!(card.contains("Close follow-up"));
    }

    #[test]
    fn waterfall_largest_first() {
        let text = render_explanation(assess(0.4, true).explanation.as_ref().unwrap()).unwrap();
        let lnr = text.find("LNR").unwrap();
        let t = text.find("T_Code").unwrap();
        let age = text.find("Age_Numeric").unwrap();
        assert!(lnr < t && t < age, "{text}");
        assert!(text.contains(&"+".repeat(WATERFALL_WIDTH)));
        assert!(text.contains("f(x)"));
    }

    #[test]
    fn unavailable_explanation_warns() {
        let text = render_explanation(&ExplanationOutcome::Unavailable {
            reason: "tree 0 has no cover statistics".into(),
        })
        .unwrap();
        assert!(text.contains("warning: attribution unavailable"));
        assert!(text.contains("tree 0"));
    }

    #[test]
    fn summary_flags_missing_cover() {
        let summary = ModelSummary {
            booster: "gbtree".into(),
            objective: "binary:logistic".into(),
            base_score: 0.5,
            num_trees: 3,
            num_nodes: 17,
            feature_names: gbcmet_core::FEATURE_NAMES.map(String::from).to_vec(),
            has_cover: false,
            xgboost_version: None,
        };
        let text = render_summary(&summary).unwrap();
        assert!(text.contains("Age_Numeric, Sex_Code, T_Code, LNR"));
        assert!(text.contains("no (cover missing)"));
        assert!(!text.contains("xgboost "));
    }
}
