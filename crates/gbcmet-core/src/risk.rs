//! Probability → risk category.

use serde::Serialize;

/// Youden-optimal cutoff from the validation cohort.
pub const RISK_THRESHOLD: f64 = 0.546;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    LowRisk,
    HighRisk,
}

impl RiskLevel {
    /// `HighRisk` iff `p >= RISK_THRESHOLD`.
    pub fn from_probability(p: f64) -> Self {
        if p >= RISK_THRESHOLD {
            Self::HighRisk
        } else {
            Self::LowRisk
        }
    }

    pub fn is_high(self) -> bool {
        self == Self::HighRisk
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::LowRisk => "Low Risk",
            Self::HighRisk => "High Risk",
        }
    }

    /// Follow-up advice shown next to the badge.
    pub fn recommendation(self) -> &'static str {
        match self {
            Self::LowRisk => "Routine follow-up.",
            Self::HighRisk => "Close follow-up; consider further examination.",
        }
    }
}

/// Render a probability as a percentage with two decimals, e.g. `"30.00%"`.
pub fn format_percent(p: f64) -> String {
    format!("{:.2}%", p * 100.0)
}
