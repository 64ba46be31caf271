//! The model's input row.
//!
//! The classifier was trained on a four-column frame and evaluates columns
//! positionally. Reordering or renaming a column does not raise anywhere; it
//! just silently produces wrong probabilities. [`FEATURE_NAMES`] is therefore
//! the single source of truth for column order, and loaders check artifacts
//! against it.

use serde::Serialize;

use crate::encoder::{Sex, TStage};

/// Number of model input columns.
pub const FEATURE_COUNT: usize = 4;

/// Training column names, in training order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = ["Age_Numeric", "Sex_Code", "T_Code", "LNR"];

/// An encoded patient row, ready for inference.
///
/// Only constructible through the encoder, so every value is inside its
/// declared domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    #[serde(rename = "Age_Numeric")]
    age_numeric: i64,
    #[serde(rename = "Sex_Code")]
    sex_code: i64,
    #[serde(rename = "T_Code")]
    t_code: i64,
    #[serde(rename = "LNR")]
    lnr: f64,
}

impl FeatureVector {
    pub(crate) fn from_validated(age: i64, sex: Sex, t_stage: TStage, lnr: f64) -> Self {
        Self {
            age_numeric: age,
            sex_code: sex.code(),
            t_code: t_stage.code(),
            lnr,
        }
    }

    /// Age in years (18–100).
    pub fn age_numeric(&self) -> i64 {
        self.age_numeric
    }

    /// 1 = male, 0 = female.
    pub fn sex_code(&self) -> i64 {
        self.sex_code
    }

    /// T stage numeral (1–4).
    pub fn t_code(&self) -> i64 {
        self.t_code
    }

    /// Lymph node ratio in [0, 1].
    pub fn lnr(&self) -> f64 {
        self.lnr
    }

    pub fn sex(&self) -> Sex {
        if self.sex_code == 1 { Sex::Male } else { Sex::Female }
    }

    pub fn t_stage(&self) -> TStage {
        match self.t_code {
            1 => TStage::T1,
            2 => TStage::T2,
            3 => TStage::T3,
            _ => TStage::T4,
        }
    }

    /// Values in [`FEATURE_NAMES`] order, as the model consumes them.
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.age_numeric as f64,
            self.sex_code as f64,
            self.t_code as f64,
            self.lnr,
        ]
    }

    /// `(column name, value)` pairs in training order.
    pub fn columns(&self) -> [(&'static str, f64); FEATURE_COUNT] {
        let values = self.as_array();
        [
            (FEATURE_NAMES[0], values[0]),
            (FEATURE_NAMES[1], values[1]),
            (FEATURE_NAMES[2], values[2]),
            (FEATURE_NAMES[3], values[3]),
        ]
    }
}
