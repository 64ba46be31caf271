//! Raw form values → [`FeatureVector`].
//!
//! Labels come from selection widgets that may carry a translated suffix
//! ("Male (男性)"), so only the first whitespace-separated token is
//! significant and matching ignores case.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::FeatureVector;

pub const MIN_AGE: i64 = 18;
pub const MAX_AGE: i64 = 100;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("age {0} is outside 18..=100")]
    AgeOutOfRange(i64),
    #[error("lymph node ratio {0} is outside [0, 1]")]
    LnrOutOfRange(f64),
    #[error("unrecognised sex {0:?} (expected Male or Female)")]
    UnknownSex(String),
    #[error("unrecognised T stage {0:?} (expected T1, T2, T3 or T4)")]
    UnknownTStage(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    /// Training encoding: 1 = male, 0 = female.
    pub fn code(self) -> i64 {
        match self {
            Self::Female => 0,
            Self::Male => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Female => "Female",
            Self::Male => "Male",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match leading_token(s).to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            _ => Err(EncodeError::UnknownSex(s.to_string())),
        }
    }
}

/// Pathological tumour extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TStage {
    T1,
    T2,
    T3,
    T4,
}

impl TStage {
    pub const ALL: [TStage; 4] = [Self::T1, Self::T2, Self::T3, Self::T4];

    /// The stage numeral.
    pub fn code(self) -> i64 {
        match self {
            Self::T1 => 1,
            Self::T2 => 2,
            Self::T3 => 3,
            Self::T4 => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::T1 => "T1",
            Self::T2 => "T2",
            Self::T3 => "T3",
            Self::T4 => "T4",
        }
    }
}

impl fmt::Display for TStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TStage {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match leading_token(s).to_ascii_uppercase().as_str() {
            "T1" => Ok(Self::T1),
            "T2" => Ok(Self::T2),
            "T3" => Ok(Self::T3),
            "T4" => Ok(Self::T4),
            _ => Err(EncodeError::UnknownTStage(s.to_string())),
        }
    }
}

/// The four raw values as collected from the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInput {
    pub age: i64,
    pub sex: String,
    pub t_stage: String,
    pub lnr: f64,
}

impl Default for PatientInput {
    /// The form's initial state.
    fn default() -> Self {
        Self {
            age: 65,
            sex: Sex::Female.to_string(),
            t_stage: TStage::T1.to_string(),
            lnr: 0.1,
        }
    }
}

impl PatientInput {
    pub fn new(age: i64, sex: impl Into<String>, t_stage: impl Into<String>, lnr: f64) -> Self {
        Self {
            age,
            sex: sex.into(),
            t_stage: t_stage.into(),
            lnr,
        }
    }

    pub fn encode(&self) -> Result<FeatureVector, EncodeError> {
        encode(self.age, &self.sex, &self.t_stage, self.lnr)
    }
}

/// Encode raw form values into the model's column vector.
pub fn encode(
    age: i64,
    sex_label: &str,
    t_label: &str,
    lnr: f64,
) -> Result<FeatureVector, EncodeError> {
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(EncodeError::AgeOutOfRange(age));
    }
    // NaN fails the range check too.
    if !(0.0..=1.0).contains(&lnr) {
        return Err(EncodeError::LnrOutOfRange(lnr));
    }
    let sex: Sex = sex_label.parse()?;
    let t_stage: TStage = t_label.parse()?;
    Ok(FeatureVector::from_validated(age, sex, t_stage, lnr))
}

fn leading_token(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or("")
}
