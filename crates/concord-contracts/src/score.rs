//! The scoring rubric's output types.
//!
//! A `Score` is derived purely from the validation report and raw call
//! counts. Re-running on identical inputs must reproduce the same score
//! bit for bit, so nothing in here carries wall-clock state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::report::ValidationStatus;

/// Letter grade bands over the total score.
///
/// Half-open intervals with the upper band winning at the boundary:
/// [9,10] → A+, [8,9) → A, [7,8) → B, [6,7) → C, [5,6) → D, [0,5) → F.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Map a total in [0, 10] to its grade band.
    pub fn from_total(total: f64) -> Self {
        if total >= 9.0 {
            Grade::APlus
        } else if total >= 8.0 {
            Grade::A
        } else if total >= 7.0 {
            Grade::B
        } else if total >= 6.0 {
            Grade::C
        } else if total >= 5.0 {
            Grade::D
        } else {
            Grade::F
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(s)
    }
}

/// One weighted criterion's result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscore {
    /// Display name of the criterion (e.g. "Tool Selection Accuracy").
    pub criterion: String,
    /// Raw score in [0, 10].
    pub score: f64,
    /// The criterion's weight in the rubric.
    pub weight: f64,
    /// `score / 10 × weight` — the contribution to the total.
    pub weighted: f64,
    /// Human-readable account of how the score was reached.
    pub explanation: String,
}

/// The final rubric output for one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Weighted total in [0, 10], rounded to two decimals.
    pub total: f64,
    /// Subscores keyed by criterion identifier ("tool_selection", …).
    pub subscores: BTreeMap<String, Subscore>,
    pub grade: Grade,
    /// Mirrors the validation report's status.
    pub status: ValidationStatus,
}
