//! Validation findings: structured issues, not exceptions.
//!
//! Agent misbehavior is first-class data. The pipeline never aborts
//! because an agent behaved badly — every check appends findings and the
//! run always proceeds to scoring. Even a structurally malformed call
//! log entry becomes a finding (`MalformedArguments`) rather than a
//! fault.

use serde::{Deserialize, Serialize};

/// How serious a finding is.
///
/// A single CRITICAL finding forces the overall run status to FAIL
/// regardless of everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// The taxonomy of issues the validation engine can report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FindingKind {
    /// A tool in `required_tools` was never called.
    MissingRequiredTool { tool: String },

    /// A call named a tool in `forbidden_tools`.
    ForbiddenToolUsed { tool: String, sequence_number: u32 },

    /// A declared parameter expectation was not met.
    ParameterMismatch {
        tool: String,
        parameter: String,
        expected: serde_json::Value,
        /// The value actually passed, absent when the parameter (or the
        /// whole call) was missing.
        actual: Option<serde_json::Value>,
    },

    /// The first-occurrence tool order deviated from `expected_sequence`.
    SequenceDeviation {
        expected: Vec<String>,
        actual: Vec<String>,
        /// Number of positions at which the orders disagree.
        deviations: usize,
    },

    /// A non-conditional claim above the confidence threshold matched no
    /// call: a hallucination.
    ClaimWithoutAction {
        claim: String,
        expected_tool: Option<String>,
        confidence: f64,
    },

    /// A call matched no claim: a silent action.
    ActionWithoutClaim { tool: String, sequence_number: u32 },

    /// A call's arguments could not be interpreted as a string-keyed map.
    /// This is malformed structural input, not agent misbehavior, and is
    /// the only finding kind reserved for faults.
    MalformedArguments { tool: String, sequence_number: u32 },

    /// Fewer total calls than `min_tool_calls`.
    TooFewCalls { minimum: u32, actual: usize },

    /// More total calls than `max_tool_calls`.
    TooManyCalls { maximum: u32, actual: usize },
}

/// One validation issue with its severity and a human-readable account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(flatten)]
    pub kind: FindingKind,
    pub severity: Severity,
    pub explanation: String,
}

impl Finding {
    pub fn new(kind: FindingKind, severity: Severity, explanation: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            explanation: explanation.into(),
        }
    }
}
