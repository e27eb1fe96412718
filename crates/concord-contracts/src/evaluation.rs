//! Evaluation identity and the combined pipeline output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    action::ActionLog, claim::ClaimLog, correspondence::MatchingOutcome,
    report::ValidationReport, score::Score,
};

/// Unique identifier for a single evaluation run.
///
/// All data produced by one run — claims, pairings, findings, score — is
/// local to that run; the id is the only thing tying the outputs
/// together for callers that fan out many evaluations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvaluationId(pub uuid::Uuid);

impl EvaluationId {
    /// Create a new, unique evaluation ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for EvaluationId {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything one pipeline run produced.
///
/// The claim log, validation report, and score are the three structures
/// exposed to report-formatting collaborators; the action log and the
/// matching outcome are included so renderers can show pairings without
/// re-deriving them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: EvaluationId,
    /// Wall-clock completion time. Not part of the deterministic core —
    /// the score itself is a pure function of the inputs.
    pub generated_at: DateTime<Utc>,
    pub action_log: ActionLog,
    pub claim_log: ClaimLog,
    pub matching: MatchingOutcome,
    pub report: ValidationReport,
    pub score: Score,
}
