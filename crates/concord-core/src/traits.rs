//! Core trait definitions for the Concord evaluation pipeline.
//!
//! These four traits define the stage seams:
//!
//! - `ClaimExtraction`        — free text → ordered claim log
//! - `CorrespondenceMatching` — claims × calls → bipartite pairing
//! - `Validation`             — pairing + expectations → findings
//! - `Scoring`                — findings + call counts → rubric score
//!
//! Every stage is a pure function of its inputs: no I/O, no shared
//! mutable state, no suspension points. The evaluator wires them
//! together in strictly forward order, and none of the signatures can
//! fail — agent misbehavior flows through as findings, never as errors.

use std::collections::BTreeSet;

use concord_contracts::{
    action::ActionLog,
    behavior::ExpectedBehavior,
    claim::ClaimLog,
    correspondence::MatchingOutcome,
    report::ValidationReport,
    score::Score,
};

/// Rule-based extraction of claimed actions from response text.
///
/// Extraction is best-effort and deterministic: a sentence matching no
/// intent pattern yields no claim, never an error. Reproducibility of
/// the final score matters more than linguistic completeness.
pub trait ClaimExtraction: Send + Sync {
    /// Scan `response_text` and produce the deduplicated, ordered claim
    /// log. `declared_tools` is the scenario's full tool vocabulary,
    /// used to break ties when a verb maps to several tools.
    fn extract(&self, response_text: &str, declared_tools: &BTreeSet<String>) -> ClaimLog;
}

/// Pairing of claims to calls — the shared primitive behind both
/// hallucination and silent-action detection.
pub trait CorrespondenceMatching: Send + Sync {
    /// Produce a maximal one-to-one pairing plus the unmatched residue.
    ///
    /// Implementations must be order-sensitive and deterministic:
    /// earlier claims get first pick of same-tool calls, and no claim or
    /// call may appear in more than one pair.
    fn pair(&self, claims: &ClaimLog, actions: &ActionLog) -> MatchingOutcome;
}

/// The requirement and consistency checks over one scenario run.
pub trait Validation: Send + Sync {
    /// Run every check against the (expectations, calls, claims,
    /// pairing) quadruple and accumulate findings. Inputs are never
    /// mutated; the run never aborts because the agent behaved badly.
    fn validate(
        &self,
        behavior: &ExpectedBehavior,
        actions: &ActionLog,
        claims: &ClaimLog,
        matching: &MatchingOutcome,
    ) -> ValidationReport;
}

/// The fixed weighted rubric.
pub trait Scoring: Send + Sync {
    /// Map the validation report and raw call counts to six weighted
    /// subscores, a total in [0, 10], and a letter grade. Must be
    /// bit-for-bit reproducible on identical inputs.
    fn score(
        &self,
        report: &ValidationReport,
        actions: &ActionLog,
        behavior: &ExpectedBehavior,
    ) -> Score;
}
