//! The Concord evaluator: the deterministic stage runner.
//!
//! The evaluator enforces the pipeline order:
//!
//!   response text → Extract → Match → Validate → Score
//!
//! Data flows strictly forward. The extractor and the given call list
//! feed the matcher; the matcher's pairing feeds the validator; the
//! scorer consumes the validator's report, never the raw text. No stage
//! performs I/O once invoked, so callers may fan out whole evaluations
//! across threads with no coordination.

use chrono::Utc;
use tracing::{debug, info};

use concord_contracts::{
    action::{ActionLog, ToolCall},
    behavior::ExpectedBehavior,
    evaluation::{Evaluation, EvaluationId},
};

use crate::traits::{ClaimExtraction, CorrespondenceMatching, Scoring, Validation};

/// The central evaluator that drives a single evaluation run.
///
/// Owns one implementation of each stage trait and runs them in the
/// fixed order on every call to `evaluate()`. Construct once and reuse —
/// the evaluator itself is stateless between runs.
pub struct Evaluator {
    extractor: Box<dyn ClaimExtraction>,
    matcher: Box<dyn CorrespondenceMatching>,
    validator: Box<dyn Validation>,
    scorer: Box<dyn Scoring>,
}

impl Evaluator {
    /// Create a new evaluator from the four stage implementations.
    pub fn new(
        extractor: Box<dyn ClaimExtraction>,
        matcher: Box<dyn CorrespondenceMatching>,
        validator: Box<dyn Validation>,
        scorer: Box<dyn Scoring>,
    ) -> Self {
        Self {
            extractor,
            matcher,
            validator,
            scorer,
        }
    }

    /// Run one full evaluation.
    ///
    /// `response_text` is the agent's narration; `calls` is the
    /// already-parsed call log from the model-calling collaborator
    /// (provider normalization is out of scope here). The call list is
    /// normalized into an `ActionLog` and treated as immutable from then
    /// on.
    pub fn evaluate(
        &self,
        behavior: &ExpectedBehavior,
        response_text: &str,
        calls: Vec<ToolCall>,
    ) -> Evaluation {
        let id = EvaluationId::new();

        debug!(
            evaluation_id = %id.0,
            call_count = calls.len(),
            text_len = response_text.len(),
            "evaluation starting"
        );

        let action_log = ActionLog::from_calls(calls);

        let claim_log = self
            .extractor
            .extract(response_text, &behavior.declared_tools());
        debug!(
            evaluation_id = %id.0,
            total_claims = claim_log.total_claims,
            "claims extracted"
        );

        let matching = self.matcher.pair(&claim_log, &action_log);
        debug!(
            evaluation_id = %id.0,
            pairs = matching.pairs.len(),
            unmatched_claims = matching.unmatched_claims.len(),
            unmatched_calls = matching.unmatched_calls.len(),
            "correspondence matching complete"
        );

        let report = self
            .validator
            .validate(behavior, &action_log, &claim_log, &matching);
        debug!(
            evaluation_id = %id.0,
            status = ?report.status,
            total_issues = report.summary.total_issues,
            "validation complete"
        );

        let score = self.scorer.score(&report, &action_log, behavior);
        info!(
            evaluation_id = %id.0,
            total = score.total,
            grade = %score.grade,
            status = ?score.status,
            "evaluation complete"
        );

        Evaluation {
            id,
            generated_at: Utc::now(),
            action_log,
            claim_log,
            matching,
            report,
            score,
        }
    }
}
