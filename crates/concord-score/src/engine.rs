//! The weighted scoring rubric.
//!
//! Six criteria, fixed weights summing to 10. Every subscore is derived
//! from the validation report and raw call counts alone, so identical
//! inputs reproduce the same `Score` bit for bit.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use concord_contracts::{
    action::ActionLog,
    behavior::ExpectedBehavior,
    finding::FindingKind,
    report::ValidationReport,
    score::{Grade, Score, Subscore},
};
use concord_core::traits::Scoring;

const WEIGHT_TOOL_SELECTION: f64 = 2.5;
const WEIGHT_PARAMETERS: f64 = 1.5;
const WEIGHT_SEQUENCE: f64 = 1.5;
const WEIGHT_CONSISTENCY: f64 = 2.5;
const WEIGHT_COMPLIANCE: f64 = 1.0;
const WEIGHT_EFFICIENCY: f64 = 1.0;

/// The default `Scoring` implementation.
#[derive(Debug, Default)]
pub struct RubricScorer;

impl RubricScorer {
    pub fn new() -> Self {
        Self
    }

    fn clamp(score: f64) -> f64 {
        score.clamp(0.0, 10.0)
    }

    /// Distinct tools called that the scenario neither requires nor lists
    /// as optional.
    fn unnecessary_tools(actions: &ActionLog, behavior: &ExpectedBehavior) -> usize {
        actions
            .summary
            .unique_tools_used
            .iter()
            .filter(|tool| !behavior.is_sanctioned(tool))
            .count()
    }

    fn tool_selection(
        report: &ValidationReport,
        actions: &ActionLog,
        behavior: &ExpectedBehavior,
    ) -> (f64, String) {
        let missing = report.missing_required_count();
        let extra = Self::unnecessary_tools(actions, behavior);

        let base = Self::clamp(10.0 - 3.0 * missing as f64);
        let cap = match extra {
            0 => 10.0,
            1 | 2 => 8.0,
            _ => Self::clamp(10.0 - 2.0 * extra as f64),
        };
        let score = base.min(cap);

        let explanation = if missing == 0 && extra == 0 {
            "all required tools used, none unnecessary".to_string()
        } else {
            format!("{missing} required tool(s) missing, {extra} unnecessary tool(s) used")
        };
        (score, explanation)
    }

    fn parameters(report: &ValidationReport) -> (f64, String) {
        let mismatches = report.parameter_mismatch_count();
        let score = Self::clamp(10.0 - 3.0 * mismatches as f64);
        let explanation = if mismatches == 0 {
            "all parameter expectations met".to_string()
        } else {
            format!("{mismatches} parameter mismatch(es)")
        };
        (score, explanation)
    }

    fn sequence(report: &ValidationReport) -> (f64, String) {
        let Some(finding) = report.sequence_deviation() else {
            return (10.0, "tool order as expected or not constrained".to_string());
        };

        if let FindingKind::SequenceDeviation {
            expected,
            actual,
            deviations,
        } = &finding.kind
        {
            let expected_set: BTreeSet<&String> = expected.iter().collect();
            let actual_set: BTreeSet<&String> = actual.iter().collect();
            if expected_set == actual_set {
                return (
                    8.0,
                    "all expected tools used, but in a different order".to_string(),
                );
            }
            let score = Self::clamp(8.0 - 2.0 * *deviations as f64);
            return (
                score,
                format!("tool order deviates at {deviations} position(s)"),
            );
        }

        (10.0, "tool order as expected or not constrained".to_string())
    }

    fn consistency(report: &ValidationReport) -> (f64, String) {
        let hallucinations = report.hallucination_count();
        let silent = report.silent_action_count();
        let score = Self::clamp(10.0 - 4.0 * hallucinations as f64 - 2.0 * silent as f64);
        let explanation = if hallucinations == 0 && silent == 0 {
            "every claim matched an action and vice versa".to_string()
        } else {
            format!("{hallucinations} unfulfilled claim(s), {silent} unannounced action(s)")
        };
        (score, explanation)
    }

    fn compliance(report: &ValidationReport) -> (f64, String) {
        let violations = report.forbidden_violation_count();
        if violations == 0 {
            (10.0, "no forbidden tools used".to_string())
        } else {
            (0.0, format!("{violations} forbidden tool call(s)"))
        }
    }

    fn efficiency(actions: &ActionLog, behavior: &ExpectedBehavior) -> (f64, String) {
        let required = behavior.required_tools.len();
        let expected_optimal = match behavior.min_tool_calls {
            Some(minimum) => (minimum as usize).min(required),
            None => required,
        }
        .max(1);

        let ratio = actions.total_calls as f64 / expected_optimal as f64;
        let score = if ratio <= 1.0 {
            10.0
        } else if ratio <= 1.5 {
            7.0
        } else {
            Self::clamp(10.0 - 10.0 * (ratio - 1.0))
        };
        let explanation = format!(
            "{} call(s) against an expected optimum of {expected_optimal}",
            actions.total_calls
        );
        (score, explanation)
    }

    fn subscore(key: &str, criterion: &str, weight: f64, (score, explanation): (f64, String)) -> (String, Subscore) {
        (
            key.to_string(),
            Subscore {
                criterion: criterion.to_string(),
                score,
                weight,
                weighted: score / 10.0 * weight,
                explanation,
            },
        )
    }
}

impl Scoring for RubricScorer {
    fn score(
        &self,
        report: &ValidationReport,
        actions: &ActionLog,
        behavior: &ExpectedBehavior,
    ) -> Score {
        let subscores: BTreeMap<String, Subscore> = [
            Self::subscore(
                "tool_selection",
                "Tool Selection Accuracy",
                WEIGHT_TOOL_SELECTION,
                Self::tool_selection(report, actions, behavior),
            ),
            Self::subscore(
                "parameters",
                "Parameter Accuracy",
                WEIGHT_PARAMETERS,
                Self::parameters(report),
            ),
            Self::subscore(
                "sequence",
                "Sequence Correctness",
                WEIGHT_SEQUENCE,
                Self::sequence(report),
            ),
            Self::subscore(
                "consistency",
                "Claim/Action Consistency",
                WEIGHT_CONSISTENCY,
                Self::consistency(report),
            ),
            Self::subscore(
                "compliance",
                "Constraint Compliance",
                WEIGHT_COMPLIANCE,
                Self::compliance(report),
            ),
            Self::subscore(
                "efficiency",
                "Call Efficiency",
                WEIGHT_EFFICIENCY,
                Self::efficiency(actions, behavior),
            ),
        ]
        .into_iter()
        .collect();

        let raw_total: f64 = subscores.values().map(|s| s.weighted).sum();
        let total = (raw_total * 100.0).round() / 100.0;
        let grade = Grade::from_total(total);

        debug!(total, grade = %grade, "scoring complete");
        Score {
            total,
            subscores,
            grade,
            status: report.status,
        }
    }
}
