//! The validation report: one run's accumulated findings.
//!
//! The report is the sole contract between the validation engine and the
//! scorer/report-formatting collaborators. It is built in a single pass
//! and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::finding::{Finding, FindingKind, Severity};

/// Overall pass/fail verdict for one evaluation run.
///
/// Precedence: any CRITICAL finding → `Fail`; an empty finding set →
/// `Pass`; anything else → `Partial`. Critical dominates count — a
/// single forbidden-tool use fails the run no matter how many other
/// checks pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Pass,
    Partial,
    Fail,
}

/// The outcome of one requirement check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// True when the check produced no findings.
    pub passed: bool,
    /// The findings this check produced. Empty on pass.
    pub findings: Vec<Finding>,
}

impl CheckResult {
    /// Build a result from accumulated findings.
    pub fn from_findings(findings: Vec<Finding>) -> Self {
        Self {
            passed: findings.is_empty(),
            findings,
        }
    }
}

/// Results of the scenario-requirement checks.
///
/// `sequence` and `call_count` are absent when the scenario does not
/// configure them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementChecks {
    pub required_tools: CheckResult,
    pub forbidden_tools: CheckResult,
    pub parameters: CheckResult,
    /// Structural argument validation (malformed-arguments findings).
    pub arguments: CheckResult,
    pub sequence: Option<CheckResult>,
    pub call_count: Option<CheckResult>,
}

/// Results of the claim/action consistency checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyChecks {
    /// `ClaimWithoutAction` findings.
    pub hallucinations: Vec<Finding>,
    /// `ActionWithoutClaim` findings.
    pub silent_actions: Vec<Finding>,
}

/// Roll-up counts over every finding in the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total_issues: usize,
    pub critical_issues: usize,
    /// Non-critical findings of any severity.
    pub warnings: usize,
}

/// The complete output of the validation engine for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub status: ValidationStatus,
    pub requirement_checks: RequirementChecks,
    pub consistency_checks: ConsistencyChecks,
    pub summary: ValidationSummary,
}

impl ValidationReport {
    /// Every finding in the report, requirement checks first, in check
    /// declaration order.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        let rc = &self.requirement_checks;
        rc.required_tools
            .findings
            .iter()
            .chain(&rc.forbidden_tools.findings)
            .chain(&rc.parameters.findings)
            .chain(&rc.arguments.findings)
            .chain(rc.sequence.iter().flat_map(|c| &c.findings))
            .chain(rc.call_count.iter().flat_map(|c| &c.findings))
            .chain(&self.consistency_checks.hallucinations)
            .chain(&self.consistency_checks.silent_actions)
    }

    /// Number of required tools that were never called.
    pub fn missing_required_count(&self) -> usize {
        self.requirement_checks.required_tools.findings.len()
    }

    /// Number of calls to forbidden tools.
    pub fn forbidden_violation_count(&self) -> usize {
        self.requirement_checks.forbidden_tools.findings.len()
    }

    /// Parameter mismatches plus malformed-argument findings — both count
    /// against the parameters subscore.
    pub fn parameter_mismatch_count(&self) -> usize {
        self.requirement_checks.parameters.findings.len()
            + self.requirement_checks.arguments.findings.len()
    }

    /// The sequence deviation finding, when the sequence check ran and
    /// failed.
    pub fn sequence_deviation(&self) -> Option<&Finding> {
        self.requirement_checks
            .sequence
            .as_ref()
            .and_then(|c| c.findings.iter().find(|f| {
                matches!(f.kind, FindingKind::SequenceDeviation { .. })
            }))
    }

    pub fn hallucination_count(&self) -> usize {
        self.consistency_checks.hallucinations.len()
    }

    pub fn silent_action_count(&self) -> usize {
        self.consistency_checks.silent_actions.len()
    }

    /// Compute the summary and status for a fully-populated report body.
    pub fn finalize(
        requirement_checks: RequirementChecks,
        consistency_checks: ConsistencyChecks,
    ) -> Self {
        let mut report = Self {
            status: ValidationStatus::Pass,
            requirement_checks,
            consistency_checks,
            summary: ValidationSummary::default(),
        };

        let total = report.findings().count();
        let critical = report
            .findings()
            .filter(|f| f.severity == Severity::Critical)
            .count();
        report.summary = ValidationSummary {
            total_issues: total,
            critical_issues: critical,
            warnings: total - critical,
        };
        report.status = if critical > 0 {
            ValidationStatus::Fail
        } else if total == 0 {
            ValidationStatus::Pass
        } else {
            ValidationStatus::Partial
        };
        report
    }
}
