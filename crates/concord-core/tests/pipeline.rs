//! End-to-end pipeline tests over the real stage implementations.
//!
//! These wire the pattern extractor, greedy matcher, behavior validator,
//! and rubric scorer into one `Evaluator` and assert on whole-run
//! outcomes rather than per-stage details.

use std::collections::BTreeMap;

use concord_contracts::{
    action::ToolCall,
    behavior::{ExpectedBehavior, ParamExpectation},
    finding::Severity,
    report::ValidationStatus,
    score::Grade,
};
use concord_core::Evaluator;
use concord_extract::PatternExtractor;
use concord_score::RubricScorer;
use concord_verify::{BehaviorValidator, GreedyMatcher};
use serde_json::json;

fn evaluator() -> Evaluator {
    Evaluator::new(
        Box::new(PatternExtractor::new()),
        Box::new(GreedyMatcher::new()),
        Box::new(BehaviorValidator::new()),
        Box::new(RubricScorer::new()),
    )
}

fn call(seq: u32, tool: &str, args: serde_json::Value) -> ToolCall {
    ToolCall {
        sequence_number: seq,
        tool_name: tool.to_string(),
        arguments: args,
        offset_ms: None,
    }
}

/// A scenario where the agent must read config.json and then edit it,
/// without touching the terminal.
fn config_fix_behavior() -> ExpectedBehavior {
    let mut read_params = BTreeMap::new();
    read_params.insert(
        "file_path".to_string(),
        ParamExpectation::Exact(json!("config.json")),
    );
    let mut required_parameters = BTreeMap::new();
    required_parameters.insert("read_file".to_string(), read_params);

    ExpectedBehavior {
        required_tools: vec!["read_file".into(), "edit_file".into()],
        forbidden_tools: vec!["run_terminal_command".into()],
        required_parameters,
        sequence_matters: true,
        expected_sequence: vec!["read_file".into(), "edit_file".into()],
        ..Default::default()
    }
}

#[test]
fn faithful_narration_scores_a_perfect_ten() {
    let behavior = config_fix_behavior();
    let narration = "I'll read the file config.json to find the port. Then I'll edit it to fix the value.";
    let calls = vec![
        call(1, "read_file", json!({"file_path": "config.json"})),
        call(
            2,
            "edit_file",
            json!({"file_path": "config.json", "old": "8080", "new": "3000"}),
        ),
    ];

    let evaluation = evaluator().evaluate(&behavior, narration, calls);

    assert_eq!(evaluation.claim_log.total_claims, 2);
    assert_eq!(evaluation.matching.pairs.len(), 2);
    assert!(evaluation.matching.unmatched_claims.is_empty());
    assert!(evaluation.matching.unmatched_calls.is_empty());
    assert_eq!(evaluation.report.status, ValidationStatus::Pass);
    assert_eq!(evaluation.score.total, 10.0);
    assert_eq!(evaluation.score.grade, Grade::APlus);
}

#[test]
fn unfulfilled_claim_costs_consistency_but_not_the_grade_band() {
    let behavior = config_fix_behavior();
    let narration = "I'll read the file config.json to find the port. Then I'll edit it to fix the value. Let me also verify permissions.";
    let calls = vec![
        call(1, "read_file", json!({"file_path": "config.json"})),
        call(2, "edit_file", json!({"file_path": "config.json"})),
    ];

    let evaluation = evaluator().evaluate(&behavior, narration, calls);

    // "verify" maps to no tool, so the claim stays unmatched and
    // confident enough to count as a high-severity hallucination.
    assert_eq!(evaluation.report.hallucination_count(), 1);
    assert_eq!(
        evaluation.report.consistency_checks.hallucinations[0].severity,
        Severity::High
    );
    assert_eq!(evaluation.report.status, ValidationStatus::Partial);
    assert_eq!(evaluation.score.subscores["consistency"].score, 6.0);
    assert_eq!(evaluation.score.total, 9.0);
}

#[test]
fn forbidden_tool_fails_the_run_outright() {
    let behavior = config_fix_behavior();
    let narration = "I'll read config.json.";
    let calls = vec![
        call(1, "read_file", json!({"file_path": "config.json"})),
        call(2, "run_terminal_command", json!({"command": "cat config.json"})),
        call(3, "edit_file", json!({"file_path": "config.json"})),
    ];

    let evaluation = evaluator().evaluate(&behavior, narration, calls);

    assert_eq!(evaluation.report.forbidden_violation_count(), 1);
    assert_eq!(evaluation.report.status, ValidationStatus::Fail);
    assert_eq!(evaluation.score.status, ValidationStatus::Fail);
    assert_eq!(evaluation.score.subscores["compliance"].score, 0.0);
}

#[test]
fn reordered_tools_cost_the_sequence_subscore() {
    let behavior = config_fix_behavior();
    let narration = "I'll edit config.json. Then I'll read it.";
    let calls = vec![
        call(1, "edit_file", json!({"file_path": "config.json"})),
        call(2, "read_file", json!({"file_path": "config.json"})),
    ];

    let evaluation = evaluator().evaluate(&behavior, narration, calls);

    assert!(evaluation.report.sequence_deviation().is_some());
    assert_eq!(evaluation.report.status, ValidationStatus::Partial);
    // Complete tool set, wrong order.
    assert_eq!(evaluation.score.subscores["sequence"].score, 8.0);
}

#[test]
fn silent_action_is_reported_and_costs_consistency() {
    let behavior = ExpectedBehavior {
        required_tools: vec!["read_file".into()],
        optional_tools: vec!["list_directory".into()],
        ..Default::default()
    };
    let narration = "I'll read main.rs.";
    let calls = vec![
        call(1, "read_file", json!({"file_path": "main.rs"})),
        call(2, "list_directory", json!({"path": "src"})),
    ];

    let evaluation = evaluator().evaluate(&behavior, narration, calls);

    assert_eq!(evaluation.report.silent_action_count(), 1);
    assert_eq!(evaluation.score.subscores["consistency"].score, 8.0);
    // Optional tools never count against selection.
    assert_eq!(evaluation.score.subscores["tool_selection"].score, 10.0);
}

#[test]
fn malformed_call_arguments_become_a_critical_finding() {
    let behavior = ExpectedBehavior {
        required_tools: vec!["read_file".into()],
        ..Default::default()
    };
    let narration = "I'll read main.rs.";
    let calls = vec![call(1, "read_file", json!(["main.rs"]))];

    let evaluation = evaluator().evaluate(&behavior, narration, calls);

    assert_eq!(evaluation.report.status, ValidationStatus::Fail);
    assert_eq!(
        evaluation.report.requirement_checks.arguments.findings[0].severity,
        Severity::Critical
    );
    // Malformed calls count against the parameter subscore.
    assert_eq!(evaluation.score.subscores["parameters"].score, 7.0);
}

#[test]
fn negated_narration_makes_no_claims_to_break() {
    let behavior = ExpectedBehavior {
        forbidden_tools: vec!["run_terminal_command".into()],
        ..Default::default()
    };
    let narration = "I won't run any commands.";

    let evaluation = evaluator().evaluate(&behavior, narration, vec![]);

    assert_eq!(evaluation.claim_log.total_claims, 0);
    assert_eq!(evaluation.report.status, ValidationStatus::Pass);
}

#[test]
fn identical_inputs_reproduce_the_same_score() {
    let behavior = config_fix_behavior();
    let narration = "I'll read config.json. Then I'll edit it.";
    let calls = vec![
        call(1, "read_file", json!({"file_path": "config.json"})),
        call(2, "edit_file", json!({"file_path": "config.json"})),
    ];

    let first = evaluator().evaluate(&behavior, narration, calls.clone());
    let second = evaluator().evaluate(&behavior, narration, calls);

    assert_ne!(first.id, second.id);
    assert_eq!(first.score, second.score);
    assert_eq!(first.report, second.report);
    assert_eq!(first.matching, second.matching);
}
