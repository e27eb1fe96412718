//! Tool-call records and the normalized action log.
//!
//! A `ToolCall` is one recorded invocation from the agent's call log.
//! The `ActionLog` is the thin normalization layer over the already-parsed
//! call list: the pipeline treats it as an immutable input — it is built
//! once from the provider-normalized calls and never mutated afterwards.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// One recorded tool invocation.
///
/// `arguments` is kept as raw JSON rather than a typed map so that a call
/// whose arguments are not a JSON object can still enter the pipeline and
/// be surfaced as a malformed-arguments finding instead of a parse error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// 1-based position in the call log, in issue order.
    pub sequence_number: u32,
    /// Name of the tool that was invoked (e.g. "read_file").
    pub tool_name: String,
    /// The call arguments. Expected to be a JSON object with string keys.
    pub arguments: serde_json::Value,
    /// Relative offset from the start of the run, in milliseconds.
    pub offset_ms: Option<f64>,
}

impl ToolCall {
    /// View `arguments` as a key/value map.
    ///
    /// Returns `None` when the arguments are not a JSON object — the
    /// validation engine reports that case as a CRITICAL finding.
    pub fn argument_map(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.arguments.as_object()
    }
}

/// Aggregate statistics over one call log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionSummary {
    /// Distinct tool names invoked at least once.
    pub unique_tools_used: BTreeSet<String>,
    /// Invocation count per tool name.
    pub tool_call_counts: BTreeMap<String, usize>,
    /// Tools invoked more than once, in first-occurrence order.
    pub tools_called_multiple_times: Vec<String>,
}

/// The full, immutable call log for one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLog {
    /// Total number of calls, including repeats.
    pub total_calls: usize,
    /// The calls in issue order.
    pub calls: Vec<ToolCall>,
    /// Derived statistics, computed once at construction.
    pub summary: ActionSummary,
}

impl ActionLog {
    /// Build an action log from an ordered call list, computing the summary.
    pub fn from_calls(calls: Vec<ToolCall>) -> Self {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut multiple: Vec<String> = Vec::new();
        for call in &calls {
            let count = counts.entry(call.tool_name.clone()).or_insert(0);
            *count += 1;
            if *count == 2 {
                multiple.push(call.tool_name.clone());
            }
        }
        let summary = ActionSummary {
            unique_tools_used: counts.keys().cloned().collect(),
            tool_call_counts: counts,
            tools_called_multiple_times: multiple,
        };
        Self {
            total_calls: calls.len(),
            calls,
            summary,
        }
    }

    /// Distinct tool names in the order each was first invoked.
    ///
    /// This is the sequence the sequence check compares against
    /// `ExpectedBehavior::expected_sequence`.
    pub fn first_occurrence_order(&self) -> Vec<String> {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut order = Vec::new();
        for call in &self.calls {
            if seen.insert(call.tool_name.as_str()) {
                order.push(call.tool_name.clone());
            }
        }
        order
    }

    /// True if `tool_name` was invoked at least once.
    pub fn has_tool(&self, tool_name: &str) -> bool {
        self.summary.unique_tools_used.contains(tool_name)
    }

    /// Number of invocations of `tool_name`.
    pub fn call_count(&self, tool_name: &str) -> usize {
        self.summary
            .tool_call_counts
            .get(tool_name)
            .copied()
            .unwrap_or(0)
    }

    /// All calls to `tool_name`, in issue order.
    pub fn calls_for_tool<'a>(&'a self, tool_name: &'a str) -> impl Iterator<Item = &'a ToolCall> {
        self.calls.iter().filter(move |c| c.tool_name == tool_name)
    }
}
