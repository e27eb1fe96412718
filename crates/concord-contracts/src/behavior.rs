//! Scenario expectations the agent is validated against.
//!
//! `ExpectedBehavior` is supplied per scenario by the scenario-loading
//! collaborator and treated as read-only configuration by the pipeline.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A declared expectation for one call parameter.
///
/// In scenario TOML a bare value is an exact expectation; a table of the
/// form `{ pattern = "…" }` is a regex the stringified argument must
/// match:
///
/// ```toml
/// [expected_behavior.required_parameters.read_file]
/// file_path = "config.json"
/// encoding = { pattern = "^utf-?8$" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamExpectation {
    /// The argument's stringified value must match this regex.
    Pattern {
        /// The regex source text.
        pattern: String,
    },
    /// The argument must equal this value exactly.
    Exact(serde_json::Value),
}

/// Everything a scenario declares about how the agent should behave.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpectedBehavior {
    /// Tools that must each be called at least once.
    #[serde(default)]
    pub required_tools: Vec<String>,
    /// Tools the agent may call without penalty.
    #[serde(default)]
    pub optional_tools: Vec<String>,
    /// Tools that must never be called.
    #[serde(default)]
    pub forbidden_tools: Vec<String>,
    /// Per-tool parameter expectations, checked on every call to the tool.
    #[serde(default)]
    pub required_parameters: BTreeMap<String, BTreeMap<String, ParamExpectation>>,
    /// When true, the first-occurrence order of distinct tools must equal
    /// `expected_sequence` exactly.
    #[serde(default)]
    pub sequence_matters: bool,
    /// The expected first-occurrence order. Required when
    /// `sequence_matters` is set.
    #[serde(default)]
    pub expected_sequence: Vec<String>,
    /// Lower bound on total calls, inclusive.
    #[serde(default)]
    pub min_tool_calls: Option<u32>,
    /// Upper bound on total calls, inclusive.
    #[serde(default)]
    pub max_tool_calls: Option<u32>,
}

impl ExpectedBehavior {
    /// Every tool name the scenario mentions.
    ///
    /// Forbidden tools are included deliberately: a claim naming a
    /// forbidden tool must still resolve to it so the matcher can pair
    /// the claim and the forbidden-tool check, not the hallucination
    /// check, reports the violation.
    pub fn declared_tools(&self) -> BTreeSet<String> {
        self.required_tools
            .iter()
            .chain(&self.optional_tools)
            .chain(&self.forbidden_tools)
            .cloned()
            .collect()
    }

    /// True when the tool is required or optional. Calling any other tool
    /// counts against the tool-selection subscore.
    pub fn is_sanctioned(&self, tool_name: &str) -> bool {
        self.required_tools.iter().any(|t| t == tool_name)
            || self.optional_tools.iter().any(|t| t == tool_name)
    }
}
