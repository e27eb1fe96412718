//! TOML-backed scenario definitions.
//!
//! A `Scenario` packages one task's identity with the `ExpectedBehavior`
//! the pipeline validates against. Loading is the only fallible step in
//! an evaluation run; once a scenario is in memory, the pipeline cannot
//! fail.
//!
//! ```toml
//! id = "config-port-fix"
//! name = "Fix the port in config.json"
//! description = "The agent must read the config before editing it."
//!
//! [expected_behavior]
//! required_tools = ["read_file", "edit_file"]
//! forbidden_tools = ["run_terminal_command"]
//! sequence_matters = true
//! expected_sequence = ["read_file", "edit_file"]
//!
//! [expected_behavior.required_parameters.read_file]
//! file_path = "config.json"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use concord_contracts::{
    behavior::ExpectedBehavior,
    error::{ConcordError, ConcordResult},
};

/// One evaluation scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Stable identifier, used to key results.
    pub id: String,
    /// Human-readable title.
    pub name: String,
    /// What the agent was asked to do.
    #[serde(default)]
    pub description: String,
    /// The behavior the agent is validated against.
    pub expected_behavior: ExpectedBehavior,
}

impl Scenario {
    /// Parse `s` as a TOML scenario and validate it.
    ///
    /// Returns `ConcordError::Config` when the TOML is malformed and
    /// `ConcordError::InvalidScenario` when it parses but is internally
    /// inconsistent.
    pub fn from_toml_str(s: &str) -> ConcordResult<Self> {
        let scenario: Scenario = toml::from_str(s).map_err(|e| ConcordError::Config {
            reason: format!("failed to parse scenario TOML: {}", e),
        })?;
        scenario.validate()?;
        debug!(id = %scenario.id, "scenario loaded");
        Ok(scenario)
    }

    /// Read the file at `path` and parse it as a TOML scenario.
    pub fn from_file(path: &Path) -> ConcordResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConcordError::Config {
            reason: format!("failed to read scenario file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Semantic checks that TOML deserialization cannot express.
    fn validate(&self) -> ConcordResult<()> {
        if self.id.trim().is_empty() {
            return Err(ConcordError::InvalidScenario {
                reason: "scenario id must not be empty".to_string(),
            });
        }
        if self.name.trim().is_empty() {
            return Err(ConcordError::InvalidScenario {
                reason: format!("scenario '{}' has an empty name", self.id),
            });
        }
        if self.expected_behavior.sequence_matters
            && self.expected_behavior.expected_sequence.is_empty()
        {
            return Err(ConcordError::InvalidScenario {
                reason: format!(
                    "scenario '{}' sets sequence_matters without an expected_sequence",
                    self.id
                ),
            });
        }
        if let (Some(min), Some(max)) = (
            self.expected_behavior.min_tool_calls,
            self.expected_behavior.max_tool_calls,
        ) {
            if min > max {
                return Err(ConcordError::InvalidScenario {
                    reason: format!(
                        "scenario '{}' has min_tool_calls {} greater than max_tool_calls {}",
                        self.id, min, max
                    ),
                });
            }
        }
        Ok(())
    }
}
