//! The two-pass greedy correspondence matcher.
//!
//! Pass 1 pairs claims to calls on exact inferred-tool equality plus a
//! substring test on the target object. Pass 2 retries the residue
//! through a static tool-family table ("check" and "examine" are
//! compatible with read_file and search_code even without an exact
//! inferred-tool hit). Pass 2 never reconsiders pairs fixed in Pass 1.
//!
//! The matcher is order-sensitive by design: claims in extraction order
//! get first pick of calls in call order. This tie-break keeps scoring
//! reproducible.

use tracing::debug;

use concord_contracts::{
    action::{ActionLog, ToolCall},
    claim::{Claim, ClaimLog},
    correspondence::{CorrespondencePair, MatchingOutcome},
};
use concord_core::traits::CorrespondenceMatching;

/// Coarse tool families used by the fuzzy pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToolFamily {
    Inspection,
    Mutation,
    Execution,
}

/// Verb → family, for claims whose inferred tool did not pin a call.
const VERB_FAMILIES: &[(&str, ToolFamily)] = &[
    ("read", ToolFamily::Inspection),
    ("check", ToolFamily::Inspection),
    ("examine", ToolFamily::Inspection),
    ("look", ToolFamily::Inspection),
    ("open", ToolFamily::Inspection),
    ("find", ToolFamily::Inspection),
    ("search", ToolFamily::Inspection),
    ("grep", ToolFamily::Inspection),
    ("scan", ToolFamily::Inspection),
    ("list", ToolFamily::Inspection),
    ("write", ToolFamily::Mutation),
    ("edit", ToolFamily::Mutation),
    ("fix", ToolFamily::Mutation),
    ("create", ToolFamily::Mutation),
    ("update", ToolFamily::Mutation),
    ("modify", ToolFamily::Mutation),
    ("run", ToolFamily::Execution),
    ("execute", ToolFamily::Execution),
    ("delete", ToolFamily::Execution),
];

const INSPECTION_TOOLS: &[&str] = &[
    "read_file",
    "get_function_definition",
    "search_code",
    "list_directory",
];
const MUTATION_TOOLS: &[&str] = &["write_file", "edit_file"];
const EXECUTION_TOOLS: &[&str] = &["run_terminal_command"];

fn verb_family(verb: &str) -> Option<ToolFamily> {
    VERB_FAMILIES
        .iter()
        .find(|(v, _)| *v == verb)
        .map(|(_, f)| *f)
}

fn family_tools(family: ToolFamily) -> &'static [&'static str] {
    match family {
        ToolFamily::Inspection => INSPECTION_TOOLS,
        ToolFamily::Mutation => MUTATION_TOOLS,
        ToolFamily::Execution => EXECUTION_TOOLS,
    }
}

/// The default `CorrespondenceMatching` implementation.
#[derive(Debug, Default)]
pub struct GreedyMatcher;

impl GreedyMatcher {
    pub fn new() -> Self {
        Self
    }

    /// True when the claim's target (if any) overlaps some stringified
    /// argument value of the call — either direction of containment
    /// counts, case-insensitively. A claim with no target passes.
    fn target_matches(claim: &Claim, call: &ToolCall) -> bool {
        let Some(target) = &claim.target_object else {
            return true;
        };
        let target = target.to_lowercase();
        let Some(args) = call.argument_map() else {
            return false;
        };
        args.values().any(|value| {
            let text = match value.as_str() {
                Some(s) => s.to_lowercase(),
                None => value.to_string().to_lowercase(),
            };
            text.contains(&target) || target.contains(&text)
        })
    }
}

impl CorrespondenceMatching for GreedyMatcher {
    fn pair(&self, claims: &ClaimLog, actions: &ActionLog) -> MatchingOutcome {
        let mut claim_taken = vec![false; claims.claims.len()];
        let mut call_taken = vec![false; actions.calls.len()];
        let mut pairs: Vec<CorrespondencePair> = Vec::new();

        // ── Pass 1: exact inferred-tool match ────────────────────────────────
        for (claim_index, claim) in claims.claims.iter().enumerate() {
            let Some(tool) = &claim.inferred_tool else {
                continue;
            };
            for (call_index, call) in actions.calls.iter().enumerate() {
                if call_taken[call_index] || call.tool_name != *tool {
                    continue;
                }
                if Self::target_matches(claim, call) {
                    debug!(claim_index, call_index, tool = %tool, "exact pair");
                    pairs.push(CorrespondencePair {
                        claim_index,
                        call_index,
                        exact: true,
                    });
                    claim_taken[claim_index] = true;
                    call_taken[call_index] = true;
                    break;
                }
            }
        }

        // ── Pass 2: tool-family fuzzy match over the residue ─────────────────
        for (claim_index, claim) in claims.claims.iter().enumerate() {
            if claim_taken[claim_index] {
                continue;
            }
            let Some(family) = verb_family(&claim.action_verb) else {
                continue;
            };
            let compatible = family_tools(family);
            for (call_index, call) in actions.calls.iter().enumerate() {
                if call_taken[call_index] || !compatible.contains(&call.tool_name.as_str()) {
                    continue;
                }
                if Self::target_matches(claim, call) {
                    debug!(
                        claim_index,
                        call_index,
                        verb = %claim.action_verb,
                        tool = %call.tool_name,
                        "fuzzy pair"
                    );
                    pairs.push(CorrespondencePair {
                        claim_index,
                        call_index,
                        exact: false,
                    });
                    claim_taken[claim_index] = true;
                    call_taken[call_index] = true;
                    break;
                }
            }
        }

        let unmatched_claims: Vec<usize> = claim_taken
            .iter()
            .enumerate()
            .filter(|(_, taken)| !**taken)
            .map(|(i, _)| i)
            .collect();
        let unmatched_calls: Vec<usize> = call_taken
            .iter()
            .enumerate()
            .filter(|(_, taken)| !**taken)
            .map(|(i, _)| i)
            .collect();

        MatchingOutcome {
            pairs,
            unmatched_claims,
            unmatched_calls,
        }
    }
}
