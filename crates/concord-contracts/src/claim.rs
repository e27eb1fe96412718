//! Extracted claims and the claim log.
//!
//! A `Claim` is one natural-language statement of intended action pulled
//! out of the agent's response text. Claims are produced once per
//! evaluation by the extractor and are immutable from then on.

use serde::{Deserialize, Serialize};

/// How strongly the sentence committed to the action.
///
/// Explicit lead-ins ("I'll", "Let me") rank above implicit gerund
/// phrases ("Looking at…"); the distinction feeds the confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimKind {
    Explicit,
    Implicit,
}

/// One extracted statement of intent.
///
/// Conditionality is a flag rather than a subtype: a conditional claim
/// ("If X, I'll…") is recorded for display but excluded from
/// hallucination scoring — a conditional that never fires is not a
/// broken promise. Negated sentences never produce a claim at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// The verbatim sentence the claim was extracted from.
    pub source_text: String,
    /// Normalized lowercase base form of the action verb.
    pub action_verb: String,
    /// The resolved object of the verb (a file name, pattern, etc.),
    /// absent when no object could be resolved.
    pub target_object: Option<String>,
    /// The tool the verb maps to, absent when no mapping applies.
    pub inferred_tool: Option<String>,
    /// Extraction confidence in [0, 1].
    pub confidence: f64,
    /// 1-based sentence ordinal within the response. Display only —
    /// never consulted by the matcher.
    pub position: usize,
    /// Explicit versus implicit phrasing.
    pub kind: ClaimKind,
    /// True when the claim was guarded by a conditional lead-in.
    pub conditional: bool,
}

/// The ordered, deduplicated set of claims for one evaluation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimLog {
    /// Number of claims after deduplication.
    pub total_claims: usize,
    /// The claims in extraction order.
    pub claims: Vec<Claim>,
}

impl ClaimLog {
    /// Build a claim log from an ordered claim list.
    pub fn from_claims(claims: Vec<Claim>) -> Self {
        Self {
            total_claims: claims.len(),
            claims,
        }
    }

    /// Claims with explicit phrasing.
    pub fn explicit(&self) -> impl Iterator<Item = &Claim> {
        self.claims.iter().filter(|c| c.kind == ClaimKind::Explicit)
    }

    /// Claims with implicit phrasing.
    pub fn implicit(&self) -> impl Iterator<Item = &Claim> {
        self.claims.iter().filter(|c| c.kind == ClaimKind::Implicit)
    }

    /// Claims at or above the given confidence.
    pub fn high_confidence(&self, threshold: f64) -> impl Iterator<Item = &Claim> + '_ {
        self.claims.iter().filter(move |c| c.confidence >= threshold)
    }
}
