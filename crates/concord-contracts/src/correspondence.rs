//! Claim-to-call pairings produced by the correspondence matcher.
//!
//! Pairings are expressed as indices into the claim and call arenas
//! rather than references, so the outcome carries no lifetimes and can
//! be serialized alongside the logs it describes.

use serde::{Deserialize, Serialize};

/// One matched (claim, call) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrespondencePair {
    /// Index into `ClaimLog::claims`.
    pub claim_index: usize,
    /// Index into `ActionLog::calls`.
    pub call_index: usize,
    /// True for a Pass-1 exact match, false for a Pass-2 fuzzy match.
    pub exact: bool,
}

/// The complete matcher output: a one-to-one pairing plus the residue.
///
/// Invariant: no claim index and no call index appears in more than one
/// pair — matching is a bipartite assignment, not many-to-many.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchingOutcome {
    /// Matched pairs, in claim order.
    pub pairs: Vec<CorrespondencePair>,
    /// Claim indices with no matching call: hallucination candidates.
    pub unmatched_claims: Vec<usize>,
    /// Call indices with no matching claim: silent-action candidates.
    pub unmatched_calls: Vec<usize>,
}

impl MatchingOutcome {
    /// True when the claim at `index` was paired with a call.
    pub fn is_claim_matched(&self, index: usize) -> bool {
        self.pairs.iter().any(|p| p.claim_index == index)
    }

    /// True when the call at `index` was paired with a claim.
    pub fn is_call_matched(&self, index: usize) -> bool {
        self.pairs.iter().any(|p| p.call_index == index)
    }
}
