//! The rule-based claim extractor.
//!
//! Scans response text sentence by sentence and produces the ordered,
//! deduplicated claim log. Extraction is best-effort: a sentence
//! matching no intent pattern yields no claim, never an error, so
//! ungrammatical or unparseable text is silently skipped.
//!
//! The only cross-sentence state is pronoun resolution — "it"/"that"
//! refers back to the most recent resolved target object.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use concord_contracts::claim::{Claim, ClaimKind, ClaimLog};
use concord_core::traits::ClaimExtraction;

use crate::patterns::{
    lookup_tools, normalize_verb, resolve_tool, MappingResolution, CONDITIONAL_GUARD,
    INTENT_PATTERNS, NEGATION,
};

/// Sentence-terminal punctuation followed by whitespace or end of text.
/// A dot inside a file name ("config.json") is not a boundary.
static SENTENCE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+(?:\s+|$)").expect("sentence boundary must compile"));

const DETERMINERS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "its", "my", "our", "some",
];

/// Noun filler between determiner and the concrete object ("the file
/// config.json", "the function named parse").
const FILLER_NOUNS: &[&str] = &[
    "file", "files", "directory", "directories", "folder", "function", "functions", "code",
    "command", "commands", "contents", "content", "named", "called",
];

/// Words that end the object phrase ("…config.json to find the port").
const STOP_WORDS: &[&str] = &[
    "to", "for", "in", "on", "and", "so", "then", "with", "using", "because", "before", "after",
    "first", "next", "now",
];

/// Prepositions between the verb and its object ("look at the config").
const SKIP_WORDS: &[&str] = &["at", "of", "into", "through", "over"];

const PRONOUNS: &[&str] = &["it", "that", "them", "this"];

/// The default `ClaimExtraction` implementation: ordered intent patterns
/// over sentence units, with the static verb→tool table.
#[derive(Debug, Default)]
pub struct PatternExtractor;

impl PatternExtractor {
    pub fn new() -> Self {
        Self
    }

    fn split_sentences(text: &str) -> Vec<&str> {
        SENTENCE_BOUNDARY
            .split(text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Resolve the raw object text captured after the verb.
    ///
    /// Leading determiners and filler nouns are skipped; a path-, file-,
    /// or glob-like token wins outright; otherwise the tokens up to the
    /// first stop word form the object. A lone pronoun resolves to the
    /// most recent target seen.
    fn resolve_target(raw_object: &str, last_target: &Option<String>) -> Option<String> {
        let tokens: Vec<String> = raw_object
            .split_whitespace()
            .map(|t| {
                t.trim_matches(|c: char| "`'\",;:()".contains(c))
                    .to_string()
            })
            .filter(|t| !t.is_empty())
            .collect();
        let first = tokens.first()?.to_lowercase();

        if PRONOUNS.contains(&first.as_str()) {
            let rest_is_trailing = tokens
                .get(1)
                .map(|t| STOP_WORDS.contains(&t.to_lowercase().as_str()))
                .unwrap_or(true);
            if rest_is_trailing {
                return last_target.clone();
            }
        }

        let mut phrase: Vec<&str> = Vec::new();
        for token in &tokens {
            let lower = token.to_lowercase();
            if STOP_WORDS.contains(&lower.as_str()) {
                break;
            }
            if token
                .chars()
                .any(|c| matches!(c, '.' | '/' | '_' | '*'))
            {
                return Some(token.clone());
            }
            if DETERMINERS.contains(&lower.as_str())
                || FILLER_NOUNS.contains(&lower.as_str())
                || SKIP_WORDS.contains(&lower.as_str())
            {
                continue;
            }
            phrase.push(token);
        }
        if phrase.is_empty() {
            None
        } else {
            Some(phrase.join(" "))
        }
    }

    /// Confidence is monotonic in pattern specificity, target presence,
    /// and mapping uniqueness, bounded to [0, 1].
    fn confidence_for(kind: ClaimKind, has_target: bool, resolution: MappingResolution) -> f64 {
        let mut confidence: f64 = match kind {
            ClaimKind::Explicit => 0.6,
            ClaimKind::Implicit => 0.45,
        };
        if has_target {
            confidence += 0.2;
        }
        confidence += match resolution {
            MappingResolution::Unique => 0.2,
            MappingResolution::Ambiguous => 0.1,
            MappingResolution::Unresolved => 0.0,
        };
        confidence.clamp(0.0, 1.0)
    }

    /// Collapse claims with the same normalized verb and resolved target,
    /// keeping the higher-confidence instance at the earliest position.
    fn deduplicate(claims: Vec<Claim>) -> Vec<Claim> {
        let mut unique: Vec<Claim> = Vec::new();
        for claim in claims {
            match unique.iter_mut().find(|c| {
                c.action_verb == claim.action_verb && c.target_object == claim.target_object
            }) {
                Some(existing) => {
                    if claim.confidence > existing.confidence {
                        let earliest = existing.position;
                        *existing = claim;
                        existing.position = earliest;
                    }
                }
                None => unique.push(claim),
            }
        }
        unique
    }
}

impl ClaimExtraction for PatternExtractor {
    fn extract(&self, response_text: &str, declared_tools: &BTreeSet<String>) -> ClaimLog {
        if response_text.trim().is_empty() {
            return ClaimLog::default();
        }

        let mut claims: Vec<Claim> = Vec::new();
        let mut last_target: Option<String> = None;

        for (index, sentence) in Self::split_sentences(response_text).iter().enumerate() {
            let position = index + 1;

            if NEGATION.is_match(sentence) {
                debug!(position, sentence, "negated sentence skipped");
                continue;
            }

            for pattern in INTENT_PATTERNS.iter() {
                let Some(caps) = pattern.regex.captures(sentence) else {
                    continue;
                };
                let Some(verb_match) = caps.get(1) else {
                    continue;
                };

                let verb = normalize_verb(verb_match.as_str());

                // An implicit gerund only counts as a claim when it is a
                // known action verb; "nothing" and "morning" are not
                // intentions.
                if pattern.kind == ClaimKind::Implicit && lookup_tools(&verb).is_none() {
                    continue;
                }

                let raw_object = caps.get(2).map(|m| m.as_str()).unwrap_or("");
                let target = Self::resolve_target(raw_object, &last_target);
                let (inferred_tool, resolution) = resolve_tool(&verb, declared_tools);
                let conditional = pattern.conditional
                    || CONDITIONAL_GUARD.is_match(&sentence[..verb_match.start()]);
                let confidence = Self::confidence_for(pattern.kind, target.is_some(), resolution);

                if let Some(t) = &target {
                    last_target = Some(t.clone());
                }

                debug!(
                    position,
                    verb = %verb,
                    target = ?target,
                    tool = ?inferred_tool,
                    confidence,
                    conditional,
                    "claim extracted"
                );

                claims.push(Claim {
                    source_text: sentence.to_string(),
                    action_verb: verb,
                    target_object: target,
                    inferred_tool,
                    confidence,
                    position,
                    kind: pattern.kind,
                    conditional,
                });

                // First matching pattern wins — one claim per sentence.
                break;
            }
        }

        ClaimLog::from_claims(Self::deduplicate(claims))
    }
}
