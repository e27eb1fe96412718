//! The static intent-pattern and verb-mapping tables.
//!
//! Extraction is rule-based and deterministic by design: an ordered list
//! of pre-compiled regexes (explicit lead-ins before implicit gerunds)
//! plus a static many-to-many verb→tool table. The "first candidate
//! present in the scenario's tool set wins" tie-break lives here as an
//! explicit function so it can be tested on its own.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use concord_contracts::claim::ClaimKind;

/// One intent template: `<lead-in> <verb> <optional determiner> <object>`.
///
/// Capture group 1 is the raw verb, group 2 the raw object text.
pub(crate) struct IntentPattern {
    pub regex: Regex,
    pub kind: ClaimKind,
    /// True for patterns whose lead-in is inherently conditional
    /// ("I might…"). Non-conditional patterns can still yield a
    /// conditional claim when preceded by an "if"-clause.
    pub conditional: bool,
}

/// Ordered pattern list: tried top to bottom, first match wins, so a
/// sentence yields at most one claim.
pub(crate) static INTENT_PATTERNS: LazyLock<Vec<IntentPattern>> = LazyLock::new(|| {
    vec![
        // "I'll read…", "Let me check…", "First, I'm going to edit…"
        IntentPattern {
            regex: Regex::new(
                r"(?i)\b(?:i['’]?ll|i\s+will|i['’]?m\s+going\s+to|i\s+am\s+going\s+to|let\s+me|we['’]?ll)\s+(?:also\s+|just\s+|now\s+|first\s+|then\s+|quickly\s+|go\s+ahead\s+and\s+|start\s+by\s+)*([a-z]+)\b\s*(.*)$",
            )
            .expect("explicit intent pattern must compile"),
            kind: ClaimKind::Explicit,
            conditional: false,
        },
        // "I might check…", "I could search…" — modal, always conditional.
        IntentPattern {
            regex: Regex::new(
                r"(?i)\bi\s+(?:might|could|may|would|should)\s+(?:also\s+|just\s+)*([a-z]+)\b\s*(.*)$",
            )
            .expect("modal intent pattern must compile"),
            kind: ClaimKind::Explicit,
            conditional: true,
        },
        // "After examining the results…"
        IntentPattern {
            regex: Regex::new(
                r"(?i)^\s*(?:after|while|when|once|before)\s+([a-z]+ing)\b\s*(.*)$",
            )
            .expect("gerund-clause intent pattern must compile"),
            kind: ClaimKind::Implicit,
            conditional: false,
        },
        // "Looking at the config file…"
        IntentPattern {
            regex: Regex::new(
                r"(?i)^\s*([a-z]+ing)\b\s+(?:at\s+|through\s+|over\s+|into\s+|for\s+)?(.*)$",
            )
            .expect("gerund intent pattern must compile"),
            kind: ClaimKind::Implicit,
            conditional: false,
        },
    ]
});

/// Negative-polarity markers. A sentence containing one emits no claim
/// at all: the verb is present but the promise is the opposite.
pub(crate) static NEGATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:won['’]?t|will\s+not|not\s+going\s+to|do\s+not|don['’]?t|never|refuse\s+to|shouldn['’]?t|can['’]?t)\b",
    )
    .expect("negation pattern must compile")
});

/// Conditional guards checked against the text before the lead-in
/// ("If the tests fail, I'll…").
pub(crate) static CONDITIONAL_GUARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:if|unless|in\s+case)\b").expect("conditional guard must compile")
});

/// The static many-to-many verb→tool table, in priority order per verb.
///
/// Deliberately an explicit ordered-candidate-list structure rather than
/// anything dynamic; ambiguity is resolved by `resolve_tool`.
pub const VERB_TO_TOOLS: &[(&str, &[&str])] = &[
    ("read", &["read_file", "get_function_definition"]),
    ("write", &["write_file", "edit_file"]),
    ("search", &["search_code"]),
    ("find", &["search_code", "list_directory"]),
    ("edit", &["edit_file", "write_file"]),
    ("fix", &["edit_file"]),
    ("run", &["run_terminal_command"]),
    ("execute", &["run_terminal_command"]),
    ("list", &["list_directory"]),
    ("check", &["read_file", "search_code"]),
    ("examine", &["read_file", "search_code"]),
    ("look", &["read_file", "search_code"]),
    ("open", &["read_file"]),
    ("grep", &["search_code"]),
    ("scan", &["search_code"]),
    ("create", &["write_file"]),
    ("update", &["edit_file", "write_file"]),
    ("modify", &["edit_file"]),
    ("delete", &["run_terminal_command"]),
];

/// Candidate tools for a normalized verb, in priority order.
pub fn lookup_tools(verb: &str) -> Option<&'static [&'static str]> {
    VERB_TO_TOOLS
        .iter()
        .find(|(v, _)| *v == verb)
        .map(|(_, tools)| *tools)
}

/// How a verb's tool mapping was resolved — feeds the confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingResolution {
    /// The verb maps to exactly one tool.
    Unique,
    /// The verb maps to several tools and the scenario's declared set
    /// picked one.
    Ambiguous,
    /// No mapping applies, or none of the candidates is declared.
    Unresolved,
}

/// The tie-break rule: a single-candidate verb resolves directly; a
/// multi-candidate verb resolves to the first candidate present in the
/// scenario's declared tool set, else to nothing.
pub fn resolve_tool(
    verb: &str,
    declared_tools: &BTreeSet<String>,
) -> (Option<String>, MappingResolution) {
    let Some(candidates) = lookup_tools(verb) else {
        return (None, MappingResolution::Unresolved);
    };
    if let [only] = candidates {
        return (Some((*only).to_string()), MappingResolution::Unique);
    }
    match candidates
        .iter()
        .find(|c| declared_tools.contains(**c))
    {
        Some(tool) => (Some((*tool).to_string()), MappingResolution::Ambiguous),
        None => (None, MappingResolution::Unresolved),
    }
}

/// Reduce a captured verb to the base form the table is keyed by.
///
/// Handles gerunds ("examining" → "examine", "running" → "run") and
/// third-person forms ("reads" → "read"). Unknown verbs come back
/// lowercased but otherwise untouched.
pub fn normalize_verb(raw: &str) -> String {
    let verb = raw.to_lowercase();
    if lookup_tools(&verb).is_some() {
        return verb;
    }
    if let Some(stem) = verb.strip_suffix("ing") {
        if lookup_tools(stem).is_some() {
            return stem.to_string();
        }
        let with_e = format!("{stem}e");
        if lookup_tools(&with_e).is_some() {
            return with_e;
        }
        let bytes = stem.as_bytes();
        if bytes.len() >= 2 && bytes[bytes.len() - 1] == bytes[bytes.len() - 2] {
            let undoubled = &stem[..stem.len() - 1];
            if lookup_tools(undoubled).is_some() {
                return undoubled.to_string();
            }
        }
    }
    if let Some(stem) = verb.strip_suffix("es") {
        if lookup_tools(stem).is_some() {
            return stem.to_string();
        }
    }
    if let Some(stem) = verb.strip_suffix('s') {
        if lookup_tools(stem).is_some() {
            return stem.to_string();
        }
    }
    verb
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{lookup_tools, normalize_verb, resolve_tool, MappingResolution};

    fn declared(tools: &[&str]) -> BTreeSet<String> {
        tools.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn normalize_handles_gerunds_and_plurals() {
        assert_eq!(normalize_verb("Reading"), "read");
        assert_eq!(normalize_verb("examining"), "examine");
        assert_eq!(normalize_verb("running"), "run");
        assert_eq!(normalize_verb("looking"), "look");
        assert_eq!(normalize_verb("searches"), "search");
        assert_eq!(normalize_verb("reads"), "read");
        // Unknown verbs are lowercased but not invented.
        assert_eq!(normalize_verb("Verify"), "verify");
        assert_eq!(normalize_verb("nothing"), "nothing");
    }

    #[test]
    fn single_candidate_verbs_resolve_unconditionally() {
        let (tool, resolution) = resolve_tool("fix", &declared(&[]));
        assert_eq!(tool.as_deref(), Some("edit_file"));
        assert_eq!(resolution, MappingResolution::Unique);
    }

    #[test]
    fn ambiguous_verb_resolves_to_first_declared_candidate() {
        // "write" maps to [write_file, edit_file]; only edit_file is declared.
        let (tool, resolution) = resolve_tool("write", &declared(&["edit_file"]));
        assert_eq!(tool.as_deref(), Some("edit_file"));
        assert_eq!(resolution, MappingResolution::Ambiguous);

        // With both declared, candidate order wins.
        let (tool, _) = resolve_tool("write", &declared(&["edit_file", "write_file"]));
        assert_eq!(tool.as_deref(), Some("write_file"));
    }

    #[test]
    fn ambiguous_verb_with_no_declared_candidate_stays_unresolved() {
        let (tool, resolution) = resolve_tool("read", &declared(&["run_terminal_command"]));
        assert_eq!(tool, None);
        assert_eq!(resolution, MappingResolution::Unresolved);
    }

    #[test]
    fn unmapped_verb_stays_unresolved() {
        let (tool, resolution) = resolve_tool("verify", &declared(&["read_file"]));
        assert_eq!(tool, None);
        assert_eq!(resolution, MappingResolution::Unresolved);
        assert!(lookup_tools("verify").is_none());
    }
}
