//! # concord-extract
//!
//! Rule-based extraction of claimed actions from agent response text.
//!
//! No training, no embeddings: an ordered table of intent patterns and a
//! static verb→tool mapping, so that extraction — and therefore the
//! final score — is deterministic and reproducible.

pub mod extractor;
pub mod patterns;

pub use extractor::PatternExtractor;
pub use patterns::{lookup_tools, normalize_verb, resolve_tool, MappingResolution};
