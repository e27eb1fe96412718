//! Fault types for the Concord pipeline.
//!
//! Faults are reserved for malformed configuration and I/O around the
//! core — agent misbehavior is never an error, it is a finding. The
//! extraction, matching, validation, and scoring stages are infallible
//! by signature.

use thiserror::Error;

/// The unified error type for the Concord crates.
#[derive(Debug, Error)]
pub enum ConcordError {
    /// A scenario file could not be read or parsed.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// A scenario parsed but is semantically invalid.
    #[error("invalid scenario: {reason}")]
    InvalidScenario { reason: String },

    /// A pipeline output could not be serialized for the caller.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

/// Convenience alias used throughout the Concord crates.
pub type ConcordResult<T> = Result<T, ConcordError>;
