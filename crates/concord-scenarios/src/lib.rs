//! # concord-scenarios
//!
//! TOML scenario loading. The one fallible surface in front of the
//! otherwise infallible evaluation pipeline.

pub mod scenario;

pub use scenario::Scenario;
