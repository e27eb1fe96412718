//! # concord-verify
//!
//! Correspondence matching and behavior validation.
//!
//! `GreedyMatcher` pairs extracted claims with recorded tool calls;
//! `BehaviorValidator` checks the call log and the pairing against the
//! scenario's expected behavior and accumulates findings. Neither stage
//! can fail: misbehavior is data, not an error.

pub mod engine;
pub mod matcher;

pub use engine::BehaviorValidator;
pub use matcher::GreedyMatcher;
