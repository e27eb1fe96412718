//! # concord-contracts
//!
//! Shared types, schemas, and contracts for the Concord evaluation
//! pipeline.
//!
//! All crates in the workspace import from here. No business logic lives
//! in this crate — only data definitions and error types.

pub mod action;
pub mod behavior;
pub mod claim;
pub mod correspondence;
pub mod error;
pub mod evaluation;
pub mod finding;
pub mod report;
pub mod score;
