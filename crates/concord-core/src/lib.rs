//! # concord-core
//!
//! The deterministic evaluation pipeline for Concord.
//!
//! This crate provides:
//! - The four stage traits (`ClaimExtraction`, `CorrespondenceMatching`,
//!   `Validation`, `Scoring`)
//! - The `Evaluator` that wires them together in the fixed forward order
//!
//! ## Usage
//!
//! ```rust,ignore
//! use concord_core::{Evaluator, traits::{ClaimExtraction, Scoring}};
//! ```

pub mod pipeline;
pub mod traits;

pub use pipeline::Evaluator;
