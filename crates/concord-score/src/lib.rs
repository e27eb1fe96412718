//! # concord-score
//!
//! The weighted scoring rubric: six criteria over the validation report
//! and raw call counts, a total in [0, 10], and a letter grade.

pub mod engine;

pub use engine::RubricScorer;
