//! Pure scoring layer
//!
//! Converts detected objects into point totals and a success percentage.
//! Nothing in this module performs I/O.

pub mod aggregate;
pub mod confidence;
pub mod deduction;
pub mod success_rate;

pub use aggregate::{aggregate, Aggregate, ScoringRules};
pub use confidence::{points_for, score};
pub use deduction::cap_deduction;
pub use success_rate::success_rate;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One detected object as reported by the recognition service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub class: String,
    /// Model confidence, 0.0..=1.0
    pub confidence: f64,
}

/// Points earned and deducted, never both nonzero for a single object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreResult {
    pub earned: i64,
    pub deducted: i64,
}

/// Scoring failures, all caused by the submitted data
#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("confidence {0} is outside [0, 1]")]
    ConfidenceOutOfRange(f64),

    #[error("detection {index} is missing `confidence`")]
    MissingConfidence { index: usize },

    #[error("detection {index} is missing `class`")]
    MissingClass { index: usize },
}
