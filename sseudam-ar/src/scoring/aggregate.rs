//! Aggregation of per-object scores and classification counts

use serde::Serialize;
use sseudam_common::config::ScoringConfig;

use super::{confidence, DetectedObject, ScoringError};

/// Target material and the classes accepted as correctly sorted
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringRules {
    pub target_category: String,
    pub accepted_classes: Vec<String>,
    pub min_correct_confidence: f64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}

impl ScoringRules {
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self {
            target_category: config.target_category.clone(),
            accepted_classes: config.accepted_classes.clone(),
            min_correct_confidence: config.min_correct_confidence,
        }
    }

    /// An object counts as correct when its class is accepted and the model
    /// is confident enough
    pub fn is_correct(&self, object: &DetectedObject) -> bool {
        object.confidence >= self.min_correct_confidence
            && self.accepted_classes.iter().any(|c| c == &object.class)
    }
}

/// Totals across all objects of one submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Aggregate {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub earned: i64,
    /// Sum of deduction magnitudes before capping
    pub deducted: i64,
}

/// Score every object and count correct classifications
///
/// An empty slice yields all zeros. Any out-of-range confidence fails the
/// whole batch.
pub fn aggregate(objects: &[DetectedObject], rules: &ScoringRules) -> Result<Aggregate, ScoringError> {
    let mut totals = Aggregate {
        total: objects.len(),
        ..Aggregate::default()
    };

    for object in objects {
        let scored = confidence::score(object.confidence)?;
        totals.earned += scored.earned;
        totals.deducted += scored.deducted;
        if rules.is_correct(object) {
            totals.correct += 1;
        }
    }
    totals.incorrect = totals.total - totals.correct;

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(class: &str, confidence: f64) -> DetectedObject {
        DetectedObject {
            class: class.to_string(),
            confidence,
        }
    }

    #[test]
    fn test_empty_is_all_zero() {
        let totals = aggregate(&[], &ScoringRules::default()).unwrap();
        assert_eq!(totals, Aggregate::default());
    }

    #[test]
    fn test_single_accepted_object() {
        let totals = aggregate(&[object("PET_transparent", 0.95)], &ScoringRules::default()).unwrap();
        assert_eq!(totals.total, 1);
        assert_eq!(totals.correct, 1);
        assert_eq!(totals.incorrect, 0);
        assert_eq!(totals.earned, 5);
        assert_eq!(totals.deducted, 0);
    }

    #[test]
    fn test_mixed_batch() {
        let objects = [
            object("PET_transparent", 0.72), // +1, correct
            object("PET_transparent", 0.65), // 0, below correctness threshold
            object("can", 0.95),             // +5, wrong class
            object("other", 0.05),           // -5
            object("other", 0.35),           // -2
        ];
        let totals = aggregate(&objects, &ScoringRules::default()).unwrap();
        assert_eq!(totals.total, 5);
        assert_eq!(totals.correct, 1);
        assert_eq!(totals.incorrect, 4);
        assert_eq!(totals.earned, 6);
        assert_eq!(totals.deducted, 7);
    }

    #[test]
    fn test_custom_allow_list() {
        let rules = ScoringRules {
            accepted_classes: vec!["PET_transparent".into(), "PET_bottle".into()],
            ..ScoringRules::default()
        };
        let totals = aggregate(&[object("PET_bottle", 0.8)], &rules).unwrap();
        assert_eq!(totals.correct, 1);
    }

    #[test]
    fn test_out_of_range_fails_batch() {
        let result = aggregate(
            &[object("PET_transparent", 0.9), object("other", 2.0)],
            &ScoringRules::default(),
        );
        assert_eq!(result, Err(ScoringError::ConfidenceOutOfRange(2.0)));
    }
}
