//! Confidence to points step function

use super::{ScoreResult, ScoringError};

/// Lower bounds (inclusive) and their points, highest first
const CONFIDENCE_TABLE: &[(f64, i64)] = &[
    (0.9, 5),
    (0.85, 4),
    (0.8, 3),
    (0.75, 2),
    (0.7, 1),
    (0.6, 0),
    (0.4, -1),
    (0.3, -2),
    (0.2, -3),
    (0.1, -4),
];

/// Points below the lowest bound
const FLOOR_POINTS: i64 = -5;

/// Signed points for one confidence value
///
/// # Examples
///
/// ```
/// use sseudam_ar::scoring::points_for;
///
/// assert_eq!(points_for(0.95).unwrap(), 5);
/// assert_eq!(points_for(0.65).unwrap(), 0);
/// assert_eq!(points_for(0.05).unwrap(), -5);
/// assert!(points_for(1.5).is_err());
/// ```
pub fn points_for(confidence: f64) -> Result<i64, ScoringError> {
    // NaN fails the range check as well
    if !(0.0..=1.0).contains(&confidence) {
        return Err(ScoringError::ConfidenceOutOfRange(confidence));
    }

    Ok(CONFIDENCE_TABLE
        .iter()
        .find(|(bound, _)| confidence >= *bound)
        .map(|(_, points)| *points)
        .unwrap_or(FLOOR_POINTS))
}

/// Score one object as an earned/deducted pair
pub fn score(confidence: f64) -> Result<ScoreResult, ScoringError> {
    let points = points_for(confidence)?;
    Ok(ScoreResult {
        earned: points.max(0),
        deducted: (-points).max(0),
    })
}
