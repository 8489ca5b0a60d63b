//! Grade transition detection

use crate::services::GradeFunction;

/// Notice attached to the outcome when the grade label changes
pub const PROMOTION_MESSAGE: &str = "Congratulations! Your grade has been promoted.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeTransition {
    pub previous: String,
    pub current: String,
}

impl GradeTransition {
    /// Compare the grade before and after a ledger update
    pub fn detect(grades: &dyn GradeFunction, prior_points: i64, updated_points: i64) -> Self {
        Self {
            previous: grades.grade_of(prior_points),
            current: grades.grade_of(updated_points),
        }
    }

    pub fn changed(&self) -> bool {
        self.previous != self.current
    }

    /// Promotion notice, empty when the label is unchanged
    pub fn notice(&self) -> &'static str {
        if self.changed() {
            PROMOTION_MESSAGE
        } else {
            ""
        }
    }
}
