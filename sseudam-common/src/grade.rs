//! Grade (tier) table
//!
//! Maps accumulated points to a tier label. The mapping is monotonic: more
//! points never yield a lower tier.

use serde::{Deserialize, Serialize};

/// One tier: the minimum accumulated points required and its label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeTier {
    pub min_points: i64,
    pub label: String,
}

/// Ordered tier table, lowest threshold first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeTable {
    tiers: Vec<GradeTier>,
}

const DEFAULT_TIERS: &[(i64, &str)] = &[
    (0, "Recycling Rookie"),
    (100, "Sorting Apprentice"),
    (300, "Green Keeper"),
    (700, "Eco Ranger"),
    (1500, "Earth Guardian"),
    (3000, "Planet Hero"),
];

impl Default for GradeTable {
    fn default() -> Self {
        Self {
            tiers: DEFAULT_TIERS
                .iter()
                .map(|(min_points, label)| GradeTier {
                    min_points: *min_points,
                    label: label.to_string(),
                })
                .collect(),
        }
    }
}

impl GradeTable {
    /// Build a table from custom tiers
    ///
    /// Tiers are sorted by threshold. The lowest tier must start at 0 so
    /// every non-negative balance has a label.
    pub fn new(mut tiers: Vec<GradeTier>) -> crate::Result<Self> {
        tiers.sort_by_key(|t| t.min_points);
        match tiers.first() {
            Some(first) if first.min_points == 0 => {}
            Some(first) => {
                return Err(crate::Error::Config(format!(
                    "lowest grade tier must start at 0 points (got {})",
                    first.min_points
                )))
            }
            None => return Err(crate::Error::Config("grade table is empty".to_string())),
        }
        if tiers.windows(2).any(|w| w[0].min_points == w[1].min_points) {
            return Err(crate::Error::Config(
                "grade tiers must have distinct thresholds".to_string(),
            ));
        }
        Ok(Self { tiers })
    }

    /// Configured tiers, or the built-in table when none are configured
    pub fn from_tiers(tiers: &[GradeTier]) -> crate::Result<Self> {
        if tiers.is_empty() {
            Ok(Self::default())
        } else {
            Self::new(tiers.to_vec())
        }
    }

    /// Label for a balance. Negative input is treated as zero.
    pub fn grade_of(&self, accumulated_points: i64) -> &str {
        self.tiers
            .iter()
            .rev()
            .find(|t| accumulated_points >= t.min_points)
            .unwrap_or(&self.tiers[0])
            .label
            .as_str()
    }
}
