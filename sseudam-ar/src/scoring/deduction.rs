//! Deduction capping

/// Clamp a raw deduction to the balance held before the update
///
/// The excess is absorbed, so applying `earned - capped` can never take the
/// balance below zero.
pub fn cap_deduction(total_deducted: i64, accumulated_points: i64) -> i64 {
    total_deducted.min(accumulated_points).max(0)
}
