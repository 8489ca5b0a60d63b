//! Success percentage

/// `round(correct * 100 / total)` with halves rounded up, 0 when `total` is 0
///
/// `correct` larger than `total` is clamped so the result stays within 0..=100.
pub fn success_rate(correct: usize, total: usize) -> i64 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total) as u64;
    let total = total as u64;
    // Integer half-up: floor((200c + t) / 2t)
    ((correct * 200 + total) / (total * 2)) as i64
}
