//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current time in milliseconds since UNIX epoch
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Month bucket (`YYYYMM`) used to group analysis records
pub fn month_key(at: &DateTime<Utc>) -> String {
    at.format("%Y%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800);
    }

    #[tokio::test]
    async fn test_now_ms_advances() {
        let t1 = now_ms();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let t2 = now_ms();
        assert!(t2 > t1);
    }

    #[test]
    fn test_month_key_zero_padded() {
        let at = Utc.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).unwrap();
        assert_eq!(month_key(&at), "202503");
    }

    #[test]
    fn test_month_key_december() {
        let at = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(month_key(&at), "202412");
    }
}
