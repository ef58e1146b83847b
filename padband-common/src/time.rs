//! Timestamp utilities

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Non-negative duration between two capture timestamps
///
/// Clamps to zero if `later` precedes `earlier` (pathological clock skew
/// during capture must not panic the replay offset computation).
pub fn offset_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> Duration {
    (later - earlier).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
    }

    #[test]
    fn test_offset_between_forward() {
        let t0 = Utc.timestamp_millis_opt(1_000).unwrap();
        let t1 = Utc.timestamp_millis_opt(1_500).unwrap();
        assert_eq!(offset_between(t0, t1), Duration::from_millis(500));
    }

    #[test]
    fn test_offset_between_equal_is_zero() {
        let t0 = Utc.timestamp_millis_opt(1_000).unwrap();
        assert_eq!(offset_between(t0, t0), Duration::ZERO);
    }

    #[test]
    fn test_offset_between_backwards_clamps_to_zero() {
        let t0 = Utc.timestamp_millis_opt(2_000).unwrap();
        let t1 = Utc.timestamp_millis_opt(1_000).unwrap();
        assert_eq!(offset_between(t0, t1), Duration::ZERO);
    }
}
