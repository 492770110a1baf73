use chrono::{DateTime, DurationRound, TimeDelta, Utc};

/// Current UTC time truncated to whole milliseconds (BSON datetime
/// precision), so a record reads back equal to what was written.
pub fn now_utc() -> DateTime<Utc> {
    let now = Utc::now();
    now.duration_trunc(TimeDelta::milliseconds(1)).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_utc_has_millisecond_precision() {
        let t = now_utc();
        assert_eq!(t.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
