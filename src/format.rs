//! Display helpers shared by the KPI cards and the leaderboard rows.

use chrono::{DateTime, Utc};

/// Placeholder for any value that is not available yet.
pub const PLACEHOLDER: &str = "—";

/// Compact count: `1.5K`, `2.5M`, `1.0B`, or the plain integer below 1000.
pub fn format_number(n: Option<u64>) -> String {
    let Some(n) = n else {
        return PLACEHOLDER.to_string();
    };
    let v = n as f64;
    if n >= 1_000_000_000 {
        format!("{:.1}B", v / 1e9)
    } else if n >= 1_000_000 {
        format!("{:.1}M", v / 1e6)
    } else if n >= 1_000 {
        format!("{:.1}K", v / 1e3)
    } else {
        n.to_string()
    }
}

pub fn format_percent(p: Option<u32>) -> String {
    match p {
        Some(p) => format!("{p}%"),
        None => PLACEHOLDER.to_string(),
    }
}

/// Compact age of `ts` relative to `now`: `now`, `{m}m`, `{h}h`, `{d}d`.
/// Every unit is rounded to nearest. Timestamps in the future read as `now`.
pub fn recency_label(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - ts).num_seconds();
    if secs < 60 {
        return "now".to_string();
    }
    let mins = (secs as f64 / 60.0).round() as i64;
    if mins < 60 {
        return format!("{mins}m");
    }
    if secs < 24 * 3600 {
        let hours = (secs as f64 / 3600.0).round() as i64;
        return format!("{hours}h");
    }
    let days = (secs as f64 / 86_400.0).round() as i64;
    format!("{days}d")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn number_thresholds() {
        assert_eq!(format_number(None), "—");
        assert_eq!(format_number(Some(0)), "0");
        assert_eq!(format_number(Some(999)), "999");
        assert_eq!(format_number(Some(1_500)), "1.5K");
        assert_eq!(format_number(Some(2_500_000)), "2.5M");
        assert_eq!(format_number(Some(1_000_000_000)), "1.0B");
        assert_eq!(format_number(Some(393_000_000)), "393.0M");
    }

    #[test]
    fn percent_or_placeholder() {
        assert_eq!(format_percent(Some(64)), "64%");
        assert_eq!(format_percent(None), "—");
    }

    #[test]
    fn recency_buckets() {
        let now = Utc::now();
        assert_eq!(recency_label(now - Duration::seconds(30), now), "now");
        assert_eq!(recency_label(now + Duration::minutes(5), now), "now");
        assert_eq!(recency_label(now - Duration::minutes(2), now), "2m");
        assert_eq!(recency_label(now - Duration::minutes(59), now), "59m");
        assert_eq!(recency_label(now - Duration::seconds(90), now), "2m");
        assert_eq!(recency_label(now - Duration::seconds(149), now), "2m");
        assert_eq!(recency_label(now - Duration::seconds(59 * 60 + 40), now), "1h");
        assert_eq!(recency_label(now - Duration::minutes(90), now), "2h");
        assert_eq!(recency_label(now - Duration::hours(3), now), "3h");
        assert_eq!(recency_label(now - Duration::hours(36), now), "2d");
        assert_eq!(recency_label(now - Duration::days(9), now), "9d");
    }
}
