use chrono::{DateTime, TimeDelta, Utc};

/// Get current time in UTC
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Format a UTC timestamp as RFC 3339 with second precision
pub fn to_rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

const PERIODS: [(&str, &str, i64); 6] = [
    ("year", "years", 60 * 60 * 24 * 365),
    ("month", "months", 60 * 60 * 24 * 30),
    ("day", "days", 60 * 60 * 24),
    ("hour", "hours", 60 * 60),
    ("minute", "minutes", 60),
    ("second", "seconds", 1),
];

/// Render a duration as "2 days, 3 hours, 1 minute".
///
/// Fractions of a second are dropped; anything under one second (or negative) renders
/// as an empty string.
pub fn humanize_delta(delta: TimeDelta) -> String {
    let mut seconds = delta.num_seconds();
    let mut parts = Vec::new();

    for (singular, plural, period) in PERIODS {
        if seconds < period {
            continue;
        }
        let value = seconds / period;
        seconds %= period;
        let unit = if value > 1 { plural } else { singular };
        parts.push(format!("{value} {unit}"));
    }

    parts.join(", ")
}
