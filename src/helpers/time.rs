use std::time::Duration;

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};

use crate::utils::constants::TOKEN_VALIDITY_HOURS;

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn now_i64() -> i64 {
    now().timestamp()
}

/// Validity window applied to every freshly issued token
pub fn token_validity() -> TimeDelta {
    TimeDelta::hours(TOKEN_VALIDITY_HOURS)
}

/// Same window, as a store ttl
pub fn token_ttl() -> Duration {
    Duration::from_secs(TOKEN_VALIDITY_HOURS as u64 * 60 * 60)
}

/// `now + ttl`, saturating at the far end of the calendar
pub fn expires_after(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Serialize an expiry the way it is persisted in a token record,
/// e.g. `2025-03-01T10:00:00+00:00`
pub fn to_record_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, false)
}

pub fn parse_record_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
