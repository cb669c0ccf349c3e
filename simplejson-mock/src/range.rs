use crate::error::ApiError;
use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use serde::Deserialize;

/// `range` object as sent by the frontend, e.g.
/// `{"from": "2023-01-01T00:00:00.000000+01:00", "to": "2023-01-01T02:00:00.000000+01:00"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRange {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    pub from: DateTime<Tz>,
    pub to: DateTime<Tz>,
}

/// Parses an RFC 3339 timestamp with an explicit offset and expresses it in `tz`.
pub fn parse_timestamp(field: &'static str, raw: &str, tz: Tz) -> Result<DateTime<Tz>, ApiError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|t| t.with_timezone(&tz))
        .map_err(|_| ApiError::InvalidTimestamp {
            field,
            value: raw.to_string(),
        })
}

pub fn parse_range(raw: &RawRange, tz: Tz) -> Result<TimeRange, ApiError> {
    Ok(TimeRange {
        from: parse_timestamp("range.from", &raw.from, tz)?,
        to: parse_timestamp("range.to", &raw.to, tz)?,
    })
}

/// Unix time in milliseconds, truncated to the second.
pub fn epoch_millis<T: TimeZone>(t: &DateTime<T>) -> i64 {
    t.timestamp().saturating_mul(1000)
}
