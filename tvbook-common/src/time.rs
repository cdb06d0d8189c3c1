//! Timestamp utilities
//!
//! Two kinds of time flow through the service:
//! - Audit timestamps (`createdAt`, `changedAt`, ...) are UTC instants.
//! - Form date-times (`airDateTime`, feed window) are local wall-clock values
//!   entered through `datetime-local` inputs, with or without seconds.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Accepted layouts for form date-times, most specific first
const FORM_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Layout used when writing form date-times back out
const FORM_OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Parse a form date-time (`YYYY-MM-DDTHH:MM[:SS]`)
pub fn parse_form_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    FORM_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Format a form date-time with seconds
pub fn format_form_datetime(value: &NaiveDateTime) -> String {
    value.format(FORM_OUTPUT_FORMAT).to_string()
}

/// Format an audit timestamp for storage
///
/// Fixed millisecond precision keeps stored values lexicographically ordered.
pub fn to_storage(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an audit timestamp read from storage
pub fn from_storage(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Serde adapter for optional form date-times
///
/// Empty strings and `null` deserialize to `None`; anything else must match
/// one of the accepted layouts.
pub mod form_datetime {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&super::format_form_datetime(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => super::parse_form_datetime(&s)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid date-time '{}'", s))),
        }
    }
}
