use crate::error::{GitPulseError, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

/// Calendar day of an ISO-8601 timestamp, taken from the text before the `T`
/// separator. No timezone conversion is applied.
pub fn day_key(timestamp: &str) -> Option<NaiveDate> {
    let prefix = timestamp.split('T').next()?.trim();
    if prefix.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

pub fn month_key(timestamp: &str) -> Option<String> {
    day_key(timestamp).map(|day| day.format("%Y-%m").to_string())
}

pub fn parse_day(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| GitPulseError::InvalidDate(format!("'{input}': {e}")))
}

/// RFC3339 first, then a bare `YYYY-MM-DD` at midnight UTC.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()?;
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Sum that pins at `u64::MAX` instead of overflowing.
pub fn saturating_sum(values: impl IntoIterator<Item = u64>) -> u64 {
    values.into_iter().fold(0, u64::saturating_add)
}

/// Deserializes `null` as the type's default.
pub fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts any JSON value; only non-negative integers survive, everything
/// else counts as zero.
pub fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_u64().unwrap_or(0))
}

/// Accepts any JSON value; only strings survive.
pub fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_key_truncates_without_timezone_shift() {
        let day = day_key("2024-03-01T23:59:59-08:00").unwrap();
        assert_eq!(day, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(day_key("2024-03-01"), NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn day_key_rejects_garbage() {
        assert_eq!(day_key(""), None);
        assert_eq!(day_key("T10:00:00Z"), None);
        assert_eq!(day_key("yesterday"), None);
        assert_eq!(day_key("2023-02-30T00:00:00Z"), None);
    }

    #[test]
    fn month_key_uses_day_prefix() {
        assert_eq!(month_key("2024-11-05T08:00:00Z").as_deref(), Some("2024-11"));
        assert_eq!(month_key("nope"), None);
    }

    #[test]
    fn parse_timestamp_accepts_both_forms() {
        assert!(parse_timestamp("2024-01-02T03:04:05Z").is_some());
        assert!(parse_timestamp("2024-01-02").is_some());
        assert!(parse_timestamp("02/01/2024").is_none());
    }

    #[test]
    fn parse_day_reports_input() {
        let err = parse_day("2024-13-01").unwrap_err();
        assert!(err.to_string().contains("2024-13-01"));
    }
}
