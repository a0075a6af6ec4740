//! Day-granular calendar helpers.
//!
//! Schedules are authored in whole days, so every date in the simulation is a
//! [`chrono::NaiveDate`]. Date strings coming from the data provider are parsed
//! leniently: anything that cannot be understood becomes `None`, which the
//! engine treats as "not started".

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serializer};

/// Formats accepted for plain calendar dates.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

/// Formats accepted for timestamps without an offset.
const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Whole days from `from` to `to` (negative when `to` precedes `from`).
#[inline]
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Shift a date by a signed number of days, saturating at the calendar limits.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days))
        .unwrap_or(if days >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}

/// Parse a date string leniently.
///
/// Accepts `YYYY-MM-DD` (and a couple of regional variants), RFC 3339
/// timestamps and offset-less ISO timestamps. Time-of-day is discarded.
///
/// # Returns
/// `None` for empty or unparseable input.
pub fn parse_date_lenient(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(ts.date_naive());
    }

    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(ts.date());
        }
    }

    None
}

/// Serde adapter for `Option<NaiveDate>` fields that must never fail
/// deserialization.
///
/// Strings are parsed with [`parse_date_lenient`]; `null`, numbers, objects or
/// garbage all become `None` and are reported through `log::warn!`.
pub mod lenient_date {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDate {
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<RawDate> = Option::deserialize(deserializer)?;
        Ok(match raw {
            None => None,
            Some(RawDate::Text(text)) => {
                let parsed = parse_date_lenient(&text);
                if parsed.is_none() && !text.trim().is_empty() {
                    log::warn!("Unparseable date '{}' treated as missing", text);
                }
                parsed
            }
            Some(RawDate::Other(_)) => {
                log::warn!("Non-string date value treated as missing");
                None
            }
        })
    }
}
