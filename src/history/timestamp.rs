//! Canonical timestamp text and coercion of legacy representations.
//!
//! Every timestamp leaves the crate as RFC 3339 with microseconds and an
//! explicit `+00:00` offset. Older history files may hold timestamps as naive
//! ISO strings, Unix epoch numbers, or `{"$date": ...}` documents; all of them
//! coerce to the same instant and therefore the same text.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;
use thiserror::Error;

/// Epoch values at or above this magnitude are taken as milliseconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Naive layouts accepted when a string carries no offset. Interpreted as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Error for a timestamp that cannot be interpreted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimestampError {
    /// A string in none of the accepted layouts.
    #[error("Unrecognized timestamp '{0}'")]
    UnrecognizedString(String),

    /// An epoch number outside chrono's representable range.
    #[error("Timestamp {0} is out of range")]
    OutOfRange(String),

    /// A JSON value of a kind that never holds a timestamp.
    #[error("Unsupported timestamp representation: {0}")]
    Unsupported(String),
}

/// Formats `at` in the canonical text form.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use ipwatch::history::timestamp;
///
/// let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
/// assert_eq!(timestamp::format(&at), "2024-05-01T12:00:00.000000+00:00");
/// ```
#[must_use]
pub fn format(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Interprets any supported JSON representation of a timestamp.
///
/// # Errors
///
/// Returns [`TimestampError`] when the value is not a recognizable timestamp.
pub fn coerce(raw: &Value) -> Result<DateTime<Utc>, TimestampError> {
    match raw {
        Value::String(s) => parse_str(s),
        Value::Number(n) => {
            if let Some(int) = n.as_i64() {
                from_epoch(int)
            } else {
                let secs = n
                    .as_f64()
                    .ok_or_else(|| TimestampError::OutOfRange(n.to_string()))?;
                from_epoch_f64(secs)
            }
        }
        Value::Object(map) => {
            if let Some(inner) = map.get("$date") {
                coerce(inner)
            } else if let Some(Value::String(long)) = map.get("$numberLong") {
                long.parse::<i64>()
                    .map_err(|_| TimestampError::UnrecognizedString(long.clone()))
                    .and_then(from_epoch)
            } else {
                Err(TimestampError::Unsupported(raw.to_string()))
            }
        }
        Value::Null | Value::Bool(_) | Value::Array(_) => {
            Err(TimestampError::Unsupported(raw.to_string()))
        }
    }
}

/// Normalizes any supported representation straight to canonical text.
///
/// # Errors
///
/// Returns [`TimestampError`] when the value is not a recognizable timestamp.
pub fn normalize(raw: &Value) -> Result<String, TimestampError> {
    coerce(raw).map(|at| format(&at))
}

fn parse_str(s: &str) -> Result<DateTime<Utc>, TimestampError> {
    let trimmed = s.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(at.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(trimmed, layout).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TimestampError::UnrecognizedString(s.to_string()))
}

fn from_epoch(value: i64) -> Result<DateTime<Utc>, TimestampError> {
    let at = if value.abs() >= MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(value)
    } else {
        DateTime::from_timestamp(value, 0)
    };
    at.ok_or_else(|| TimestampError::OutOfRange(value.to_string()))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn from_epoch_f64(secs: f64) -> Result<DateTime<Utc>, TimestampError> {
    if !secs.is_finite() {
        return Err(TimestampError::OutOfRange(secs.to_string()));
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round() as u32;
    DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
        .ok_or_else(|| TimestampError::OutOfRange(secs.to_string()))
}

/// Serde adapter: writes canonical text, reads any supported representation.
pub mod canonical {
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    /// Serializes as canonical text.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format(at))
    }

    /// Deserializes from any representation accepted by [`super::coerce`].
    ///
    /// # Errors
    ///
    /// Fails when the value is not a recognizable timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        super::coerce(&raw).map_err(D::Error::custom)
    }
}
