//! ISO-8601 timestamps
//!
//! A [`Timestamp`] compares by instant but serializes back to the exact string
//! it was read from, so outage records are resubmitted byte-for-byte.
//!
//! Text received from the API is never rejected: a value that is not a valid
//! date is kept as-is, has no instant and is neither before nor after any
//! other timestamp. Text supplied by a user goes through [`Timestamp::parse`],
//! which does reject it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use errors::{OutageError, OutageResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Naive date-time layouts accepted after RFC 3339, read as UTC
const NAIVE_DATE_TIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Minute-precision date-time with a numeric offset, e.g. `2022-01-01T02:00+02:00`
const MINUTE_OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M%:z";

/// An instant in time together with its original ISO-8601 text
#[derive(Debug, Clone)]
pub struct Timestamp {
    raw: String,
    instant: Option<DateTime<Utc>>,
}

impl Timestamp {
    /// Parse an ISO-8601 string
    ///
    /// Accepts RFC 3339 (`2022-01-01T00:00:00.000Z`, any offset), the same
    /// without seconds (`2022-01-01T00:00Z`), a date-time without offset
    /// (taken as UTC) and a bare date (midnight UTC). Surrounding whitespace
    /// is dropped from the stored text.
    ///
    /// # Examples
    /// ```
    /// # use outage_model::Timestamp;
    /// let ts = Timestamp::parse("2022-01-01T00:00:00.000Z").unwrap();
    /// assert_eq!(ts.as_str(), "2022-01-01T00:00:00.000Z");
    /// assert!(Timestamp::parse("invalid-date").is_err());
    /// ```
    pub fn parse(input: &str) -> OutageResult<Self> {
        let text = input.trim();
        let instant = parse_instant(text).ok_or_else(|| {
            OutageError::invalid_input(format!(
                "'{}' is invalid. Date must be provided in ISO-8601 format",
                input
            ))
        })?;

        Ok(Self {
            raw: text.to_string(),
            instant: Some(instant),
        })
    }

    /// Wrap text received from the API, keeping it exactly as given
    ///
    /// Never fails; check [`Timestamp::is_valid`] to see whether it parsed.
    pub fn lenient(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let instant = parse_instant(raw.trim());
        Self { raw, instant }
    }

    /// The text this timestamp was read from
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed instant in UTC, `None` when the text is not a valid date
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        self.instant
    }

    pub fn is_valid(&self) -> bool {
        self.instant.is_some()
    }
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(local) = s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
        return parse_naive(local);
    }

    if let Ok(dt) = DateTime::parse_from_str(s, MINUTE_OFFSET_FORMAT) {
        return Some(dt.with_timezone(&Utc));
    }

    parse_naive(s).or_else(|| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    })
}

fn parse_naive(s: &str) -> Option<DateTime<Utc>> {
    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|naive| naive.and_utc())
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self {
            raw: instant.to_rfc3339_opts(SecondsFormat::Millis, true),
            instant: Some(instant),
        }
    }
}

impl FromStr for Timestamp {
    type Err = OutageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// Valid timestamps compare by instant; invalid ones are only equal to the
// same text and unordered against everything else.
impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        match (self.instant, other.instant) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.raw == other.raw,
            _ => false,
        }
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.instant, other.instant) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            (None, None) if self.raw == other.raw => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl Hash for Timestamp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.instant {
            Some(instant) => instant.hash(state),
            None => self.raw.hash(state),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::lenient(raw))
    }
}
