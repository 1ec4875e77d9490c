//! Timestamp transcoding between RFC3339 strings and epoch milliseconds
//!
//! The readable rendering of a `timestamp` value is an RFC3339 string; the
//! optimized rendering is an integer count of milliseconds since the Unix
//! epoch. Both directions are total over protocol-legal values and fail
//! with a typed error otherwise.

use chrono::{DateTime, LocalResult, SecondsFormat, TimeZone, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failures of timestamp transcoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// The string rendering could not be parsed as RFC3339
    InvalidRfc3339(String),
    /// The integer rendering falls outside the range `chrono` can
    /// represent
    OutOfRange(i64),
}

impl Display for TimestampError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TimestampError::InvalidRfc3339(s) => {
                write!(f, "`{s}` is not a valid RFC3339 timestamp")
            }
            TimestampError::OutOfRange(ms) => {
                write!(f, "epoch-millisecond value {ms} is out of range")
            }
        }
    }
}

impl Error for TimestampError {}

/// Parses an RFC3339 string into epoch milliseconds.
pub fn millis_of_rfc3339(s: &str) -> Result<i64, TimestampError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.timestamp_millis())
        .map_err(|_| TimestampError::InvalidRfc3339(s.to_owned()))
}

/// Renders epoch milliseconds as an RFC3339 string in UTC.
///
/// Sub-second digits are emitted only when the millisecond component is
/// non-zero, so second-aligned values round-trip through the conventional
/// `…T…Z` rendering.
pub fn rfc3339_of_millis(millis: i64) -> Result<String, TimestampError> {
    match Utc.timestamp_millis_opt(millis) {
        LocalResult::Single(dt) => Ok(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        _ => Err(TimestampError::OutOfRange(millis)),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn epoch_is_epoch() {
        assert_eq!(millis_of_rfc3339("1970-01-01T00:00:00Z").unwrap(), 0);
        assert_eq!(rfc3339_of_millis(0).unwrap(), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn roundtrip_second_aligned() {
        for ms in [0i64, 1_000, 1_655_000_000_000, -1_000] {
            let s = rfc3339_of_millis(ms).unwrap();
            assert_eq!(millis_of_rfc3339(&s).unwrap(), ms, "value {ms} via {s}");
        }
    }

    #[test]
    fn offset_normalized_to_utc() {
        assert_eq!(
            millis_of_rfc3339("1970-01-01T01:00:00+01:00").unwrap(),
            0
        );
    }

    #[test]
    fn garbage_rejected() {
        assert!(millis_of_rfc3339("next tuesday").is_err());
    }
}
