//! Timestamp parsing for the query window
//!
//! Bounds are accepted as `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`. Neither form
//! carries a zone, and both are read as UTC rather than the host's local
//! zone. A date on its own means midnight of that day. RFC 3339 strings with
//! an explicit offset are also accepted and converted to UTC.

use crate::error::{Result, UsageError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;

/// Full date and time, no zone
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Date only
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Records before this instant are known to be incomplete.
const ACCURATE_RECORDS_SINCE: (i32, u32, u32) = (2020, 6, 1);

/// A point in time, always held in UTC
///
/// # Examples
/// ```
/// use check_usage_core::timestamp::UtcTimestamp;
///
/// let ts: UtcTimestamp = "2024-03-01".parse().unwrap();
/// assert_eq!(ts.to_string(), "2024-03-01T00:00:00Z");
/// assert_eq!(ts.unix_seconds(), 1709251200);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcTimestamp(DateTime<Utc>);

impl UtcTimestamp {
    /// Parse a command-line time specification
    ///
    /// Tries the full form first, then the date-only form, then RFC 3339.
    pub fn parse(input: &str) -> Result<Self> {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, DATETIME_FORMAT) {
            return Ok(Self::from_naive_utc(naive));
        }

        if let Ok(date) = NaiveDate::parse_from_str(input, DATE_FORMAT) {
            return Ok(Self::from_naive_utc(date.and_time(NaiveTime::MIN)));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Ok(Self(dt.with_timezone(&Utc)));
        }

        Err(UsageError::Parameter(format!(
            "Invalid time specification: '{input}', expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS"
        )))
    }

    // Never routed through `Local`: a zone-less input is UTC regardless of TZ.
    fn from_naive_utc(naive: NaiveDateTime) -> Self {
        Self(Utc.from_utc_datetime(&naive))
    }

    /// Get the inner datetime
    pub fn inner(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Seconds since the Unix epoch, as sent to the accounting service
    pub fn unix_seconds(&self) -> i64 {
        self.0.timestamp()
    }

    /// Whether this instant falls before the service's reliable records
    pub fn predates_accurate_records(&self) -> bool {
        let (y, m, d) = ACCURATE_RECORDS_SINCE;
        match NaiveDate::from_ymd_opt(y, m, d) {
            Some(cutoff) => self.0 < Self::from_naive_utc(cutoff.and_time(NaiveTime::MIN)).0,
            None => false,
        }
    }
}

impl FromStr for UtcTimestamp {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Z", self.0.format(DATETIME_FORMAT))
    }
}
