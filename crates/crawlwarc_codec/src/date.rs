//! `WARC-Date` values.

use crate::error::{CodecError, CodecResult};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `WARC-Date` header value.
///
/// Dates produced here are UTC with microsecond precision
/// (`2024-01-01T00:00:00.000000Z`). Dates supplied by a caller are checked
/// to be RFC 3339 UTC timestamps and then kept exactly as written, so a
/// request and its response always carry byte-identical values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WarcDate(String);

impl WarcDate {
    /// Returns the current UTC time.
    #[must_use]
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Formats a UTC timestamp with microsecond precision.
    #[must_use]
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    /// Validates and wraps a caller-supplied date.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidDate`] if the value is not RFC 3339 or
    /// is not expressed in UTC with a `Z` suffix.
    pub fn parse(value: &str) -> CodecResult<Self> {
        let parsed = DateTime::parse_from_rfc3339(value)
            .map_err(|e| CodecError::invalid_date(value, e.to_string()))?;

        if parsed.offset().local_minus_utc() != 0 || !value.ends_with('Z') {
            return Err(CodecError::invalid_date(value, "not a UTC timestamp"));
        }

        Ok(Self(value.to_string()))
    }

    /// Returns the header value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WarcDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for WarcDate {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WarcDate {
    type Error = CodecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WarcDate> for String {
    fn from(date: WarcDate) -> Self {
        date.0
    }
}
