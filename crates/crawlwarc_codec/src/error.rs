//! Error types for the codec crate.

use std::io;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or parsing WARC records.
#[derive(Error, Debug)]
pub enum CodecError {
    /// I/O error while compressing or reading members.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A `WARC-Date` value is not an RFC 3339 UTC timestamp.
    #[error("invalid WARC-Date {value:?}: {reason}")]
    InvalidDate {
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A header field name or value cannot be framed.
    #[error("invalid header field {name}: {message}")]
    InvalidHeader {
        /// The header field name.
        name: String,
        /// Description of the problem.
        message: String,
    },

    /// A decoded member is not a well-formed WARC record.
    #[error("invalid record: {message}")]
    InvalidRecord {
        /// Description of the structural error.
        message: String,
    },

    /// Unknown digest algorithm label.
    #[error("unsupported digest algorithm: {label}")]
    UnsupportedDigest {
        /// The label that was not recognized.
        label: String,
    },
}

impl CodecError {
    /// Create an invalid date error.
    pub fn invalid_date(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDate {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an invalid record error.
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }
}
