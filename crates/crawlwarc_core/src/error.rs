//! Error types for the archive writer.

use crawlwarc_codec::CodecError;
use crawlwarc_storage::StorageError;
use std::io;
use thiserror::Error;

/// Result type for writer operations.
pub type WriteResult<T> = Result<T, WriteError>;

/// Coarse classification of a [`WriteError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid settings; no writer is produced.
    Config,
    /// The exchange cannot be turned into well-formed records; it is skipped.
    RecordBuild,
    /// Opening, appending to or finalizing an archive failed.
    Io,
}

/// Errors that can occur while writing archives.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Settings failed validation.
    #[error("invalid settings: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },

    /// A mandatory record field is missing or malformed.
    #[error("cannot build record: {message}")]
    RecordBuild {
        /// Description of the problem.
        message: String,
    },

    /// Filesystem error, passed through as the OS reported it.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Record encoding error.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The per-run file sequence is used up.
    #[error("archive sequence exhausted: more than {max} files in one run")]
    SerialExhausted {
        /// Highest usable sequence number.
        max: u32,
    },
}

impl WriteError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a record build error.
    pub fn record_build(message: impl Into<String>) -> Self {
        Self::RecordBuild {
            message: message.into(),
        }
    }

    /// Returns the error classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } => ErrorKind::Config,
            Self::RecordBuild { .. } => ErrorKind::RecordBuild,
            Self::Codec(CodecError::Io(_)) => ErrorKind::Io,
            Self::Codec(_) => ErrorKind::RecordBuild,
            Self::Io(_) | Self::SerialExhausted { .. } => ErrorKind::Io,
        }
    }
}

impl From<StorageError> for WriteError {
    fn from(err: StorageError) -> Self {
        Self::Io(err.into_io())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(WriteError::config("x").kind(), ErrorKind::Config);
        assert_eq!(WriteError::record_build("x").kind(), ErrorKind::RecordBuild);
        assert_eq!(
            WriteError::from(io::Error::new(io::ErrorKind::PermissionDenied, "nope")).kind(),
            ErrorKind::Io
        );
        assert_eq!(
            WriteError::from(CodecError::invalid_header("WARC-Target-URI", "empty")).kind(),
            ErrorKind::RecordBuild
        );
        assert_eq!(WriteError::SerialExhausted { max: 1 }.kind(), ErrorKind::Io);
    }

    #[test]
    fn io_errors_are_not_decorated() {
        let err = WriteError::from(StorageError::Io(io::Error::new(
            io::ErrorKind::Other,
            "disk full",
        )));
        assert!(matches!(err, WriteError::Io(ref e) if e.kind() == io::ErrorKind::Other));
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.to_string(), "disk full");

        let err = WriteError::from(io::Error::new(io::ErrorKind::Other, "disk full"));
        assert_eq!(err.to_string(), "disk full");
    }
}
