//! # crawlwarc core
//!
//! Turns captured request/response exchanges into size-bounded sequences of
//! gzip-compressed WARC 1.0 files.
//!
//! This crate provides:
//! - [`Settings`] validated writer configuration
//! - [`RecordBuilder`] warcinfo, request and response record construction
//! - [`FileRotator`] archive file sequencing and size-based rotation
//! - [`WarcWriter`] the façade a crawler calls once per completed exchange
//!
//! ## Example
//!
//! ```rust,no_run
//! use crawlwarc_core::{HttpRequest, HttpResponse, Settings, WarcWriter};
//!
//! let settings = Settings::new("/var/archive").warc_prefix("quotes");
//! let mut writer = WarcWriter::new(settings)?;
//!
//! let mut request = HttpRequest::get("http://quotes.example/page/1");
//! request.stamp_warc_date();
//! let response = HttpResponse::new("http://quotes.example/page/1", 200, "OK")
//!     .header("Content-Type", "text/html")
//!     .body(b"<html></html>".to_vec());
//!
//! writer.write(&response, &request)?;
//! println!("{} file(s), current {:?}", writer.warc_count(), writer.warc_fname());
//! # Ok::<(), crawlwarc_core::WriteError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod archive;
mod builder;
mod error;
mod exchange;
mod rotator;
mod settings;
mod stats;
mod writer;

pub use archive::{ArchiveFile, BackendOpener};
pub use builder::{Exchange, RecordBuilder};
pub use error::{ErrorKind, WriteError, WriteResult};
pub use exchange::{HttpRequest, HttpResponse, RequestMeta};
pub use rotator::{AppendOutcome, FileRotator, WriterState, MAX_SEQUENCE};
pub use settings::{Settings, DEFAULT_MAX_WARC_SIZE, DEFAULT_WARC_SPEC};
pub use stats::{StatsSnapshot, WriterStats};
pub use writer::WarcWriter;

pub use crawlwarc_codec::{DigestAlgorithm, RecordId, WarcDate, WarcRecord, WarcRecordType};
pub use crawlwarc_storage::{FileBackend, StorageBackend, StorageError, StorageResult};

/// Crate version, written into warcinfo records.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
