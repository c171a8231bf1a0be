//! # crawlwarc codec
//!
//! WARC 1.0 record framing for crawlwarc.
//!
//! This crate owns the archive wire format:
//! - [`WarcRecord`] header framing and content-length accounting
//! - [`Digester`] block digests (`sha1:<BASE32>`)
//! - [`Compressor`] one gzip member per record
//! - [`WarcReader`] member-by-member parsing of finished archives
//!
//! ## Record Layout
//!
//! ```text
//! WARC/1.0\r\n
//! WARC-Type: response\r\n
//! ...header fields...\r\n
//! Content-Length: N\r\n
//! \r\n
//! <N bytes of content block>\r\n
//! \r\n
//! ```
//!
//! Each serialized record is compressed as an independent gzip member, so
//! an archive is a plain concatenation of members and any record can be
//! decoded from its offset without touching earlier ones.
//!
//! ## Usage
//!
//! ```
//! use crawlwarc_codec::{Compressor, Digester, WarcDate, WarcRecord, WarcRecordType};
//!
//! let digester = Digester::default();
//! let record = WarcRecord::new(
//!     WarcRecordType::Warcinfo,
//!     WarcDate::now(),
//!     "application/warc-fields",
//!     b"software: crawlwarc\r\n".to_vec(),
//!     &digester,
//! );
//! let member = Compressor::default().compress_record(&record.encode().unwrap()).unwrap();
//! assert!(!member.is_empty());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod compress;
mod date;
mod digest;
mod error;
mod reader;
mod record;

pub use compress::Compressor;
pub use date::WarcDate;
pub use digest::{DigestAlgorithm, DigestValue, Digester};
pub use error::{CodecError, CodecResult};
pub use reader::{ParsedRecord, WarcReader};
pub use record::{RecordId, WarcRecord, WarcRecordType, CRLF, WARC_VERSION};
