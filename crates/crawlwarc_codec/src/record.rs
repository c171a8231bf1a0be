//! WARC record types and serialization.

use crate::date::WarcDate;
use crate::digest::{DigestValue, Digester};
use crate::error::{CodecError, CodecResult};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Version line that opens every record.
pub const WARC_VERSION: &str = "WARC/1.0";

/// Line separator used throughout the header block.
pub const CRLF: &str = "\r\n";

/// Type of WARC record written by crawlwarc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarcRecordType {
    /// Per-file metadata record.
    Warcinfo,
    /// A captured HTTP request.
    Request,
    /// A captured HTTP response.
    Response,
}

impl WarcRecordType {
    /// Returns the `WARC-Type` header value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warcinfo => "warcinfo",
            Self::Request => "request",
            Self::Response => "response",
        }
    }
}

impl fmt::Display for WarcRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WarcRecordType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warcinfo" => Ok(Self::Warcinfo),
            "request" => Ok(Self::Request),
            "response" => Ok(Self::Response),
            other => Err(CodecError::invalid_record(format!(
                "unknown WARC-Type: {other}"
            ))),
        }
    }
}

/// A `WARC-Record-ID` of the form `<urn:uuid:...>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId(String);

impl RecordId {
    /// Generates a fresh, globally unique record id.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("<urn:uuid:{}>", Uuid::new_v4()))
    }

    /// Returns the header value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One WARC record: a header block plus a content block.
///
/// `content_length` and `payload_digest` are derived from the content block
/// when the record is created and cannot drift from it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarcRecord {
    record_type: WarcRecordType,
    record_id: RecordId,
    date: WarcDate,
    target_uri: Option<String>,
    concurrent_to: Option<RecordId>,
    filename: Option<String>,
    content_type: String,
    content_block: Vec<u8>,
    payload_digest: DigestValue,
}

impl WarcRecord {
    /// Creates a record with a fresh id, digesting `content_block`.
    #[must_use]
    pub fn new(
        record_type: WarcRecordType,
        date: WarcDate,
        content_type: impl Into<String>,
        content_block: Vec<u8>,
        digester: &Digester,
    ) -> Self {
        let payload_digest = digester.digest(&content_block);
        Self {
            record_type,
            record_id: RecordId::generate(),
            date,
            target_uri: None,
            concurrent_to: None,
            filename: None,
            content_type: content_type.into(),
            content_block,
            payload_digest,
        }
    }

    /// Sets `WARC-Target-URI`.
    #[must_use]
    pub fn with_target_uri(mut self, uri: impl Into<String>) -> Self {
        self.target_uri = Some(uri.into());
        self
    }

    /// Sets `WARC-Concurrent-To`.
    #[must_use]
    pub fn with_concurrent_to(mut self, id: RecordId) -> Self {
        self.concurrent_to = Some(id);
        self
    }

    /// Sets `WARC-Filename`.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Returns the record type.
    #[must_use]
    pub fn record_type(&self) -> WarcRecordType {
        self.record_type
    }

    /// Returns the record id.
    #[must_use]
    pub fn record_id(&self) -> &RecordId {
        &self.record_id
    }

    /// Returns the `WARC-Date`.
    #[must_use]
    pub fn date(&self) -> &WarcDate {
        &self.date
    }

    /// Returns the target URI, if any.
    #[must_use]
    pub fn target_uri(&self) -> Option<&str> {
        self.target_uri.as_deref()
    }

    /// Returns the id of the concurrent record, if any.
    #[must_use]
    pub fn concurrent_to(&self) -> Option<&RecordId> {
        self.concurrent_to.as_ref()
    }

    /// Returns the `WARC-Filename`, if any.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Returns the `Content-Type`.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Returns the raw content block.
    #[must_use]
    pub fn content_block(&self) -> &[u8] {
        &self.content_block
    }

    /// Returns the content block length in bytes.
    #[must_use]
    pub fn content_length(&self) -> u64 {
        self.content_block.len() as u64
    }

    /// Returns the digest of the content block.
    #[must_use]
    pub fn payload_digest(&self) -> &DigestValue {
        &self.payload_digest
    }

    /// Returns the header fields in emission order.
    #[must_use]
    pub fn header_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("WARC-Type", self.record_type.as_str().to_string()),
            ("WARC-Record-ID", self.record_id.to_string()),
            ("WARC-Date", self.date.to_string()),
        ];
        if let Some(uri) = &self.target_uri {
            fields.push(("WARC-Target-URI", uri.clone()));
        }
        if let Some(id) = &self.concurrent_to {
            fields.push(("WARC-Concurrent-To", id.to_string()));
        }
        if let Some(name) = &self.filename {
            fields.push(("WARC-Filename", name.clone()));
        }
        fields.push(("Content-Type", self.content_type.clone()));
        fields.push(("WARC-Block-Digest", self.payload_digest.to_string()));
        fields.push(("WARC-Payload-Digest", self.payload_digest.to_string()));
        fields.push(("Content-Length", self.content_length().to_string()));
        fields
    }

    /// Serializes the record to its uncompressed wire form.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidHeader`] if any header value is empty or
    /// contains a line break.
    pub fn encode(&self) -> CodecResult<Vec<u8>> {
        let fields = self.header_fields();

        let mut header = String::with_capacity(512);
        header.push_str(WARC_VERSION);
        header.push_str(CRLF);
        for (name, value) in &fields {
            if value.is_empty() {
                return Err(CodecError::invalid_header(*name, "empty value"));
            }
            if value.contains(['\r', '\n']) {
                return Err(CodecError::invalid_header(*name, "value contains a line break"));
            }
            header.push_str(name);
            header.push_str(": ");
            header.push_str(value);
            header.push_str(CRLF);
        }
        header.push_str(CRLF);

        let mut out = Vec::with_capacity(header.len() + self.content_block.len() + 4);
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(&self.content_block);
        out.extend_from_slice(CRLF.as_bytes());
        out.extend_from_slice(CRLF.as_bytes());
        Ok(out)
    }
}
