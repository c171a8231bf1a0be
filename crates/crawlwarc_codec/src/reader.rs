//! Member-by-member reader for finished archives.
//!
//! The reader decodes one gzip member at a time and parses it as a single
//! WARC record. It checks framing only; digests are left to external
//! validators.

use crate::error::{CodecError, CodecResult};
use crate::record::{WarcRecordType, WARC_VERSION};
use flate2::bufread::GzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

const HEADER_END: &[u8] = b"\r\n\r\n";

/// A record decoded from an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    /// Offset of the record's gzip member in the archive.
    pub offset: u64,
    /// Compressed length of the member.
    pub compressed_len: u64,
    /// Header fields in file order.
    pub headers: Vec<(String, String)>,
    /// The content block.
    pub block: Vec<u8>,
}

impl ParsedRecord {
    /// Returns the first header value with the given name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the parsed `WARC-Type`.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is missing or unknown.
    pub fn record_type(&self) -> CodecResult<WarcRecordType> {
        self.header("WARC-Type")
            .ok_or_else(|| CodecError::invalid_record("missing WARC-Type"))?
            .parse()
    }

    /// Returns `WARC-Record-ID`.
    #[must_use]
    pub fn record_id(&self) -> Option<&str> {
        self.header("WARC-Record-ID")
    }

    /// Returns `WARC-Date`.
    #[must_use]
    pub fn date(&self) -> Option<&str> {
        self.header("WARC-Date")
    }

    /// Returns `WARC-Target-URI`.
    #[must_use]
    pub fn target_uri(&self) -> Option<&str> {
        self.header("WARC-Target-URI")
    }

    /// Returns `WARC-Concurrent-To`.
    #[must_use]
    pub fn concurrent_to(&self) -> Option<&str> {
        self.header("WARC-Concurrent-To")
    }

    /// Returns the declared `Content-Length`.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.header("Content-Length").and_then(|v| v.parse().ok())
    }

    fn parse(raw: &[u8], offset: u64, compressed_len: u64) -> CodecResult<Self> {
        let header_end = raw
            .windows(HEADER_END.len())
            .position(|w| w == HEADER_END)
            .ok_or_else(|| CodecError::invalid_record("header block is not terminated"))?;

        let header_text = std::str::from_utf8(&raw[..header_end])
            .map_err(|_| CodecError::invalid_record("header block is not UTF-8"))?;
        let mut lines = header_text.split("\r\n");

        if lines.next() != Some(WARC_VERSION) {
            return Err(CodecError::invalid_record(format!(
                "record at offset {offset} does not start with {WARC_VERSION}"
            )));
        }

        let mut headers = Vec::new();
        for line in lines {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| CodecError::invalid_record(format!("malformed header line: {line:?}")))?;
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }

        let mut record = Self {
            offset,
            compressed_len,
            headers,
            block: Vec::new(),
        };

        let length = record
            .content_length()
            .ok_or_else(|| CodecError::invalid_record("missing or invalid Content-Length"))?;
        let block_start = header_end + HEADER_END.len();
        let block_end = usize::try_from(length)
            .ok()
            .and_then(|len| block_start.checked_add(len))
            .filter(|&end| end <= raw.len())
            .ok_or_else(|| CodecError::invalid_record("content block shorter than Content-Length"))?;

        if &raw[block_end..] != HEADER_END {
            return Err(CodecError::invalid_record(
                "content block is not followed by the record terminator",
            ));
        }

        record.block = raw[block_start..block_end].to_vec();
        Ok(record)
    }
}

/// Reads records from a concatenation of gzip members.
pub struct WarcReader<R: BufRead> {
    input: CountingReader<R>,
    done: bool,
}

impl WarcReader<BufReader<File>> {
    /// Opens an archive file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(path: &Path) -> CodecResult<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }

    /// Reads every record of an archive file.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered.
    pub fn read_all(path: &Path) -> CodecResult<Vec<ParsedRecord>> {
        Self::open(path)?.collect()
    }
}

impl<R: BufRead> WarcReader<R> {
    /// Creates a reader over buffered input.
    pub fn new(input: R) -> Self {
        Self {
            input: CountingReader {
                inner: input,
                consumed: 0,
            },
            done: false,
        }
    }

    /// Reads the next record, or `None` at a clean end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if a member cannot be decompressed or parsed.
    pub fn next_record(&mut self) -> CodecResult<Option<ParsedRecord>> {
        let offset = self.input.consumed;
        if self.input.fill_buf()?.is_empty() {
            return Ok(None);
        }

        let mut raw = Vec::new();
        GzDecoder::new(&mut self.input).read_to_end(&mut raw)?;
        let compressed_len = self.input.consumed - offset;

        ParsedRecord::parse(&raw, offset, compressed_len).map(Some)
    }
}

impl<R: BufRead> Iterator for WarcReader<R> {
    type Item = CodecResult<ParsedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Tracks how many bytes the decoder has consumed, which gives member offsets.
struct CountingReader<R> {
    inner: R,
    consumed: u64,
}

impl<R: BufRead> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed += n as u64;
        Ok(n)
    }
}

impl<R: BufRead> BufRead for CountingReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.consumed += amt as u64;
        self.inner.consume(amt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Compressor, Digester, WarcDate, WarcRecord};

    fn member(record_type: WarcRecordType, block: &[u8]) -> (WarcRecord, Vec<u8>) {
        let record = WarcRecord::new(
            record_type,
            WarcDate::now(),
            "application/warc-fields",
            block.to_vec(),
            &Digester::default(),
        );
        let bytes = Compressor::default()
            .compress_record(&record.encode().unwrap())
            .unwrap();
        (record, bytes)
    }

    #[test]
    fn reads_back_concatenated_records() {
        let (first, mut archive) = member(WarcRecordType::Warcinfo, b"software: test\r\n");
        let first_len = archive.len() as u64;
        let (second, bytes) = member(WarcRecordType::Request, b"GET / HTTP/1.1\r\n\r\n");
        archive.extend(bytes);

        let records: Vec<_> = WarcReader::new(&archive[..])
            .collect::<CodecResult<_>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].offset, 0);
        assert_eq!(records[0].compressed_len, first_len);
        assert_eq!(records[1].offset, first_len);
        assert_eq!(records[0].record_id(), Some(first.record_id().as_str()));
        assert_eq!(records[1].record_id(), Some(second.record_id().as_str()));
        assert_eq!(records[1].block, b"GET / HTTP/1.1\r\n\r\n");
        assert_eq!(records[1].record_type().unwrap(), WarcRecordType::Request);
    }

    #[test]
    fn block_may_contain_blank_lines() {
        let block = b"HTTP/1.1 200 OK\r\n\r\nline\r\n\r\nmore";
        let (_, archive) = member(WarcRecordType::Response, block);

        let record = WarcReader::new(&archive[..]).next_record().unwrap().unwrap();
        assert_eq!(record.block, block);
        assert_eq!(record.content_length(), Some(block.len() as u64));
    }

    #[test]
    fn empty_input_has_no_records() {
        let mut reader = WarcReader::new(&b""[..]);
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn rejects_member_without_version_line() {
        let bytes = Compressor::default()
            .compress_record(b"HTTP/1.1 200 OK\r\n\r\n")
            .unwrap();
        let result = WarcReader::new(&bytes[..]).next_record();
        assert!(matches!(result, Err(CodecError::InvalidRecord { .. })));
    }

    #[test]
    fn rejects_short_block() {
        let bytes = Compressor::default()
            .compress_record(b"WARC/1.0\r\nContent-Length: 10\r\n\r\nabc\r\n\r\n")
            .unwrap();
        let result = WarcReader::new(&bytes[..]).next_record();
        assert!(matches!(result, Err(CodecError::InvalidRecord { .. })));
    }

    #[test]
    fn read_all_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.warc.gz");
        let (record, bytes) = member(WarcRecordType::Warcinfo, b"software: test\r\n");
        std::fs::write(&path, bytes).unwrap();

        let records = WarcReader::read_all(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date(), Some(record.date().as_str()));
        assert!(WarcReader::read_all(&dir.path().join("missing.warc.gz")).is_err());
    }

    #[test]
    fn iterator_stops_after_error() {
        let mut reader = WarcReader::new(&b"not gzip at all"[..]);
        assert!(matches!(reader.next(), Some(Err(_))));
        assert!(reader.next().is_none());
    }
}
