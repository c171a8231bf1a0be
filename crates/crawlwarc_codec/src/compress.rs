//! Per-record gzip compression.
//!
//! Every record becomes its own gzip member. Members are self-terminated,
//! so an archive can be appended to without re-reading earlier content and
//! any record can be decoded starting at its own offset.

use crate::error::CodecResult;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

/// Default deflate level.
pub const DEFAULT_LEVEL: u32 = 6;

/// Wraps serialized records as independent gzip members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compressor {
    level: u32,
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL)
    }
}

impl Compressor {
    /// Creates a compressor with the given deflate level (clamped to 0..=9).
    #[must_use]
    pub fn new(level: u32) -> Self {
        Self {
            level: level.min(9),
        }
    }

    /// Returns the deflate level.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Compresses one serialized record into a complete gzip member.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the encoder fails.
    pub fn compress_record(&self, record_bytes: &[u8]) -> CodecResult<Vec<u8>> {
        let mut encoder = GzEncoder::new(
            Vec::with_capacity(record_bytes.len() / 2 + 64),
            Compression::new(self.level),
        );
        encoder.write_all(record_bytes)?;
        Ok(encoder.finish()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn member_decodes_back() {
        let member = Compressor::default().compress_record(b"WARC/1.0\r\n").unwrap();
        // gzip magic
        assert_eq!(&member[..2], &[0x1f, 0x8b]);

        let mut out = Vec::new();
        GzDecoder::new(&member[..]).read_to_end(&mut out).unwrap();
        assert_eq!(out, b"WARC/1.0\r\n");
    }

    #[test]
    fn concatenated_members_stay_separable() {
        let compressor = Compressor::default();
        let mut archive = compressor.compress_record(b"first").unwrap();
        let first_len = archive.len();
        archive.extend(compressor.compress_record(b"second").unwrap());

        let mut out = Vec::new();
        GzDecoder::new(&archive[first_len..])
            .read_to_end(&mut out)
            .unwrap();
        assert_eq!(out, b"second");
    }

    #[test]
    fn level_is_clamped() {
        assert_eq!(Compressor::new(42).level(), 9);
        assert_eq!(Compressor::new(0).level(), 0);
    }

    #[test]
    fn empty_input_is_still_a_member() {
        let member = Compressor::new(0).compress_record(b"").unwrap();
        assert!(member.len() >= 18);
    }
}
