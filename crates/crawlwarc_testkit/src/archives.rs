//! Reading back and checking finished archives.
//!
//! [`check_archive`] applies the structural rules every file must satisfy,
//! so integration tests can assert them in one call.

use crawlwarc_codec::{DigestAlgorithm, Digester, ParsedRecord, WarcReader, WarcRecordType};
use std::collections::HashSet;
use std::path::Path;

/// Reads every record of `path`.
pub fn read_archive(path: &Path) -> Vec<ParsedRecord> {
    WarcReader::read_all(path).expect("Failed to read archive")
}

/// Record counts of a checked archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArchiveSummary {
    /// All records, warcinfo included.
    pub records: usize,
    /// Request/response pairs.
    pub exchanges: usize,
}

/// Checks one archive file:
///
/// - the first record is warcinfo and it is the only one
/// - every `Content-Length` equals the block length
/// - every block and payload digest matches a fresh digest of the block
/// - every response directly follows its request and names it in
///   `WARC-Concurrent-To`, with an identical `WARC-Date`
/// - record ids are unique within the file
pub fn check_archive(path: &Path) -> Result<ArchiveSummary, String> {
    let records =
        WarcReader::read_all(path).map_err(|e| format!("{}: {e}", path.display()))?;
    check_records(&records)
}

/// Applies the [`check_archive`] rules to already parsed records.
pub fn check_records(records: &[ParsedRecord]) -> Result<ArchiveSummary, String> {
    let Some(first) = records.first() else {
        return Err("archive is empty".to_string());
    };
    if first.record_type().map_err(|e| e.to_string())? != WarcRecordType::Warcinfo {
        return Err("first record is not warcinfo".to_string());
    }

    let mut ids = HashSet::new();
    let mut exchanges = 0;
    let mut pending_request: Option<&ParsedRecord> = None;

    for (index, record) in records.iter().enumerate() {
        let record_type = record.record_type().map_err(|e| e.to_string())?;
        let id = record
            .record_id()
            .ok_or_else(|| format!("record {index}: missing WARC-Record-ID"))?;
        if !ids.insert(id) {
            return Err(format!("record {index}: duplicate id {id}"));
        }

        if record.content_length() != Some(record.block.len() as u64) {
            return Err(format!(
                "record {index}: Content-Length {:?} but block has {} bytes",
                record.content_length(),
                record.block.len()
            ));
        }
        check_digest(record, "WARC-Block-Digest").map_err(|e| format!("record {index}: {e}"))?;
        check_digest(record, "WARC-Payload-Digest").map_err(|e| format!("record {index}: {e}"))?;

        match record_type {
            WarcRecordType::Warcinfo if index > 0 => {
                return Err(format!("record {index}: warcinfo after the first record"));
            }
            WarcRecordType::Warcinfo => {}
            WarcRecordType::Request => {
                if pending_request.is_some() {
                    return Err(format!("record {index}: request without a response"));
                }
                pending_request = Some(record);
            }
            WarcRecordType::Response => {
                let request = pending_request
                    .take()
                    .ok_or_else(|| format!("record {index}: response without a request"))?;
                if record.concurrent_to() != request.record_id() {
                    return Err(format!("record {index}: WARC-Concurrent-To mismatch"));
                }
                if record.date() != request.date() {
                    return Err(format!("record {index}: WARC-Date differs from request"));
                }
                exchanges += 1;
            }
        }
    }

    if pending_request.is_some() {
        return Err("archive ends with an unpaired request".to_string());
    }

    Ok(ArchiveSummary {
        records: records.len(),
        exchanges,
    })
}

fn check_digest(record: &ParsedRecord, header: &str) -> Result<(), String> {
    let value = record
        .header(header)
        .ok_or_else(|| format!("missing {header}"))?;
    let (label, _) = value
        .split_once(':')
        .ok_or_else(|| format!("malformed {header}: {value}"))?;
    let algorithm: DigestAlgorithm = label.parse().map_err(|e| format!("{header}: {e}"))?;

    let expected = Digester::new(algorithm).digest(&record.block);
    if expected.as_str() != value {
        return Err(format!("{header} {value} does not match {expected}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sample_get, TestDest};

    #[test]
    fn written_archive_passes_checks() {
        let dest = TestDest::new();
        let mut writer = dest.writer(|s| s);
        let (response, request) = sample_get("http://quotes.example/");
        writer.write(&response, &request).unwrap();
        writer.write(&response, &request).unwrap();

        let summary = check_archive(&dest.archives()[0]).unwrap();
        assert_eq!(summary, ArchiveSummary { records: 5, exchanges: 2 });
    }

    #[test]
    fn detects_broken_pairing() {
        let dest = TestDest::new();
        let mut writer = dest.writer(|s| s);
        let (response, request) = sample_get("http://quotes.example/");
        writer.write(&response, &request).unwrap();

        let mut records = read_archive(&dest.archives()[0]);
        records.swap(1, 2);
        assert!(check_records(&records).is_err());

        let mut records = read_archive(&dest.archives()[0]);
        records[2].block.push(b'!');
        assert!(check_records(&records).is_err());
    }
}
