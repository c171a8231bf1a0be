//! Inspect command implementation.

use crawlwarc_codec::{ParsedRecord, WarcReader};
use serde::Serialize;
use std::path::Path;

/// Archive inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Archive path.
    pub path: String,
    /// Number of records.
    pub record_count: usize,
    /// Records in file order.
    pub records: Vec<RecordSummary>,
}

/// One record of an archive.
#[derive(Debug, Serialize)]
pub struct RecordSummary {
    /// Offset of the gzip member.
    pub offset: u64,
    /// Compressed member length.
    pub compressed_len: u64,
    /// `WARC-Type`.
    pub record_type: String,
    /// `WARC-Record-ID`.
    pub record_id: String,
    /// `WARC-Date`.
    pub date: String,
    /// `WARC-Target-URI`, for request and response records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_uri: Option<String>,
    /// `WARC-Concurrent-To`, for response records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrent_to: Option<String>,
    /// `Content-Length`.
    pub content_length: u64,
}

impl From<&ParsedRecord> for RecordSummary {
    fn from(record: &ParsedRecord) -> Self {
        Self {
            offset: record.offset,
            compressed_len: record.compressed_len,
            record_type: record.header("WARC-Type").unwrap_or("-").to_string(),
            record_id: record.record_id().unwrap_or("-").to_string(),
            date: record.date().unwrap_or("-").to_string(),
            target_uri: record.target_uri().map(str::to_string),
            concurrent_to: record.concurrent_to().map(str::to_string),
            content_length: record.content_length().unwrap_or(record.block.len() as u64),
        }
    }
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let result = inspect(path)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => print_text_output(&result),
    }

    Ok(())
}

/// Reads every record of `path`.
pub fn inspect(path: &Path) -> Result<InspectResult, Box<dyn std::error::Error>> {
    if !path.is_file() {
        return Err(format!("No archive found at {}", path.display()).into());
    }

    let records: Vec<RecordSummary> = WarcReader::read_all(path)?
        .iter()
        .map(RecordSummary::from)
        .collect();

    Ok(InspectResult {
        path: path.display().to_string(),
        record_count: records.len(),
        records,
    })
}

fn print_text_output(result: &InspectResult) {
    println!("Archive: {}", result.path);
    println!("Records: {}", result.record_count);
    println!();

    for record in &result.records {
        println!(
            "{:>10}  {:<9} {} {} {:>8}  {}",
            record.offset,
            record.record_type,
            record.record_id,
            record.date,
            record.content_length,
            record.target_uri.as_deref().unwrap_or("")
        );
        if let Some(id) = &record.concurrent_to {
            println!("{:>10}  concurrent-to {id}", "");
        }
    }
}
