//! Archive command implementation.

use crawlwarc_core::{
    ErrorKind, HttpRequest, HttpResponse, Settings, StatsSnapshot, WarcDate, WarcWriter,
};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One line of the input file.
#[derive(Debug, Deserialize)]
struct ExchangeLine {
    request: RequestLine,
    response: ResponseLine,
    /// Pre-assigned `WARC-Date`; the current time is used when absent.
    #[serde(default)]
    warc_date: Option<WarcDate>,
}

#[derive(Debug, Deserialize)]
struct RequestLine {
    #[serde(default = "default_method")]
    method: String,
    url: String,
    #[serde(default = "default_version")]
    version: String,
    #[serde(default)]
    headers: Vec<(String, String)>,
    #[serde(default)]
    body: String,
}

#[derive(Debug, Deserialize)]
struct ResponseLine {
    url: String,
    #[serde(default = "default_version")]
    version: String,
    status: u16,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    headers: Vec<(String, String)>,
    #[serde(default)]
    body: String,
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_version() -> String {
    "HTTP/1.1".to_string()
}

impl ExchangeLine {
    fn into_exchange(self) -> (HttpResponse, HttpRequest) {
        let mut request = HttpRequest::new(self.request.method, self.request.url);
        request.version = self.request.version;
        request.headers = self.request.headers;
        request.body = self.request.body.into_bytes();
        request.meta.warc_date = self.warc_date;

        let mut response =
            HttpResponse::new(self.response.url, self.response.status, self.response.reason);
        response.version = self.response.version;
        response.headers = self.response.headers;
        response.body = self.response.body.into_bytes();

        (response, request)
    }
}

/// Result of an archive run.
#[derive(Debug)]
pub struct ArchiveSummary {
    /// Lines that could not be parsed or archived.
    pub skipped: usize,
    /// Files created.
    pub warc_count: u32,
    /// Last file written.
    pub last_file: Option<PathBuf>,
    /// Writer counters.
    pub stats: StatsSnapshot,
}

/// Runs the archive command.
pub fn run(
    settings_path: Option<&Path>,
    input: &Path,
    dest: Option<PathBuf>,
    prefix: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = resolve_settings(settings_path, dest)?;
    if let Some(prefix) = prefix {
        settings.warc_prefix = prefix;
    }

    let summary = archive(settings, input)?;

    println!("Exchanges:     {}", summary.stats.exchanges);
    println!("Skipped:       {}", summary.skipped);
    println!("Records:       {}", summary.stats.records);
    println!("Bytes written: {}", summary.stats.bytes_written);
    println!("Files:         {}", summary.warc_count);
    println!("Rotations:     {}", summary.stats.rotations);
    if let Some(file) = &summary.last_file {
        println!("Last file:     {}", file.display());
    }

    Ok(())
}

/// Picks the settings file, the `--dest` directory, or both.
fn resolve_settings(
    settings_path: Option<&Path>,
    dest: Option<PathBuf>,
) -> Result<Settings, Box<dyn std::error::Error>> {
    match (settings_path, dest) {
        (Some(path), dest) => {
            let mut settings = load_settings(path)?;
            if let Some(dest) = dest {
                settings.warc_dest = dest;
            }
            Ok(settings)
        }
        (None, Some(dest)) => Ok(Settings::new(dest)),
        (None, None) => Err("no output directory: pass --dest or a settings file".into()),
    }
}

fn load_settings(path: &Path) -> Result<Settings, Box<dyn std::error::Error>> {
    let file = File::open(path).map_err(|e| format!("cannot open {}: {e}", path.display()))?;
    let settings = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| format!("invalid settings file {}: {e}", path.display()))?;
    Ok(settings)
}

/// Writes every exchange of `input`.
///
/// Malformed lines and exchanges that cannot be turned into records are
/// skipped with a warning; any I/O failure stops the run.
pub fn archive(settings: Settings, input: &Path) -> Result<ArchiveSummary, Box<dyn std::error::Error>> {
    let mut writer = WarcWriter::new(settings)?;
    let reader = BufReader::new(
        File::open(input).map_err(|e| format!("cannot open {}: {e}", input.display()))?,
    );

    let mut skipped = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let parsed: ExchangeLine = match serde_json::from_str(&line) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(line = index + 1, error = %e, "skipping unparsable exchange");
                skipped += 1;
                continue;
            }
        };

        let (response, request) = parsed.into_exchange();
        match writer.write(&response, &request) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::RecordBuild => skipped += 1,
            Err(e) => return Err(e.into()),
        }
    }

    let last_file = writer.finish()?;
    info!(
        files = writer.warc_count(),
        exchanges = writer.stats().exchanges(),
        "archive run complete"
    );

    Ok(ArchiveSummary {
        skipped,
        warc_count: writer.warc_count(),
        last_file: last_file.or_else(|| writer.warc_fname().map(Path::to_path_buf)),
        stats: writer.stats().snapshot(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crawlwarc_codec::{WarcReader, WarcRecordType};
    use std::fs;
    use tempfile::tempdir;

    const GOOD: &str = r#"{"request":{"url":"http://a.example/","headers":[["Host","a.example"]]},"response":{"url":"http://a.example/","status":200,"reason":"OK","body":"hi"},"warc_date":"2024-01-01T00:00:00.000000Z"}"#;

    #[test]
    fn archives_lines_and_skips_bad_ones() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        let input = dir.path().join("input.jsonl");
        let bad_uri = GOOD.replace("http://a.example/", "");
        fs::write(&input, format!("{GOOD}\n\nnot json\n{bad_uri}\n{GOOD}\n")).unwrap();

        let summary = archive(Settings::new(&out).warc_prefix("cli"), &input).unwrap();

        assert_eq!(summary.stats.exchanges, 2);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.warc_count, 1);

        let records = WarcReader::read_all(&summary.last_file.unwrap()).unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].record_type().unwrap(), WarcRecordType::Warcinfo);
        assert_eq!(records[1].date(), Some("2024-01-01T00:00:00.000000Z"));
        assert!(records[4].block.ends_with(b"\r\n\r\nhi"));
    }

    #[test]
    fn settings_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"warc_dest": "/data", "collection": "quotes", "max_warc_size": 1000}"#,
        )
        .unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.warc_dest, PathBuf::from("/data"));
        assert_eq!(settings.collection, "quotes");
        assert_eq!(settings.max_warc_size, 1000);
        assert_eq!(settings.warc_prefix, "rec");
    }

    #[test]
    fn settings_file_without_dest_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"collection": "quotes"}"#).unwrap();

        let err = load_settings(&path).unwrap_err();
        assert!(err.to_string().contains("warc_dest"));
    }

    #[test]
    fn dest_flag_overrides_settings_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"warc_dest": "/data", "collection": "quotes"}"#).unwrap();

        let settings = resolve_settings(Some(&path), Some(PathBuf::from("/elsewhere"))).unwrap();
        assert_eq!(settings.warc_dest, PathBuf::from("/elsewhere"));
        assert_eq!(settings.collection, "quotes");

        let settings = resolve_settings(None, Some(PathBuf::from("/elsewhere"))).unwrap();
        assert_eq!(settings.warc_dest, PathBuf::from("/elsewhere"));

        assert!(resolve_settings(None, None).is_err());
    }

    #[test]
    fn invalid_date_line_is_skipped() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.jsonl");
        fs::write(&input, GOOD.replace("2024-01-01T00:00:00.000000Z", "yesterday")).unwrap();

        let summary = archive(Settings::new(dir.path()), &input).unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.warc_count, 0);
    }
}
