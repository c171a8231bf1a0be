//! The archive writer façade.

use crate::archive::{create_file_backend, BackendOpener};
use crate::builder::{Exchange, RecordBuilder};
use crate::error::WriteResult;
use crate::exchange::{HttpRequest, HttpResponse};
use crate::rotator::{FileRotator, WriterState};
use crate::settings::Settings;
use crate::stats::WriterStats;
use crawlwarc_codec::{Compressor, Digester, WarcDate};
use crawlwarc_storage::{StorageBackend, StorageResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Writes crawled exchanges into rotating `.warc.gz` files.
///
/// One writer per crawl run. [`WarcWriter::write`] is called once per
/// completed exchange, in completion order. Files are created lazily on the
/// first write.
///
/// # Example
///
/// ```rust,no_run
/// use crawlwarc_core::{HttpRequest, HttpResponse, Settings, WarcWriter};
///
/// let mut writer = WarcWriter::new(Settings::new("/var/archive"))?;
/// let request = HttpRequest::get("http://a.example/");
/// let response = HttpResponse::new("http://a.example/", 200, "OK");
/// writer.write(&response, &request)?;
/// writer.finish()?;
/// # Ok::<(), crawlwarc_core::WriteError>(())
/// ```
#[derive(Debug)]
pub struct WarcWriter {
    settings: Settings,
    builder: RecordBuilder,
    rotator: FileRotator,
    stats: Arc<WriterStats>,
}

impl WarcWriter {
    /// Validates `settings` and creates a writer. No file is created yet.
    ///
    /// # Errors
    ///
    /// Returns [`crate::WriteError::Config`] if the settings are invalid or
    /// `warc_dest` is not a writable directory.
    pub fn new(settings: Settings) -> WriteResult<Self> {
        Self::build(settings, Arc::new(create_file_backend))
    }

    /// Like [`WarcWriter::new`], but each archive file's storage comes from
    /// `opener` instead of a fresh file on disk.
    ///
    /// `opener` receives the full path the file would have and must return
    /// an empty backend.
    ///
    /// # Errors
    ///
    /// Returns [`crate::WriteError::Config`] if the settings are invalid or
    /// `warc_dest` is not a writable directory.
    pub fn with_opener<F>(settings: Settings, opener: F) -> WriteResult<Self>
    where
        F: Fn(&Path) -> StorageResult<Box<dyn StorageBackend>> + Send + Sync + 'static,
    {
        Self::build(settings, Arc::new(opener))
    }

    fn build(settings: Settings, opener: Arc<BackendOpener>) -> WriteResult<Self> {
        settings.validate()?;

        let builder = RecordBuilder::new(Digester::new(settings.digest_algorithm));
        let compressor = Compressor::new(settings.compression_level);
        let stats = Arc::new(WriterStats::new());
        let rotator = FileRotator::new(settings.clone(), builder, compressor)
            .with_opener(opener)
            .with_stats(Arc::clone(&stats));

        info!(
            dest = %settings.warc_dest.display(),
            prefix = %settings.warc_prefix,
            max_warc_size = settings.max_warc_size,
            digest = %settings.digest_algorithm,
            "warc writer ready"
        );

        Ok(Self {
            settings,
            builder,
            rotator,
            stats,
        })
    }

    /// Archives one exchange as a request record followed by its response.
    ///
    /// The `WARC-Date` comes from the request's metadata slot; if the
    /// framework never stamped it, the current time is used for both
    /// records.
    ///
    /// # Errors
    ///
    /// - [`crate::ErrorKind::RecordBuild`] if the exchange is malformed;
    ///   nothing is written.
    /// - [`crate::ErrorKind::Io`] if opening, rotating or appending fails;
    ///   records already on disk stay valid.
    pub fn write(&mut self, response: &HttpResponse, request: &HttpRequest) -> WriteResult<()> {
        let result = self.write_exchange(response, request);
        if let Err(e) = &result {
            self.stats.record_error();
            warn!(url = %request.url, error = %e, "exchange not archived");
        }
        result
    }

    fn write_exchange(&mut self, response: &HttpResponse, request: &HttpRequest) -> WriteResult<()> {
        let assigned;
        let date = match &request.meta.warc_date {
            Some(date) => date,
            None => {
                assigned = WarcDate::now();
                &assigned
            }
        };
        let exchange = Exchange::new(request, response, date);

        let request_record = self.builder.build_request(&exchange)?;
        let response_record = self
            .builder
            .build_response(&exchange, request_record.record_id())?;

        let outcome = self.rotator.append(&[request_record, response_record])?;
        self.stats.record_exchange();

        debug!(
            url = %response.url,
            status = response.status,
            rotated = outcome.rotated,
            warc_size = self.warc_size(),
            "archived exchange"
        );
        Ok(())
    }

    /// Closes the current file, flushing and syncing it.
    ///
    /// A later [`WarcWriter::write`] opens the next file in the sequence.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from the final flush or sync.
    pub fn finish(&mut self) -> WriteResult<Option<PathBuf>> {
        self.rotator.finish()
    }

    /// Returns the number of files created so far.
    #[must_use]
    pub fn warc_count(&self) -> u32 {
        self.rotator.state().warc_count
    }

    /// Returns the compressed size of the current file.
    #[must_use]
    pub fn warc_size(&self) -> u64 {
        self.rotator.state().warc_size
    }

    /// Returns the path of the current file, or `None` before the first write.
    #[must_use]
    pub fn warc_fname(&self) -> Option<&Path> {
        self.rotator.state().warc_fname.as_deref()
    }

    /// Returns all three counters.
    #[must_use]
    pub fn state(&self) -> &WriterState {
        self.rotator.state()
    }

    /// Returns the running statistics.
    #[must_use]
    pub fn stats(&self) -> &WriterStats {
        &self.stats
    }

    /// Returns a shared handle to the statistics.
    ///
    /// The handle stays valid while the writer keeps writing, so another
    /// thread can poll it for progress.
    #[must_use]
    pub fn stats_handle(&self) -> Arc<WriterStats> {
        Arc::clone(&self.stats)
    }

    /// Returns the validated settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::ShortWriteBackend;
    use crate::error::{ErrorKind, WriteError};
    use crawlwarc_codec::{WarcReader, WarcRecordType};
    use std::fs;
    use std::thread;
    use tempfile::tempdir;

    fn exchange(url: &str) -> (HttpResponse, HttpRequest) {
        let request = HttpRequest::get(url).header("Host", "a.example");
        let response = HttpResponse::new(url, 200, "OK")
            .header("Content-Type", "text/plain")
            .body(b"body".to_vec());
        (response, request)
    }

    #[test]
    fn new_does_not_create_files() {
        let dir = tempdir().unwrap();
        let writer = WarcWriter::new(Settings::new(dir.path())).unwrap();

        assert_eq!(writer.warc_count(), 0);
        assert_eq!(writer.warc_size(), 0);
        assert!(writer.warc_fname().is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn new_rejects_invalid_settings() {
        let dir = tempdir().unwrap();
        let err = WarcWriter::new(Settings::new(dir.path().join("nope"))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn single_exchange() {
        let dir = tempdir().unwrap();
        let mut writer = WarcWriter::new(Settings::new(dir.path())).unwrap();
        let (response, request) = exchange("http://a.example/");

        writer.write(&response, &request).unwrap();

        assert_eq!(writer.warc_count(), 1);
        let path = writer.warc_fname().unwrap().to_path_buf();
        assert_eq!(writer.warc_size(), fs::metadata(&path).unwrap().len());

        let records = WarcReader::read_all(&path).unwrap();
        let types: Vec<_> = records.iter().map(|r| r.record_type().unwrap()).collect();
        assert_eq!(
            types,
            [WarcRecordType::Warcinfo, WarcRecordType::Request, WarcRecordType::Response]
        );
        assert_eq!(records[2].concurrent_to(), records[1].record_id());
        assert_eq!(records[1].date(), records[2].date());

        let stats = writer.stats().snapshot();
        assert_eq!(stats.exchanges, 1);
        assert_eq!(stats.records, 3);
        assert_eq!(stats.files_opened, 1);
        assert_eq!(stats.bytes_written, writer.warc_size());
    }

    #[test]
    fn preset_date_is_shared() {
        let dir = tempdir().unwrap();
        let mut writer = WarcWriter::new(Settings::new(dir.path())).unwrap();
        let (response, request) = exchange("http://a.example/");
        let request = request.warc_date(WarcDate::parse("2024-01-01T00:00:00.000000Z").unwrap());

        writer.write(&response, &request).unwrap();

        let records = WarcReader::read_all(writer.warc_fname().unwrap()).unwrap();
        assert_eq!(records[1].date(), Some("2024-01-01T00:00:00.000000Z"));
        assert_eq!(records[2].date(), Some("2024-01-01T00:00:00.000000Z"));
    }

    #[test]
    fn malformed_exchange_is_skipped() {
        let dir = tempdir().unwrap();
        let mut writer = WarcWriter::new(Settings::new(dir.path())).unwrap();
        let (response, request) = exchange("");

        let err = writer.write(&response, &request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RecordBuild);
        assert_eq!(writer.warc_count(), 0);
        assert_eq!(writer.stats().errors(), 1);

        let (response, request) = exchange("http://a.example/");
        writer.write(&response, &request).unwrap();
        assert_eq!(writer.warc_count(), 1);
    }

    #[test]
    fn finish_then_write_opens_next_file() {
        let dir = tempdir().unwrap();
        let mut writer = WarcWriter::new(Settings::new(dir.path())).unwrap();
        let (response, request) = exchange("http://a.example/");

        writer.write(&response, &request).unwrap();
        assert!(writer.finish().unwrap().is_some());
        writer.write(&response, &request).unwrap();

        assert_eq!(writer.warc_count(), 2);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn missing_dest_at_write_time_is_an_io_error() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("out");
        fs::create_dir(&dest).unwrap();
        let mut writer = WarcWriter::new(Settings::new(&dest)).unwrap();
        fs::remove_dir(&dest).unwrap();

        let (response, request) = exchange("http://a.example/");
        let err = writer.write(&response, &request).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(matches!(err, WriteError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
        assert!(!err.to_string().starts_with("I/O error"));
        assert_eq!(writer.warc_count(), 0);
        assert_eq!(writer.stats().errors(), 1);
    }

    #[test]
    fn stats_follow_the_files_actually_opened() {
        let dir = tempdir().unwrap();
        let mut writer = WarcWriter::with_opener(Settings::new(dir.path()), |_: &Path| {
            Ok(Box::new(ShortWriteBackend::failing_on(1)) as Box<dyn StorageBackend>)
        })
        .unwrap();
        let (response, request) = exchange("http://a.example/");

        assert!(writer.write(&response, &request).is_err());

        let stats = writer.stats().snapshot();
        assert_eq!(writer.warc_count(), 1);
        assert_eq!(stats.files_opened, u64::from(writer.warc_count()));
        assert_eq!(stats.exchanges, 0);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.bytes_written, writer.warc_size());
    }

    #[test]
    fn stats_handle_is_readable_from_another_thread() {
        let dir = tempdir().unwrap();
        let mut writer = WarcWriter::new(Settings::new(dir.path())).unwrap();
        let handle = writer.stats_handle();
        let (response, request) = exchange("http://a.example/");

        writer.write(&response, &request).unwrap();
        writer.write(&response, &request).unwrap();

        let seen = thread::spawn(move || handle.snapshot()).join().unwrap();
        assert_eq!(seen.exchanges, 2);
        assert_eq!(seen, writer.stats().snapshot());
    }
}
