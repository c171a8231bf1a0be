//! Archive file sequencing and size-based rotation.

use crate::archive::{compress_batch, create_file_backend, ArchiveFile, BackendOpener};
use crate::builder::RecordBuilder;
use crate::error::{WriteError, WriteResult};
use crate::settings::Settings;
use crate::stats::WriterStats;
use chrono::Utc;
use crawlwarc_codec::{Compressor, WarcDate, WarcRecord};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Highest sequence number that fits the five-digit file name field.
pub const MAX_SEQUENCE: u32 = 99_999;

/// The rotator's file slot.
#[derive(Debug)]
enum FileState {
    NoFileOpen,
    FileOpen(ArchiveFile),
}

/// Read-only view of the writer's counters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WriterState {
    /// Files created so far in this run.
    pub warc_count: u32,
    /// Compressed bytes written to the current file.
    pub warc_size: u64,
    /// Path of the current (or last) file.
    pub warc_fname: Option<PathBuf>,
}

/// What an append did besides writing the batch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppendOutcome {
    /// File created to receive the batch, if any.
    pub opened: Option<PathBuf>,
    /// Whether a full file was closed first.
    pub rotated: bool,
    /// Records appended, including a fresh warcinfo.
    pub records: u64,
    /// Compressed bytes appended, including a fresh warcinfo.
    pub bytes: u64,
}

/// Owns the open archive file and decides when to start the next one.
///
/// Two states: `NoFileOpen` until the first append (or after
/// [`FileRotator::finish`]) and `FileOpen` afterwards. Every file starts
/// with a warcinfo record describing the run; a file whose warcinfo cannot
/// be written is removed again and its sequence number reused.
///
/// File, rotation and append counters are recorded into the shared
/// [`WriterStats`] as they happen, including when a later step of the same
/// append fails.
pub struct FileRotator {
    settings: Settings,
    builder: RecordBuilder,
    compressor: Compressor,
    opener: Arc<BackendOpener>,
    stats: Arc<WriterStats>,
    file: FileState,
    state: WriterState,
}

impl fmt::Debug for FileRotator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileRotator")
            .field("settings", &self.settings)
            .field("file", &self.file)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl FileRotator {
    /// Creates a rotator with no file open, writing files under
    /// `settings.warc_dest`.
    #[must_use]
    pub fn new(settings: Settings, builder: RecordBuilder, compressor: Compressor) -> Self {
        let opener: Arc<BackendOpener> = Arc::new(create_file_backend);
        Self {
            settings,
            builder,
            compressor,
            opener,
            stats: Arc::new(WriterStats::new()),
            file: FileState::NoFileOpen,
            state: WriterState::default(),
        }
    }

    /// Replaces how the storage of each new file is created.
    #[must_use]
    pub fn with_opener(mut self, opener: Arc<BackendOpener>) -> Self {
        self.opener = opener;
        self
    }

    /// Records counters into `stats` instead of a private set.
    #[must_use]
    pub fn with_stats(mut self, stats: Arc<WriterStats>) -> Self {
        self.stats = stats;
        self
    }

    /// Returns the counters.
    #[must_use]
    pub fn state(&self) -> &WriterState {
        &self.state
    }

    /// Returns the statistics this rotator records into.
    #[must_use]
    pub fn stats(&self) -> &Arc<WriterStats> {
        &self.stats
    }

    /// Returns true if a file is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.file, FileState::FileOpen(_))
    }

    /// Returns the open file, if any.
    #[must_use]
    pub fn current(&self) -> Option<&ArchiveFile> {
        match &self.file {
            FileState::FileOpen(archive) => Some(archive),
            FileState::NoFileOpen => None,
        }
    }

    /// Appends `records` as one batch, opening or rotating files as needed.
    ///
    /// The batch is compressed before the rotation decision, so the file
    /// size limit is checked against real on-disk bytes. A batch never
    /// straddles two files. A file left poisoned by an earlier failure is
    /// rotated away before anything else is written.
    ///
    /// # Errors
    ///
    /// Returns a record build error if a record cannot be framed (nothing
    /// is written), or an I/O error from opening, finalizing or appending.
    pub fn append(&mut self, records: &[WarcRecord]) -> WriteResult<AppendOutcome> {
        let batch = compress_batch(&self.compressor, records)?;
        let batch_len = batch.len() as u64;
        let max = self.settings.max_warc_size;
        let mut outcome = AppendOutcome::default();

        let needs_rotation = match &self.file {
            FileState::FileOpen(archive) => {
                archive.is_poisoned()
                    || (archive.size_bytes() > 0 && archive.size_bytes() + batch_len > max)
            }
            FileState::NoFileOpen => false,
        };
        if needs_rotation {
            self.close_current()?;
            self.stats.record_rotation();
            outcome.rotated = true;
        }

        if !self.is_open() {
            let (path, records, bytes) = self.open_next()?;
            outcome.opened = Some(path);
            outcome.records += records;
            outcome.bytes += bytes;
        }

        if batch_len > max {
            warn!(batch_len, max, "batch exceeds max_warc_size, writing it whole");
        }

        let FileState::FileOpen(archive) = &mut self.file else {
            return Err(no_file_open());
        };
        let offset = archive.append_compressed(&batch, records.len() as u64)?;
        debug!(
            file = %archive.path().display(),
            offset,
            records = records.len(),
            bytes = batch_len,
            "appended batch"
        );

        self.state.warc_size = archive.size_bytes();
        self.stats.record_append(records.len() as u64, batch_len);
        outcome.records += records.len() as u64;
        outcome.bytes += batch_len;
        Ok(outcome)
    }

    /// Flushes and closes the open file, returning to `NoFileOpen`.
    ///
    /// Counters are kept, so the next append continues the sequence.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from the final flush or sync.
    pub fn finish(&mut self) -> WriteResult<Option<PathBuf>> {
        if self.is_open() {
            self.close_current().map(Some)
        } else {
            Ok(None)
        }
    }

    fn close_current(&mut self) -> WriteResult<PathBuf> {
        let FileState::FileOpen(archive) = std::mem::replace(&mut self.file, FileState::NoFileOpen)
        else {
            return Err(no_file_open());
        };
        let size = archive.size_bytes();
        let records = archive.record_count();

        if archive.is_poisoned() {
            let path = archive.path().to_path_buf();
            warn!(file = %path.display(), size, records, "abandoning archive file with a partial record");
            if let Err(e) = archive.finalize() {
                warn!(file = %path.display(), error = %e, "cannot sync abandoned archive file");
            }
            return Ok(path);
        }

        let path = archive.finalize()?;
        info!(file = %path.display(), size, records, "closed archive file");
        Ok(path)
    }

    /// Creates the next sequenced file and writes its warcinfo record.
    fn open_next(&mut self) -> WriteResult<(PathBuf, u64, u64)> {
        let sequence = self.state.warc_count;
        if sequence > MAX_SEQUENCE {
            return Err(WriteError::SerialExhausted { max: MAX_SEQUENCE });
        }

        let path = archive_path(&self.settings.warc_dest, &self.settings.warc_prefix, sequence);
        let backend = (self.opener)(&path)?;
        let mut archive = ArchiveFile::with_backend(path.clone(), sequence, backend);

        let warcinfo = self
            .builder
            .build_warcinfo(&self.settings, WarcDate::now())
            .with_filename(archive.file_name());
        let written = compress_batch(&self.compressor, std::slice::from_ref(&warcinfo))
            .and_then(|info| archive.append_compressed(&info, 1).map(|_| info.len() as u64));
        let info_len = match written {
            Ok(len) => len,
            Err(e) => {
                drop(archive);
                discard_file(&path);
                return Err(e);
            }
        };

        info!(file = %path.display(), sequence, "opened archive file");

        self.state.warc_count += 1;
        self.state.warc_size = archive.size_bytes();
        self.state.warc_fname = Some(path.clone());
        self.file = FileState::FileOpen(archive);
        self.stats.record_file_opened();
        self.stats.record_append(1, info_len);
        Ok((path, 1, info_len))
    }
}

fn no_file_open() -> WriteError {
    WriteError::Io(io::Error::new(io::ErrorKind::NotFound, "no archive file open"))
}

/// Removes a file that never received its warcinfo record.
fn discard_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(file = %path.display(), "removed archive file without warcinfo"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(file = %path.display(), error = %e, "cannot remove archive file without warcinfo"),
    }
}

/// `<dest>/<prefix>-<YYYYmmddHHMMSS>-<sequence:05>.warc.gz`
fn archive_path(dest: &Path, prefix: &str, sequence: u32) -> PathBuf {
    let timestamp = Utc::now().format("%Y%m%d%H%M%S");
    dest.join(format!("{prefix}-{timestamp}-{sequence:05}.warc.gz"))
}
