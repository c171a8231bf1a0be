//! A single open archive file.

use crate::error::WriteResult;
use crawlwarc_codec::{Compressor, WarcRecord};
use crawlwarc_storage::{FileBackend, StorageBackend, StorageResult};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Creates the storage behind each new archive file.
///
/// Called with the full path of the file about to be opened. The returned
/// backend must be empty.
pub type BackendOpener = dyn Fn(&Path) -> StorageResult<Box<dyn StorageBackend>> + Send + Sync;

/// Creates `path` exclusively on disk.
pub(crate) fn create_file_backend(path: &Path) -> StorageResult<Box<dyn StorageBackend>> {
    Ok(Box::new(FileBackend::create_new(path)?))
}

/// One `.warc.gz` file of a run.
///
/// An `ArchiveFile` only grows: compressed batches are appended whole and
/// earlier bytes are never touched. A batch whose append fails is cut off
/// again, so the file always ends on a record boundary. If that cut fails
/// too the file is marked poisoned and refuses further appends.
/// [`ArchiveFile::finalize`] consumes the file, so a closed archive cannot
/// receive further appends.
pub struct ArchiveFile {
    path: PathBuf,
    sequence_number: u32,
    backend: Box<dyn StorageBackend>,
    size_bytes: u64,
    record_count: u64,
    poisoned: bool,
}

impl fmt::Debug for ArchiveFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveFile")
            .field("path", &self.path)
            .field("sequence_number", &self.sequence_number)
            .field("size_bytes", &self.size_bytes)
            .field("record_count", &self.record_count)
            .field("poisoned", &self.poisoned)
            .finish_non_exhaustive()
    }
}

impl ArchiveFile {
    /// Wraps an existing, empty backend.
    #[must_use]
    pub fn with_backend(
        path: PathBuf,
        sequence_number: u32,
        backend: Box<dyn StorageBackend>,
    ) -> Self {
        Self {
            path,
            sequence_number,
            backend,
            size_bytes: 0,
            record_count: 0,
            poisoned: false,
        }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the file name component of the path.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Returns the run-local sequence number.
    #[must_use]
    pub fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    /// Returns the compressed bytes written so far.
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Returns the number of records written so far.
    #[must_use]
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Returns true if a failed append could not be rolled back.
    #[must_use]
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Appends an already compressed batch of `records` records.
    ///
    /// Returns the offset the batch starts at.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error. Whatever part of the batch reached
    /// the backend is truncated away and the counters are left untouched, so
    /// the file still ends with the last complete record.
    pub fn append_compressed(&mut self, compressed: &[u8], records: u64) -> WriteResult<u64> {
        if self.poisoned {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} has a partial record at its end", self.path.display()),
            )
            .into());
        }

        let before = self.backend.size()?;
        match append_and_flush(self.backend.as_mut(), compressed) {
            Ok(offset) => {
                self.size_bytes = before + compressed.len() as u64;
                self.record_count += records;
                Ok(offset)
            }
            Err(err) => {
                if let Err(rollback) = self.backend.truncate(before) {
                    self.poisoned = true;
                    warn!(
                        file = %self.path.display(),
                        error = %rollback,
                        "cannot truncate failed append"
                    );
                }
                Err(err.into())
            }
        }
    }

    /// Flushes and syncs the file, then closes it.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    pub fn finalize(mut self) -> WriteResult<PathBuf> {
        self.backend.flush()?;
        self.backend.sync()?;
        Ok(self.path)
    }
}

fn append_and_flush(backend: &mut dyn StorageBackend, data: &[u8]) -> StorageResult<u64> {
    let offset = backend.append(data)?;
    backend.flush()?;
    Ok(offset)
}

/// Serializes `records` and compresses each one into its own gzip member.
///
/// The members are returned concatenated so a batch lands in one append.
///
/// # Errors
///
/// Fails if a record header cannot be framed or the encoder fails.
pub(crate) fn compress_batch(
    compressor: &Compressor,
    records: &[WarcRecord],
) -> WriteResult<Vec<u8>> {
    let mut out = Vec::new();
    for record in records {
        let encoded = record.encode()?;
        out.extend_from_slice(&compressor.compress_record(&encoded)?);
    }
    Ok(out)
}
