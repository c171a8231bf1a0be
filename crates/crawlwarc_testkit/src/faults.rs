//! Storage that fails on demand.
//!
//! Lets integration tests drive the writer into the half-written append a
//! full disk produces, while the bytes still land in a real file.

use crawlwarc_core::{FileBackend, StorageBackend, StorageError, StorageResult};
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// An on-disk backend that fails chosen appends halfway through.
#[derive(Debug)]
pub struct FaultyBackend {
    inner: FileBackend,
    appends: usize,
    fail_on: Vec<usize>,
}

impl FaultyBackend {
    /// Creates `path` and fails the appends numbered in `fail_on`, counting
    /// from zero (the warcinfo record).
    pub fn create(path: &Path, fail_on: Vec<usize>) -> StorageResult<Self> {
        Ok(Self {
            inner: FileBackend::create_new(path)?,
            appends: 0,
            fail_on,
        })
    }
}

impl StorageBackend for FaultyBackend {
    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        let index = self.appends;
        self.appends += 1;

        if self.fail_on.contains(&index) {
            self.inner.append(&data[..data.len() / 2])?;
            self.inner.flush()?;
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::Other,
                "no space left on device",
            )));
        }
        self.inner.append(data)
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.inner.flush()
    }

    fn size(&self) -> StorageResult<u64> {
        self.inner.size()
    }

    fn truncate(&mut self, len: u64) -> StorageResult<()> {
        self.inner.truncate(len)
    }

    fn sync(&mut self) -> StorageResult<()> {
        self.inner.sync()
    }
}

/// Returns a backend opener whose first file fails the appends in
/// `fail_on`; every later file is a plain [`FileBackend`].
pub fn fail_first_file(
    fail_on: Vec<usize>,
) -> impl Fn(&Path) -> StorageResult<Box<dyn StorageBackend>> + Send + Sync + 'static {
    let opened = AtomicUsize::new(0);
    move |path: &Path| -> StorageResult<Box<dyn StorageBackend>> {
        if opened.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(Box::new(FaultyBackend::create(path, fail_on.clone())?))
        } else {
            Ok(Box::new(FileBackend::create_new(path)?))
        }
    }
}
