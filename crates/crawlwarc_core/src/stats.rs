//! Writer statistics.
//!
//! The writer keeps its counters behind an `Arc`. A monitoring thread takes
//! a handle with [`crate::WarcWriter::stats_handle`] and reads it while the
//! crawl thread keeps writing.
//!
//! ```rust,ignore
//! let stats = writer.stats_handle();
//! std::thread::spawn(move || {
//!     let snap = stats.snapshot();
//!     println!("{} exchanges in {} file(s)", snap.exchanges, snap.files_opened);
//! });
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Running counters for a [`crate::WarcWriter`].
#[derive(Debug, Default)]
pub struct WriterStats {
    /// Exchanges archived.
    exchanges: AtomicU64,
    /// Records appended (including warcinfo).
    records: AtomicU64,
    /// Compressed bytes appended.
    bytes_written: AtomicU64,
    /// Archive files created with their warcinfo.
    files_opened: AtomicU64,
    /// Rotations performed.
    rotations: AtomicU64,
    /// Failed `write` calls.
    errors: AtomicU64,
}

impl WriterStats {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_exchange(&self) {
        self.exchanges.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_append(&self, records: u64, bytes: u64) {
        self.records.fetch_add(records, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_file_opened(&self) {
        self.files_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rotation(&self) {
        self.rotations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of archived exchanges.
    pub fn exchanges(&self) -> u64 {
        self.exchanges.load(Ordering::Relaxed)
    }

    /// Returns the number of appended records.
    pub fn records(&self) -> u64 {
        self.records.load(Ordering::Relaxed)
    }

    /// Returns the total compressed bytes appended.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Returns the number of archive files created.
    pub fn files_opened(&self) -> u64 {
        self.files_opened.load(Ordering::Relaxed)
    }

    /// Returns the number of rotations.
    pub fn rotations(&self) -> u64 {
        self.rotations.load(Ordering::Relaxed)
    }

    /// Returns the number of failed writes.
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            exchanges: self.exchanges(),
            records: self.records(),
            bytes_written: self.bytes_written(),
            files_opened: self.files_opened(),
            rotations: self.rotations(),
            errors: self.errors(),
        }
    }
}

/// A point-in-time copy of [`WriterStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Exchanges archived.
    pub exchanges: u64,
    /// Records appended.
    pub records: u64,
    /// Compressed bytes appended.
    pub bytes_written: u64,
    /// Archive files created.
    pub files_opened: u64,
    /// Rotations performed.
    pub rotations: u64,
    /// Failed writes.
    pub errors: u64,
}
