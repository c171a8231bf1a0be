//! Storage backend trait definition.

use crate::error::StorageResult;

/// A low-level append-only byte store.
///
/// One backend holds exactly one archive file. The archive writer appends
/// whole compressed records to it and only ever cuts it back to a length it
/// observed before a failed append.
///
/// # Invariants
///
/// - `append` returns the offset where data was written
/// - `truncate` never grows the store
/// - `sync` makes all appended data durable
/// - Backends must be `Send + Sync`
pub trait StorageBackend: Send + Sync {
    /// Appends data to the end of the storage.
    ///
    /// Returns the offset where the data was written.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs. Part of `data` may already
    /// have been written when this fails.
    fn append(&mut self, data: &[u8]) -> StorageResult<u64>;

    /// Flushes buffered writes to the operating system.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush operation fails.
    fn flush(&mut self) -> StorageResult<()>;

    /// Returns the current size of the storage in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;

    /// Cuts the storage back to `len` bytes.
    ///
    /// Used to drop the tail of an append that failed partway.
    ///
    /// # Errors
    ///
    /// Returns an error if the truncate operation fails.
    fn truncate(&mut self, len: u64) -> StorageResult<()>;

    /// Syncs all data and metadata to durable storage.
    ///
    /// Called when an archive file is finalized on rotation or shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&mut self) -> StorageResult<()>;
}
