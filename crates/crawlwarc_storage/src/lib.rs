//! # crawlwarc storage
//!
//! Append-only byte stores that hold crawlwarc archive files.
//!
//! Storage backends are **opaque byte stores** - they do not interpret the
//! data they store. They know nothing about WARC records, gzip members or
//! rotation; the codec and core crates own all of that.
//!
//! ## Design Principles
//!
//! - Backends are simple byte stores (append, flush, truncate, sync)
//! - Earlier bytes are never rewritten; only a failed append's tail is cut
//! - Must be `Send + Sync` so a writer can be handed to another thread
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing
//! - [`FileBackend`] - For archive files on disk
//!
//! ## Example
//!
//! ```rust
//! use crawlwarc_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! let offset = backend.append(b"hello world").unwrap();
//! assert_eq!(offset, 0);
//!
//! // drop the tail of a half-written append
//! backend.append(b" and more").unwrap();
//! backend.truncate(11).unwrap();
//! assert_eq!(backend.data(), b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
