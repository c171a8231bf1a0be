//! Test fixtures and writer helpers.
//!
//! Provides scratch destinations and sample exchanges for writer tests.

use crawlwarc_core::{
    HttpRequest, HttpResponse, Settings, StorageBackend, StorageResult, WarcWriter,
};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch `warc_dest` with automatic cleanup.
pub struct TestDest {
    dir: TempDir,
}

impl TestDest {
    /// Creates an empty temporary directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Returns the directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Returns default settings writing into this directory.
    pub fn settings(&self) -> Settings {
        Settings::new(self.path()).warc_prefix("test")
    }

    /// Creates a writer from the default settings adjusted by `configure`.
    pub fn writer(&self, configure: impl FnOnce(Settings) -> Settings) -> WarcWriter {
        WarcWriter::new(configure(self.settings())).expect("Failed to create writer")
    }

    /// Creates a writer with default settings whose files come from `opener`.
    pub fn writer_with_opener<F>(&self, opener: F) -> WarcWriter
    where
        F: Fn(&Path) -> StorageResult<Box<dyn StorageBackend>> + Send + Sync + 'static,
    {
        WarcWriter::with_opener(self.settings(), opener).expect("Failed to create writer")
    }

    /// Returns the `.warc.gz` files in the directory, in sequence order.
    pub fn archives(&self) -> Vec<PathBuf> {
        list_archives(self.path())
    }
}

impl Default for TestDest {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the `.warc.gz` files in `dir`, sorted by name.
///
/// Names embed the creation timestamp followed by the sequence number, so
/// name order is creation order within one run.
pub fn list_archives(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .expect("Failed to read directory")
        .map(|entry| entry.expect("Failed to read entry").path())
        .filter(|path| path.to_string_lossy().ends_with(".warc.gz"))
        .collect();
    paths.sort();
    paths
}

/// Builds a simple GET exchange with a small HTML body.
pub fn sample_get(url: &str) -> (HttpResponse, HttpRequest) {
    let request = HttpRequest::get(url)
        .header("Host", host_of(url))
        .header("User-Agent", "crawlwarc-test/1.0")
        .header("Accept", "text/html");
    let response = HttpResponse::new(url, 200, "OK")
        .header("Content-Type", "text/html; charset=utf-8")
        .body(b"<html><body>quote</body></html>".to_vec());
    (response, request)
}

/// Builds a GET exchange whose response body is `body`.
pub fn exchange_with_body(url: &str, body: Vec<u8>) -> (HttpResponse, HttpRequest) {
    let request = HttpRequest::get(url).header("Host", host_of(url));
    let response = HttpResponse::new(url, 200, "OK")
        .header("Content-Type", "application/octet-stream")
        .header("Content-Length", body.len().to_string())
        .body(body);
    (response, request)
}

/// Returns `len` pseudo-random bytes that gzip cannot shrink.
///
/// The same seed always yields the same bytes.
pub fn incompressible_body(len: usize, seed: u64) -> Vec<u8> {
    let mut body = vec![0u8; len];
    StdRng::seed_from_u64(seed).fill_bytes(&mut body);
    body
}

fn host_of(url: &str) -> String {
    url.split_once("://")
        .map_or(url, |(_, rest)| rest)
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .to_string()
}
