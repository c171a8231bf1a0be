//! Writer configuration.

use crate::error::{WriteError, WriteResult};
use crawlwarc_codec::DigestAlgorithm;
use serde::Deserialize;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Specification URL written into warcinfo `conformsTo`.
pub const DEFAULT_WARC_SPEC: &str =
    "https://iipc.github.io/warc-specifications/specifications/warc-format/warc-1.0/";

/// Default rotation threshold (10 GB).
pub const DEFAULT_MAX_WARC_SIZE: u64 = 10_000_000_000;

/// Configuration for a [`crate::WarcWriter`].
///
/// Built once per crawl run and validated by [`Settings::validate`] when the
/// writer is constructed. An external loader can deserialize it from JSON:
/// `warc_dest` is required, unknown keys are rejected and the other fields
/// fall back to the values of [`Settings::default`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Specification URL (informational, written to warcinfo).
    #[serde(default = "default_warc_spec")]
    pub warc_spec: String,

    /// Rotation threshold for compressed file size, in bytes.
    #[serde(default = "default_max_warc_size")]
    pub max_warc_size: u64,

    /// Collection name (`isPartOf`).
    #[serde(default)]
    pub collection: String,

    /// Free-text description of the crawl.
    #[serde(default)]
    pub description: String,

    /// Contact for the crawl operator.
    #[serde(default)]
    pub operator: String,

    /// Robots policy, e.g. `obey` or `ignore`.
    #[serde(default = "default_robots")]
    pub robots: String,

    /// User agent the crawler announced.
    #[serde(default)]
    pub user_agent: String,

    /// Archive file name prefix.
    #[serde(default = "default_warc_prefix")]
    pub warc_prefix: String,

    /// Directory archive files are written to.
    pub warc_dest: PathBuf,

    /// Digest used for block and payload digests.
    #[serde(default)]
    pub digest_algorithm: DigestAlgorithm,

    /// Deflate level for record members (0..=9).
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,

    /// Software string written to warcinfo.
    #[serde(default = "default_software")]
    pub software: String,
}

fn default_warc_spec() -> String {
    DEFAULT_WARC_SPEC.to_string()
}

const fn default_max_warc_size() -> u64 {
    DEFAULT_MAX_WARC_SIZE
}

fn default_robots() -> String {
    "obey".to_string()
}

fn default_warc_prefix() -> String {
    "rec".to_string()
}

const fn default_compression_level() -> u32 {
    6
}

fn default_software() -> String {
    format!("crawlwarc/{}", crate::VERSION)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            warc_spec: default_warc_spec(),
            max_warc_size: default_max_warc_size(),
            collection: String::new(),
            description: String::new(),
            operator: String::new(),
            robots: default_robots(),
            user_agent: String::new(),
            warc_prefix: default_warc_prefix(),
            warc_dest: PathBuf::from("."),
            digest_algorithm: DigestAlgorithm::default(),
            compression_level: default_compression_level(),
            software: default_software(),
        }
    }
}

impl Settings {
    /// Creates settings writing to `warc_dest` with default values.
    #[must_use]
    pub fn new(warc_dest: impl Into<PathBuf>) -> Self {
        Self {
            warc_dest: warc_dest.into(),
            ..Self::default()
        }
    }

    /// Sets the rotation threshold.
    #[must_use]
    pub const fn max_warc_size(mut self, size: u64) -> Self {
        self.max_warc_size = size;
        self
    }

    /// Sets the file name prefix.
    #[must_use]
    pub fn warc_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.warc_prefix = prefix.into();
        self
    }

    /// Sets the collection name.
    #[must_use]
    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the operator contact.
    #[must_use]
    pub fn operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = operator.into();
        self
    }

    /// Sets the robots policy.
    #[must_use]
    pub fn robots(mut self, robots: impl Into<String>) -> Self {
        self.robots = robots.into();
        self
    }

    /// Sets the announced user agent.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the digest algorithm.
    #[must_use]
    pub const fn digest_algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.digest_algorithm = algorithm;
        self
    }

    /// Sets the deflate level.
    #[must_use]
    pub const fn compression_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }

    /// Checks every invariant the writer relies on.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::Config`] if:
    /// - `max_warc_size` is zero
    /// - `warc_prefix` is empty or contains a path separator
    /// - `compression_level` is above 9
    /// - `warc_dest` is missing, not a directory, or not writable
    pub fn validate(&self) -> WriteResult<()> {
        if self.max_warc_size == 0 {
            return Err(WriteError::config("max_warc_size must be greater than zero"));
        }

        if self.warc_prefix.is_empty() {
            return Err(WriteError::config("warc_prefix must not be empty"));
        }
        if self.warc_prefix.contains(['/', '\\']) || self.warc_prefix.chars().any(char::is_control)
        {
            return Err(WriteError::config(format!(
                "warc_prefix contains invalid characters: {:?}",
                self.warc_prefix
            )));
        }

        if self.compression_level > 9 {
            return Err(WriteError::config(format!(
                "compression_level must be 0..=9, got {}",
                self.compression_level
            )));
        }

        check_writable_dir(&self.warc_dest)
    }
}

/// Checks `dir` by creating and removing a uniquely named file.
fn check_writable_dir(dir: &Path) -> WriteResult<()> {
    if !dir.is_dir() {
        return Err(WriteError::config(format!(
            "warc_dest is not a directory: {}",
            dir.display()
        )));
    }

    let scratch = dir.join(format!(".crawlwarc-write-check-{}", Uuid::new_v4()));
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&scratch)
        .map_err(|e| {
            WriteError::config(format!("warc_dest is not writable: {}: {e}", dir.display()))
        })?;
    fs::remove_file(&scratch).map_err(|e| {
        WriteError::config(format!(
            "cannot remove write check file in warc_dest: {}: {e}",
            scratch.display()
        ))
    })?;

    Ok(())
}
