//! # crawlwarc testkit
//!
//! Test utilities for crawlwarc.
//!
//! This crate provides:
//! - Fixtures: scratch destinations, sample exchanges, incompressible bodies
//! - Fault injection: storage that fails appends halfway through
//! - Property-based test generators using proptest
//! - Helpers that read back and check finished archives
//!
//! The cross-crate integration tests live in this crate's `tests/`
//! directory.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crawlwarc_testkit::prelude::*;
//!
//! let dest = TestDest::new();
//! let mut writer = dest.writer(|s| s.max_warc_size(10_000_000));
//! let (response, request) = sample_get("http://quotes.example/");
//! writer.write(&response, &request).unwrap();
//! assert_eq!(dest.archives().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archives;
pub mod faults;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::archives::*;
    pub use crate::faults::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use archives::*;
pub use faults::*;
pub use fixtures::*;
pub use generators::*;
