//! Block digests in the `<algorithm>:<BASE32>` form used by WARC headers.

use crate::error::CodecError;
use data_encoding::BASE32;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Hash function used for `WARC-Block-Digest` / `WARC-Payload-Digest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-1, the customary WARC digest.
    #[default]
    Sha1,
    /// SHA-256.
    Sha256,
}

impl DigestAlgorithm {
    /// Returns the label written before the `:` in a digest value.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" | "sha-1" => Ok(Self::Sha1),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            _ => Err(CodecError::UnsupportedDigest {
                label: s.to_string(),
            }),
        }
    }
}

/// A digest header value such as `sha1:3I42H3S6NNFQ2MSVX7XZKYAYSCX5QBYJ`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DigestValue(String);

impl DigestValue {
    /// Returns the header value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the algorithm label part.
    #[must_use]
    pub fn algorithm_label(&self) -> &str {
        self.0.split_once(':').map_or("", |(label, _)| label)
    }
}

impl fmt::Display for DigestValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes digests over complete content blocks.
///
/// The digest is written into the header that precedes the block, so the
/// whole block must be materialized before calling [`Digester::digest`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Digester {
    algorithm: DigestAlgorithm,
}

impl Digester {
    /// Creates a digester for the given algorithm.
    #[must_use]
    pub const fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Returns the configured algorithm.
    #[must_use]
    pub const fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Digests `content`.
    #[must_use]
    pub fn digest(&self, content: &[u8]) -> DigestValue {
        let encoded = match self.algorithm {
            DigestAlgorithm::Sha1 => BASE32.encode(&Sha1::digest(content)),
            DigestAlgorithm::Sha256 => BASE32.encode(&Sha256::digest(content)),
        };
        DigestValue(format!("{}:{}", self.algorithm.label(), encoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sha1_of_empty_block() {
        let digest = Digester::default().digest(b"");
        assert_eq!(digest.as_str(), "sha1:3I42H3S6NNFQ2MSVX7XZKYAYSCX5QBYJ");
        assert_eq!(digest.algorithm_label(), "sha1");
    }

    #[test]
    fn sha256_shape() {
        let digest = Digester::new(DigestAlgorithm::Sha256).digest(b"hello");
        let (label, body) = digest.as_str().split_once(':').unwrap();
        assert_eq!(label, "sha256");
        // 32 bytes -> 52 base32 chars + 4 padding
        assert_eq!(body.len(), 56);
        assert!(body.ends_with("===="));
    }

    #[test]
    fn different_content_differs() {
        let digester = Digester::default();
        assert_ne!(digester.digest(b"a"), digester.digest(b"b"));
    }

    #[test]
    fn algorithm_parsing() {
        assert_eq!("SHA1".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha1);
        assert_eq!(
            "sha-256".parse::<DigestAlgorithm>().unwrap(),
            DigestAlgorithm::Sha256
        );
        assert!("md5".parse::<DigestAlgorithm>().is_err());
    }

    proptest! {
        #[test]
        fn digest_is_deterministic(content in prop::collection::vec(any::<u8>(), 0..2048)) {
            let digester = Digester::default();
            prop_assert_eq!(digester.digest(&content), digester.digest(&content));
        }
    }
}
