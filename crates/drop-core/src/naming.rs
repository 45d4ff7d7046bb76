//! Content-addressed remote file names.
//!
//! The stem is the URL-safe base64 (no padding) of a digest over the exact
//! uploaded bytes, truncated to the profile's hash length.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::Deserialize;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::DropError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl HashAlgorithm {
    pub fn digest(self, bytes: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha1 => Sha1::digest(bytes).to_vec(),
            HashAlgorithm::Sha256 => Sha256::digest(bytes).to_vec(),
        }
    }

    /// Length of the unpadded base64 encoding of one digest.
    pub fn encoded_len(self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 27,
            HashAlgorithm::Sha256 => 43,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Sha1 => f.write_str("sha1"),
            HashAlgorithm::Sha256 => f.write_str("sha256"),
        }
    }
}

/// Truncated URL-safe digest stem of `bytes`.
pub fn hash_stem(bytes: &[u8], algorithm: HashAlgorithm, hash_length: usize) -> Result<String, DropError> {
    let max = algorithm.encoded_len();
    if hash_length == 0 || hash_length > max {
        return Err(DropError::config(format!(
            "hash length {} must be between 1 and {} for {}",
            hash_length, max, algorithm
        )));
    }
    let digest = algorithm.digest(bytes);
    tracing::debug!(algorithm = %algorithm, digest = %hex::encode(&digest), "hashed upload");
    let mut encoded = URL_SAFE_NO_PAD.encode(&digest);
    encoded.truncate(hash_length);
    Ok(encoded)
}

/// Remote file name: hash stem plus `.extension` when one is given and non-empty.
pub fn content_name(
    bytes: &[u8],
    algorithm: HashAlgorithm,
    hash_length: usize,
    extension: Option<&str>,
) -> Result<String, DropError> {
    let stem = hash_stem(bytes, algorithm, hash_length)?;
    Ok(match extension {
        Some(ext) if !ext.is_empty() => format!("{}.{}", stem, ext),
        _ => stem,
    })
}
