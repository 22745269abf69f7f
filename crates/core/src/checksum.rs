//! `Upload-Checksum` header parsing and digest comparison.

use base64::Engine;
use sha1::{Digest, Sha1};

/// SHA-1 digest width in bytes.
const SHA1_DIGEST_LEN: usize = 20;

/// A parsed `Upload-Checksum` header: `<algorithm> <base64-of-binary-digest>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadChecksum {
    /// The declared algorithm (e.g. "sha1").
    pub algorithm: String,
    /// The base64-encoded binary digest, verbatim from the header.
    pub digest_b64: String,
}

impl UploadChecksum {
    /// Split the header value on the first space.
    pub fn parse(value: &str) -> crate::Result<Self> {
        let (algorithm, digest_b64) = value
            .split_once(' ')
            .ok_or_else(|| crate::Error::InvalidChecksum(value.to_string()))?;
        Ok(Self {
            algorithm: algorithm.to_string(),
            digest_b64: digest_b64.to_string(),
        })
    }

    /// Whether the declared algorithm is one this server computes.
    pub fn is_supported(&self) -> bool {
        self.algorithm == crate::protocol::SUPPORTED_CHECKSUM
    }

    /// Compare the client digest against a server-computed SHA-1 hex string.
    ///
    /// The hex string must be exactly 40 characters and the decoded digest
    /// exactly 20 bytes; comparison is case-insensitive. An undecodable
    /// header digest never matches.
    pub fn matches_sha1_hex(&self, hex: &str) -> bool {
        let Ok(digest) = base64::engine::general_purpose::STANDARD.decode(&self.digest_b64) else {
            return false;
        };
        if digest.len() != SHA1_DIGEST_LEN || hex.len() != 2 * SHA1_DIGEST_LEN {
            return false;
        }
        hex_upper(&digest).eq_ignore_ascii_case(hex)
    }
}

/// Compute the uppercase SHA-1 hex digest of a byte slice.
pub fn sha1_hex_upper(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hex_upper(&hasher.finalize())
}

/// Render raw digest bytes as uppercase hex.
pub fn hex_upper(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}
