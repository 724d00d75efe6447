//! Content-signature hashing for release artifacts.

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

/// Newtype for a SHA-1 hash string (40 hex characters, lower-case).
///
/// Provides compile-time distinction from other strings and optional runtime
/// validation. Release signatures travel in this form on the wire and are
/// compared by exact hex equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Sha1Hash(String);

impl Sha1Hash {
    /// Create a new `Sha1Hash` without validation, lower-casing the input.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().to_lowercase())
    }

    /// Create a validated `Sha1Hash` (40 hex characters).
    ///
    /// # Errors
    ///
    /// Returns an error string if `s` is not exactly 40 ASCII hex characters.
    pub fn validated(s: &str) -> Result<Self, String> {
        if s.len() == 40 && s.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(s.to_lowercase()))
        } else {
            Err(format!(
                "Invalid SHA1 hash: expected 40 hex chars, got '{s}'"
            ))
        }
    }

    /// Compute the SHA-1 hash of in-memory data.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(data);
        Self(hex::encode(hasher.finalize()))
    }

    /// Compute the SHA-1 hash of a file by streaming its contents.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read.
    pub fn compute_file(path: &std::path::Path) -> std::io::Result<Self> {
        let mut file = std::fs::File::open(path)?;
        let mut hasher = Sha1::new();
        std::io::copy(&mut file, &mut hasher)?;
        Ok(Self(hex::encode(hasher.finalize())))
    }

    /// Return the inner hex string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Sha1Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Sha1Hash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Sha1Hash {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Sha1Hash {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
