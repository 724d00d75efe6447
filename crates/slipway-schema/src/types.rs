//! Wire-format types for the release manifest.

use crate::hash::Sha1Hash;
use crate::version;
use serde::{Deserialize, Serialize};

/// One published release in the distribution manifest.
///
/// Entries are immutable once published: the manifest only grows, and every
/// field is fixed at publish time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEntry {
    /// Artifact's original file name, without the version suffix.
    pub name: String,

    /// Lower-case hex SHA-1 signature of the artifact contents.
    pub sha1: Sha1Hash,

    /// Retrieval URL of the version-suffixed artifact object.
    pub url: String,

    /// Published semantic version.
    pub version: Version,

    /// Retrieval URL of the detached verification key, if one was published.
    #[serde(rename = "publicKey", skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

/// Errors that can occur when validating a [`ReleaseEntry`].
#[derive(thiserror::Error, Debug)]
pub enum EntryError {
    /// The SHA-1 hash string is not exactly 40 characters long.
    #[error("Invalid SHA1 length: expected 40 chars, got {0}")]
    InvalidSha1Length(usize),

    /// A required field (name, version, or URL) is empty.
    #[error("Empty field: {0}")]
    EmptyField(String),

    /// The retrieval URL is malformed or uses an unsupported scheme.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ReleaseEntry {
    /// Validates the entry's integrity by checking all required fields.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::EmptyField`] if `name`, `version`, or `url` is
    /// empty, [`EntryError::InvalidUrl`] if the URL does not start with
    /// `http`, or [`EntryError::InvalidSha1Length`] if the hash is not 40
    /// characters.
    pub fn validate(&self) -> Result<(), EntryError> {
        if self.name.is_empty() {
            return Err(EntryError::EmptyField("name".to_string()));
        }
        if self.version.as_str().is_empty() {
            return Err(EntryError::EmptyField("version".to_string()));
        }
        if self.url.is_empty() {
            return Err(EntryError::EmptyField("url".to_string()));
        }
        if !self.url.starts_with("http") {
            return Err(EntryError::InvalidUrl(
                "Must start with http(s)".to_string(),
            ));
        }

        if self.sha1.as_str().len() != 40 {
            return Err(EntryError::InvalidSha1Length(self.sha1.as_str().len()));
        }

        Ok(())
    }
}

/// A semantic version string, stored as published and compared semantically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version(String);

impl Ord for Version {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        version::compare(&self.0, &other.0)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Version {
    /// Create a new version from the given string (stored as-is).
    pub fn new(v: &str) -> Self {
        Self(v.to_string())
    }

    /// Return the version string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Deref for Version {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Version {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl PartialEq<str> for Version {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Version {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(version: &str) -> ReleaseEntry {
        ReleaseEntry {
            name: "mytool".to_string(),
            sha1: Sha1Hash::compute(version.as_bytes()),
            url: format!("https://dl.example.com/releases/mytool-{version}"),
            version: Version::new(version),
            public_key: None,
        }
    }

    #[test]
    fn version_orders_semantically() {
        assert!(Version::new("1.10.0") > Version::new("1.9.0"));
        assert!(Version::new("1.0.0-alpha") < Version::new("1.0.0"));
    }

    #[test]
    fn validate_accepts_well_formed_entries() {
        assert!(entry("1.0.0").validate().is_ok());
    }

    #[test]
    fn validate_rejects_defects() {
        let mut bad = entry("1.0.0");
        bad.name = String::new();
        assert!(matches!(bad.validate(), Err(EntryError::EmptyField(_))));

        let mut bad = entry("1.0.0");
        bad.url = "ftp://example.com/mytool".to_string();
        assert!(matches!(bad.validate(), Err(EntryError::InvalidUrl(_))));

        let mut bad = entry("1.0.0");
        bad.sha1 = Sha1Hash::new("abc123");
        assert!(matches!(
            bad.validate(),
            Err(EntryError::InvalidSha1Length(6))
        ));
    }

    #[test]
    fn public_key_is_omitted_from_wire_when_absent() {
        let json = serde_json::to_string(&entry("1.0.0")).unwrap();
        assert!(!json.contains("publicKey"));

        let mut with_key = entry("1.0.0");
        with_key.public_key = Some("https://dl.example.com/releases/key".to_string());
        let json = serde_json::to_string(&with_key).unwrap();
        assert!(json.contains("\"publicKey\""));
    }
}
