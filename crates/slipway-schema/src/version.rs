//! Semantic-version normalization and comparison.
//!
//! Versions travel as raw strings in the manifest; every ordering decision
//! in the protocol goes through semver precedence rules, never string order.

use thiserror::Error;

/// Error returned when an input string is not a valid semantic version.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid semantic version '{input}': {reason}")]
pub struct VersionFormatError {
    /// The rejected input string.
    pub input: String,
    /// Parser diagnostic describing why it was rejected.
    pub reason: String,
}

/// Parse a version string into a [`semver::Version`], accepting an optional
/// leading `v`/`V` tag prefix.
///
/// Partial versions such as `"1.2"` are rejected; manifest lookups must
/// never prefix-match.
///
/// # Errors
///
/// Returns [`VersionFormatError`] if the remainder is not a full
/// `major.minor.patch` semantic version.
pub fn normalize(input: &str) -> Result<semver::Version, VersionFormatError> {
    let trimmed = input.trim();
    let bare = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);

    semver::Version::parse(bare).map_err(|e| VersionFormatError {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Compare two raw version strings under semantic precedence.
///
/// Parseable versions always order above unparseable ones; two unparseable
/// strings fall back to byte order so the result is still a total order.
pub fn compare(a: &str, b: &str) -> std::cmp::Ordering {
    match (normalize(a), normalize(b)) {
        (Ok(va), Ok(vb)) => va.cmp(&vb),
        (Ok(_), Err(_)) => std::cmp::Ordering::Greater,
        (Err(_), Ok(_)) => std::cmp::Ordering::Less,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// `true` when `candidate` is strictly newer than `current`.
pub fn is_newer(current: &str, candidate: &str) -> bool {
    compare(candidate, current) == std::cmp::Ordering::Greater
}

/// Semantic equality between two raw version strings.
///
/// Both sides must parse for semantic comparison (`"v1.2.0"` equals
/// `"1.2.0"`); otherwise equality falls back to the exact strings, so
/// `"1.2.0"` never matches a partial query like `"1.2"`.
pub fn semantic_eq(a: &str, b: &str) -> bool {
    match (normalize(a), normalize(b)) {
        (Ok(va), Ok(vb)) => va == vb,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn normalize_accepts_tag_prefix() {
        assert_eq!(normalize("1.2.0").unwrap(), normalize("v1.2.0").unwrap());
        assert_eq!(normalize("V2.0.1").unwrap().to_string(), "2.0.1");
    }

    #[test]
    fn normalize_rejects_partial_versions() {
        assert!(normalize("1.2").is_err());
        assert!(normalize("1").is_err());
        assert!(normalize("latest").is_err());
    }

    #[test]
    fn compare_uses_semver_precedence() {
        assert_eq!(compare("2.3.1", "2.3.0"), Ordering::Greater);
        assert_eq!(compare("1.0.0-alpha", "1.0.0"), Ordering::Less);
        assert_eq!(compare("1.0.0-alpha.1", "1.0.0-alpha.2"), Ordering::Less);
        assert_eq!(compare("v1.0.0", "1.0.0"), Ordering::Equal);
        // Lexical order would get this one wrong.
        assert_eq!(compare("1.10.0", "1.9.0"), Ordering::Greater);
    }

    #[test]
    fn unparseable_versions_sink() {
        assert_eq!(compare("1.0.0", "not-a-version"), Ordering::Greater);
        assert_eq!(compare("not-a-version", "1.0.0"), Ordering::Less);
    }

    #[test]
    fn is_newer_is_strict() {
        assert!(is_newer("1.0.0", "1.1.0"));
        assert!(!is_newer("1.1.0", "1.1.0"));
        assert!(!is_newer("1.1.0", "1.0.0"));
    }

    #[test]
    fn semantic_eq_never_prefix_matches() {
        assert!(semantic_eq("1.2.0", "v1.2.0"));
        assert!(!semantic_eq("1.2.0", "1.2"));
        assert!(!semantic_eq("1.2.0", "1.2.1"));
    }
}
