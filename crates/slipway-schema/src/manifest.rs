//! The release manifest: an append-mostly ordered record of published
//! releases, serialized as a JSON array at a well-known remote URL.

use crate::types::ReleaseEntry;
use crate::version;
use serde::{Deserialize, Serialize};

/// Sort directions for [`Manifest::sorted_entries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest version first.
    Desc,
    /// Oldest version first.
    Asc,
}

/// Ordered set of release entries; insertion order is publish order.
///
/// The manifest enforces no uniqueness on versions or signatures.
/// Duplicate detection is an advisory pre-publish check, and any entry
/// appended here is accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: Vec<ReleaseEntry>,
}

impl Manifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a manifest from already-decoded entries, preserving their order.
    pub fn from_entries(entries: Vec<ReleaseEntry>) -> Self {
        Self { entries }
    }

    /// Decode a manifest from its JSON wire format.
    ///
    /// # Errors
    ///
    /// Returns the underlying decode error if `raw` is not a JSON array of
    /// release entries.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Append an entry. No validation beyond structural shape is applied.
    pub fn add_entry(&mut self, entry: ReleaseEntry) {
        self.entries.push(entry);
    }

    /// Entries in insertion (publish) order.
    pub fn entries(&self) -> &[ReleaseEntry] {
        &self.entries
    }

    /// `true` when no release has been published.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of published entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// A copy of the entries sorted by semantic version.
    ///
    /// The sort is stable: entries with equal versions keep their relative
    /// publish order in both directions.
    pub fn sorted_entries(&self, order: SortOrder) -> Vec<ReleaseEntry> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| {
            let ord = version::compare(a.version.as_str(), b.version.as_str());
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
        entries
    }

    /// Serialize the manifest to its wire format: a pretty-printed JSON
    /// array with one object per release.
    ///
    /// # Errors
    ///
    /// Returns the underlying encode error (which cannot occur for
    /// well-formed entries).
    pub fn dump_content(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Sha1Hash;
    use crate::types::Version;

    fn entry(name: &str, version: &str) -> ReleaseEntry {
        ReleaseEntry {
            name: name.to_string(),
            sha1: Sha1Hash::compute(format!("{name}-{version}").as_bytes()),
            url: format!("https://dl.example.com/releases/{name}-{version}"),
            version: Version::new(version),
            public_key: None,
        }
    }

    fn sample() -> Manifest {
        Manifest::from_entries(vec![
            entry("mytool", "1.0.0"),
            entry("mytool", "2.3.1"),
            entry("mytool", "2.3.0"),
        ])
    }

    #[test]
    fn dump_and_reload_round_trips() {
        let manifest = sample();
        let raw = manifest.dump_content().unwrap();
        let reloaded = Manifest::from_json(&raw).unwrap();
        assert_eq!(reloaded, manifest);
        // Insertion order survives, not version order.
        assert_eq!(reloaded.entries()[1].version.as_str(), "2.3.1");
    }

    #[test]
    fn wire_format_is_a_json_array() {
        let raw = sample().dump_content().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.is_array());
        assert_eq!(value.as_array().unwrap().len(), 3);
        assert_eq!(value[0]["name"], "mytool");
        assert_eq!(value[0]["version"], "1.0.0");
    }

    #[test]
    fn sorted_entries_are_a_permutation() {
        let manifest = sample();
        let asc = manifest.sorted_entries(SortOrder::Asc);
        let desc = manifest.sorted_entries(SortOrder::Desc);

        assert_eq!(asc.len(), manifest.len());
        assert_eq!(desc.len(), manifest.len());

        let asc_versions: Vec<_> = asc.iter().map(|e| e.version.as_str()).collect();
        let desc_versions: Vec<_> = desc.iter().map(|e| e.version.as_str()).collect();
        assert_eq!(asc_versions, ["1.0.0", "2.3.0", "2.3.1"]);
        assert_eq!(desc_versions, ["2.3.1", "2.3.0", "1.0.0"]);

        // The original manifest is untouched.
        assert_eq!(manifest.entries()[0].version.as_str(), "1.0.0");
        assert_eq!(manifest.entries()[1].version.as_str(), "2.3.1");
    }

    #[test]
    fn equal_versions_keep_publish_order() {
        let mut manifest = Manifest::new();
        let mut first = entry("mytool", "1.0.0");
        first.url = "https://dl.example.com/releases/first".to_string();
        let mut second = entry("mytool", "1.0.0");
        second.url = "https://dl.example.com/releases/second".to_string();
        manifest.add_entry(first);
        manifest.add_entry(second);

        for order in [SortOrder::Asc, SortOrder::Desc] {
            let sorted = manifest.sorted_entries(order);
            assert!(sorted[0].url.ends_with("first"));
            assert!(sorted[1].url.ends_with("second"));
        }
    }

    #[test]
    fn add_entry_accepts_duplicates() {
        let mut manifest = Manifest::new();
        manifest.add_entry(entry("mytool", "1.0.0"));
        manifest.add_entry(entry("mytool", "1.0.0"));
        assert_eq!(manifest.len(), 2);
    }

    #[test]
    fn optional_public_key_round_trips() {
        let mut with_key = entry("mytool", "1.0.0");
        with_key.public_key =
            Some("https://dl.example.com/releases/mytool-1.0.0.pubkey".to_string());
        let manifest = Manifest::from_entries(vec![with_key, entry("mytool", "1.1.0")]);

        let raw = manifest.dump_content().unwrap();
        let reloaded = Manifest::from_json(&raw).unwrap();
        assert!(reloaded.entries()[0].public_key.is_some());
        assert!(reloaded.entries()[1].public_key.is_none());
    }
}
