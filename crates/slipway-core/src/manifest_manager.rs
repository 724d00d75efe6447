//! Remote manifest loading and version queries.
//!
//! The manager owns the manifest URL and answers every identity and
//! ordering question the publish and self-update flows ask.

use slipway_schema::manifest::Manifest;
use slipway_schema::types::ReleaseEntry;
use slipway_schema::version;
use thiserror::Error;

/// Failure to fetch or decode the remote manifest.
///
/// Both variants carry the manifest URL for diagnostics. Recovery is only
/// ever an explicit caller decision (continue with an empty manifest),
/// never automatic.
#[derive(Error, Debug)]
pub enum ManifestFetchError {
    /// The manifest could not be downloaded (network error, non-2xx status).
    #[error("the remote manifest could not be downloaded `{url}`")]
    Download {
        /// URL of the manifest that failed to download.
        url: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The response body is not a valid JSON array of release entries.
    #[error("the remote manifest is not a valid JSON document `{url}`")]
    Malformed {
        /// URL of the manifest that failed to decode.
        url: String,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
}

impl ManifestFetchError {
    /// URL of the manifest involved in the failure.
    pub fn manifest_url(&self) -> &str {
        match self {
            Self::Download { url, .. } | Self::Malformed { url, .. } => url,
        }
    }
}

/// Fetches the remote manifest and answers version and identity queries
/// against it.
#[derive(Debug, Clone)]
pub struct ManifestManager {
    manifest_url: String,
    client: reqwest::Client,
}

impl ManifestManager {
    /// Create a manager for the manifest at `manifest_url`.
    pub fn new(manifest_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            manifest_url: manifest_url.into(),
            client,
        }
    }

    /// URL this manager loads the manifest from.
    pub fn manifest_url(&self) -> &str {
        &self.manifest_url
    }

    /// Download and decode the remote manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestFetchError::Download`] when the transport fetch
    /// fails (404s included) and [`ManifestFetchError::Malformed`] when the
    /// body is not a JSON array of entries.
    pub async fn load_manifest(&self) -> Result<Manifest, ManifestFetchError> {
        let response = self
            .client
            .get(&self.manifest_url)
            .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|source| ManifestFetchError::Download {
                url: self.manifest_url.clone(),
                source,
            })?;

        let body = response
            .text()
            .await
            .map_err(|source| ManifestFetchError::Download {
                url: self.manifest_url.clone(),
                source,
            })?;

        let entries: Vec<ReleaseEntry> =
            serde_json::from_str(&body).map_err(|source| ManifestFetchError::Malformed {
                url: self.manifest_url.clone(),
                source,
            })?;

        tracing::debug!(
            url = %self.manifest_url,
            entries = entries.len(),
            "loaded remote manifest"
        );

        Ok(Self::build_manifest(entries))
    }

    /// Build a manifest from decoded entries. The recovery path passes an
    /// empty list to start over.
    pub fn build_manifest(entries: Vec<ReleaseEntry>) -> Manifest {
        Manifest::from_entries(entries)
    }

    /// Entry carrying the greatest semantic version, or `None` on an empty
    /// manifest.
    ///
    /// Only strictly-greater comparisons advance the running maximum, so
    /// the earliest of several equal versions wins.
    pub fn last_version<'m>(&self, manifest: &'m Manifest) -> Option<&'m ReleaseEntry> {
        let mut last: Option<&ReleaseEntry> = None;

        for entry in manifest.entries() {
            match last {
                None => last = Some(entry),
                Some(current)
                    if version::is_newer(current.version.as_str(), entry.version.as_str()) =>
                {
                    last = Some(entry);
                }
                Some(_) => {}
            }
        }

        last
    }

    /// First entry whose version is semantically equal to `version`.
    pub fn entry_by_version<'m>(
        &self,
        manifest: &'m Manifest,
        version_str: &str,
    ) -> Option<&'m ReleaseEntry> {
        manifest
            .entries()
            .iter()
            .find(|entry| version::semantic_eq(entry.version.as_str(), version_str))
    }

    /// The newest entry when it is strictly newer than `version`, else
    /// `None` (including on an empty manifest).
    pub fn new_version_available<'m>(
        &self,
        manifest: &'m Manifest,
        version_str: &str,
    ) -> Option<&'m ReleaseEntry> {
        let last = self.last_version(manifest)?;
        version::is_newer(version_str, last.version.as_str()).then_some(last)
    }

    /// Publish guard: the entry already occupying `version`, if any.
    pub fn identical_version<'m>(
        &self,
        manifest: &'m Manifest,
        version_str: &str,
    ) -> Option<&'m ReleaseEntry> {
        self.entry_by_version(manifest, version_str)
    }

    /// First entry whose content signature matches `signature` exactly
    /// (hex equality, not semantic).
    pub fn identical_signature<'m>(
        &self,
        manifest: &'m Manifest,
        signature: &str,
    ) -> Option<&'m ReleaseEntry> {
        manifest
            .entries()
            .iter()
            .find(|entry| entry.sha1.as_str() == signature)
    }
}
