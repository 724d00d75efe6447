//! Publish orchestration: name the remote objects, upload them, and grow
//! the manifest.

use crate::uploader::{UploadError, Uploader};
use slipway_schema::hash::Sha1Hash;
use slipway_schema::manifest::Manifest;
use slipway_schema::types::{ReleaseEntry, Version};
use slipway_schema::version::{self, VersionFormatError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure modes of a publish transaction.
#[derive(Error, Debug)]
pub enum DistributeError {
    /// The requested version is not a valid semantic version.
    #[error(transparent)]
    Version(#[from] VersionFormatError),

    /// The artifact path has no usable file name.
    #[error("artifact path has no file name: {0}")]
    ArtifactName(String),

    /// Reading the artifact or its sibling key failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An object upload failed; the publish stops at that step.
    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// Remote object names derived from the artifact file name and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetNames {
    /// Original artifact file name, no version suffix.
    pub original: String,
    /// Version-suffixed artifact object name.
    pub versioned: String,
    /// Rolling `-latest` alias object name.
    pub latest: String,
    /// Detached public-key object name (`<versioned>.pubkey`).
    pub public_key: String,
}

impl TargetNames {
    /// Derive the remote names for `artifact_path` published as `version`.
    ///
    /// # Errors
    ///
    /// Fails when the path has no file name component.
    pub fn derive(version: &str, artifact_path: &Path) -> Result<Self, DistributeError> {
        let original = artifact_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DistributeError::ArtifactName(artifact_path.display().to_string()))?
            .to_string();

        let stem = artifact_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&original);

        let (versioned, latest) = match artifact_path.extension().and_then(|e| e.to_str()) {
            Some(ext) => (
                format!("{stem}-{version}.{ext}"),
                format!("{stem}-latest.{ext}"),
            ),
            None => (format!("{stem}-{version}"), format!("{stem}-latest")),
        };
        let public_key = format!("{versioned}.pubkey");

        Ok(Self {
            original,
            versioned,
            latest,
            public_key,
        })
    }
}

/// Orchestrates one publish transaction against an [`Uploader`].
#[derive(Debug)]
pub struct DistributionManager<U> {
    uploader: U,
    manifest_file_name: String,
}

impl<U: Uploader> DistributionManager<U> {
    /// Create a manager that re-uploads the manifest as `manifest_file_name`
    /// on every publish.
    pub fn new(uploader: U, manifest_file_name: impl Into<String>) -> Self {
        Self {
            uploader,
            manifest_file_name: manifest_file_name.into(),
        }
    }

    /// The injected uploader capability.
    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    /// Content signature of an artifact on disk.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the artifact cannot be read.
    pub fn archive_signature(&self, artifact_path: &Path) -> std::io::Result<Sha1Hash> {
        Sha1Hash::compute_file(artifact_path)
    }

    /// Publish one artifact and record it in `manifest`.
    ///
    /// Uploads the version-suffixed artifact, the same bytes again under
    /// the `-latest` alias (two independent objects; object stores have no
    /// symlinks), the sibling `<artifact>.pubkey` when present, then
    /// appends the new entry and re-uploads the whole manifest. The steps
    /// are not transactional: a failure after the artifact upload leaves
    /// that object unreferenced by any manifest.
    ///
    /// # Errors
    ///
    /// Fails fast with [`DistributeError::Version`] before any network
    /// call; any upload failure aborts the remaining steps.
    pub async fn distribute(
        &self,
        version_str: &str,
        artifact_path: &Path,
        manifest: &mut Manifest,
    ) -> Result<ReleaseEntry, DistributeError> {
        version::normalize(version_str)?;

        let names = TargetNames::derive(version_str, artifact_path)?;
        let signature = self.archive_signature(artifact_path)?;
        let key_path = sibling_public_key(artifact_path);

        tracing::debug!(
            version = version_str,
            artifact = %artifact_path.display(),
            "publishing artifact"
        );

        let artifact_url = self
            .uploader
            .upload_artifact(artifact_path, &names.versioned)
            .await?;
        self.uploader
            .upload_artifact(artifact_path, &names.latest)
            .await?;

        let mut public_key_url = None;
        if let Some(key_path) = &key_path {
            public_key_url = Some(
                self.uploader
                    .upload_public_key(key_path, &names.public_key)
                    .await?,
            );
        }

        let entry = ReleaseEntry {
            name: names.original,
            sha1: signature,
            url: artifact_url,
            version: Version::new(version_str),
            public_key: public_key_url,
        };

        manifest.add_entry(entry.clone());
        self.uploader
            .upload_manifest(manifest, &self.manifest_file_name)
            .await?;

        Ok(entry)
    }
}

/// Path of the detached key next to the artifact, when one exists.
fn sibling_public_key(artifact_path: &Path) -> Option<PathBuf> {
    let mut name = artifact_path.as_os_str().to_os_string();
    name.push(".pubkey");
    let path = PathBuf::from(name);
    path.exists().then_some(path)
}
