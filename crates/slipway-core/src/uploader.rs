//! Uploading capability: move bytes to a remote destination and hand back
//! a public retrieval URL.

#[cfg(feature = "upload")]
pub mod s3;

use async_trait::async_trait;
use slipway_schema::manifest::Manifest;
use std::path::Path;
use thiserror::Error;

/// Failure to upload an object.
///
/// Terminal for the current publish attempt: callers must not assume the
/// upload is retried.
#[derive(Error, Debug)]
#[error("there was an error uploading `{target_path}`")]
pub struct UploadError {
    /// Remote object path that failed.
    pub target_path: String,
    /// Underlying transport error.
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl UploadError {
    /// Wrap a transport failure for the given remote object path.
    pub fn new(
        target_path: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            target_path: target_path.into(),
            source: source.into(),
        }
    }
}

/// Capability for pushing release objects to a remote store.
///
/// Implementations are polymorphic over the storage backend, selected once
/// at configuration time.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload a release artifact, returning its public retrieval URL.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError`] on any transport failure.
    async fn upload_artifact(
        &self,
        local_path: &Path,
        target_name: &str,
    ) -> Result<String, UploadError>;

    /// Upload the serialized manifest, returning its public retrieval URL.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError`] on any transport failure.
    async fn upload_manifest(
        &self,
        manifest: &Manifest,
        target_name: &str,
    ) -> Result<String, UploadError>;

    /// Upload a detached public key, returning its public retrieval URL.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError`] on any transport failure.
    async fn upload_public_key(
        &self,
        local_path: &Path,
        target_name: &str,
    ) -> Result<String, UploadError>;
}
