//! S3-compatible uploader adapter.
//!
//! Works against any S3 API surface (AWS, R2, MinIO). Objects are written
//! with public-read visibility; the manifest key is overwritten on every
//! publish, so release history lives solely inside the manifest JSON.

use super::{UploadError, Uploader};
use async_trait::async_trait;
use aws_sdk_s3 as s3;
use slipway_schema::manifest::Manifest;
use std::path::Path;

/// Resolved configuration for the S3 uploader.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// S3-compatible endpoint (e.g. `https://<account>.r2.cloudflarestorage.com`);
    /// `None` selects the default AWS endpoint for `region`.
    pub endpoint: Option<String>,
    /// Region handed to the SDK (`auto` works for R2-style stores).
    pub region: String,
    /// Access key ID.
    pub access_key: String,
    /// Secret access key.
    pub secret_key: String,
    /// Bucket name.
    pub bucket: String,
    /// Key prefix for artifact and public-key objects.
    pub artifact_base_path: String,
    /// Key prefix for the manifest object.
    pub manifest_base_path: String,
    /// Public base URL for downloads (e.g. `https://dl.example.com`).
    pub public_base_url: String,
}

impl S3Config {
    /// Load configuration from `SLIPWAY_STORE_*` environment variables.
    ///
    /// Returns `None` when a required variable (access key, secret key,
    /// bucket, public URL) is absent.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            endpoint: std::env::var("SLIPWAY_STORE_ENDPOINT").ok(),
            region: std::env::var("SLIPWAY_STORE_REGION").unwrap_or_else(|_| "auto".to_string()),
            access_key: std::env::var("SLIPWAY_STORE_ACCESS_KEY").ok()?,
            secret_key: std::env::var("SLIPWAY_STORE_SECRET_KEY").ok()?,
            bucket: std::env::var("SLIPWAY_STORE_BUCKET").ok()?,
            artifact_base_path: std::env::var("SLIPWAY_STORE_ARTIFACT_PATH").unwrap_or_default(),
            manifest_base_path: std::env::var("SLIPWAY_STORE_MANIFEST_PATH").unwrap_or_default(),
            public_base_url: std::env::var("SLIPWAY_STORE_PUBLIC_URL").ok()?,
        })
    }
}

/// Uploader backed by an S3-compatible object store.
#[derive(Debug)]
pub struct S3Uploader {
    client: s3::Client,
    bucket: String,
    artifact_base_path: String,
    manifest_base_path: String,
    public_base_url: String,
}

impl S3Uploader {
    /// Create an uploader from resolved configuration.
    pub fn new(config: S3Config) -> Self {
        let credentials = s3::config::Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "slipway-store",
        );

        let mut builder = s3::Config::builder()
            .behavior_version_latest()
            .region(s3::config::Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true); // Required for R2
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        let client = s3::Client::from_conf(builder.build());

        Self {
            client,
            bucket: config.bucket,
            artifact_base_path: config.artifact_base_path,
            manifest_base_path: config.manifest_base_path,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Object key under the given base prefix. Any leading path separator
    /// is stripped; object stores treat keys as plain names.
    fn object_key(base_path: &str, target_name: &str) -> String {
        let key = if base_path.is_empty() {
            target_name.to_string()
        } else {
            format!("{base_path}/{target_name}")
        };
        key.trim_start_matches('/').to_string()
    }

    /// Public retrieval URL for an object key.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }

    async fn put(
        &self,
        key: &str,
        body: s3::primitives::ByteStream,
        content_type: &str,
    ) -> Result<String, UploadError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .acl(s3::types::ObjectCannedAcl::PublicRead)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| UploadError::new(key, e))?;

        tracing::debug!(bucket = %self.bucket, key, "uploaded object");

        Ok(self.public_url(key))
    }

    async fn put_file(&self, key: &str, local_path: &Path) -> Result<String, UploadError> {
        let body = s3::primitives::ByteStream::from_path(local_path)
            .await
            .map_err(|e| UploadError::new(key, e))?;
        self.put(key, body, "application/octet-stream").await
    }
}

#[async_trait]
impl Uploader for S3Uploader {
    async fn upload_artifact(
        &self,
        local_path: &Path,
        target_name: &str,
    ) -> Result<String, UploadError> {
        let key = Self::object_key(&self.artifact_base_path, target_name);
        self.put_file(&key, local_path).await
    }

    async fn upload_manifest(
        &self,
        manifest: &Manifest,
        target_name: &str,
    ) -> Result<String, UploadError> {
        let key = Self::object_key(&self.manifest_base_path, target_name);
        let content = manifest
            .dump_content()
            .map_err(|e| UploadError::new(key.clone(), e))?;
        self.put(
            &key,
            s3::primitives::ByteStream::from(content.into_bytes()),
            "application/json",
        )
        .await
    }

    async fn upload_public_key(
        &self,
        local_path: &Path,
        target_name: &str,
    ) -> Result<String, UploadError> {
        let key = Self::object_key(&self.artifact_base_path, target_name);
        self.put_file(&key, local_path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_joins_and_strips_leading_separator() {
        assert_eq!(
            S3Uploader::object_key("releases", "mytool-1.0.0"),
            "releases/mytool-1.0.0"
        );
        assert_eq!(
            S3Uploader::object_key("/releases", "mytool-1.0.0"),
            "releases/mytool-1.0.0"
        );
        assert_eq!(S3Uploader::object_key("", "manifest.json"), "manifest.json");
        assert_eq!(S3Uploader::object_key("/", "manifest.json"), "manifest.json");
    }

    #[test]
    fn public_url_construction() {
        let config = S3Config {
            endpoint: Some("https://example.r2.cloudflarestorage.com".to_string()),
            region: "auto".to_string(),
            access_key: "key".to_string(),
            secret_key: "secret".to_string(),
            bucket: "releases".to_string(),
            artifact_base_path: "releases".to_string(),
            manifest_base_path: String::new(),
            public_base_url: "https://dl.example.com/".to_string(), // Trailing slash
        };

        let uploader = S3Uploader::new(config);
        assert_eq!(
            uploader.public_url("releases/mytool-1.0.0"),
            "https://dl.example.com/releases/mytool-1.0.0"
        );
    }
}
