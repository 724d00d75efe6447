//! Configuration loading and resolution.
//!
//! `slipway.toml` is discovered from `--config`/`SLIPWAY_CONFIG`, then the
//! working directory, then `~/.slipway/config.toml`. Environment variables
//! override file values. The result is a set of fully resolved records
//! handed to the core constructors; core never reads configuration itself.

use anyhow::{Context, Result};
use serde::Deserialize;
use slipway_core::uploader::s3::S3Config;
use std::path::{Path, PathBuf};

/// Top-level configuration for the slipway CLI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Remote manifest location and file name.
    pub manifest: ManifestSection,
    /// Publish defaults.
    pub distribution: DistributionSection,
    /// Object-store settings.
    pub storage: StorageSection,
    /// HTTP transport settings.
    pub http: HttpSection,
}

/// The `[manifest]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestSection {
    /// URL the release manifest is fetched from.
    pub url: String,
    /// Remote object name the manifest is uploaded as.
    pub file_name: String,
}

impl Default for ManifestSection {
    fn default() -> Self {
        Self {
            url: String::new(),
            file_name: "manifest.json".to_string(),
        }
    }
}

/// The `[distribution]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DistributionSection {
    /// Default archive path for `publish` when none is given on the command line.
    pub artifact_path: Option<PathBuf>,
}

/// The `[storage]` section. Credentials may be left out of the file and
/// supplied through `SLIPWAY_STORE_ACCESS_KEY` / `SLIPWAY_STORE_SECRET_KEY`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageSection {
    /// S3-compatible endpoint; `None` selects the default AWS endpoint.
    pub endpoint: Option<String>,
    /// Region handed to the SDK.
    pub region: Option<String>,
    /// Bucket name.
    pub bucket: Option<String>,
    /// Access key ID.
    pub access_key: Option<String>,
    /// Secret access key.
    pub secret_key: Option<String>,
    /// Key prefix for artifact and public-key objects.
    pub artifact_base_path: Option<String>,
    /// Key prefix for the manifest object.
    pub manifest_base_path: Option<String>,
    /// Public base URL for downloads.
    pub public_base_url: Option<String>,
}

/// The `[http]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpSection {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            timeout_secs: slipway_core::DEFAULT_HTTP_TIMEOUT.as_secs(),
        }
    }
}

impl Config {
    /// Load configuration, apply environment overrides, and return the
    /// resolved result.
    ///
    /// A missing configuration file is not an error; commands fail later
    /// with a message naming the first setting they actually need.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match Self::discover(explicit) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration");
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                toml::from_str(&content)
                    .with_context(|| format!("Failed to parse {}", path.display()))?
            }
            None => Self::default(),
        };

        config.apply_env();
        Ok(config)
    }

    fn discover(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        let local = PathBuf::from("slipway.toml");
        if local.exists() {
            return Some(local);
        }

        let home = dirs::home_dir()?.join(".slipway").join("config.toml");
        home.exists().then_some(home)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("SLIPWAY_MANIFEST_URL") {
            self.manifest.url = url;
        }
        if let Ok(v) = std::env::var("SLIPWAY_STORE_ENDPOINT") {
            self.storage.endpoint = Some(v);
        }
        if let Ok(v) = std::env::var("SLIPWAY_STORE_REGION") {
            self.storage.region = Some(v);
        }
        if let Ok(v) = std::env::var("SLIPWAY_STORE_BUCKET") {
            self.storage.bucket = Some(v);
        }
        if let Ok(v) = std::env::var("SLIPWAY_STORE_ACCESS_KEY") {
            self.storage.access_key = Some(v);
        }
        if let Ok(v) = std::env::var("SLIPWAY_STORE_SECRET_KEY") {
            self.storage.secret_key = Some(v);
        }
        if let Ok(v) = std::env::var("SLIPWAY_STORE_ARTIFACT_PATH") {
            self.storage.artifact_base_path = Some(v);
        }
        if let Ok(v) = std::env::var("SLIPWAY_STORE_MANIFEST_PATH") {
            self.storage.manifest_base_path = Some(v);
        }
        if let Ok(v) = std::env::var("SLIPWAY_STORE_PUBLIC_URL") {
            self.storage.public_base_url = Some(v);
        }
    }

    /// Manifest URL, required by every remote operation.
    pub fn manifest_url(&self) -> Result<&str> {
        if self.manifest.url.is_empty() {
            anyhow::bail!("manifest.url is not configured (set it in slipway.toml or SLIPWAY_MANIFEST_URL)");
        }
        Ok(&self.manifest.url)
    }

    /// Resolved S3 record for the uploader.
    ///
    /// # Errors
    ///
    /// Names the first missing storage setting.
    pub fn to_s3_config(&self) -> Result<S3Config> {
        let storage = &self.storage;
        Ok(S3Config {
            endpoint: storage.endpoint.clone(),
            region: storage
                .region
                .clone()
                .unwrap_or_else(|| "auto".to_string()),
            access_key: storage
                .access_key
                .clone()
                .context("storage.access_key is not configured (or SLIPWAY_STORE_ACCESS_KEY)")?,
            secret_key: storage
                .secret_key
                .clone()
                .context("storage.secret_key is not configured (or SLIPWAY_STORE_SECRET_KEY)")?,
            bucket: storage
                .bucket
                .clone()
                .context("storage.bucket is not configured (or SLIPWAY_STORE_BUCKET)")?,
            artifact_base_path: storage.artifact_base_path.clone().unwrap_or_default(),
            manifest_base_path: storage.manifest_base_path.clone().unwrap_or_default(),
            public_base_url: storage
                .public_base_url
                .clone()
                .context("storage.public_base_url is not configured (or SLIPWAY_STORE_PUBLIC_URL)")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config_file() {
        let raw = r#"
            [manifest]
            url = "https://dl.example.com/manifest.json"

            [distribution]
            artifact_path = "dist/mytool.bin"

            [storage]
            endpoint = "https://account.r2.cloudflarestorage.com"
            bucket = "releases"
            access_key = "key"
            secret_key = "secret"
            artifact_base_path = "releases"
            public_base_url = "https://dl.example.com"

            [http]
            timeout_secs = 10
        "#;

        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.manifest.url, "https://dl.example.com/manifest.json");
        assert_eq!(config.manifest.file_name, "manifest.json");
        assert_eq!(
            config.distribution.artifact_path.as_deref(),
            Some(Path::new("dist/mytool.bin"))
        );
        assert_eq!(config.http.timeout_secs, 10);

        let s3 = config.to_s3_config().unwrap();
        assert_eq!(s3.bucket, "releases");
        assert_eq!(s3.region, "auto");
        assert_eq!(s3.manifest_base_path, "");
    }

    #[test]
    fn missing_storage_settings_are_named() {
        let config = Config::default();
        let err = config.to_s3_config().unwrap_err();
        assert!(err.to_string().contains("storage.access_key"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let raw = r#"
            [manifest]
            url = "https://dl.example.com/manifest.json"
            file = "typo.json"
        "#;
        assert!(toml::from_str::<Config>(raw).is_err());
    }

    #[test]
    fn manifest_url_is_required() {
        let config = Config::default();
        assert!(config.manifest_url().is_err());
    }
}
