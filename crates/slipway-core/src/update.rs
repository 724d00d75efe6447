//! Self-update: discover, verify, and atomically install a newer release.

use crate::io::download::{self, DownloadError};
use crate::manifest_manager::{ManifestFetchError, ManifestManager};
use slipway_schema::types::ReleaseEntry;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Phases of one self-update attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateState {
    /// No update activity yet.
    Idle,
    /// Fetching the remote manifest.
    Checking,
    /// The manifest holds nothing newer than the running version.
    UpToDate,
    /// A newer release was found.
    UpdateAvailable,
    /// Streaming the release artifact.
    Downloading,
    /// Verifying the downloaded bytes against the published signatures.
    Verifying,
    /// Swapping the verified artifact into place.
    Installing,
    /// The new release is installed.
    Installed,
    /// The downloaded bytes did not match the published signature.
    VerificationFailed,
    /// Terminal failure while checking or downloading, with its cause.
    Failed(String),
}

/// Failure modes of [`SelfUpdateClient::apply_update`].
#[derive(Error, Debug)]
pub enum UpdateError {
    /// Transport failure while downloading the artifact, key, or signature.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem failure while staging or installing.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Downloaded content hash does not match the published signature.
    /// The download is discarded; the installed binary is untouched.
    #[error("signature mismatch: expected {expected}, got {actual}")]
    SignatureMismatch {
        /// Signature the manifest entry promised.
        expected: String,
        /// Signature of the bytes actually received.
        actual: String,
    },

    /// The published verification key could not be decoded.
    #[error("invalid public key fetched from `{url}`")]
    PublicKey {
        /// URL the key was fetched from.
        url: String,
    },

    /// The detached signature did not verify against the published key.
    #[error("detached signature rejected for `{url}`")]
    DetachedSignature {
        /// URL of the signature object that failed verification.
        url: String,
    },
}

impl From<DownloadError> for UpdateError {
    fn from(e: DownloadError) -> Self {
        match e {
            DownloadError::Http(e) => Self::Http(e),
            DownloadError::Io(e) => Self::Io(e),
        }
    }
}

/// Client driving the self-update state machine for an installed copy.
///
/// Either the update installs cleanly or the existing binary is left
/// untouched; no intermediate state is ever observable at `install_path`.
#[derive(Debug)]
pub struct SelfUpdateClient {
    client: reqwest::Client,
    state: UpdateState,
}

impl SelfUpdateClient {
    /// Create a client using the given HTTP client.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            state: UpdateState::Idle,
        }
    }

    /// Current phase of the update attempt.
    pub fn state(&self) -> &UpdateState {
        &self.state
    }

    /// Look for a release newer than `current_version` in the manifest at
    /// `manifest_url`.
    ///
    /// # Errors
    ///
    /// Propagates [`ManifestFetchError`] when the manifest cannot be
    /// fetched or decoded.
    pub async fn check_for_update(
        &mut self,
        manifest_url: &str,
        current_version: &str,
    ) -> Result<Option<ReleaseEntry>, ManifestFetchError> {
        self.state = UpdateState::Checking;

        let manager = ManifestManager::new(manifest_url, self.client.clone());
        let manifest = match manager.load_manifest().await {
            Ok(manifest) => manifest,
            Err(e) => {
                self.state = UpdateState::Failed(e.to_string());
                return Err(e);
            }
        };

        match manager.new_version_available(&manifest, current_version) {
            Some(entry) => {
                self.state = UpdateState::UpdateAvailable;
                Ok(Some(entry.clone()))
            }
            None => {
                self.state = UpdateState::UpToDate;
                Ok(None)
            }
        }
    }

    /// Download, verify, and atomically install `entry` over `install_path`.
    ///
    /// The artifact is streamed to a temporary directory and its SHA-1
    /// compared to the published signature before anything is staged; the
    /// final step is a single rename over the target, so no observer ever
    /// sees a partially written binary. When the entry carries a public
    /// key, the key is installed beside the binary and, if the store also
    /// hosts `<url>.sig`, the bytes are checked as an ed25519 detached
    /// signature first.
    ///
    /// # Errors
    ///
    /// [`UpdateError::SignatureMismatch`] discards the download and leaves
    /// the installed binary untouched, as does every other failure.
    pub async fn apply_update(
        &mut self,
        entry: &ReleaseEntry,
        install_path: &Path,
    ) -> Result<(), UpdateError> {
        self.state = UpdateState::Downloading;

        let tmp_dir = tempfile::tempdir()?;
        let download_path = tmp_dir.path().join(&entry.name);

        let actual =
            match download::download_to_path(&self.client, &entry.url, &download_path).await {
                Ok(hash) => hash,
                Err(e) => {
                    self.state = UpdateState::Failed(e.to_string());
                    return Err(e.into());
                }
            };

        self.state = UpdateState::Verifying;

        if actual.as_str() != entry.sha1.as_str() {
            self.state = UpdateState::VerificationFailed;
            return Err(UpdateError::SignatureMismatch {
                expected: entry.sha1.to_string(),
                actual: actual.to_string(),
            });
        }

        let public_key = match &entry.public_key {
            Some(key_url) => {
                let key = self.fetch_public_key(key_url).await?;
                self.verify_detached_signature(key_url, &key, &entry.url, &download_path)
                    .await?;
                Some(key)
            }
            None => None,
        };

        self.state = UpdateState::Installing;

        // Stage beside the target so the final step is a same-volume rename.
        let staged = path_with_suffix(install_path, ".new");
        tokio::fs::copy(&download_path, &staged).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&staged, std::fs::Permissions::from_mode(0o755)).await?;
        }

        if let Some(key_material) = public_key {
            let key_staged = path_with_suffix(install_path, ".pubkey.new");
            tokio::fs::write(&key_staged, key_material.as_bytes()).await?;
            tokio::fs::rename(&key_staged, path_with_suffix(install_path, ".pubkey")).await?;
        }

        tokio::fs::rename(&staged, install_path).await?;
        self.state = UpdateState::Installed;

        tracing::debug!(
            version = %entry.version,
            target = %install_path.display(),
            "installed release"
        );

        Ok(())
    }

    async fn fetch_public_key(&mut self, key_url: &str) -> Result<String, UpdateError> {
        let response = self
            .client
            .get(key_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);

        match response {
            Ok(response) => Ok(response.text().await?),
            Err(e) => {
                self.state = UpdateState::Failed(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Verify the downloaded artifact against a detached ed25519 signature
    /// published at `<artifact_url>.sig`, when one exists.
    async fn verify_detached_signature(
        &mut self,
        key_url: &str,
        key_material: &str,
        artifact_url: &str,
        artifact_path: &Path,
    ) -> Result<(), UpdateError> {
        use base64::Engine as _;
        use ed25519_dalek::{Signature, Verifier, VerifyingKey};

        let engine = base64::engine::general_purpose::STANDARD;

        let key_bytes = engine
            .decode(key_material.trim())
            .map_err(|_| UpdateError::PublicKey {
                url: key_url.to_string(),
            })?;
        let key_bytes: [u8; 32] =
            key_bytes
                .as_slice()
                .try_into()
                .map_err(|_| UpdateError::PublicKey {
                    url: key_url.to_string(),
                })?;
        let verifying_key =
            VerifyingKey::from_bytes(&key_bytes).map_err(|_| UpdateError::PublicKey {
                url: key_url.to_string(),
            })?;

        let sig_url = format!("{artifact_url}.sig");
        let response = match self.client.get(&sig_url).send().await {
            Ok(response) if response.status().is_success() => response,
            // No detached signature published; the SHA-1 gate already passed.
            _ => {
                tracing::debug!(url = %sig_url, "no detached signature, skipping");
                return Ok(());
            }
        };

        let sig_b64 = response.text().await?;
        let sig_bytes =
            engine
                .decode(sig_b64.trim())
                .map_err(|_| UpdateError::DetachedSignature {
                    url: sig_url.clone(),
                })?;
        let sig_bytes: [u8; 64] =
            sig_bytes
                .as_slice()
                .try_into()
                .map_err(|_| UpdateError::DetachedSignature {
                    url: sig_url.clone(),
                })?;
        let signature = Signature::from_bytes(&sig_bytes);

        let data = tokio::fs::read(artifact_path).await?;
        if verifying_key.verify(&data, &signature).is_err() {
            self.state = UpdateState::VerificationFailed;
            return Err(UpdateError::DetachedSignature { url: sig_url });
        }

        Ok(())
    }
}

/// Append `suffix` to the full file name (`tool.bin` + `.new` ->
/// `tool.bin.new`), unlike `Path::with_extension` which would replace it.
fn path_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
