//! Publish flow: pre-publish policy checks composed from manifest
//! queries, then one distribute transaction.

use anyhow::{Context, Result};
use slipway_core::decision::DecisionPort;
use slipway_core::distribution::DistributionManager;
use slipway_core::manifest_manager::ManifestManager;
use slipway_core::reporter::Reporter;
use slipway_core::uploader::Uploader;
use slipway_schema::types::ReleaseEntry;
use std::path::Path;

/// Result of a publish attempt that ran to a decision.
#[derive(Debug)]
pub enum PublishOutcome {
    /// The archive was published; the new entry is returned for display.
    Published(ReleaseEntry),
    /// The publish was refused, outright or by the operator.
    Refused,
}

/// Run the pre-publish policy and, when it passes, distribute the archive.
///
/// Policy, in order:
/// 1. unreachable/corrupt manifest -- confirmable; continuing starts from
///    a fresh empty manifest, which replaces the remote history on the
///    next upload;
/// 2. identical version already published -- refused outright, the
///    decision port is not consulted;
/// 3. a newer version already published -- confirmable;
/// 4. identical content signature under another version -- confirmable.
pub async fn publish_archive<U: Uploader>(
    manifest_manager: &ManifestManager,
    distribution: &DistributionManager<U>,
    version: &str,
    archive_path: &Path,
    decisions: &dyn DecisionPort,
    reporter: &dyn Reporter,
) -> Result<PublishOutcome> {
    let mut manifest = match manifest_manager.load_manifest().await {
        Ok(manifest) => manifest,
        Err(e) => {
            reporter.error(&e.to_string());
            let proceed = decisions.confirm(
                "Do you still want to publish the archive? \
                 This will empty the remote manifest (if one exists)!",
            );
            if !proceed {
                return Ok(PublishOutcome::Refused);
            }
            ManifestManager::build_manifest(Vec::new())
        }
    };

    if manifest_manager
        .identical_version(&manifest, version)
        .is_some()
    {
        reporter.error(&format!(
            "An archive with the same version is already published ({version})"
        ));
        reporter
            .warning("Publishing an archive with the same version won't trigger new installations");
        return Ok(PublishOutcome::Refused);
    }

    if let Some(newer) = manifest_manager.new_version_available(&manifest, version) {
        reporter.warning(&format!(
            "A more recent version is already published ({})",
            newer.version
        ));
        if !decisions.confirm("Do you still want to publish this archive?") {
            return Ok(PublishOutcome::Refused);
        }
    }

    let signature = distribution
        .archive_signature(archive_path)
        .with_context(|| format!("Failed to read archive {}", archive_path.display()))?;
    if let Some(existing) = manifest_manager.identical_signature(&manifest, signature.as_str()) {
        reporter.warning(&format!(
            "An archive with the same signature is already published:\n{}",
            serde_json::to_string_pretty(existing)?
        ));
        if !decisions.confirm("Do you still want to publish this archive?") {
            return Ok(PublishOutcome::Refused);
        }
    }

    let entry = distribution
        .distribute(version, archive_path, &mut manifest)
        .await?;

    Ok(PublishOutcome::Published(entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockito::Server;
    use slipway_core::decision::FixedDecision;
    use slipway_core::reporter::NullReporter;
    use slipway_core::uploader::UploadError;
    use slipway_schema::hash::Sha1Hash;
    use slipway_schema::manifest::Manifest;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingUploader {
        manifests: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Uploader for RecordingUploader {
        async fn upload_artifact(
            &self,
            _local_path: &Path,
            target_name: &str,
        ) -> Result<String, UploadError> {
            Ok(format!("https://dl.example.com/releases/{target_name}"))
        }

        async fn upload_manifest(
            &self,
            manifest: &Manifest,
            _target_name: &str,
        ) -> Result<String, UploadError> {
            self.manifests
                .lock()
                .unwrap()
                .push(manifest.dump_content().unwrap());
            Ok("https://dl.example.com/manifest.json".to_string())
        }

        async fn upload_public_key(
            &self,
            _local_path: &Path,
            target_name: &str,
        ) -> Result<String, UploadError> {
            Ok(format!("https://dl.example.com/releases/{target_name}"))
        }
    }

    /// Proves a refusal path never consults the operator.
    struct UnreachableDecision;

    impl DecisionPort for UnreachableDecision {
        fn confirm(&self, message: &str) -> bool {
            panic!("decision port must not be consulted: {message}");
        }
    }

    fn manifest_body(entries: &[(&str, &str)]) -> String {
        let entries: Vec<serde_json::Value> = entries
            .iter()
            .map(|(version, sha1)| {
                serde_json::json!({
                    "name": "mytool.bin",
                    "sha1": sha1,
                    "url": format!("https://dl.example.com/releases/mytool-{version}.bin"),
                    "version": version,
                })
            })
            .collect();
        serde_json::to_string(&entries).unwrap()
    }

    fn write_archive(dir: &tempfile::TempDir, payload: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join("mytool.bin");
        std::fs::write(&path, payload).unwrap();
        path
    }

    async fn serve_manifest(server: &mut Server, body: &str) -> mockito::Mock {
        server
            .mock("GET", "/manifest.json")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn identical_version_is_refused_without_asking() {
        let mut server = Server::new_async().await;
        let _m = serve_manifest(
            &mut server,
            &manifest_body(&[("1.0.0", "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed")]),
        )
        .await;

        let dir = tempfile::tempdir().unwrap();
        let archive = write_archive(&dir, b"payload");

        let manager = ManifestManager::new(
            format!("{}/manifest.json", server.url()),
            reqwest::Client::new(),
        );
        let distribution = DistributionManager::new(RecordingUploader::default(), "manifest.json");

        let outcome = publish_archive(
            &manager,
            &distribution,
            "1.0.0",
            &archive,
            &UnreachableDecision,
            &NullReporter,
        )
        .await
        .unwrap();

        assert!(matches!(outcome, PublishOutcome::Refused));
    }

    #[tokio::test]
    async fn stale_publish_needs_confirmation() {
        let mut server = Server::new_async().await;
        let _m = serve_manifest(
            &mut server,
            &manifest_body(&[("2.0.0", "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed")]),
        )
        .await;

        let dir = tempfile::tempdir().unwrap();
        let archive = write_archive(&dir, b"payload");

        let manager = ManifestManager::new(
            format!("{}/manifest.json", server.url()),
            reqwest::Client::new(),
        );
        let distribution = DistributionManager::new(RecordingUploader::default(), "manifest.json");

        let refused = publish_archive(
            &manager,
            &distribution,
            "1.0.0",
            &archive,
            &FixedDecision(false),
            &NullReporter,
        )
        .await
        .unwrap();
        assert!(matches!(refused, PublishOutcome::Refused));

        let published = publish_archive(
            &manager,
            &distribution,
            "1.0.0",
            &archive,
            &FixedDecision(true),
            &NullReporter,
        )
        .await
        .unwrap();
        assert!(matches!(published, PublishOutcome::Published(_)));
    }

    #[tokio::test]
    async fn duplicate_signature_needs_confirmation() {
        let payload = b"payload";
        let signature = Sha1Hash::compute(payload);

        let mut server = Server::new_async().await;
        let _m = serve_manifest(
            &mut server,
            &manifest_body(&[("0.9.0", signature.as_str())]),
        )
        .await;

        let dir = tempfile::tempdir().unwrap();
        let archive = write_archive(&dir, payload);

        let manager = ManifestManager::new(
            format!("{}/manifest.json", server.url()),
            reqwest::Client::new(),
        );
        let distribution = DistributionManager::new(RecordingUploader::default(), "manifest.json");

        let refused = publish_archive(
            &manager,
            &distribution,
            "1.0.0",
            &archive,
            &FixedDecision(false),
            &NullReporter,
        )
        .await
        .unwrap();
        assert!(matches!(refused, PublishOutcome::Refused));
    }

    #[tokio::test]
    async fn unreachable_manifest_can_start_fresh() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/manifest.json")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let archive = write_archive(&dir, b"payload");

        let manager = ManifestManager::new(
            format!("{}/manifest.json", server.url()),
            reqwest::Client::new(),
        );
        let distribution = DistributionManager::new(RecordingUploader::default(), "manifest.json");

        let refused = publish_archive(
            &manager,
            &distribution,
            "1.0.0",
            &archive,
            &FixedDecision(false),
            &NullReporter,
        )
        .await
        .unwrap();
        assert!(matches!(refused, PublishOutcome::Refused));

        let published = publish_archive(
            &manager,
            &distribution,
            "1.0.0",
            &archive,
            &FixedDecision(true),
            &NullReporter,
        )
        .await
        .unwrap();
        let PublishOutcome::Published(entry) = published else {
            panic!("expected a published entry");
        };
        assert_eq!(entry.version.as_str(), "1.0.0");

        // The fresh manifest was uploaded with exactly the new entry.
        let manifests = distribution_uploaded(&distribution);
        let last = manifests.last().unwrap();
        let reloaded = Manifest::from_json(last).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.entries()[0].version.as_str(), "1.0.0");
    }

    fn distribution_uploaded(
        distribution: &DistributionManager<RecordingUploader>,
    ) -> Vec<String> {
        distribution.uploader().manifests.lock().unwrap().clone()
    }
}
