//! Publish command

use crate::config::Config;
use crate::ops::publish::{PublishOutcome, publish_archive};
use crate::ui::Output;
use crate::ui::prompt::StdinPrompt;
use anyhow::{Context, Result, bail};
use slipway_core::decision::{DecisionPort, FixedDecision};
use slipway_core::distribution::DistributionManager;
use slipway_core::manifest_manager::ManifestManager;
use slipway_core::uploader::s3::S3Uploader;
use std::path::{Path, PathBuf};

/// Publish an archive and update the remote manifest
pub async fn publish(
    config: &Config,
    archive: Option<PathBuf>,
    build_version: Option<String>,
    yes: bool,
) -> Result<()> {
    let output = Output::new();

    let archive_path = match archive {
        Some(path) => path,
        None => config
            .distribution
            .artifact_path
            .clone()
            .context("No archive given and no distribution.artifact_path configured")?,
    };
    if !archive_path.exists() {
        bail!("Archive not found: {}", archive_path.display());
    }

    let version = match build_version {
        Some(version) => version,
        None => describe_git_tag(&archive_path)?,
    };

    let client = crate::http_client(config.http.timeout_secs)?;
    let manifest_manager = ManifestManager::new(config.manifest_url()?, client);
    let uploader = S3Uploader::new(config.to_s3_config()?);
    let distribution = DistributionManager::new(uploader, config.manifest.file_name.clone());

    let decisions: Box<dyn DecisionPort> = if yes {
        Box::new(FixedDecision(true))
    } else {
        Box::new(StdinPrompt)
    };

    let outcome = publish_archive(
        &manifest_manager,
        &distribution,
        &version,
        &archive_path,
        decisions.as_ref(),
        &output,
    )
    .await?;

    match outcome {
        PublishOutcome::Published(entry) => {
            output.success("Archive successfully published!");
            println!("{}", serde_json::to_string_pretty(&entry)?);
            Ok(())
        }
        PublishOutcome::Refused => bail!("publish aborted"),
    }
}

/// Most recent tag reachable from HEAD, resolved in the archive's directory.
fn describe_git_tag(base_file: &Path) -> Result<String> {
    let dir = base_file.parent().filter(|p| !p.as_os_str().is_empty());
    let dir = dir.unwrap_or_else(|| Path::new("."));

    let output = std::process::Command::new("git")
        .args(["describe", "--tags", "HEAD"])
        .current_dir(dir)
        .output()
        .context("Failed to run git describe")?;

    if !output.status.success() {
        bail!(
            "The tag could not be retrieved from \"{}\": {}",
            dir.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
