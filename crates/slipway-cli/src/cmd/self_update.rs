//! Self-update command for slipway

use crate::config::Config;
use crate::ui::Output;
use anyhow::{Context, Result};
use slipway_core::update::{SelfUpdateClient, UpdateError};

/// Update slipway itself to the latest published version
pub async fn self_update(config: &Config, dry_run: bool) -> Result<()> {
    let output = Output::new();
    let current_version = env!("CARGO_PKG_VERSION");

    output.info("Checking for updates...");

    let client = crate::http_client(config.http.timeout_secs)?;
    let mut updater = SelfUpdateClient::new(client);

    let entry = match updater
        .check_for_update(config.manifest_url()?, current_version)
        .await?
    {
        Some(entry) => entry,
        None => {
            output.success(&format!(
                "slipway is already up to date (v{current_version})"
            ));
            return Ok(());
        }
    };

    output.warning(&format!(
        "Update available: {current_version} -> {}",
        entry.version
    ));

    if dry_run {
        output.info("Dry run, not installing update.");
        return Ok(());
    }

    let install_path =
        std::env::current_exe().context("Failed to locate the running executable")?;

    output.info(&format!("Downloading from {}...", entry.url));

    match updater.apply_update(&entry, &install_path).await {
        Ok(()) => {
            output.success(&format!("slipway has been updated to v{}", entry.version));
            Ok(())
        }
        Err(e @ UpdateError::SignatureMismatch { .. }) => {
            output.error("Downloaded archive failed verification; keeping the current binary");
            Err(e.into())
        }
        Err(e) => Err(e).context("Failed to apply update"),
    }
}
