//! Version listing and inspection commands

use crate::config::Config;
use anyhow::{Result, bail};
use comfy_table::Table;
use crossterm::style::Stylize;
use slipway_core::manifest_manager::ManifestManager;
use slipway_schema::manifest::SortOrder;

/// List the published versions, newest first
pub async fn list(config: &Config) -> Result<()> {
    println!(
        "Current version: {}",
        env!("CARGO_PKG_VERSION").to_string().green()
    );

    let client = crate::http_client(config.http.timeout_secs)?;
    let manager = ManifestManager::new(config.manifest_url()?, client);
    let manifest = manager.load_manifest().await?;

    if manifest.is_empty() {
        println!("No versions published yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(["Version", "URL"]);
    for entry in manifest.sorted_entries(SortOrder::Desc) {
        table.add_row([entry.version.as_str(), entry.url.as_str()]);
    }
    println!("{table}");

    Ok(())
}

/// Show one version's details
pub async fn show(config: &Config, version: &str) -> Result<()> {
    let client = crate::http_client(config.http.timeout_secs)?;
    let manager = ManifestManager::new(config.manifest_url()?, client);
    let manifest = manager.load_manifest().await?;

    let Some(entry) = manager.entry_by_version(&manifest, version) else {
        bail!("No archive matching version {version}");
    };

    let lw = 12;

    println!("Version: {}", entry.version.as_str().green());
    println!();
    println!("  {:<lw$}{}", "name", entry.name);
    println!("  {:<lw$}{}", "url", entry.url);
    println!(
        "  {:<lw$}{}",
        "public key",
        entry.public_key.as_deref().unwrap_or("None")
    );
    println!("  {:<lw$}{}", "signature", entry.sha1);

    Ok(())
}
