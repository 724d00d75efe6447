//! slipway - publish and self-update single-binary tools
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
//!
//! Slipway publishes a single-file release artifact to an S3-compatible
//! object store, maintains a JSON release manifest at a well-known URL,
//! and lets previously-installed copies discover, verify, and atomically
//! install newer releases.
//!
//! # Architecture
//!
//! - **Explicit wiring**: commands construct the managers they need
//!   (`ManifestManager`, `DistributionManager`, `S3Uploader`) from resolved
//!   configuration records; nothing is looked up from shared mutable state.
//! - **Ports**: interactive concerns are injected (`Reporter` for output,
//!   `DecisionPort` for confirmations), so the flows run unattended in CI.

pub mod cmd;
pub mod config;
pub mod ops;
pub mod ui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// User Agent string (re-exported from slipway_core)
pub use slipway_core::USER_AGENT;

/// Build the HTTP client every remote command uses. The timeout bounds
/// each request; remote calls never hang indefinitely.
pub fn http_client(timeout_secs: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(Into::into)
}

#[derive(Debug, Parser)]
#[command(name = "slipway")]
#[command(author, version, about = "slipway - publish and self-update single-binary tools")]
pub struct Cli {
    /// Path to the configuration file (default: ./slipway.toml)
    #[arg(long, global = true, env = "SLIPWAY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Publish an archive and update the remote manifest
    Publish {
        /// Archive file path (default: distribution.artifact_path config value)
        archive: Option<PathBuf>,
        /// Version to publish (default: the most recent git tag)
        #[arg(long)]
        build_version: Option<String>,
        /// Answer yes to every confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Inspect published versions
    Versions {
        #[command(subcommand)]
        command: VersionsCommands,
    },
    /// Update slipway itself to the latest published version
    #[command(name = "self-update")]
    SelfUpdate {
        /// Check for a new version without installing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum VersionsCommands {
    /// List the published versions, newest first
    List,
    /// Show one version's details
    Show {
        /// Version number
        version: String,
    },
}
