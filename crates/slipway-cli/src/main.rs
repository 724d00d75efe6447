//! slipway CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use slipway_cli::config::Config;
use slipway_cli::{Cli, Commands, VersionsCommands, cmd};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Publish {
            archive,
            build_version,
            yes,
        } => cmd::publish::publish(&config, archive, build_version, yes).await,
        Commands::Versions { command } => match command {
            VersionsCommands::List => cmd::versions::list(&config).await,
            VersionsCommands::Show { version } => cmd::versions::show(&config, &version).await,
        },
        Commands::SelfUpdate { dry_run } => cmd::self_update::self_update(&config, dry_run).await,
        Commands::Completions { shell } => {
            cmd::completions::completions(shell);
            Ok(())
        }
    }
}
