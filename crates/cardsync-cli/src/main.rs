//! cardsync CLI - queue trading card edits offline and replay them later
//!
//! Records are queued into a local libSQL database and synced on demand
//! against the configured HTTP endpoint.

mod cli;
mod commands;
mod config_profiles;
mod error;

#[cfg(test)]
mod tests;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::common::resolve_db_path;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::enqueue::run_enqueue;
use crate::commands::list::run_list;
use crate::commands::stats::run_stats;
use crate::commands::sync::{run_sync, SyncArgs};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cardsync=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Enqueue {
            item_type,
            data,
            id,
            priority,
        } => {
            let db_path = resolve_db_path(cli.db_path)?;
            run_enqueue(&item_type, data, id, priority, &db_path).await?;
        }
        Commands::List { json } => {
            let db_path = resolve_db_path(cli.db_path)?;
            run_list(json, &db_path).await?;
        }
        Commands::Sync {
            batch_size,
            strategy,
            endpoint,
        } => {
            let db_path = resolve_db_path(cli.db_path)?;
            let args = SyncArgs {
                batch_size,
                strategy: strategy.map(Into::into),
                endpoint,
            };
            run_sync(args, profile, &db_path).await?;
        }
        Commands::Stats { json } => {
            let db_path = resolve_db_path(cli.db_path)?;
            run_stats(json, &db_path).await?;
        }
        Commands::Config { command } => run_config(command, profile)?,
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref())?,
    }

    Ok(())
}
