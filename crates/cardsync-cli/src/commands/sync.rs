use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use cardsync_core::{
    ConflictResolution, ConflictResolver, ConflictStrategy, HttpSyncEndpoint, SyncConflict,
    SyncOptions, SyncResult, SyncSettings,
};

use crate::commands::common::{
    auth_token_from_env, data_preview, format_resolved_lines, format_stats_lines, open_queue,
    resolve_endpoint_url,
};
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

/// Per-run overrides from the command line
#[derive(Debug, Default)]
pub struct SyncArgs {
    pub batch_size: Option<usize>,
    pub strategy: Option<ConflictStrategy>,
    pub endpoint: Option<String>,
}

pub async fn run_sync(
    args: SyncArgs,
    global_profile: Option<&str>,
    db_path: &Path,
) -> Result<(), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(global_profile);
    let profile = config.profile(&profile_name).cloned().unwrap_or_default();

    let settings = resolve_settings(profile.sync, args.batch_size, args.strategy)?;
    let endpoint_url = resolve_endpoint_url(
        args.endpoint,
        env::var("CARDSYNC_ENDPOINT_URL").ok(),
        profile.endpoint_url(),
    )
    .ok_or(CliError::SyncNotConfigured)?;

    let mut endpoint = HttpSyncEndpoint::new(endpoint_url)?;
    if let Some(token) = auth_token_from_env() {
        endpoint = endpoint.with_auth_token(token);
    }
    tracing::info!(profile = %profile_name, endpoint = endpoint.base_url(), "Using sync endpoint");

    let local = open_queue(db_path, endpoint).await?;
    let queue = &local.queue;
    if queue.get_stats().pending == 0 {
        println!("Nothing to sync.");
        return Ok(());
    }

    let run = queue.start_sync(build_options(settings));
    tokio::pin!(run);
    let result = tokio::select! {
        result = &mut run => result,
        Ok(()) = tokio::signal::ctrl_c() => {
            eprintln!("Cancelling after the current batch...");
            queue.cancel_sync();
            run.await
        }
    };

    print_summary(&result);
    if result.success {
        Ok(())
    } else {
        Err(CliError::SyncFailed(failure_summary(&result)))
    }
}

/// Profile settings with command-line overrides applied
pub fn resolve_settings(
    base: SyncSettings,
    batch_size: Option<usize>,
    strategy: Option<ConflictStrategy>,
) -> Result<SyncSettings, CliError> {
    let mut settings = base;
    if let Some(batch_size) = batch_size {
        settings.batch_size = batch_size;
    }
    if let Some(strategy) = strategy {
        settings.conflict_strategy = strategy;
    }
    settings.validate()?;
    Ok(settings)
}

fn build_options(settings: SyncSettings) -> SyncOptions {
    let batches = AtomicUsize::new(0);
    let options = settings.to_options().on_progress(move |stats| {
        let batch = batches.fetch_add(1, Ordering::Relaxed) + 1;
        println!(
            "batch {batch}: synced={} failed={} conflicts={} pending={}",
            stats.synced, stats.failed, stats.conflicts, stats.pending
        );
    });

    if settings.conflict_strategy == ConflictStrategy::Manual {
        options.on_conflict(PromptResolver)
    } else {
        options
    }
}

fn print_summary(result: &SyncResult) {
    if result.cancelled {
        println!("Sync cancelled; remaining records stay queued.");
    }
    for line in format_stats_lines(&result.stats) {
        println!("{line}");
    }
    if !result.resolved.is_empty() {
        println!("Resolved conflicts:");
        for line in format_resolved_lines(&result.resolved) {
            println!("  {line}");
        }
    }
}

pub fn failure_summary(result: &SyncResult) -> String {
    if result.errors.is_empty() {
        "some records failed and stay queued for the next run".to_string()
    } else {
        result
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Asks on the terminal how to settle each conflict
pub struct PromptResolver;

#[async_trait]
impl ConflictResolver for PromptResolver {
    async fn resolve(&self, conflict: &SyncConflict) -> Option<ConflictResolution> {
        let prompt = format_conflict_prompt(conflict);
        match tokio::task::spawn_blocking(move || prompt_line(&prompt)).await {
            Ok(Ok(answer)) => parse_conflict_answer(&answer),
            Ok(Err(error)) => {
                tracing::warn!("Failed to read conflict answer: {error}");
                None
            }
            Err(error) => {
                tracing::warn!("Conflict prompt task failed: {error}");
                None
            }
        }
    }
}

pub fn format_conflict_prompt(conflict: &SyncConflict) -> String {
    format!(
        "Conflict on {}:{}\n  local:  {}\n  server: {}\nKeep [c]lient, [s]erver, paste merged JSON, or press enter to skip: ",
        conflict.item_type,
        conflict.item_id,
        data_preview(&conflict.client_data, 120),
        data_preview(&conflict.server_data, 120),
    )
}

/// `c`/`client`, `s`/`server`, a JSON document to merge, or nothing
pub fn parse_conflict_answer(answer: &str) -> Option<ConflictResolution> {
    let answer = answer.trim();
    match answer.to_ascii_lowercase().as_str() {
        "" => None,
        "c" | "client" => Some(ConflictResolution::client_wins()),
        "s" | "server" => Some(ConflictResolution::server_wins()),
        _ => match serde_json::from_str(answer) {
            Ok(data) => Some(ConflictResolution::merge(data)),
            Err(error) => {
                tracing::warn!("Ignoring unreadable conflict answer: {error}");
                None
            }
        },
    }
}

fn prompt_line(prompt: &str) -> io::Result<String> {
    {
        let mut stdout = io::stdout().lock();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;
    }
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(answer)
}
