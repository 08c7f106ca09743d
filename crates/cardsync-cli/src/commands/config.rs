use cardsync_core::util::{is_http_url, normalize_text_option};
use cardsync_core::ConflictStrategy;

use crate::cli::ConfigCommands;
use crate::config_profiles::{default_config_path, CliProfile, CliProfilesConfig};
use crate::error::CliError;

/// Field updates requested by `config set`
#[derive(Debug, Default, Clone, Copy)]
pub struct ProfileUpdate<'a> {
    pub endpoint: Option<&'a str>,
    pub batch_size: Option<usize>,
    pub retry_count: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub strategy: Option<ConflictStrategy>,
}

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => run_config_show(global_profile),
        ConfigCommands::Set {
            endpoint,
            batch_size,
            retry_count,
            retry_delay_ms,
            strategy,
            no_activate,
        } => {
            let update = ProfileUpdate {
                endpoint: endpoint.as_deref(),
                batch_size,
                retry_count,
                retry_delay_ms,
                strategy: strategy.map(ConflictStrategy::from),
            };
            run_config_set(global_profile, update, no_activate)
        }
    }
}

fn run_config_show(global_profile: Option<&str>) -> Result<(), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(global_profile);
    let profile = config.profile(&profile_name).cloned().unwrap_or_default();
    let path = default_config_path().map_err(CliError::Config)?;

    println!("Profile '{}' ({})", profile_name, path.display());
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

fn run_config_set(
    global_profile: Option<&str>,
    update: ProfileUpdate<'_>,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(global_profile);

    apply_profile_update(config.profile_mut_or_default(&profile_name), update)?;

    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    tracing::debug!(profile = %profile_name, "Saved CLI profile");
    println!("Profile '{}' saved at {}", profile_name, path.display());

    let ready = config
        .profile(&profile_name)
        .and_then(CliProfile::endpoint_url)
        .is_some();
    if !ready {
        println!("Profile '{profile_name}' has no sync endpoint yet; pass --endpoint <URL>.");
    }
    Ok(())
}

/// Apply updates to a profile, validating the result before it is kept
pub fn apply_profile_update(
    profile: &mut CliProfile,
    update: ProfileUpdate<'_>,
) -> Result<(), CliError> {
    let mut next = profile.clone();

    if let Some(endpoint) = update.endpoint {
        let endpoint = normalize_text_option(Some(endpoint.to_string()))
            .ok_or_else(|| CliError::Config("endpoint must not be empty".to_string()))?;
        if !is_http_url(&endpoint) {
            return Err(CliError::Config(
                "endpoint must include http:// or https://".to_string(),
            ));
        }
        next.endpoint_url = Some(endpoint.trim_end_matches('/').to_string());
    }
    if let Some(batch_size) = update.batch_size {
        next.sync.batch_size = batch_size;
    }
    if let Some(retry_count) = update.retry_count {
        next.sync.retry_count = retry_count;
    }
    if let Some(retry_delay_ms) = update.retry_delay_ms {
        next.sync.retry_delay_ms = retry_delay_ms;
    }
    if let Some(strategy) = update.strategy {
        next.sync.conflict_strategy = strategy;
    }

    next.sync.validate()?;
    *profile = next;
    Ok(())
}
