use cardsync_core::{
    ConflictStrategy, Error, QueueItemDraft, ResolvedConflict, SyncResult, SyncSettings, SyncStats,
    SyncStatus,
};
use clap::CommandFactory;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::cli::{Cli, CompletionShell, StrategyArg};
use crate::commands::common::{
    data_preview, enqueue_item, format_item_lines, format_relative_time, format_resolved_lines,
    format_stats_lines, format_sync_timestamp, list_pending, load_stats, normalize_content,
    normalize_item_type, parse_item_data, resolve_endpoint_url,
};
use crate::commands::completions::render_completions;
use crate::commands::config::{apply_profile_update, ProfileUpdate};
use crate::commands::sync::{failure_summary, parse_conflict_answer, resolve_settings};
use crate::config_profiles::CliProfile;
use crate::error::CliError;

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn completions_use_binary_name() {
    let rendered = String::from_utf8(render_completions(CompletionShell::Bash)).unwrap();
    assert!(rendered.contains("cardsync"));
}

#[test]
fn strategy_args_map_to_run_strategies() {
    assert_eq!(
        ConflictStrategy::from(StrategyArg::ClientWins),
        ConflictStrategy::ClientWins
    );
    assert_eq!(
        ConflictStrategy::from(StrategyArg::ServerWins),
        ConflictStrategy::ServerWins
    );
    assert_eq!(
        ConflictStrategy::from(StrategyArg::Manual),
        ConflictStrategy::Manual
    );
}

#[test]
fn normalize_content_trims_and_rejects_empty() {
    assert_eq!(normalize_content("  {}  "), Some("{}".to_string()));
    assert_eq!(normalize_content(" \n\t "), None);
}

#[test]
fn normalize_item_type_rejects_empty() {
    assert!(matches!(
        normalize_item_type(" \n "),
        Err(CliError::EmptyItemType)
    ));
    assert_eq!(normalize_item_type(" card ").unwrap(), "card");
}

#[test]
fn parse_item_data_requires_json() {
    assert_eq!(
        parse_item_data(r#"{"name":"Pikachu"}"#).unwrap(),
        json!({"name": "Pikachu"})
    );
    assert!(matches!(
        parse_item_data("name=Pikachu"),
        Err(CliError::InvalidData(_))
    ));
}

#[test]
fn endpoint_url_prefers_flag_then_env_then_profile() {
    let resolved = resolve_endpoint_url(
        Some("https://flag.example.com".to_string()),
        Some("https://env.example.com".to_string()),
        Some("https://profile.example.com".to_string()),
    );
    assert_eq!(resolved.as_deref(), Some("https://flag.example.com"));

    let resolved = resolve_endpoint_url(
        Some("  ".to_string()),
        Some("https://env.example.com".to_string()),
        Some("https://profile.example.com".to_string()),
    );
    assert_eq!(resolved.as_deref(), Some("https://env.example.com"));

    let resolved = resolve_endpoint_url(None, None, Some("https://profile.example.com".to_string()));
    assert_eq!(resolved.as_deref(), Some("https://profile.example.com"));

    assert_eq!(resolve_endpoint_url(None, None, None), None);
}

#[test]
fn resolve_settings_applies_overrides() {
    let settings = resolve_settings(
        SyncSettings::default(),
        Some(25),
        Some(ConflictStrategy::ServerWins),
    )
    .unwrap();
    assert_eq!(settings.batch_size, 25);
    assert_eq!(settings.conflict_strategy, ConflictStrategy::ServerWins);
    assert_eq!(settings.retry_count, SyncSettings::default().retry_count);
}

#[test]
fn resolve_settings_rejects_invalid_values() {
    assert!(resolve_settings(SyncSettings::default(), Some(0), None).is_err());
    assert!(resolve_settings(SyncSettings::default(), None, Some(ConflictStrategy::Merge)).is_err());
}

#[test]
fn profile_update_validates_before_applying() {
    let mut profile = CliProfile::default();

    apply_profile_update(
        &mut profile,
        ProfileUpdate {
            endpoint: Some(" https://api.example.com/ "),
            batch_size: Some(50),
            strategy: Some(ConflictStrategy::Manual),
            ..ProfileUpdate::default()
        },
    )
    .unwrap();
    assert_eq!(
        profile.endpoint_url.as_deref(),
        Some("https://api.example.com")
    );
    assert_eq!(profile.sync.batch_size, 50);
    assert_eq!(profile.sync.conflict_strategy, ConflictStrategy::Manual);

    let before = profile.clone();
    let error = apply_profile_update(
        &mut profile,
        ProfileUpdate {
            endpoint: Some("api.example.com"),
            batch_size: Some(5),
            ..ProfileUpdate::default()
        },
    );
    assert!(matches!(error, Err(CliError::Config(_))));
    assert_eq!(profile, before);

    let error = apply_profile_update(
        &mut profile,
        ProfileUpdate {
            batch_size: Some(0),
            ..ProfileUpdate::default()
        },
    );
    assert!(matches!(error, Err(CliError::Core(Error::Config(_)))));
    assert_eq!(profile, before);
}

#[test]
fn conflict_answers() {
    let client = parse_conflict_answer("c\n").unwrap();
    assert_eq!(client.strategy, ConflictStrategy::ClientWins);

    let server = parse_conflict_answer(" Server ").unwrap();
    assert_eq!(server.strategy, ConflictStrategy::ServerWins);

    let merged = parse_conflict_answer(r#"{"hp": 75}"#).unwrap();
    assert_eq!(merged.strategy, ConflictStrategy::Merge);
    assert_eq!(merged.resolved_data, Some(json!({"hp": 75})));

    assert!(parse_conflict_answer("\n").is_none());
    assert!(parse_conflict_answer("whatever").is_none());
}

#[test]
fn failure_summary_lists_run_errors() {
    let rejected = SyncResult {
        success: false,
        stats: SyncStats::default(),
        errors: vec![Error::SyncInProgress],
        resolved: Vec::new(),
        cancelled: false,
    };
    assert_eq!(failure_summary(&rejected), "Sync already in progress");

    let item_failures = SyncResult {
        errors: Vec::new(),
        ..rejected
    };
    assert!(failure_summary(&item_failures).contains("stay queued"));
}

#[test]
fn format_sync_timestamp_returns_utc_label() {
    assert_eq!(format_sync_timestamp(0), "1970-01-01 00:00:00 UTC");
}

#[test]
fn format_relative_time_units() {
    let now = 10_000_000_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
    assert_eq!(format_relative_time(now - 3 * 24 * 60 * 60_000, now), "3d ago");
    assert_eq!(format_relative_time(now - 14 * 24 * 60 * 60_000, now), "2w ago");
}

#[test]
fn format_stats_lines_include_every_counter() {
    let stats = SyncStats {
        pending: 2,
        synced: 10,
        failed: 1,
        conflicts: 3,
        last_sync_at: Some(0),
    };
    let lines = format_stats_lines(&stats);
    assert_eq!(
        lines,
        vec![
            "pending    2",
            "synced     10",
            "failed     1",
            "conflicts  3",
            "last sync  1970-01-01 00:00:00 UTC",
        ]
    );

    let never = format_stats_lines(&SyncStats::default());
    assert_eq!(never[4], "last sync  never");
}

#[test]
fn data_preview_truncates_with_ellipsis() {
    let data = json!({"name": "A very long card name that will not fit"});
    let preview = data_preview(&data, 20);
    assert_eq!(preview.chars().count(), 20);
    assert!(preview.ends_with("..."));
    assert_eq!(data_preview(&json!({"a": 1}), 20), r#"{"a":1}"#);
}

#[test]
fn format_resolved_lines_include_strategy_and_key() {
    let lines = format_resolved_lines(&[ResolvedConflict {
        item_id: "abc".to_string(),
        item_type: "card".to_string(),
        strategy: ConflictStrategy::ServerWins,
        data: json!({"hp": 90}),
    }]);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("server-wins"));
    assert!(lines[0].contains("card:abc"));
    assert!(lines[0].contains(r#"{"hp":90}"#));
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn enqueued_items_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("cardsync.db");

    let low = enqueue_item(
        &db_path,
        QueueItemDraft::new("card", json!({"name": "Bulbasaur"})).with_id("low"),
    )
    .await
    .unwrap();
    let high = enqueue_item(
        &db_path,
        QueueItemDraft::new("template", json!({"layout": "full-art"}))
            .with_id("high")
            .with_priority(5),
    )
    .await
    .unwrap();
    assert_eq!(low, "low");
    assert_eq!(high, "high");

    let items = list_pending(&db_path).await.unwrap();
    let ids = items.iter().map(|item| item.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["high", "low"]);
    assert!(items
        .iter()
        .all(|item| item.sync_status == SyncStatus::Pending));

    let lines = format_item_lines(&items);
    assert!(lines[0].starts_with("high"));
    assert!(lines[0].contains("template"));

    let stats = load_stats(&db_path).await.unwrap();
    assert_eq!(stats.pending, 2);
    assert_eq!(stats.synced, 0);
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn enqueue_with_same_key_replaces_record() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("cardsync.db");

    for hp in [60, 70] {
        enqueue_item(
            &db_path,
            QueueItemDraft::new("card", json!({"hp": hp})).with_id("charmander"),
        )
        .await
        .unwrap();
    }

    let items = list_pending(&db_path).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].data, json!({"hp": 70}));
}
