use std::path::PathBuf;

use cardsync_core::ConflictStrategy;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "cardsync")]
#[command(about = "Queue trading card edits offline and sync them later")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// CLI profile name for endpoint and sync settings
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Queue a record for the next sync
    #[command(alias = "add")]
    Enqueue {
        /// Record type (card, template, memory, ...)
        item_type: String,
        /// Record payload as JSON (read from stdin when omitted)
        data: Option<String>,
        /// Record id (generated when omitted)
        #[arg(long, value_name = "ID")]
        id: Option<String>,
        /// Higher priorities sync first
        #[arg(short, long, default_value = "1")]
        priority: i32,
    },
    /// List queued records in sync order
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay queued records against the sync endpoint
    Sync {
        /// Maximum records per batch
        #[arg(long, value_name = "N")]
        batch_size: Option<usize>,
        /// How to settle conflicts reported by the server
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
        /// Sync endpoint base URL
        #[arg(long, value_name = "URL")]
        endpoint: Option<String>,
    },
    /// Show sync statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

/// Conflict strategies selectable for a whole run
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum StrategyArg {
    ClientWins,
    ServerWins,
    Manual,
}

impl From<StrategyArg> for ConflictStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::ClientWins => Self::ClientWins,
            StrategyArg::ServerWins => Self::ServerWins,
            StrategyArg::Manual => Self::Manual,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the resolved profile
    Show,
    /// Create or update a profile
    Set {
        /// Sync endpoint base URL
        #[arg(long, value_name = "URL")]
        endpoint: Option<String>,
        /// Maximum records per batch
        #[arg(long, value_name = "N")]
        batch_size: Option<usize>,
        /// Retry budget per record
        #[arg(long, value_name = "N")]
        retry_count: Option<u32>,
        /// Delay between retries in milliseconds
        #[arg(long, value_name = "MS")]
        retry_delay_ms: Option<u64>,
        /// Default conflict strategy
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
}
