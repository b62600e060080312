//! ironquest: terminal client for the IronQuest path finder.
//!
//! Shares the storage root (`~/.ironquest`, or `IRONQUEST_HOME`) with the
//! overlay windows, so parameters edited here show up in a running overlay
//! and vice versa.
//!
//! ## Subcommands
//!
//! - `params`: show, edit or reset the persisted search parameters
//! - `find-path`: request a path for the current parameters
//! - `quests`: list incomplete quests with their priorities
//! - `watch`: apply and print mutations from sibling windows

mod find_path;
mod logging;
mod params;
mod quests;
mod render;
mod watch;

use clap::{Parser, Subcommand};
use quest_core::{load_client_config, App, StorageConfig};

#[derive(Parser)]
#[command(name = "ironquest")]
#[command(about = "IronQuest path finder client")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or edit the persisted search parameters
    Params {
        #[command(subcommand)]
        action: params::ParamsAction,
    },

    /// Request a path for the current parameters
    FindPath {
        /// Print the raw path as JSON
        #[arg(long)]
        json: bool,
    },

    /// List incomplete quests for the current character
    Quests {
        /// Print the quest list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply and print mutations arriving from sibling windows
    Watch {
        /// Poll interval in milliseconds
        #[arg(long, default_value_t = 250)]
        interval_ms: u64,

        /// Stop after this many seconds instead of running until interrupted
        #[arg(long)]
        for_secs: Option<u64>,
    },
}

fn main() {
    let _logging_guard = logging::init();
    let cli = Cli::parse();

    let mut app = match bootstrap() {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = %e, "ironquest failed to start");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Params { action } => params::run(&mut app, action),
        Commands::FindPath { json } => find_path::run(&mut app, json),
        Commands::Quests { json } => quests::run(&mut app, json),
        Commands::Watch {
            interval_ms,
            for_secs,
        } => watch::run(&mut app, interval_ms, for_secs),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "ironquest command failed");
        std::process::exit(1);
    }
}

fn bootstrap() -> Result<App, String> {
    let storage = StorageConfig::from_env().map_err(|e| e.to_string())?;
    let config = load_client_config(&storage);
    App::bootstrap(storage, config).map_err(|e| e.to_string())
}
