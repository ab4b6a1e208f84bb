//! wiki-sync - copies changed page content from a local page store into a wiki.

mod app;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use wiki_sync_config::{
    init_logging, DEFAULT_LOCAL_CONFIG_FILE, DEFAULT_LOG_LEVEL, DEFAULT_WIKI_CONFIG_FILE,
};

/// wiki-sync command-line interface.
#[derive(Parser, Debug)]
#[command(name = "wiki-sync")]
#[command(about = "Sync page content from a local page store into a wiki database")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = DEFAULT_LOG_LEVEL, global = true)]
    log_level: String,

    /// Also write a JSONL run log to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Local page store config file
    #[arg(long, default_value = DEFAULT_LOCAL_CONFIG_FILE, global = true)]
    local: PathBuf,

    /// Wiki store config file
    #[arg(long, default_value = DEFAULT_WIKI_CONFIG_FILE, global = true)]
    wiki: PathBuf,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// Write changed pages to the wiki (default)
    Sync {
        /// Compute the change set without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the pages that would be updated
    Diff {
        /// Print the change set as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create the expected tables in both stores
    Init,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.log_file.clone());

    let paths = app::ConfigPaths {
        local: cli.local,
        wiki: cli.wiki,
    };

    let command = cli.command.unwrap_or(Commands::Sync { dry_run: false });
    let result = match command {
        Commands::Sync { dry_run } => app::sync(&paths, dry_run).map(|_| ()),
        Commands::Diff { json } => app::diff(&paths, json),
        Commands::Init => app::init(&paths),
    };

    match result {
        Ok(()) => {
            // Keep `diff --json` output parseable.
            if !matches!(command, Commands::Diff { json: true }) {
                println!("Finished!");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            eprintln!("{}", e.category());
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
