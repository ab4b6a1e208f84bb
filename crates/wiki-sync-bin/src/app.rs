//! Command implementations.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::info;
use wiki_sync_config::{LocalDbConfig, WikiDbConfig};
use wiki_sync_engine::{
    read_local_pages, sync_local_pages, LogSink, SyncError, SyncReport, SyncResult, SyncSettings,
};
use wiki_sync_store::{database_path, SqliteLocalStore, SqliteRemoteStore};

/// Failure of a command.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// `diff --json` could not encode its report
    #[error("Failed to encode the change set as JSON: {0}")]
    Encode(#[from] serde_json::Error),
}

impl AppError {
    /// Human readable category line shown before the error message.
    pub fn category(&self) -> String {
        match self {
            Self::Sync(e) => e.category(),
            Self::Encode(_) => "The change set could not be printed.".to_string(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Locations of the two config files.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub local: PathBuf,
    pub wiki: PathBuf,
}

impl ConfigPaths {
    fn load_local(&self) -> SyncResult<LocalDbConfig> {
        let config = LocalDbConfig::load(&self.local)?;
        info!(local = %config.connection.redacted(), "local configuration loaded");
        Ok(config)
    }

    fn load_wiki(&self) -> SyncResult<WikiDbConfig> {
        let config = WikiDbConfig::load(&self.wiki)?;
        info!(wiki = %config.connection.redacted(), "wiki configuration loaded");
        Ok(config)
    }
}

/// Run one sync. The wiki config's `userName` is the user recorded on
/// every revision.
///
/// The wiki config is only read once the local store turned out to have
/// pages, so an empty local store never depends on it.
pub fn sync(paths: &ConfigPaths, dry_run: bool) -> AppResult<SyncReport> {
    let local = SqliteLocalStore::new(&paths.load_local()?);
    let Some(local_pages) = read_local_pages(&local)? else {
        return Ok(SyncReport::nothing_to_update());
    };

    let wiki_config = paths.load_wiki()?;
    let wiki = SqliteRemoteStore::new(&wiki_config);
    let settings = SyncSettings {
        user_name: wiki_config.connection.user_name.clone(),
        options: wiki_config.options,
        dry_run,
    };
    let report = sync_local_pages(&local_pages, &wiki, &settings, &LogSink)?;
    info!(
        outcome = ?report.outcome,
        changes = report.changes.len(),
        applied = report.applied.len(),
        "sync complete"
    );
    Ok(report)
}

/// Print the change set without writing.
pub fn diff(paths: &ConfigPaths, json: bool) -> AppResult<()> {
    let report = sync(paths, true)?;

    if json {
        println!("{}", render_json(&report)?);
        return Ok(());
    }

    if report.changes.is_empty() {
        println!("No pages need updating");
    }
    for change in &report.changes {
        println!(
            "{:>6}  {}  {} -> {}",
            change.remote_page_id,
            change.title.trim(),
            change.remote_hash,
            change.local_hash
        );
    }
    Ok(())
}

fn render_json<T: Serialize + ?Sized>(value: &T) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Create both SQLite stores with their expected tables.
pub fn init(paths: &ConfigPaths) -> AppResult<()> {
    let local_config = paths.load_local()?;
    let wiki_config = paths.load_wiki()?;

    SqliteLocalStore::new(&local_config)
        .init_schema()
        .map_err(SyncError::from)?;
    println!(
        "Local store ready at {}",
        database_path(&local_config.connection).display()
    );

    SqliteRemoteStore::new(&wiki_config)
        .init_schema()
        .map_err(SyncError::from)?;
    println!(
        "Wiki store ready at {}",
        database_path(&wiki_config.connection).display()
    );
    Ok(())
}
