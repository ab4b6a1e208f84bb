//! Sync error types.

use std::fmt;
use thiserror::Error;
use wiki_sync_config::ConfigError;
use wiki_sync_store::{StoreError, StoreTable};

/// One write step of a page update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStep {
    InsertText,
    ResolveTextId,
    RepointPage,
    AppendRevision,
}

impl UpdateStep {
    /// What the wiki store looks like when this step fails.
    pub fn partial_state(&self) -> &'static str {
        match self {
            Self::InsertText => "no rows were written for this page",
            Self::ResolveTextId | Self::RepointPage => {
                "a new text row exists that no page points to"
            }
            Self::AppendRevision => {
                "the page points at its new text but no revision records the change"
            }
        }
    }
}

impl fmt::Display for UpdateStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InsertText => "insert text",
            Self::ResolveTextId => "resolve text id",
            Self::RepointPage => "repoint page",
            Self::AppendRevision => "append revision",
        };
        f.write_str(name)
    }
}

/// Which store held a duplicated title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSide {
    Local,
    Remote,
}

impl fmt::Display for TitleSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Remote => "wiki",
        })
    }
}

/// Sync error type.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A read failed, or user resolution hit a store fault
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The configured user name has no identity row
    #[error("User {user_name:?} has no entry in the wiki user table")]
    InvalidUser { user_name: String },

    /// A matched title is not unique, so the page cannot be identified
    #[error("Title {title:?} appears more than once in the {side} store")]
    DuplicateTitle { side: TitleSide, title: String },

    /// A write step failed part way through a page update
    #[error("Updating page {page_title:?} failed at step '{step}' ({}): {source}", .step.partial_state())]
    UpdateStep {
        page_title: String,
        step: UpdateStep,
        #[source]
        source: StoreError,
    },

    /// The page repoint matched no rows
    #[error("No wiki page titled {page_title:?} was repointed; text row {text_id} is orphaned")]
    PageNotRepointed { page_title: String, text_id: i64 },
}

impl SyncError {
    /// Human readable category line shown before the error message.
    pub fn category(&self) -> String {
        match self {
            Self::Config(ConfigError::PortFormat { .. }) => {
                "There is wrong format of port number in the config file.".to_string()
            }
            Self::Config(_) => "The configuration file could not be used.".to_string(),
            Self::Store(e) | Self::UpdateStep { source: e, .. } => store_category(e),
            Self::InvalidUser { .. } => {
                "User name in the wiki config file is incorrect (cannot find their id in the user table). Unable to update pages."
                    .to_string()
            }
            Self::DuplicateTitle { .. } => {
                "Page titles do not identify pages uniquely. Unable to update pages.".to_string()
            }
            Self::PageNotRepointed { .. } => {
                "A wiki page disappeared while it was being updated.".to_string()
            }
        }
    }
}

fn store_category(error: &StoreError) -> String {
    match error.kind() {
        StoreTable::LocalPage => {
            "There were some troubles while trying to connect to local database.".to_string()
        }
        StoreTable::RemotePage
        | StoreTable::RemoteText
        | StoreTable::RemoteUser
        | StoreTable::RemoteRevision => format!(
            "There were some troubles while accessing the {} table. Unable to update pages.",
            error.table()
        ),
    }
}

/// Result type alias using SyncError.
pub type SyncResult<T> = Result<T, SyncError>;
