//! Store error types.

use std::fmt;
use thiserror::Error;

/// The table family an operation was touching when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreTable {
    LocalPage,
    RemotePage,
    RemoteText,
    RemoteUser,
    RemoteRevision,
}

impl fmt::Display for StoreTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LocalPage => "local page",
            Self::RemotePage => "wiki page",
            Self::RemoteText => "wiki text",
            Self::RemoteUser => "wiki user",
            Self::RemoteRevision => "wiki revision",
        };
        f.write_str(name)
    }
}

/// Store error type. Each variant names the table it was raised for and
/// carries the driver's message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Local store unreachable or query fault
    #[error("Local store error on table {table}: {message}")]
    LocalConnectivity { table: String, message: String },

    /// Wiki page table unreachable or query fault
    #[error("Wiki page table error on {table}: {message}")]
    RemotePageConnectivity { table: String, message: String },

    /// Wiki text table unreachable or query fault
    #[error("Wiki text table error on {table}: {message}")]
    RemoteTextConnectivity { table: String, message: String },

    /// Wiki user table unreachable or query fault
    #[error("Wiki user table error on {table}: {message}")]
    RemoteUserConnectivity { table: String, message: String },

    /// Wiki revision table unreachable or write fault
    #[error("Wiki revision table error on {table}: {message}")]
    RemoteRevisionConnectivity { table: String, message: String },
}

impl StoreError {
    pub fn new(kind: StoreTable, table: &str, message: impl fmt::Display) -> Self {
        let table = table.to_string();
        let message = message.to_string();
        match kind {
            StoreTable::LocalPage => Self::LocalConnectivity { table, message },
            StoreTable::RemotePage => Self::RemotePageConnectivity { table, message },
            StoreTable::RemoteText => Self::RemoteTextConnectivity { table, message },
            StoreTable::RemoteUser => Self::RemoteUserConnectivity { table, message },
            StoreTable::RemoteRevision => Self::RemoteRevisionConnectivity { table, message },
        }
    }

    pub fn kind(&self) -> StoreTable {
        match self {
            Self::LocalConnectivity { .. } => StoreTable::LocalPage,
            Self::RemotePageConnectivity { .. } => StoreTable::RemotePage,
            Self::RemoteTextConnectivity { .. } => StoreTable::RemoteText,
            Self::RemoteUserConnectivity { .. } => StoreTable::RemoteUser,
            Self::RemoteRevisionConnectivity { .. } => StoreTable::RemoteRevision,
        }
    }

    pub fn table(&self) -> &str {
        match self {
            Self::LocalConnectivity { table, .. }
            | Self::RemotePageConnectivity { table, .. }
            | Self::RemoteTextConnectivity { table, .. }
            | Self::RemoteUserConnectivity { table, .. }
            | Self::RemoteRevisionConnectivity { table, .. } => table,
        }
    }
}

/// Result type alias using StoreError.
pub type StoreResult<T> = Result<T, StoreError>;
