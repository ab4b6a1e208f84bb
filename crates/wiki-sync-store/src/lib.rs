//! Store access for wiki-sync.
//!
//! This crate provides:
//! - [`LocalStore`] / [`RemoteStore`] traits, the seam between the sync
//!   engine and a concrete database driver
//! - SQLite implementations of both ([`SqliteLocalStore`], [`SqliteRemoteStore`])
//! - Record types for every table the engine reads or writes
//! - Schema bootstrap for the expected local and wiki tables
//! - [`StoreError`], one variant per table family
//!
//! # Connection model
//!
//! Every read or write opens its own connection, runs one statement and
//! closes the connection before returning. Nothing is pooled and no
//! transaction spans two calls.
//!
//! ```ignore
//! let remote = SqliteRemoteStore::new(&wiki_config);
//! let text_id = remote.insert_text(b"new content")?;
//! remote.update_page_latest("Dog", text_id)?;
//! ```

mod connection;
mod error;
mod local;
mod models;
mod remote;
pub mod schema;

pub use connection::database_path;
pub use error::{StoreError, StoreResult, StoreTable};
pub use local::{LocalStore, SqliteLocalStore};
pub use models::*;
pub use remote::{RemoteStore, RemoteTables, SqliteRemoteStore, TEXT_FLAGS};
