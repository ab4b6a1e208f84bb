//! Configuration and logging setup for wiki-sync.
//!
//! Two line-oriented `key=value` files drive a run:
//! - the local page store (`local_pages.txt`): connection keys plus `tableName`
//! - the wiki store (`mediawiki.txt`): connection keys plus the wiki table names
//!   and the optional sync options
//!
//! Both share the connection keys `dataSource`, `port`, `userName`, `password`
//! and `databaseName`, parsed into a [`ConnectionConfig`].

mod config;
mod connection;
mod error;
mod logging;

pub use config::{
    HashAlgorithm, LocalDbConfig, SyncOptions, TextIdStrategy, WikiDbConfig,
    DEFAULT_LOCAL_CONFIG_FILE, DEFAULT_LOG_LEVEL, DEFAULT_WIKI_CONFIG_FILE,
};
pub use connection::{ConnectionConfig, STATEMENT_TIMEOUT};
pub use error::{ConfigError, ConfigResult};
pub use logging::{init_logging, parse_level};
