//! Connection settings shared by the local and wiki stores.

use std::fmt;
use std::time::Duration;

/// Upper bound on a single statement before the driver gives up.
pub const STATEMENT_TIMEOUT: Duration = Duration::from_secs(60);

/// Immutable connection parameters for one store.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub data_source: String,
    pub port: u16,
    pub user_name: String,
    pub password: String,
    pub database_name: String,
}

impl ConnectionConfig {
    /// Connection descriptor in the `key=value;` form, password masked.
    /// This is the only form the descriptor is ever logged in.
    pub fn redacted(&self) -> String {
        let password = if self.password.is_empty() { "" } else { "***" };
        format!(
            "datasource={};port={};username={};password={};database={};",
            self.data_source, self.port, self.user_name, password, self.database_name
        )
    }
}

// Keeps the password out of `{:?}` output, which ends up in logs.
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("data_source", &self.data_source)
            .field("port", &self.port)
            .field("user_name", &self.user_name)
            .field("database_name", &self.database_name)
            .finish_non_exhaustive()
    }
}
