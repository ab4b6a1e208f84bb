//! Parsing of the `key=value` configuration files.

use crate::{ConfigError, ConfigResult, ConnectionConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Local store config file read when no path is given on the command line.
pub const DEFAULT_LOCAL_CONFIG_FILE: &str = "local_pages.txt";

/// Wiki store config file read when no path is given on the command line.
pub const DEFAULT_WIKI_CONFIG_FILE: &str = "mediawiki.txt";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

const CONNECTION_KEYS: [&str; 5] = ["dataSource", "port", "userName", "password", "databaseName"];

/// How the pipeline learns the id of the text row it just inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextIdStrategy {
    /// Use the id generated by the insert itself.
    #[default]
    InsertId,
    /// Re-read the text table and take the highest id (legacy behaviour).
    MaxScan,
}

impl FromStr for TextIdStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "insert_id" => Ok(Self::InsertId),
            "max_scan" => Ok(Self::MaxScan),
            _ => Err(ConfigError::InvalidValue {
                key: "textIdStrategy",
                value: s.to_string(),
            }),
        }
    }
}

/// Digest used for the remote side of the content comparison. It must match
/// whatever produced the local `page_hash` column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    #[default]
    Md5,
    Sha256,
}

impl FromStr for HashAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha256" => Ok(Self::Sha256),
            _ => Err(ConfigError::InvalidValue {
                key: "hashAlgorithm",
                value: s.to_string(),
            }),
        }
    }
}

/// Tool behaviour read from the wiki config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOptions {
    pub text_id_strategy: TextIdStrategy,
    pub hash_algorithm: HashAlgorithm,
}

/// Settings for the local page store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDbConfig {
    pub connection: ConnectionConfig,
    pub table_name: String,
}

impl LocalDbConfig {
    /// Parse the contents of a local store config file.
    pub fn parse(text: &str) -> ConfigResult<Self> {
        let entries = Entries::parse(text, &["tableName"]);
        Ok(Self {
            connection: entries.connection()?,
            table_name: entries.table("tableName", None)?,
        })
    }

    /// Load and parse a local store config file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }
}

/// Settings for the wiki store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiDbConfig {
    pub connection: ConnectionConfig,
    pub page_table: String,
    pub text_table: String,
    pub user_table: String,
    pub revision_table: String,
    pub options: SyncOptions,
}

impl WikiDbConfig {
    /// Parse the contents of a wiki store config file.
    pub fn parse(text: &str) -> ConfigResult<Self> {
        let entries = Entries::parse(
            text,
            &[
                "tableName_page",
                "tableName_text",
                "tableName_user",
                "tableName_revision",
                "textIdStrategy",
                "hashAlgorithm",
            ],
        );

        let mut options = SyncOptions::default();
        if let Some(value) = entries.get("textIdStrategy") {
            options.text_id_strategy = value.parse()?;
        }
        if let Some(value) = entries.get("hashAlgorithm") {
            options.hash_algorithm = value.parse()?;
        }

        Ok(Self {
            connection: entries.connection()?,
            page_table: entries.table("tableName_page", Some("mw_page"))?,
            text_table: entries.table("tableName_text", Some("mw_text"))?,
            user_table: entries.table("tableName_user", Some("mw_user"))?,
            revision_table: entries.table("tableName_revision", Some("mw_revision"))?,
            options,
        })
    }

    /// Load and parse a wiki store config file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }
}

/// Trimmed `key=value` pairs; a repeated key keeps its last value.
struct Entries {
    values: HashMap<String, String>,
}

impl Entries {
    fn parse(text: &str, extra_keys: &[&str]) -> Self {
        let mut values = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                debug!(line, "ignoring config line without '='");
                continue;
            };
            let key = key.trim();
            if !CONNECTION_KEYS.contains(&key) && !extra_keys.contains(&key) {
                debug!(key, "ignoring unknown config key");
                continue;
            }
            values.insert(key.to_string(), value.trim().to_string());
        }
        Self { values }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn required(&self, key: &'static str) -> ConfigResult<&str> {
        self.get(key).ok_or(ConfigError::MissingKey(key))
    }

    fn connection(&self) -> ConfigResult<ConnectionConfig> {
        let port = self.required("port")?;
        let port = port.parse::<u16>().map_err(|_| ConfigError::PortFormat {
            value: port.to_string(),
        })?;

        Ok(ConnectionConfig {
            data_source: self.required("dataSource")?.to_string(),
            port,
            user_name: self.required("userName")?.to_string(),
            password: self.get("password").unwrap_or_default().to_string(),
            database_name: self.required("databaseName")?.to_string(),
        })
    }

    fn table(&self, key: &'static str, default: Option<&str>) -> ConfigResult<String> {
        let value = match (self.get(key), default) {
            (Some(value), _) => value,
            (None, Some(default)) => default,
            (None, None) => return Err(ConfigError::MissingKey(key)),
        };
        if !is_identifier(value) {
            return Err(ConfigError::InvalidTableName {
                key,
                value: value.to_string(),
            });
        }
        Ok(value.to_string())
    }
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
