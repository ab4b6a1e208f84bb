//! Configuration error types.

use thiserror::Error;

/// Error raised while reading or validating a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `port` is not an integer in 0..=65535
    #[error("Port must be an integer between 0 and 65535, got {value:?}")]
    PortFormat { value: String },

    /// A required key is absent
    #[error("Missing required key `{0}`")]
    MissingKey(&'static str),

    /// Table names are interpolated into SQL and must be plain identifiers
    #[error("Invalid table name for `{key}`: {value:?}")]
    InvalidTableName { key: &'static str, value: String },

    /// An option key carries a value outside its allowed set
    #[error("Invalid value for `{key}`: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;
