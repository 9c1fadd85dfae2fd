use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(String),

    #[error("Unknown time zone `{0}`")]
    InvalidTimeZone(String),

    #[error("Configuration backup `{0}` not found")]
    BackupNotFound(String),
}
