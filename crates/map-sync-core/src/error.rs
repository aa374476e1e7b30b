use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Failed to fetch archive {fingerprint}: {reason}")]
    ArchiveFetchFailed { fingerprint: String, reason: String },

    #[error("Failed to extract archive {fingerprint}: {reason}")]
    ArchiveExtractFailed { fingerprint: String, reason: String },

    #[error("Failed to write {}: {source}", path.display())]
    FileWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to stat {}: {source}", path.display())]
    StatFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to hash {}: {source}", path.display())]
    HashFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to move {}: {source}", path.display())]
    MoveFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to remove {}: {source}", path.display())]
    RemoveFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to remove directory {}: {source}", path.display())]
    RmdirFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Run cancelled")]
    Cancelled,
}

impl Error {
    /// Whether this error ends the whole run rather than a single item.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::CatalogUnavailable(_)
                | Error::Config(_)
                | Error::ConfigSource(_)
                | Error::Io(_)
                | Error::Cancelled
        )
    }
}
