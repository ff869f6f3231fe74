use std::path::PathBuf;
use thiserror::Error;

/// Core error type for vitetags operations.
///
/// Unresolvable manifest entries are not errors; they are skipped. Errors are
/// reserved for configuration problems and for URL generation failures, which
/// callers must fix rather than silently render around.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read manifest at {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest at {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid tag options: {0}")]
    InvalidOptions(#[source] serde_json::Error),

    #[error("Resource {path} does not exist")]
    ResourceNotFound { path: String },

    #[error("Resource {path} is outside the public root")]
    ResourceOutsideRoot { path: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
