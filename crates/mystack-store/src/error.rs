//! Error types for the config registry

use thiserror::Error;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while reading or writing stack descriptions
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// Caller supplied an empty cluster name; checked before touching storage
    #[error("invalid empty cluster name")]
    EmptyClusterName,

    /// Storage failed or returned no matching row; the underlying diagnostic
    /// is preserved verbatim
    #[error("{0}")]
    Database(#[from] rusqlite::Error),

    /// The stored or supplied stack YAML is empty or malformed
    #[error(transparent)]
    Config(#[from] mystack_core::ConfigError),

    /// Filesystem error while opening the registry
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Check whether this is the "no rows" kind of storage error.
    pub fn is_no_rows(&self) -> bool {
        matches!(
            self,
            StoreError::Database(rusqlite::Error::QueryReturnedNoRows)
        )
    }
}
