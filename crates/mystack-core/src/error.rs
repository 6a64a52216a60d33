//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// The config text is empty, or declares no apps, services, or setup.
    #[error("invalid empty config")]
    Empty,

    /// The config text is not well-formed YAML; the parser diagnostic is
    /// surfaced verbatim.
    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
