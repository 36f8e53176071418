//! Application layer error type

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while configuring and assembling the application
#[derive(Error, Debug)]
pub enum AppError {
    /// Config file could not be read
    #[error("Failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML or has unknown keys
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config parsed but holds unusable values
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// A required adapter was not supplied to the builder
    #[error("{0} is required")]
    MissingAdapter(&'static str),
}

/// Application layer Result type alias
pub type AppResult<T> = std::result::Result<T, AppError>;
