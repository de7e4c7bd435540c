//! Error types for agp-core

use thiserror::Error;

/// Result type alias using agp-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the AGP installer
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to spawn an external process
    #[error("Failed to spawn \"{command}\": {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// Environment file not found
    #[error("Environment file not found: {path}")]
    EnvFileNotFound { path: String },

    /// Home directory could not be determined
    #[error("Could not determine the home directory")]
    HomeDirNotFound,

    /// Path contains non-UTF-8 components
    #[error("Path is not valid UTF-8: {path}")]
    NonUtf8Path { path: String },

    /// Directory walk error
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn spawn(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            command: command.into(),
            source,
        }
    }

    pub fn env_file_not_found(path: impl Into<String>) -> Self {
        Self::EnvFileNotFound { path: path.into() }
    }

    pub fn non_utf8_path(path: impl Into<String>) -> Self {
        Self::NonUtf8Path { path: path.into() }
    }
}
