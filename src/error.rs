use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Application-wide error type for the sheriff CLI.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to launch editor: {0}")]
    Editor(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to write configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Invalid exclude pattern: {0}")]
    Glob(#[from] globset::Error),

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Backend setup failed: {0}")]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl AppError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        AppError::Config(msg.into())
    }
}

/// Failures that prevent a scan from producing any candidates at all.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Not a file or directory: {}", .0.display())]
    NotAFileOrDirectory(PathBuf),

    #[error("Failed to resolve changed files: {0}")]
    ChangeSetResolution(String),
}

/// A failed call to the analysis backend. Contained at the file boundary.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("API key is required for provider '{0}'")]
    MissingApiKey(String),

    #[error("Provider '{0}' requires an API URL")]
    MissingApiUrl(String),

    #[error("Provider '{0}' requires a command to run")]
    MissingCommand(String),

    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' exited with status {status}: {detail}")]
    Exit { program: String, status: String, detail: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} returned HTTP {status}: {detail}")]
    Status { endpoint: String, status: u16, detail: String },

    #[error("Malformed API response: {0}")]
    Envelope(String),

    #[error("Failed to read file: {0}")]
    Read(#[from] io::Error),
}
