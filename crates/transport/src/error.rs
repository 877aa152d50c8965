//! Error types for the transport layer

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using TransportError
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors raised by the remote-shell, HTTP and browser transports
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("command produced non-UTF-8 output")]
    NonUtf8Output,

    #[error("could not parse structured output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upload of {local} to {remote} failed: {detail}")]
    UploadFailed {
        local: PathBuf,
        remote: String,
        detail: String,
    },

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("browser script failed: {0}")]
    Browser(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
