//! Errors surfaced by the Meest Express client.

use reqwest::StatusCode;
use thiserror::Error;

/// Failures of token acquisition and branch search.
///
/// `Configuration` is raised before any network traffic; everything else
/// comes from talking to the remote service.
#[derive(Error, Debug)]
pub enum MeestError {
    /// Missing or unusable local configuration (e.g. empty credentials).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The `auth` call did not yield a token.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Connection, timeout or other client level failure.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx reply.
    #[error("Unexpected HTTP status: {0}")]
    Status(StatusCode),

    /// Reply body could not be decoded.
    #[error("Invalid response: {0}")]
    Response(String),
}

impl MeestError {
    /// Short label used for metrics and log fields
    pub fn reason(&self) -> &'static str {
        match self {
            MeestError::Configuration(_) => "configuration",
            MeestError::Authentication(_) => "authentication",
            MeestError::Transport(_) => "transport",
            MeestError::Status(_) => "status",
            MeestError::Response(_) => "response",
        }
    }
}

pub type Result<T> = std::result::Result<T, MeestError>;
