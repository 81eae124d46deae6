//! Unified error handling for the robot console core.
//!
//! Every failure in the core maps onto one of these variants; nothing here is
//! fatal to the process. Server-reported control errors carry the server's
//! `msg` verbatim so the UI can show it unmodified.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Streaming or HTTP transport failure. Logged, retryable.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A payload that did not match the expected schema.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The server answered `status: "err"`; the message is passed through.
    #[error("{0}")]
    Api(String),

    /// Client-side invariant violation caught before dispatch.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An operation attempted from a state that forbids it.
    #[error("{0}")]
    Precondition(String),

    /// A control call that did not complete within the configured bound.
    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConsoleError {
    /// Whether re-issuing the same request can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ConsoleError::Transport(_) | ConsoleError::Timeout(_))
    }

    /// Error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            ConsoleError::Transport(_) => "transport",
            ConsoleError::Parse(_) => "parse",
            ConsoleError::Api(_) => "api",
            ConsoleError::Validation(_) => "validation",
            ConsoleError::Precondition(_) => "precondition",
            ConsoleError::Timeout(_) => "timeout",
            ConsoleError::Config(_) => "config",
        }
    }
}

impl From<reqwest::Error> for ConsoleError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ConsoleError::Timeout(err.to_string())
        } else if err.is_decode() {
            ConsoleError::Parse(err.to_string())
        } else {
            ConsoleError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        ConsoleError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for ConsoleError {
    fn from(err: toml::de::Error) -> Self {
        ConsoleError::Config(err.to_string())
    }
}

impl From<io::Error> for ConsoleError {
    fn from(err: io::Error) -> Self {
        ConsoleError::Transport(err.to_string())
    }
}

/// Result type alias using ConsoleError
pub type ConsoleResult<T> = Result<T, ConsoleError>;
