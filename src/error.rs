//! Error types for bq-sync-query.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for query operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The query text was missing or blank. Raised before any remote call.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Errors surfaced by the remote query service on any page.
    #[error("Remote execution error: {0}")]
    Remote(String),

    /// Configuration errors (invalid config file, missing project, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (undecodable responses, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QueryError {
    /// Creates an invalid argument error with the given message.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates a remote execution error with the given message.
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "Invalid Argument",
            Self::Remote(_) => "Remote Execution Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using QueryError.
pub type Result<T> = std::result::Result<T, QueryError>;
