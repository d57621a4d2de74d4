//! Error types for check-usage
//!
//! This module defines the error type used throughout the check-usage crates.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! Every failure surfaces to the user; nothing is retried. [`UsageError::kind`]
//! groups the variants into the categories the command line reports, and
//! [`UsageError::exit_code`] maps each category to a process exit status.
//!
//! # Example
//!
//! ```
//! use check_usage_core::error::{ErrorKind, UsageError, Result};
//!
//! fn require_user(user: Option<&str>) -> Result<&str> {
//!     user.ok_or_else(|| UsageError::Parameter("no user given".to_string()))
//! }
//!
//! let err = require_user(None).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Parameter);
//! assert_eq!(err.exit_code(), 2);
//! ```

use thiserror::Error;

/// Main error type for check-usage operations
#[derive(Error, Debug)]
pub enum UsageError {
    /// Malformed command-line input, detected before any request is made
    #[error("{0}")]
    Parameter(String),

    /// Missing or unusable configuration (token, API URL)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network failure or timeout talking to the accounting service
    #[error("Request to accounting service failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The accounting service answered with a non-success status
    #[error("Accounting service returned HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Reason phrase or a snippet of the response body
        message: String,
    },

    /// The response body could not be understood
    #[error("Malformed response from accounting service: {0}")]
    ResponseFormat(String),
}

/// Coarse classification of a [`UsageError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad command-line input
    Parameter,
    /// Bad local configuration
    Config,
    /// Network failure, timeout, or non-2xx status
    Transport,
    /// Unparseable response body
    ResponseFormat,
}

impl UsageError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            UsageError::Parameter(_) => ErrorKind::Parameter,
            UsageError::Config(_) => ErrorKind::Config,
            UsageError::Network(_) | UsageError::Status { .. } => ErrorKind::Transport,
            UsageError::ResponseFormat(_) => ErrorKind::ResponseFormat,
        }
    }

    /// Process exit status for this error
    ///
    /// `2` matches the status clap uses for its own usage errors.
    pub fn exit_code(&self) -> u8 {
        match self.kind() {
            ErrorKind::Parameter => 2,
            ErrorKind::Config => 3,
            ErrorKind::Transport => 4,
            ErrorKind::ResponseFormat => 5,
        }
    }

    /// Whether the failure happened on the service side of the exchange
    pub fn is_remote(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport | ErrorKind::ResponseFormat)
    }
}

impl From<serde_json::Error> for UsageError {
    fn from(err: serde_json::Error) -> Self {
        UsageError::ResponseFormat(err.to_string())
    }
}

/// Convenience type alias for Results in check-usage
pub type Result<T> = std::result::Result<T, UsageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = UsageError::Status {
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Accounting service returned HTTP 503: Service Unavailable"
        );

        let error = UsageError::Parameter("Invalid time specification: nope".to_string());
        assert_eq!(error.to_string(), "Invalid time specification: nope");
    }

    #[test]
    fn test_json_error_is_response_format() {
        let json_error = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let usage_error: UsageError = json_error.into();
        assert_eq!(usage_error.kind(), ErrorKind::ResponseFormat);
        assert_eq!(usage_error.exit_code(), 5);
    }

    #[test]
    fn test_exit_codes_are_distinct_and_nonzero() {
        let errors = [
            UsageError::Parameter(String::new()),
            UsageError::Config(String::new()),
            UsageError::Status {
                status: 500,
                message: String::new(),
            },
            UsageError::ResponseFormat(String::new()),
        ];
        let codes: Vec<u8> = errors.iter().map(UsageError::exit_code).collect();
        assert_eq!(codes, vec![2, 3, 4, 5]);
        assert!(!errors[0].is_remote());
        assert!(errors[2].is_remote());
        assert!(errors[3].is_remote());
    }
}
