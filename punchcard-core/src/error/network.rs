//! Network-related error types.
//!
//! This module provides error types for network operations including
//! connection failures, timeouts, and WebSocket errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Network error type covering connection failures, timeouts,
/// and WebSocket errors.
///
/// # Examples
///
/// ```
/// use punchcard_core::error::NetworkError;
///
/// let error = NetworkError::ConnectionFailed {
///     reason: "Connection refused".to_string(),
/// };
/// assert!(error.to_string().contains("Connection refused"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkError {
    /// Connection to remote host failed.
    #[error("[Network] Connection failed: {reason}")]
    ConnectionFailed {
        /// Reason for the connection failure.
        reason: String,
    },

    /// Connection timed out.
    #[error("[Network] Connection timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// WebSocket error occurred.
    #[error("[Network] WebSocket error: {reason}")]
    WebSocket {
        /// Reason for the WebSocket error.
        reason: String,
    },

    /// HTTP request failed.
    #[error("[Network] HTTP error: status {status_code} - {reason}")]
    Http {
        /// HTTP status code.
        status_code: u16,
        /// Reason for the HTTP error.
        reason: String,
    },

    /// Connection was closed unexpectedly.
    #[error("[Network] Connection closed: {reason}")]
    ConnectionClosed {
        /// Reason for the connection closure.
        reason: String,
    },

    /// Endpoint URL is malformed.
    #[error("[Network] Invalid URL: {url}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
    },
}

impl NetworkError {
    /// Returns true if this error is recoverable (can be retried).
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.severity().is_recoverable()
    }

    /// Returns the severity level of this error.
    #[must_use]
    pub fn severity(&self) -> super::ErrorSeverity {
        use super::ErrorSeverity;
        match self {
            Self::InvalidUrl { .. } => ErrorSeverity::Fatal,
            Self::Timeout { .. }
            | Self::ConnectionFailed { .. }
            | Self::ConnectionClosed { .. }
            | Self::WebSocket { .. } => ErrorSeverity::Recoverable,
            Self::Http { status_code, .. } if *status_code >= 500 => ErrorSeverity::Recoverable,
            Self::Http { .. } => ErrorSeverity::Warning,
        }
    }

    /// Creates a connection failure error.
    #[must_use]
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            reason: reason.into(),
        }
    }

    /// Creates a WebSocket error.
    #[must_use]
    pub fn websocket(reason: impl Into<String>) -> Self {
        Self::WebSocket {
            reason: reason.into(),
        }
    }

    /// Creates a connection-closed error.
    #[must_use]
    pub fn closed(reason: impl Into<String>) -> Self {
        Self::ConnectionClosed {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_failed() {
        let error = NetworkError::connection_failed("Connection refused");
        assert!(error.to_string().contains("Connection refused"));
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_timeout() {
        let error = NetworkError::Timeout { timeout_ms: 5000 };
        assert!(error.to_string().contains("5000ms"));
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_invalid_url_fatal() {
        let error = NetworkError::InvalidUrl {
            url: "not a url".to_string(),
        };
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_http_severity() {
        let server_side = NetworkError::Http {
            status_code: 503,
            reason: "Service unavailable".to_string(),
        };
        assert!(server_side.is_recoverable());

        let client_side = NetworkError::Http {
            status_code: 404,
            reason: "Not found".to_string(),
        };
        assert_eq!(client_side.severity(), crate::error::ErrorSeverity::Warning);
    }

    #[test]
    fn test_serde_roundtrip() {
        let error = NetworkError::Timeout { timeout_ms: 3000 };
        let json = serde_json::to_string(&error).unwrap();
        let parsed: NetworkError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, parsed);
    }
}
