//! Card-data error types.
//!
//! This module provides error types for card-data operations including
//! source failures, decode errors, and missing data. Every one of these
//! is survivable at the channel level: a failed fetch is substituted
//! with fallback data rather than closing the connection.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Card-data error type covering source failures, decode errors,
/// and missing data.
///
/// # Examples
///
/// ```
/// use punchcard_core::error::DataError;
///
/// let error = DataError::SourceUnavailable {
///     reason: "connection pool exhausted".to_string(),
/// };
/// assert!(error.to_string().contains("connection pool exhausted"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataError {
    /// The backing card store could not be reached.
    #[error("[Data] Card source unavailable: {reason}")]
    SourceUnavailable {
        /// Reason the source could not be reached.
        reason: String,
    },

    /// The card store rejected or failed the query.
    #[error("[Data] Query failed for user '{user_id}': {reason}")]
    QueryFailed {
        /// User the query was scoped to.
        user_id: String,
        /// Reason for the query failure.
        reason: String,
    },

    /// A record came back in a shape we could not decode.
    #[error("[Data] Decode failed: {reason}")]
    DecodeFailed {
        /// Reason for the decode failure.
        reason: String,
    },

    /// JSON serialization/deserialization error.
    #[error("[Data] JSON error: {reason}")]
    JsonError {
        /// Reason for the JSON error.
        reason: String,
    },

    /// Required data is missing.
    #[error("[Data] Missing data: {description}")]
    MissingData {
        /// Description of the missing data.
        description: String,
    },
}

impl DataError {
    /// Returns true if this error is recoverable.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.severity().is_recoverable()
    }

    /// Returns the severity level of this error.
    ///
    /// No data error is fatal: a failed fetch falls back to demo cards
    /// and the channel carries on.
    #[must_use]
    pub fn severity(&self) -> super::ErrorSeverity {
        use super::ErrorSeverity;
        match self {
            Self::SourceUnavailable { .. } | Self::QueryFailed { .. } => {
                ErrorSeverity::Recoverable
            }
            Self::DecodeFailed { .. } | Self::JsonError { .. } | Self::MissingData { .. } => {
                ErrorSeverity::Warning
            }
        }
    }

    /// Creates a source-unavailable error.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            reason: reason.into(),
        }
    }

    /// Creates a query failure error for a specific user.
    #[must_use]
    pub fn query_failed(user_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::QueryFailed {
            user_id: user_id.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError {
            reason: err.to_string(),
        }
    }
}
