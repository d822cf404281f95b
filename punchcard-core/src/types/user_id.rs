//! UserId type for claimed client identities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// UserId - the identity a client claims when registering a connection.
///
/// Wraps a `String`. The value is client-asserted and unauthenticated at
/// this layer: it scopes best-effort notifications and must never be used
/// to authorize actions.
///
/// # Examples
///
/// ```
/// use punchcard_core::types::UserId;
///
/// let user = UserId::new("u-123").unwrap();
/// assert_eq!(user.as_str(), "u-123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new `UserId` from a string.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyUserId` if the string is empty.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() {
            return Err(ValidationError::EmptyUserId);
        }
        Ok(Self(s))
    }

    /// Creates a new `UserId` without validation.
    #[must_use]
    pub fn new_unchecked(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the user id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_new() {
        let user = UserId::new("customer-42").unwrap();
        assert_eq!(user.as_str(), "customer-42");
    }

    #[test]
    fn test_user_id_empty() {
        assert_eq!(UserId::new(""), Err(ValidationError::EmptyUserId));
    }

    #[test]
    fn test_user_id_display() {
        let user = UserId::new_unchecked("u1");
        assert_eq!(user.to_string(), "u1");
    }

    #[test]
    fn test_user_id_serde_transparent() {
        let user = UserId::new_unchecked("u1");
        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(json, "\"u1\"");

        let parsed: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, user);
    }

    #[test]
    fn test_user_id_from_str() {
        let user: UserId = "u2".parse().unwrap();
        assert_eq!(user.as_str(), "u2");
        assert!("".parse::<UserId>().is_err());
    }
}
