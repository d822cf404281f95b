//! Card source trait definitions.
//!
//! [`CardSource`] is the seam between the realtime channel and whatever
//! actually stores cards. The relay only ever asks one question: the
//! current cards for a user. Implementations decide where the answer
//! comes from.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::DataError;
use crate::types::{CardView, UserId};

/// Source of current card snapshots for a user.
///
/// A fetch error never closes a connection: callers substitute fallback
/// data and tag the payload accordingly.
#[async_trait]
pub trait CardSource: Send + Sync {
    /// Returns the current cards for a user.
    ///
    /// An unknown user is not an error: it yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns a `DataError` if the backing store could not be queried.
    async fn cards_for_user(&self, user_id: &UserId) -> Result<Vec<CardView>, DataError>;
}

/// In-memory card source backed by a per-user map.
///
/// Used for demos and tests; production deployments wire a real store
/// behind the trait instead.
#[derive(Debug, Default)]
pub struct StaticCardSource {
    cards: RwLock<HashMap<String, Vec<CardView>>>,
}

impl StaticCardSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds cards for a user, replacing any previous entry.
    #[must_use]
    pub fn with_cards(self, user_id: &UserId, cards: Vec<CardView>) -> Self {
        self.cards.write().insert(user_id.as_str().to_string(), cards);
        self
    }

    /// Replaces the cards for a user.
    pub fn set_cards(&self, user_id: &UserId, cards: Vec<CardView>) {
        self.cards.write().insert(user_id.as_str().to_string(), cards);
    }
}

#[async_trait]
impl CardSource for StaticCardSource {
    async fn cards_for_user(&self, user_id: &UserId) -> Result<Vec<CardView>, DataError> {
        Ok(self
            .cards
            .read()
            .get(user_id.as_str())
            .cloned()
            .unwrap_or_default())
    }
}

/// Card source that always fails. Exercises the fallback path in tests.
#[derive(Debug, Clone, Default)]
pub struct FailingCardSource {
    reason: Option<String>,
}

impl FailingCardSource {
    /// Creates a failing source with a default reason.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a failing source with a specific failure reason.
    #[must_use]
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
        }
    }
}

#[async_trait]
impl CardSource for FailingCardSource {
    async fn cards_for_user(&self, user_id: &UserId) -> Result<Vec<CardView>, DataError> {
        let reason = self
            .reason
            .clone()
            .unwrap_or_else(|| "card source offline".to_string());
        Err(DataError::query_failed(user_id.as_str(), reason))
    }
}
