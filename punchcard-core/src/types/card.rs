//! Card transfer objects pushed over the realtime channel.
//!
//! These mirror the shape the REST layer serves: one `CardView` per
//! card-in-use, with the loyalty-card template fields denormalized onto it.
//! They are produced fresh on every fetch and never cached by this service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One card-in-use for a customer, as sent on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    /// Points accumulated on this card.
    pub points: u32,
    /// When the customer picked up the card.
    pub created_at: DateTime<Utc>,
    /// Denormalized loyalty-card template fields.
    pub loyalty_card: LoyaltyCardSummary,
}

/// Denormalized fields of the loyalty-card template a card-in-use points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyCardSummary {
    /// Card description shown to the customer.
    pub description: String,
    /// Points needed to complete the card.
    pub max_points: u32,
    /// Template status (e.g. "active").
    pub status: String,
    /// Artwork image URL.
    pub artwork_url: String,
    /// Name of the issuing business.
    pub business_name: String,
}

/// Whether a card payload was produced from live data or the fallback deck.
///
/// Fetch failures are substituted with fixed demo cards so the channel stays
/// demonstrably alive; the tag lets consumers and tests tell the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    /// Fetched from the persistence layer.
    Live,
    /// Substituted demo data after a fetch failure.
    Fallback,
}

impl DataOrigin {
    /// Returns true if this payload came from the fallback deck.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback)
    }
}
