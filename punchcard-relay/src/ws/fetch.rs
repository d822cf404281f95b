//! Card-data fetch with fallback substitution.
//!
//! A failed fetch never reaches the wire as an error: the caller gets a
//! fixed demo deck tagged `DataOrigin::Fallback` instead. Availability of
//! the channel wins over correctness of the payload; the client's REST
//! path stays authoritative.

use chrono::Utc;
use tracing::warn;

use punchcard_core::traits::CardSource;
use punchcard_core::types::{CardView, DataOrigin, LoyaltyCardSummary, UserId};

/// A card snapshot together with where it came from.
#[derive(Debug, Clone)]
pub struct FetchedCards {
    /// The cards to send.
    pub cards: Vec<CardView>,
    /// Live data or the fallback deck.
    pub source: DataOrigin,
}

/// Fetches the current cards for a user, substituting the fallback deck
/// on error.
pub async fn fetch_with_fallback(source: &dyn CardSource, user_id: &UserId) -> FetchedCards {
    match source.cards_for_user(user_id).await {
        Ok(cards) => FetchedCards {
            cards,
            source: DataOrigin::Live,
        },
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "Card fetch failed, using fallback deck");
            FetchedCards {
                cards: fallback_deck(),
                source: DataOrigin::Fallback,
            }
        }
    }
}

/// The fixed two-card demo deck substituted when a fetch fails.
#[must_use]
pub fn fallback_deck() -> Vec<CardView> {
    let now = Utc::now();
    vec![
        CardView {
            points: 150,
            created_at: now,
            loyalty_card: LoyaltyCardSummary {
                description: "Coffee Loyalty Card".to_string(),
                max_points: 500,
                status: "active".to_string(),
                artwork_url: "https://example.com/coffee-card.jpg".to_string(),
                business_name: "Coffee Shop".to_string(),
            },
        },
        CardView {
            points: 75,
            created_at: now,
            loyalty_card: LoyaltyCardSummary {
                description: "Bakery Loyalty Card".to_string(),
                max_points: 300,
                status: "active".to_string(),
                artwork_url: "https://example.com/bakery-card.jpg".to_string(),
                business_name: "Local Bakery".to_string(),
            },
        },
    ]
}
