//! NewType wrappers and transfer objects.
//!
//! # Types
//!
//! - [`UserId`] - Claimed user identities attached to connections
//! - [`CardView`] - One card-in-use as pushed to clients
//! - [`LoyaltyCardSummary`] - Denormalized loyalty-card fields
//! - [`DataOrigin`] - Whether a payload came from live data or the fallback deck

mod card;
mod user_id;

pub use card::{CardView, DataOrigin, LoyaltyCardSummary};
pub use user_id::UserId;

/// Validation error for `NewType` construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// User id is empty
    #[error("user id cannot be empty")]
    EmptyUserId,
}
