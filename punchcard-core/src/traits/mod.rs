//! Core trait definitions.
//!
//! This module provides the persistence seam for the realtime channel:
//! the relay fetches card snapshots through [`CardSource`] and never
//! talks to a database directly.
//!
//! # Quick Start
//!
//! ```ignore
//! use punchcard_core::traits::CardSource;
//!
//! struct PostgresCardSource { /* ... */ }
//!
//! #[async_trait::async_trait]
//! impl CardSource for PostgresCardSource {
//!     async fn cards_for_user(&self, user_id: &UserId) -> Result<Vec<CardView>, DataError> {
//!         // Query the cards-in-use table
//!     }
//! }
//! ```

mod card_source;

pub use card_source::{CardSource, FailingCardSource, StaticCardSource};
