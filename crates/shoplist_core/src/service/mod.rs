//! Core use-case services.
//!
//! # Responsibility
//! - Own the item collection and its mutations (`item_store`).
//! - Wire store, controls and listeners for front ends (`list_session`).

pub mod clock;
pub mod item_store;
pub mod list_session;
