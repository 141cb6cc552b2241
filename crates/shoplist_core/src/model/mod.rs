//! Domain model for shopping list entries.
//!
//! # Responsibility
//! - Define the canonical item record and its wire shape.
//! - Hold input normalization shared by the store and front ends.
//!
//! # Invariants
//! - Every item is identified by a stable `ItemId`.
//! - Removal is a hard delete; there are no tombstones.

pub mod item;
