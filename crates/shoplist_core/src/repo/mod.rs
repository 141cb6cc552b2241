//! Storage backends behind the persistence adapter.
//!
//! # Responsibility
//! - Define the durable key-value contract the core writes through.
//! - Isolate SQLite details from the store and view layers.

pub mod kv_repo;
