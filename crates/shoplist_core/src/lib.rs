//! Core domain logic for Shoplist.
//! This crate is the single source of truth for list invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod repo;
pub mod service;
pub mod view;

pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, LoggingError};
pub use model::item::{normalize_name, parse_quantity, Item, ItemId, DEFAULT_QUANTITY};
pub use persistence::{
    MalformedDataPolicy, PersistenceAdapter, PersistenceError, PersistenceResult,
    CORRUPT_BACKUP_KEY, STORAGE_KEY,
};
pub use repo::kv_repo::{
    KeyValueStore, KvError, KvResult, MemoryKeyValueStore, SqliteKeyValueStore,
};
pub use service::clock::{Clock, SystemClock};
pub use service::item_store::{EditRequest, ItemStore, Outcome};
pub use service::list_session::{
    Command, ListSession, RenderRequest, SessionListener, SessionOpenError,
};
pub use view::{apply, FilterMode, ParseModeError, SortMode, ViewControls};
