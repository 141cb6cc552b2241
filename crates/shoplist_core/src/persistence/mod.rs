//! Whole-collection persistence under one fixed key.
//!
//! # Responsibility
//! - Serialize the full item list to JSON and overwrite the stored blob.
//! - Load the list at startup, tolerating absent or unreadable data.
//!
//! # Invariants
//! - Writes always replace the entire collection; nothing is incremental.
//! - `save` never propagates a failure into the caller.
//! - Loaded collections never contain two items with the same id.

use crate::model::item::{Item, ItemId};
use crate::repo::kv_repo::{KeyValueStore, KvError};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Storage key holding the serialized collection.
pub const STORAGE_KEY: &str = "shopping.items.v1";
/// Storage key receiving the raw blob when [`MalformedDataPolicy::Backup`] resets.
pub const CORRUPT_BACKUP_KEY: &str = "shopping.items.v1.corrupt";

pub type PersistenceResult<T> = Result<T, PersistenceError>;

#[derive(Debug)]
pub enum PersistenceError {
    Store(KvError),
    /// Stored blob is not a valid item list.
    Malformed(serde_json::Error),
    Encode(serde_json::Error),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Malformed(err) => write!(f, "stored item list is unreadable: {err}"),
            Self::Encode(err) => write!(f, "failed to encode item list: {err}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Malformed(err) | Self::Encode(err) => Some(err),
        }
    }
}

impl From<KvError> for PersistenceError {
    fn from(value: KvError) -> Self {
        Self::Store(value)
    }
}

/// What `load` does when the stored blob cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedDataPolicy {
    /// Start from an empty list and drop the unreadable data.
    #[default]
    Reset,
    /// Copy the raw blob to [`CORRUPT_BACKUP_KEY`], then start empty.
    Backup,
    /// Return the error to the caller.
    Fail,
}

impl MalformedDataPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::Backup => "backup",
            Self::Fail => "fail",
        }
    }
}

impl FromStr for MalformedDataPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reset" => Ok(Self::Reset),
            "backup" => Ok(Self::Backup),
            "fail" => Ok(Self::Fail),
            other => Err(format!(
                "unsupported malformed-data policy `{other}`; expected reset|backup|fail"
            )),
        }
    }
}

/// Reads and writes the item collection through a [`KeyValueStore`].
pub struct PersistenceAdapter<S: KeyValueStore> {
    store: S,
    policy: MalformedDataPolicy,
}

impl<S: KeyValueStore> PersistenceAdapter<S> {
    /// Creates an adapter with the default [`MalformedDataPolicy::Reset`].
    pub fn new(store: S) -> Self {
        Self::with_policy(store, MalformedDataPolicy::default())
    }

    pub fn with_policy(store: S, policy: MalformedDataPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> MalformedDataPolicy {
        self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the stored collection.
    ///
    /// Returns an empty list when nothing is stored. Unreadable data is
    /// handled per the configured policy; only `Fail` yields `Err`.
    pub fn load(&self) -> PersistenceResult<Vec<Item>> {
        let raw = match self.store.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("event=items_load module=persistence status=ok source=empty count=0");
                return Ok(Vec::new());
            }
            Err(err) => return self.recover(PersistenceError::Store(err), None),
        };

        match serde_json::from_str::<Vec<Item>>(&raw) {
            Ok(items) => {
                let loaded = items.len();
                let items = drop_duplicate_ids(items);
                if items.len() != loaded {
                    warn!(
                        "event=items_load module=persistence status=degraded duplicates_dropped={}",
                        loaded - items.len()
                    );
                }
                info!(
                    "event=items_load module=persistence status=ok source=store count={}",
                    items.len()
                );
                Ok(items)
            }
            Err(err) => self.recover(PersistenceError::Malformed(err), Some(raw.as_str())),
        }
    }

    /// Overwrites the stored collection, returning any failure.
    pub fn try_save(&self, items: &[Item]) -> PersistenceResult<()> {
        let encoded = serde_json::to_string(items).map_err(PersistenceError::Encode)?;
        self.store.put(STORAGE_KEY, &encoded)?;
        debug!(
            "event=items_save module=persistence status=ok count={} bytes={}",
            items.len(),
            encoded.len()
        );
        Ok(())
    }

    /// Overwrites the stored collection; failures are logged and dropped.
    ///
    /// The in-memory collection stays authoritative when this fails.
    pub fn save(&self, items: &[Item]) {
        if let Err(err) = self.try_save(items) {
            error!(
                "event=items_save module=persistence status=error count={} error={}",
                items.len(),
                err
            );
        }
    }

    fn recover(&self, err: PersistenceError, raw: Option<&str>) -> PersistenceResult<Vec<Item>> {
        match self.policy {
            MalformedDataPolicy::Fail => {
                error!(
                    "event=items_load module=persistence status=error policy=fail error={err}"
                );
                return Err(err);
            }
            MalformedDataPolicy::Backup => {
                if let Some(raw) = raw {
                    match self.store.put(CORRUPT_BACKUP_KEY, raw) {
                        Ok(()) => info!(
                            "event=items_backup module=persistence status=ok bytes={}",
                            raw.len()
                        ),
                        Err(backup_err) => error!(
                            "event=items_backup module=persistence status=error error={backup_err}"
                        ),
                    }
                }
            }
            MalformedDataPolicy::Reset => {}
        }

        warn!(
            "event=items_load module=persistence status=reset policy={} error={err}",
            self.policy.as_str()
        );
        Ok(Vec::new())
    }
}

fn drop_duplicate_ids(items: Vec<Item>) -> Vec<Item> {
    let mut seen: HashSet<ItemId> = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{MalformedDataPolicy, PersistenceAdapter, STORAGE_KEY};
    use crate::model::item::{Item, ItemId};
    use crate::repo::kv_repo::{KeyValueStore, MemoryKeyValueStore};

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!(
            " BACKUP ".parse::<MalformedDataPolicy>().unwrap(),
            MalformedDataPolicy::Backup
        );
        assert!("ignore".parse::<MalformedDataPolicy>().is_err());
    }

    #[test]
    fn load_keeps_first_of_duplicate_ids() {
        let store = MemoryKeyValueStore::new();
        let first = Item::with_id(ItemId::from("dup"), "first", 1.0, 1);
        let second = Item::with_id(ItemId::from("dup"), "second", 2.0, 2);
        store
            .put(
                STORAGE_KEY,
                &serde_json::to_string(&vec![first.clone(), second]).unwrap(),
            )
            .unwrap();

        let loaded = PersistenceAdapter::new(&store).load().unwrap();
        assert_eq!(loaded, vec![first]);
    }
}
