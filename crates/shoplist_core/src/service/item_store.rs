//! Authoritative in-memory item collection.
//!
//! # Responsibility
//! - Own the insertion-ordered item list and every mutation on it.
//! - Hand the full list to persistence after each mutation.
//!
//! # Invariants
//! - Item ids are unique within the collection at all times.
//! - Collection order is insertion order; nothing here reorders it.
//! - Blank names never create or rename an item.
//! - Unknown ids are silent no-ops, never errors.

use crate::model::item::{normalize_name, parse_quantity, Item, ItemId};
use crate::persistence::{PersistenceAdapter, PersistenceResult};
use crate::repo::kv_repo::KeyValueStore;
use crate::service::clock::{Clock, SystemClock};
use log::debug;

/// Result of a command that may legitimately do nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    NoOp,
}

impl Outcome {
    fn from_changed(changed: bool) -> Self {
        if changed {
            Self::Applied
        } else {
            Self::NoOp
        }
    }
}

/// Proposed replacement values for one item.
///
/// Front ends build this from whatever input modality they use; a cancelled
/// edit simply never produces a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub id: ItemId,
    pub proposed_name: String,
    /// `None` or blank text resets the quantity to `1`.
    pub proposed_quantity: Option<String>,
}

impl EditRequest {
    pub fn new(
        id: ItemId,
        proposed_name: impl Into<String>,
        proposed_quantity: Option<String>,
    ) -> Self {
        Self {
            id,
            proposed_name: proposed_name.into(),
            proposed_quantity,
        }
    }
}

/// Owner of the item collection.
pub struct ItemStore<S: KeyValueStore> {
    items: Vec<Item>,
    persistence: PersistenceAdapter<S>,
    clock: Box<dyn Clock>,
}

impl<S: KeyValueStore> ItemStore<S> {
    /// Loads the stored collection and stamps new items with [`SystemClock`].
    ///
    /// # Errors
    /// - Only when the adapter's policy is `Fail` and stored data is unusable.
    pub fn load(persistence: PersistenceAdapter<S>) -> PersistenceResult<Self> {
        Self::load_with_clock(persistence, Box::new(SystemClock::new()))
    }

    pub fn load_with_clock(
        persistence: PersistenceAdapter<S>,
        clock: Box<dyn Clock>,
    ) -> PersistenceResult<Self> {
        let items = persistence.load()?;
        Ok(Self {
            items,
            persistence,
            clock,
        })
    }

    /// Appends a new pending item.
    ///
    /// Returns the new id, or `None` when `name` is blank. A blank name does
    /// not touch storage.
    pub fn add(&mut self, name: &str, quantity: Option<&str>) -> Option<ItemId> {
        let name = normalize_name(name)?;
        let item = Item::new(name, parse_quantity(quantity), self.clock.now_ms());
        let id = item.id.clone();
        self.items.push(item);
        debug!(
            "event=item_add module=store status=ok total={}",
            self.items.len()
        );
        self.persist();
        Some(id)
    }

    /// Flips `done` on the matching item. Storage is rewritten either way.
    pub fn toggle(&mut self, id: &ItemId) -> Outcome {
        let outcome = match self.find_mut(id) {
            Some(item) => {
                item.toggle();
                Outcome::Applied
            }
            None => Outcome::NoOp,
        };
        debug!("event=item_toggle module=store outcome={outcome:?}");
        self.persist();
        outcome
    }

    pub fn remove(&mut self, id: &ItemId) -> Outcome {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        let outcome = Outcome::from_changed(self.items.len() != before);
        debug!("event=item_remove module=store outcome={outcome:?}");
        self.persist();
        outcome
    }

    /// Replaces name and quantity of the requested item.
    ///
    /// A blank proposed name leaves the item untouched.
    pub fn edit(&mut self, request: &EditRequest) -> Outcome {
        let name = normalize_name(&request.proposed_name);
        let qty = parse_quantity(request.proposed_quantity.as_deref());
        let outcome = match (name, self.find_mut(&request.id)) {
            (Some(name), Some(item)) => {
                item.name = name;
                item.qty = qty;
                Outcome::Applied
            }
            _ => Outcome::NoOp,
        };
        debug!("event=item_edit module=store outcome={outcome:?}");
        self.persist();
        outcome
    }

    /// Drops every completed item and returns how many were removed.
    pub fn clear_done(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(Item::is_pending);
        let removed = before - self.items.len();
        debug!("event=items_clear_done module=store removed={removed}");
        self.persist();
        removed
    }

    /// Current collection in insertion order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn total_count(&self) -> usize {
        self.items.len()
    }

    pub fn pending_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_pending()).count()
    }

    pub fn done_count(&self) -> usize {
        self.total_count() - self.pending_count()
    }

    fn find_mut(&mut self, id: &ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    fn persist(&self) {
        self.persistence.save(&self.items);
    }
}
