//! Composition root between the core and a front end.
//!
//! # Responsibility
//! - Own one `ItemStore` plus the session's view controls.
//! - Accept front-end commands one at a time and run them to completion.
//! - Re-derive the projection and notify listeners after every command.
//!
//! # Invariants
//! - The cached projection always reflects the latest collection and controls.
//! - Listeners are notified exactly once per command, after persistence.

use crate::config::AppConfig;
use crate::db::DbError;
use crate::model::item::{Item, ItemId};
use crate::persistence::{PersistenceAdapter, PersistenceError, PersistenceResult};
use crate::repo::kv_repo::{KeyValueStore, SqliteKeyValueStore};
use crate::service::clock::Clock;
use crate::service::item_store::{EditRequest, ItemStore, Outcome};
use crate::view::{apply, FilterMode, SortMode, ViewControls};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One user intent forwarded by a front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add {
        name: String,
        quantity: Option<String>,
    },
    Toggle(ItemId),
    Remove(ItemId),
    Edit(EditRequest),
    ClearDone,
    SetFilter(FilterMode),
    SetSearch(String),
    SetSort(SortMode),
}

impl Command {
    /// Stable label used in log events.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Toggle(_) => "toggle",
            Self::Remove(_) => "remove",
            Self::Edit(_) => "edit",
            Self::ClearDone => "clear_done",
            Self::SetFilter(_) => "set_filter",
            Self::SetSearch(_) => "set_search",
            Self::SetSort(_) => "set_sort",
        }
    }
}

/// Re-render request handed to listeners after a command.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub command: &'a Command,
    pub outcome: Outcome,
    pub view: &'a [Item],
    pub controls: &'a ViewControls,
    pub pending_count: usize,
    pub total_count: usize,
}

/// Receives a render request after every command.
pub trait SessionListener {
    fn on_render(&mut self, request: &RenderRequest<'_>);
}

impl<F> SessionListener for F
where
    F: FnMut(&RenderRequest<'_>),
{
    fn on_render(&mut self, request: &RenderRequest<'_>) {
        self(request)
    }
}

/// Failure while opening a session from configuration.
#[derive(Debug)]
pub enum SessionOpenError {
    Db(DbError),
    Persistence(PersistenceError),
}

impl Display for SessionOpenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "failed to open storage: {err}"),
            Self::Persistence(err) => write!(f, "failed to load items: {err}"),
        }
    }
}

impl Error for SessionOpenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<DbError> for SessionOpenError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<PersistenceError> for SessionOpenError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

/// Store plus control state, driven by a single front end.
pub struct ListSession<S: KeyValueStore> {
    store: ItemStore<S>,
    controls: ViewControls,
    view: Vec<Item>,
    listeners: Vec<Box<dyn SessionListener>>,
}

impl ListSession<SqliteKeyValueStore> {
    /// Opens the SQLite file named by `config` and loads the stored list.
    pub fn open_sqlite(config: &AppConfig) -> Result<Self, SessionOpenError> {
        let store = SqliteKeyValueStore::open(&config.db_path)?;
        let adapter = PersistenceAdapter::with_policy(store, config.malformed_policy);
        Ok(Self::open(adapter)?)
    }
}

impl<S: KeyValueStore> ListSession<S> {
    /// Loads the stored collection and starts with default controls.
    pub fn open(persistence: PersistenceAdapter<S>) -> PersistenceResult<Self> {
        ItemStore::load(persistence).map(Self::from_store)
    }

    pub fn open_with_clock(
        persistence: PersistenceAdapter<S>,
        clock: Box<dyn Clock>,
    ) -> PersistenceResult<Self> {
        ItemStore::load_with_clock(persistence, clock).map(Self::from_store)
    }

    pub fn from_store(store: ItemStore<S>) -> Self {
        let controls = ViewControls::default();
        let view = apply(store.items(), &controls);
        Self {
            store,
            controls,
            view,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl SessionListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Runs one command to completion and notifies listeners.
    pub fn dispatch(&mut self, command: Command) -> Outcome {
        let outcome = match &command {
            Command::Add { name, quantity } => {
                match self.store.add(name, quantity.as_deref()) {
                    Some(_) => Outcome::Applied,
                    None => Outcome::NoOp,
                }
            }
            Command::Toggle(id) => self.store.toggle(id),
            Command::Remove(id) => self.store.remove(id),
            Command::Edit(request) => self.store.edit(request),
            Command::ClearDone => {
                if self.store.clear_done() > 0 {
                    Outcome::Applied
                } else {
                    Outcome::NoOp
                }
            }
            Command::SetFilter(filter) => replace(&mut self.controls.filter, *filter),
            Command::SetSearch(search) => replace(&mut self.controls.search, search.clone()),
            Command::SetSort(sort) => replace(&mut self.controls.sort, *sort),
        };
        log::debug!(
            "event=command module=session command={} outcome={outcome:?}",
            command.label()
        );

        self.view = apply(self.store.items(), &self.controls);
        self.notify(&command, outcome);
        outcome
    }

    pub fn add(&mut self, name: impl Into<String>, quantity: Option<String>) -> Outcome {
        self.dispatch(Command::Add {
            name: name.into(),
            quantity,
        })
    }

    pub fn toggle(&mut self, id: ItemId) -> Outcome {
        self.dispatch(Command::Toggle(id))
    }

    pub fn remove(&mut self, id: ItemId) -> Outcome {
        self.dispatch(Command::Remove(id))
    }

    pub fn edit(&mut self, request: EditRequest) -> Outcome {
        self.dispatch(Command::Edit(request))
    }

    pub fn clear_done(&mut self) -> Outcome {
        self.dispatch(Command::ClearDone)
    }

    pub fn set_filter(&mut self, filter: FilterMode) -> Outcome {
        self.dispatch(Command::SetFilter(filter))
    }

    pub fn set_search(&mut self, search: impl Into<String>) -> Outcome {
        self.dispatch(Command::SetSearch(search.into()))
    }

    pub fn set_sort(&mut self, sort: SortMode) -> Outcome {
        self.dispatch(Command::SetSort(sort))
    }

    /// Projection of the collection under the current controls.
    pub fn current_view(&self) -> &[Item] {
        &self.view
    }

    pub fn pending_count(&self) -> usize {
        self.store.pending_count()
    }

    pub fn total_count(&self) -> usize {
        self.store.total_count()
    }

    pub fn controls(&self) -> &ViewControls {
        &self.controls
    }

    pub fn store(&self) -> &ItemStore<S> {
        &self.store
    }

    fn notify(&mut self, command: &Command, outcome: Outcome) {
        let request = RenderRequest {
            command,
            outcome,
            view: &self.view,
            controls: &self.controls,
            pending_count: self.store.pending_count(),
            total_count: self.store.total_count(),
        };
        for listener in &mut self.listeners {
            listener.on_render(&request);
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> Outcome {
    if *slot == value {
        return Outcome::NoOp;
    }
    *slot = value;
    Outcome::Applied
}
