use shoplist_core::{
    Clock, Command, EditRequest, FilterMode, ItemId, KeyValueStore, ListSession,
    MemoryKeyValueStore, Outcome, PersistenceAdapter, RenderRequest, SortMode, STORAGE_KEY,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

struct StepClock(Cell<i64>);

impl Clock for StepClock {
    fn now_ms(&self) -> i64 {
        let now = self.0.get();
        self.0.set(now + 1);
        now
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Rendered {
    command: &'static str,
    outcome: Outcome,
    names: Vec<String>,
    pending: usize,
    total: usize,
}

fn open(backend: &MemoryKeyValueStore) -> ListSession<&MemoryKeyValueStore> {
    ListSession::open_with_clock(
        PersistenceAdapter::new(backend),
        Box::new(StepClock(Cell::new(1))),
    )
    .unwrap()
}

fn record(session: &mut ListSession<&MemoryKeyValueStore>) -> Rc<RefCell<Vec<Rendered>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    session.subscribe(move |request: &RenderRequest<'_>| {
        sink.borrow_mut().push(Rendered {
            command: request.command.label(),
            outcome: request.outcome,
            names: request.view.iter().map(|item| item.name.clone()).collect(),
            pending: request.pending_count,
            total: request.total_count,
        });
    });
    log
}

fn view_names<'a>(session: &'a ListSession<&MemoryKeyValueStore>) -> Vec<&'a str> {
    session
        .current_view()
        .iter()
        .map(|item| item.name.as_str())
        .collect()
}

#[test]
fn every_command_notifies_listeners_once() {
    let backend = MemoryKeyValueStore::new();
    let mut session = open(&backend);
    let log = record(&mut session);

    session.add("Milk", Some("2".into()));
    session.add("  ", None);
    session.set_filter(FilterMode::Done);

    let log = log.borrow();
    assert_eq!(log.len(), 3);
    assert_eq!(log[0].command, "add");
    assert_eq!(log[0].outcome, Outcome::Applied);
    assert_eq!(log[0].names, vec!["Milk".to_string()]);
    assert_eq!((log[0].pending, log[0].total), (1, 1));
    assert_eq!(log[1].outcome, Outcome::NoOp);
    assert_eq!(log[2].command, "set_filter");
    assert!(log[2].names.is_empty());
}

#[test]
fn projection_follows_controls_and_mutations() {
    let backend = MemoryKeyValueStore::new();
    let mut session = open(&backend);

    session.add("Milk", None);
    session.add("milk powder", None);
    session.add("Bread", None);
    let powder = session.current_view()[1].id.clone();
    session.toggle(powder);

    session.set_filter(FilterMode::Pending);
    session.set_search("mil");
    session.set_sort(SortMode::Name);
    assert_eq!(view_names(&session), vec!["Milk"]);

    session.set_search("");
    assert_eq!(view_names(&session), vec!["Bread", "Milk"]);

    session.add("Apples", None);
    assert_eq!(view_names(&session), vec!["Apples", "Bread", "Milk"]);
    assert_eq!(session.pending_count(), 3);
    assert_eq!(session.total_count(), 4);
}

#[test]
fn setting_the_same_control_twice_is_a_noop() {
    let backend = MemoryKeyValueStore::new();
    let mut session = open(&backend);

    assert_eq!(session.set_sort(SortMode::Status), Outcome::Applied);
    assert_eq!(session.set_sort(SortMode::Status), Outcome::NoOp);
    assert_eq!(session.controls().sort, SortMode::Status);
}

#[test]
fn controls_are_not_persisted() {
    let backend = MemoryKeyValueStore::new();
    {
        let mut session = open(&backend);
        session.add("Milk", None);
        session.set_filter(FilterMode::Done);
        session.set_search("x");
    }

    let reopened = open(&backend);
    assert_eq!(reopened.controls().filter, FilterMode::All);
    assert!(reopened.controls().search.is_empty());
    assert_eq!(view_names(&reopened), vec!["Milk"]);
}

#[test]
fn edit_and_remove_flow_through_dispatch() {
    let backend = MemoryKeyValueStore::new();
    let mut session = open(&backend);
    session.add("Milk", None);
    let id = session.current_view()[0].id.clone();

    let outcome = session.dispatch(Command::Edit(EditRequest::new(
        id.clone(),
        "Oat milk",
        Some("2".into()),
    )));
    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(view_names(&session), vec!["Oat milk"]);

    assert_eq!(session.remove(ItemId::from("nope")), Outcome::NoOp);
    assert_eq!(session.remove(id), Outcome::Applied);
    assert!(session.current_view().is_empty());

    let raw = backend.get(STORAGE_KEY).unwrap();
    assert_eq!(raw.as_deref(), Some("[]"));
}

#[test]
fn clear_done_reports_noop_when_nothing_is_done() {
    let backend = MemoryKeyValueStore::new();
    let mut session = open(&backend);
    session.add("Milk", None);

    assert_eq!(session.clear_done(), Outcome::NoOp);

    let id = session.current_view()[0].id.clone();
    session.toggle(id);
    assert_eq!(session.clear_done(), Outcome::Applied);
    assert_eq!(session.total_count(), 0);
}
