use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use michishirube_core::{NullProgressStore, ProgressStore, TourFlow, TourPhase};

#[derive(Default)]
struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    fn get(&self, scope: &str) -> Option<String> {
        self.values.borrow().get(scope).cloned()
    }

    fn set(&self, scope: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(scope.to_string(), value.to_string());
    }
}

impl ProgressStore for MemoryStore {
    fn read(&self, scope: &str) -> Option<String> {
        self.get(scope)
    }

    fn write(&self, scope: &str, value: &str) {
        self.set(scope, value);
    }

    fn clear(&self, scope: &str) {
        self.values.borrow_mut().remove(scope);
    }
}

const SCOPE: &str = "progress.test-tour";

fn flow_with(store: Rc<MemoryStore>, step_count: usize) -> TourFlow {
    TourFlow::new(SCOPE, step_count, store)
}

#[test]
fn start_defaults_to_first_step_and_persists_it() {
    let store = Rc::new(MemoryStore::default());
    let mut flow = flow_with(store.clone(), 3);
    assert_eq!(flow.phase(), TourPhase::NotStarted);
    flow.start();
    assert_eq!(flow.phase(), TourPhase::Active(0));
    assert_eq!(store.get(SCOPE).as_deref(), Some("0"));
}

#[test]
fn next_walks_forward_and_finishes_past_the_last_step() {
    let store = Rc::new(MemoryStore::default());
    let mut flow = flow_with(store.clone(), 3);
    flow.start();
    flow.next();
    assert_eq!(flow.phase(), TourPhase::Active(1));
    assert_eq!(store.get(SCOPE).as_deref(), Some("1"));
    flow.next();
    assert_eq!(flow.phase(), TourPhase::Active(2));
    assert!(flow.is_last());
    flow.next();
    assert_eq!(flow.phase(), TourPhase::Finished);
    assert_eq!(store.get(SCOPE), None);
    // Terminal: further navigation is inert.
    flow.next();
    flow.back();
    assert_eq!(flow.phase(), TourPhase::Finished);
}

#[test]
fn back_at_first_step_changes_nothing() {
    let store = Rc::new(MemoryStore::default());
    let mut flow = flow_with(store.clone(), 3);
    flow.start();
    let persisted_before = store.get(SCOPE);
    flow.back();
    assert_eq!(flow.phase(), TourPhase::Active(0));
    assert_eq!(store.get(SCOPE), persisted_before);
}

#[test]
fn back_steps_down_from_later_steps() {
    let store = Rc::new(MemoryStore::default());
    let mut flow = flow_with(store.clone(), 3);
    flow.start();
    flow.next();
    flow.back();
    assert_eq!(flow.phase(), TourPhase::Active(0));
    assert_eq!(store.get(SCOPE).as_deref(), Some("0"));
}

#[test]
fn skip_is_terminal_and_clears_progress() {
    let store = Rc::new(MemoryStore::default());
    let mut flow = flow_with(store.clone(), 3);
    flow.start();
    flow.next();
    flow.skip();
    assert_eq!(flow.phase(), TourPhase::Skipped);
    assert_eq!(store.get(SCOPE), None);
}

#[test]
fn progress_round_trips_across_fresh_flows() {
    let store = Rc::new(MemoryStore::default());
    let mut flow = flow_with(store.clone(), 4);
    flow.start();
    flow.next();
    flow.next();
    drop(flow);

    let mut restored = flow_with(store, 4);
    restored.start();
    assert_eq!(restored.phase(), TourPhase::Active(2));
}

#[test]
fn corrupt_persisted_values_restore_to_zero() {
    for raw in ["banana", "9", "-3", "1.5", ""] {
        let store = Rc::new(MemoryStore::default());
        store.set(SCOPE, raw);
        let mut flow = flow_with(store, 3);
        flow.start();
        assert_eq!(flow.phase(), TourPhase::Active(0), "raw value {raw:?}");
    }
}

#[test]
fn flow_works_without_working_storage() {
    let mut flow = TourFlow::new(SCOPE, 2, Rc::new(NullProgressStore));
    flow.start();
    assert_eq!(flow.phase(), TourPhase::Active(0));
    flow.next();
    assert_eq!(flow.phase(), TourPhase::Active(1));
    flow.next();
    assert_eq!(flow.phase(), TourPhase::Finished);
}

#[test]
fn empty_tour_never_activates() {
    let store = Rc::new(MemoryStore::default());
    let mut flow = flow_with(store, 0);
    flow.start();
    assert_eq!(flow.phase(), TourPhase::NotStarted);
}
