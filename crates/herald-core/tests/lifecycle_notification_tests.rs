//! Tests for the `newListener` / `removeListener` notifications.
//!
//! These verify the ordering contract: `newListener` fires before the
//! sequence is touched (a handler sees the pre-add state), and
//! `removeListener` fires after an itemized removal (a handler sees the
//! post-removal state), carrying the original callback in both cases.

use herald_core::{listener, EventArg, EventName, EventRegistry, Listener, NEW_LISTENER, REMOVE_LISTENER};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn tagged(log: &Arc<Mutex<Vec<String>>>, tag: &str) -> Listener {
    let log = log.clone();
    let tag = tag.to_string();
    listener(move |_registry, _args| log.lock().push(tag.clone()))
}

#[test]
fn new_listener_fires_before_the_entry_is_visible() {
    let registry = EventRegistry::new();
    let observed = Arc::new(Mutex::new(Vec::new()));

    let seen = observed.clone();
    registry.on(
        NEW_LISTENER,
        listener(move |registry, args| {
            let name = args[0].as_name().expect("name argument").clone();
            seen.lock().push((name.clone(), registry.listener_count(name)));
        }),
    );

    let target = listener(|_registry, _args| {});
    registry.on("test", target.clone());

    // The handler ran once, for the very first registration, and the
    // entry was not yet in the sequence at that point.
    assert_eq!(*observed.lock(), [(EventName::from("test"), 0)]);
    assert_eq!(registry.listener_count("test"), 1);
}

#[test]
fn new_listener_carries_the_original_for_once_registrations() {
    let registry = EventRegistry::new();
    let target = listener(|_registry, _args| {});
    let matched = Arc::new(AtomicBool::new(false));

    let expected = target.clone();
    let hit = matched.clone();
    registry.on(
        NEW_LISTENER,
        listener(move |_registry, args| {
            let carried = args[1].as_listener().expect("listener argument");
            hit.store(Arc::ptr_eq(carried, &expected), Ordering::SeqCst);
        }),
    );

    registry.once("test", target);
    assert!(matched.load(Ordering::SeqCst));
}

#[test]
fn new_listener_handler_can_register_ahead_of_the_add() {
    let registry = EventRegistry::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    // On the first "test" add, sneak in another listener. It lands in the
    // sequence before the add that triggered the notification completes.
    let sneak = tagged(&log, "sneak");
    let armed = Arc::new(AtomicBool::new(true));
    registry.on(
        NEW_LISTENER,
        listener(move |registry, args| {
            if args[0].as_name().and_then(|name| name.as_str()) == Some("test")
                && armed.swap(false, Ordering::SeqCst)
            {
                registry.on("test", sneak.clone());
            }
        }),
    );

    registry.on("test", tagged(&log, "main"));
    registry.emit("test", &[]);
    assert_eq!(*log.lock(), ["sneak", "main"]);
}

#[test]
fn once_firing_notifies_removal_before_the_listener_runs() {
    let registry = EventRegistry::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let target = tagged(&log, "target");
    let expected = target.clone();
    let seen = log.clone();
    registry.on(
        REMOVE_LISTENER,
        listener(move |_registry, args| {
            let name = args[0].as_name().expect("name argument");
            let original = args[1].as_listener().expect("listener argument");
            assert!(Arc::ptr_eq(original, &expected));
            seen.lock().push(format!("removed:{name}"));
        }),
    );

    registry.once("test", target);
    registry.emit("test", &[EventArg::value(1)]);

    assert_eq!(*log.lock(), ["removed:test", "target"]);
}

#[test]
fn explicit_removal_of_a_once_entry_reports_the_original() {
    let registry = EventRegistry::new();
    let target = listener(|_registry, _args| {});
    let matched = Arc::new(AtomicBool::new(false));

    let expected = target.clone();
    let hit = matched.clone();
    registry.on(
        REMOVE_LISTENER,
        listener(move |_registry, args| {
            let original = args[1].as_listener().expect("listener argument");
            hit.store(Arc::ptr_eq(original, &expected), Ordering::SeqCst);
        }),
    );

    registry.once("test", target.clone());
    registry.remove_listener("test", &target);

    assert!(matched.load(Ordering::SeqCst));
    assert_eq!(registry.listener_count("test"), 0);
}

#[test]
fn unmatched_removal_stays_silent() {
    let registry = EventRegistry::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    registry.on(REMOVE_LISTENER, tagged(&log, "removed"));
    registry.remove_listener("test", &listener(|_registry, _args| {}));

    assert!(log.lock().is_empty());
}

#[test]
fn bulk_clears_are_not_itemized() {
    let registry = EventRegistry::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    registry.on(REMOVE_LISTENER, tagged(&log, "removed"));
    registry.on("a", listener(|_registry, _args| {}));
    registry.on("a", listener(|_registry, _args| {}));
    registry.on("b", listener(|_registry, _args| {}));

    registry.remove_all_listeners("a");
    registry.clear();

    assert!(log.lock().is_empty());
    assert_eq!(registry.listener_count("a"), 0);
    assert_eq!(registry.listener_count("b"), 0);
}
