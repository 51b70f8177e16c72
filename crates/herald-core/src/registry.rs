//! The registry/dispatch engine.
//!
//! [`EventRegistry`] maps event names to ordered listener sequences and
//! invokes them synchronously on [`emit`](EventRegistry::emit). All
//! methods take `&self`; internal state sits behind a `parking_lot::Mutex`
//! that is never held while a listener runs, which is what allows a
//! listener to re-enter the registry (add, remove, emit) from inside a
//! dispatch without deadlocking.
//!
//! Dispatch walks the live sequence by position. A fire-once entry is
//! removed immediately before its invocation and the cursor stays put, so
//! the entry shifted into the vacated slot is not skipped. There is no
//! snapshot: entries added or removed re-entrantly during the same pass
//! change what the rest of that pass sees.
//!
//! Two lifecycle notifications re-enter the dispatcher. [`NEW_LISTENER`]
//! fires inside every add before the sequence is touched, so a handler
//! inspecting the registry sees the pre-add state. [`REMOVE_LISTENER`]
//! fires after every itemized removal (explicit or once-triggered), so a
//! handler sees the post-removal state. Both carry the event name and the
//! original callback as arguments.

use std::fmt;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};

use crate::args::EventArg;
use crate::error::{RegistryError, RegistryResult};
use crate::listener::{Listener, OnceListener, Registration};
use crate::name::EventName;

/// Notification fired inside every add, before the sequence is touched.
/// Arguments: the target event name and the original listener.
pub const NEW_LISTENER: &str = "newListener";

/// Notification fired after every itemized removal, explicit or
/// once-triggered. Arguments: the event name and the original listener.
/// Bulk clears do not fire it.
pub const REMOVE_LISTENER: &str = "removeListener";

/// Reserved name used by failure-delivery conventions (see the
/// `herald-futures` crate); the registry itself gives it no special
/// treatment.
pub const ERROR_EVENT: &str = "error";

/// Initial process-wide listener ceiling.
pub const DEFAULT_CEILING: f64 = 10.0;

static DEFAULT_MAX_LISTENERS: RwLock<f64> = RwLock::new(DEFAULT_CEILING);

/// Current process-wide default listener ceiling.
///
/// Read by every registry without a per-instance override at the moment
/// a check is made.
pub fn default_max_listeners() -> f64 {
    *DEFAULT_MAX_LISTENERS.read()
}

/// Replace the process-wide default listener ceiling.
///
/// Takes effect for future checks on every registry without a
/// per-instance override; sequences that already exceed the new value are
/// not re-checked. Rejects negative and NaN values without touching the
/// current default. `0.0` and `+inf` disable the warning.
pub fn set_default_max_listeners(ceiling: f64) -> RegistryResult<()> {
    check_ceiling(ceiling)?;
    *DEFAULT_MAX_LISTENERS.write() = ceiling;
    Ok(())
}

fn check_ceiling(ceiling: f64) -> RegistryResult<()> {
    if ceiling.is_nan() || ceiling < 0.0 {
        return Err(RegistryError::CeilingOutOfRange { value: ceiling });
    }
    Ok(())
}

#[derive(Default)]
struct EventSlot {
    registrations: Vec<Registration>,
    /// Set when the ceiling warning has fired for this sequence; cleared
    /// by bulk clears so a rebuilt sequence can warn again.
    warned: bool,
}

#[derive(Default)]
struct RegistryState {
    /// Insertion order of keys is the first-seen order reported by
    /// `event_names`. Slots are never pruned; an emptied slot answers
    /// "no listeners" everywhere while keeping its name visible.
    events: IndexMap<EventName, EventSlot>,
    ceiling: Option<f64>,
}

enum Insert {
    Append,
    Prepend,
}

/// In-process publish/subscribe registry with synchronous dispatch.
///
/// Listeners are registered against string or token names and invoked in
/// sequence order when the name is emitted. Fire-once registrations are
/// removed immediately before their first invocation. See the module
/// docs for the re-entrancy and mutation-during-dispatch contract.
///
/// ```
/// use herald_core::{listener, EventArg, EventRegistry};
/// use serde_json::json;
///
/// let registry = EventRegistry::new();
/// registry.on(
///     "job:done",
///     listener(|_registry, args| {
///         assert_eq!(args[0].as_value(), Some(&json!("ok")));
///     }),
/// );
/// assert!(registry.emit("job:done", &[EventArg::value("ok")]));
/// assert!(!registry.emit("job:failed", &[]));
/// ```
#[derive(Default)]
pub struct EventRegistry {
    state: Mutex<RegistryState>,
}

impl EventRegistry {
    /// Create an empty registry using the process-wide default ceiling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `listener` to the sequence for `name`.
    ///
    /// Fires [`NEW_LISTENER`] with `(name, listener)` before the sequence
    /// is touched, then logs a single warning if the post-append count
    /// crosses the effective ceiling.
    pub fn on(&self, name: impl Into<EventName>, listener: Listener) -> &Self {
        self.add(name.into(), Registration::Plain(listener), Insert::Append)
    }

    /// Alias for [`on`](Self::on).
    pub fn add_listener(&self, name: impl Into<EventName>, listener: Listener) -> &Self {
        self.on(name, listener)
    }

    /// Append a fire-once registration for `name`.
    ///
    /// The [`NEW_LISTENER`] notification carries the original callback,
    /// not the wrapper.
    pub fn once(&self, name: impl Into<EventName>, listener: Listener) -> &Self {
        self.add(
            name.into(),
            Registration::Once(OnceListener::new(listener)),
            Insert::Append,
        )
    }

    /// Insert `listener` at the front of the sequence for `name`.
    pub fn prepend_listener(&self, name: impl Into<EventName>, listener: Listener) -> &Self {
        self.add(name.into(), Registration::Plain(listener), Insert::Prepend)
    }

    /// Insert a fire-once registration at the front of the sequence.
    pub fn prepend_once_listener(&self, name: impl Into<EventName>, listener: Listener) -> &Self {
        self.add(
            name.into(),
            Registration::Once(OnceListener::new(listener)),
            Insert::Prepend,
        )
    }

    fn add(&self, name: EventName, registration: Registration, position: Insert) -> &Self {
        let original = registration.listener().clone();
        // Notify before the sequence is touched: a handler that inspects
        // the registry observes the pre-add state.
        self.emit(
            NEW_LISTENER,
            &[EventArg::Name(name.clone()), EventArg::Listener(original)],
        );

        let crossing = {
            let mut state = self.state.lock();
            let ceiling = state.ceiling.unwrap_or_else(default_max_listeners);
            let slot = state.events.entry(name.clone()).or_default();
            match position {
                Insert::Append => slot.registrations.push(registration),
                Insert::Prepend => slot.registrations.insert(0, registration),
            }
            let count = slot.registrations.len();
            let over = ceiling > 0.0 && ceiling.is_finite() && (count as f64) > ceiling;
            if over && !slot.warned {
                slot.warned = true;
                Some((count, ceiling))
            } else {
                None
            }
        };
        if let Some((count, ceiling)) = crossing {
            tracing::warn!(
                event = %name,
                count,
                ceiling,
                "possible listener leak: ceiling exceeded; raise it with set_max_listeners if this is intentional"
            );
        }
        self
    }

    /// Synchronously invoke every listener currently registered for
    /// `name`, in sequence order, passing each one this registry and
    /// `args`.
    ///
    /// Returns `false`, with no side effects, when the sequence is absent
    /// or empty; `true` otherwise. A fire-once entry is removed from the
    /// sequence, with a [`REMOVE_LISTENER`] notification, immediately
    /// before its invocation.
    pub fn emit(&self, name: impl Into<EventName>, args: &[EventArg]) -> bool {
        let name = name.into();
        {
            let state = self.state.lock();
            let live = state
                .events
                .get(&name)
                .is_some_and(|slot| !slot.registrations.is_empty());
            if !live {
                return false;
            }
        }

        let mut cursor = 0;
        loop {
            // Take the entry at the cursor under the lock, release the
            // lock, then call. Once entries leave the sequence here, with
            // the cursor left in place so the shifted successor is seen.
            let step = {
                let mut state = self.state.lock();
                let Some(slot) = state.events.get_mut(&name) else {
                    break;
                };
                let Some(registration) = slot.registrations.get(cursor).cloned() else {
                    break;
                };
                if registration.is_once() {
                    slot.registrations.remove(cursor);
                } else {
                    cursor += 1;
                }
                registration
            };
            match step {
                Registration::Plain(callback) => callback(self, args),
                Registration::Once(wrapper) => {
                    self.notify_removed(&name, wrapper.listener().clone());
                    wrapper.call(self, args);
                }
            }
        }
        true
    }

    fn notify_removed(&self, name: &EventName, original: Listener) {
        self.emit(
            REMOVE_LISTENER,
            &[EventArg::Name(name.clone()), EventArg::Listener(original)],
        );
    }

    /// Remove the most recently added registration matching `listener`,
    /// comparing plain entries directly and fire-once entries through
    /// their wrapped original.
    ///
    /// Fires [`REMOVE_LISTENER`] with `(name, original)` when an entry
    /// was removed. An unknown name or an unmatched listener is a silent
    /// no-op.
    pub fn remove_listener(&self, name: impl Into<EventName>, listener: &Listener) -> &Self {
        let name = name.into();
        let removed = {
            let mut state = self.state.lock();
            state.events.get_mut(&name).and_then(|slot| {
                slot.registrations
                    .iter()
                    .rposition(|registration| registration.matches(listener))
                    .map(|index| slot.registrations.remove(index))
            })
        };
        if let Some(registration) = removed {
            self.notify_removed(&name, registration.listener().clone());
        }
        self
    }

    /// Alias for [`remove_listener`](Self::remove_listener).
    pub fn off(&self, name: impl Into<EventName>, listener: &Listener) -> &Self {
        self.remove_listener(name, listener)
    }

    /// Drop every registration for `name`.
    ///
    /// A bulk clear is non-itemized: no [`REMOVE_LISTENER`] notifications
    /// fire. The name stays visible to [`event_names`](Self::event_names)
    /// and its warning state is reset.
    pub fn remove_all_listeners(&self, name: impl Into<EventName>) -> &Self {
        let name = name.into();
        let mut state = self.state.lock();
        if let Some(slot) = state.events.get_mut(&name) {
            slot.registrations.clear();
            slot.warned = false;
        }
        self
    }

    /// Drop every registration for every name, without itemized
    /// notifications. Names stay visible to
    /// [`event_names`](Self::event_names).
    pub fn clear(&self) -> &Self {
        let mut state = self.state.lock();
        for slot in state.events.values_mut() {
            slot.registrations.clear();
            slot.warned = false;
        }
        self
    }

    /// Number of registrations currently stored for `name`.
    pub fn listener_count(&self, name: impl Into<EventName>) -> usize {
        let name = name.into();
        let state = self.state.lock();
        state
            .events
            .get(&name)
            .map_or(0, |slot| slot.registrations.len())
    }

    /// Copies of the listeners for `name`, with fire-once wrappers
    /// unwrapped to the callbacks that were originally registered.
    pub fn listeners(&self, name: impl Into<EventName>) -> Vec<Listener> {
        let name = name.into();
        let state = self.state.lock();
        state.events.get(&name).map_or_else(Vec::new, |slot| {
            slot.registrations
                .iter()
                .map(|registration| registration.listener().clone())
                .collect()
        })
    }

    /// Copies of the registrations for `name` with fire-once wrappers
    /// left intact, for callers that need to tell once registrations
    /// apart.
    pub fn raw_listeners(&self, name: impl Into<EventName>) -> Vec<Registration> {
        let name = name.into();
        let state = self.state.lock();
        state
            .events
            .get(&name)
            .map_or_else(Vec::new, |slot| slot.registrations.clone())
    }

    /// Every name ever given a sequence, in first-seen order, including
    /// names whose sequences are currently empty.
    pub fn event_names(&self) -> Vec<EventName> {
        let state = self.state.lock();
        state.events.keys().cloned().collect()
    }

    /// The effective listener ceiling: the per-instance override if set,
    /// else the current process-wide default.
    pub fn max_listeners(&self) -> f64 {
        let state = self.state.lock();
        state.ceiling.unwrap_or_else(default_max_listeners)
    }

    /// Set the per-instance listener ceiling.
    ///
    /// `0.0` and `+inf` disable the warning. Negative and NaN values are
    /// rejected without touching the override.
    pub fn set_max_listeners(&self, ceiling: f64) -> RegistryResult<&Self> {
        check_ceiling(ceiling)?;
        self.state.lock().ceiling = Some(ceiling);
        Ok(self)
    }
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        let counts: Vec<(String, usize)> = state
            .events
            .iter()
            .map(|(name, slot)| (name.to_string(), slot.registrations.len()))
            .collect();
        f.debug_struct("EventRegistry")
            .field("ceiling", &state.ceiling)
            .field("listener_counts", &counts)
            .finish()
    }
}
