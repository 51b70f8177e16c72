//! Future-returning single-shot waits over [`herald_core::EventRegistry`].
//!
//! [`once`] turns "the next emission of a name" into a future. The future
//! resolves with the emitted arguments, or fails with the payload of the
//! reserved `error` event if that fires first. Whichever side fires
//! deregisters both underlying listeners, so a settled wait leaves
//! nothing behind and a later, unrelated `error` emission cannot touch
//! it.
//!
//! Registration happens before [`once`] returns, not at first poll, so an
//! emission between the call and the await is not missed:
//!
//! ```
//! use herald_core::{EventArg, EventRegistry};
//! use herald_futures::once;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let registry = EventRegistry::new();
//! let ready = once(&registry, "ready");
//! registry.emit("ready", &[EventArg::value("now")]);
//!
//! let args = ready.await.expect("resolved");
//! assert_eq!(args[0].as_value(), Some(&serde_json::json!("now")));
//! # });
//! ```

use std::future::Future;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::oneshot;

use herald_core::{listener, EventArg, EventName, EventRegistry, ListenerFn, ERROR_EVENT};

/// Failure outcomes of a [`once`] wait.
#[derive(Debug, Error)]
pub enum OnceError {
    /// The registry emitted `error` before the awaited event fired; the
    /// error event's arguments are carried as payload.
    #[error("`error` was emitted before the awaited event")]
    ErrorEvent(Vec<EventArg>),
    /// Both underlying listeners were dropped before either event fired,
    /// e.g. by a bulk clear.
    #[error("listeners were dropped before the awaited event fired")]
    Cancelled,
}

/// Specialized result type for [`once`].
pub type OnceResult = Result<Vec<EventArg>, OnceError>;

/// Shared between the two racing listeners. Exactly one side takes the
/// sender; both sides then detach whatever is still registered.
///
/// The listener slots hold weak references: the registry owns the only
/// strong ones, so dropping the registrations (bulk clear, registry drop)
/// drops the closures, this state, and the sender, which settles the wait
/// as [`OnceError::Cancelled`].
struct WaitState {
    settle: Mutex<Option<oneshot::Sender<OnceResult>>>,
    event_listener: Mutex<Option<Weak<ListenerFn>>>,
    error_listener: Mutex<Option<Weak<ListenerFn>>>,
}

impl WaitState {
    /// Remove both registrations from `registry`. Entries the dispatcher
    /// already removed (the fired once entry) are silent no-ops.
    fn detach(&self, registry: &EventRegistry, name: &EventName) {
        let event_listener = self.event_listener.lock().take();
        if let Some(listener) = event_listener.and_then(|weak| weak.upgrade()) {
            registry.remove_listener(name.clone(), &listener);
        }
        let error_listener = self.error_listener.lock().take();
        if let Some(listener) = error_listener.and_then(|weak| weak.upgrade()) {
            registry.remove_listener(ERROR_EVENT, &listener);
        }
    }
}

/// Wait for the next emission of `name` on `registry`.
///
/// Registers a fire-once listener for `name` that resolves the returned
/// future with the emitted arguments and, unless `name` is the reserved
/// `error` name itself, a listener on `error` that fails the future with
/// [`OnceError::ErrorEvent`] instead. The side that fires first wins and
/// deregisters the loser.
pub fn once(
    registry: &EventRegistry,
    name: impl Into<EventName>,
) -> impl Future<Output = OnceResult> {
    let name = name.into();
    let (settle, settled) = oneshot::channel();
    let state = Arc::new(WaitState {
        settle: Mutex::new(Some(settle)),
        event_listener: Mutex::new(None),
        error_listener: Mutex::new(None),
    });

    let resolve = {
        let state = state.clone();
        let name = name.clone();
        listener(move |registry, args| {
            if let Some(settle) = state.settle.lock().take() {
                let _ = settle.send(Ok(args.to_vec()));
            }
            state.detach(registry, &name);
        })
    };
    *state.event_listener.lock() = Some(Arc::downgrade(&resolve));
    registry.once(name.clone(), resolve);

    if name.as_str() != Some(ERROR_EVENT) {
        let reject = {
            let state = state.clone();
            let name = name.clone();
            listener(move |registry, args| {
                if let Some(settle) = state.settle.lock().take() {
                    let _ = settle.send(Err(OnceError::ErrorEvent(args.to_vec())));
                }
                state.detach(registry, &name);
            })
        };
        *state.error_listener.lock() = Some(Arc::downgrade(&reject));
        registry.on(ERROR_EVENT, reject);
    }

    async move { settled.await.unwrap_or(Err(OnceError::Cancelled)) }
}
