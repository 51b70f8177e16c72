//! Synchronous in-process publish/subscribe.
//!
//! An [`EventRegistry`] holds ordered listener sequences keyed by string
//! or token [`EventName`]s and dispatches to them synchronously on
//! [`emit`](EventRegistry::emit). The pieces:
//!
//! - [`EventRegistry`]: the registry/dispatch engine
//! - [`Listener`] / [`listener`]: shared callbacks with pointer identity
//! - [`OnceListener`]: the fire-once wrapper, removed before its first
//!   invocation
//! - [`Registration`]: the `Plain`/`Once` entry stored per sequence
//! - [`EventArg`]: the positional argument values a dispatch carries
//!
//! The registry notifies about its own mutations through two reserved
//! events, [`NEW_LISTENER`] and [`REMOVE_LISTENER`], dispatched like any
//! other emission. A soft per-name listener ceiling (default
//! [`DEFAULT_CEILING`], overridable per instance or process-wide) logs a
//! `tracing` warning when crossed; it never blocks an add.
//!
//! # Example
//!
//! ```
//! use herald_core::{listener, EventArg, EventRegistry};
//! use serde_json::json;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let registry = EventRegistry::new();
//! let fired = Arc::new(AtomicUsize::new(0));
//!
//! let count = fired.clone();
//! registry.once(
//!     "job:done",
//!     listener(move |_registry, args| {
//!         assert_eq!(args[0].as_value(), Some(&json!("ok")));
//!         count.fetch_add(1, Ordering::SeqCst);
//!     }),
//! );
//!
//! registry.emit("job:done", &[EventArg::value("ok")]);
//! registry.emit("job:done", &[EventArg::value("ok")]);
//! assert_eq!(fired.load(Ordering::SeqCst), 1);
//! ```
//!
//! Dispatch is same-thread and runs to completion; there is no delivery
//! across threads or processes and no persistence. Listeners may re-enter
//! the registry from inside a dispatch; the module docs on
//! [`registry`] spell out the mutation-during-iteration contract.

pub mod args;
pub mod error;
pub mod listener;
pub mod name;
pub mod registry;

pub use args::EventArg;
pub use error::{RegistryError, RegistryResult};
pub use listener::{listener, Listener, ListenerFn, OnceListener, Registration};
pub use name::{EventName, EventToken};
pub use registry::{
    default_max_listeners, set_default_max_listeners, EventRegistry, DEFAULT_CEILING, ERROR_EVENT,
    NEW_LISTENER, REMOVE_LISTENER,
};
