//! Listener storage: shared callbacks, the fire-once wrapper, and the
//! registration variants the registry stores per event name.

use std::fmt;
use std::sync::Arc;

use crate::args::EventArg;
use crate::registry::EventRegistry;

/// Callback signature for registered listeners.
///
/// Every listener receives the owning registry as invocation context,
/// which is what lets a listener add, remove, or emit from inside a
/// dispatch, plus the emitted positional arguments.
pub type ListenerFn = dyn Fn(&EventRegistry, &[EventArg]) + Send + Sync;

/// A shared listener reference.
///
/// Identity is pointer identity: removal and introspection compare the
/// `Arc` allocation, so callers keep a clone of the value they registered
/// if they intend to remove or recognize it later.
pub type Listener = Arc<ListenerFn>;

/// Wrap a closure as a [`Listener`].
pub fn listener<F>(callback: F) -> Listener
where
    F: Fn(&EventRegistry, &[EventArg]) + Send + Sync + 'static,
{
    Arc::new(callback)
}

/// Fire-once wrapper around a listener.
///
/// Preserves the original callback for identity comparison and
/// introspection; invocation forwards to it unchanged. The registry
/// removes the wrapper from its sequence immediately before the first
/// invocation.
#[derive(Clone)]
pub struct OnceListener {
    inner: Listener,
}

impl OnceListener {
    /// Wrap `listener` for single-fire registration.
    pub fn new(listener: Listener) -> Self {
        Self { inner: listener }
    }

    /// The wrapped original callback.
    pub fn listener(&self) -> &Listener {
        &self.inner
    }

    /// Forward an invocation to the wrapped callback.
    pub fn call(&self, registry: &EventRegistry, args: &[EventArg]) {
        (self.inner)(registry, args)
    }
}

impl fmt::Debug for OnceListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OnceListener(..)")
    }
}

/// A stored entry in an event's listener sequence.
#[derive(Clone)]
pub enum Registration {
    /// Fires on every emission.
    Plain(Listener),
    /// Fires once, then is removed.
    Once(OnceListener),
}

impl Registration {
    /// The original callback, unwrapped for `Once` entries.
    pub fn listener(&self) -> &Listener {
        match self {
            Self::Plain(listener) => listener,
            Self::Once(wrapper) => wrapper.listener(),
        }
    }

    /// Whether this entry fires at most once.
    pub fn is_once(&self) -> bool {
        matches!(self, Self::Once(_))
    }

    /// Identity match against a caller-held reference, through the
    /// wrapper for `Once` entries.
    pub(crate) fn matches(&self, target: &Listener) -> bool {
        Arc::ptr_eq(self.listener(), target)
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("Plain(..)"),
            Self::Once(_) => f.write_str("Once(..)"),
        }
    }
}
