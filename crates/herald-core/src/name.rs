//! Event name keys: strings and opaque tokens.
//!
//! Listener sequences are keyed by [`EventName`], which is either a string
//! compared by value or an [`EventToken`] compared by identity. Tokens are
//! the way to claim an event key that no string-typed caller can collide
//! with: every call to [`EventToken::new`] mints a distinct key.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_TOKEN_ID: AtomicU64 = AtomicU64::new(1);

/// An opaque, process-unique event key.
///
/// Two tokens compare equal only when one is a clone of the other. The
/// optional label is carried for diagnostics and ignored by equality and
/// hashing, so two tokens with the same label are still distinct keys.
#[derive(Clone)]
pub struct EventToken {
    id: u64,
    label: Option<Arc<str>>,
}

impl EventToken {
    /// Mint a fresh token.
    pub fn new() -> Self {
        Self {
            id: NEXT_TOKEN_ID.fetch_add(1, Ordering::Relaxed),
            label: None,
        }
    }

    /// Mint a fresh token carrying a diagnostic label.
    pub fn labeled(label: impl Into<Arc<str>>) -> Self {
        Self {
            id: NEXT_TOKEN_ID.fetch_add(1, Ordering::Relaxed),
            label: Some(label.into()),
        }
    }

    /// The diagnostic label, if one was given.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl Default for EventToken {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for EventToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventToken {}

impl Hash for EventToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "EventToken({label} #{})", self.id),
            None => write!(f, "EventToken(#{})", self.id),
        }
    }
}

/// Key for a listener sequence: a string name or an opaque token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventName {
    /// A string key, compared by value.
    Named(Arc<str>),
    /// A token key, compared by identity.
    Token(EventToken),
}

impl EventName {
    /// The string form of a named key, `None` for tokens.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Token(_) => None,
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Token(token) => write!(f, "{token:?}"),
        }
    }
}

impl From<&str> for EventName {
    fn from(name: &str) -> Self {
        Self::Named(Arc::from(name))
    }
}

impl From<String> for EventName {
    fn from(name: String) -> Self {
        Self::Named(Arc::from(name))
    }
}

impl From<Arc<str>> for EventName {
    fn from(name: Arc<str>) -> Self {
        Self::Named(name)
    }
}

impl From<EventToken> for EventName {
    fn from(token: EventToken) -> Self {
        Self::Token(token)
    }
}

impl From<&EventName> for EventName {
    fn from(name: &EventName) -> Self {
        name.clone()
    }
}
