//! Positional argument values delivered to listeners.

use std::fmt;

use serde_json::Value;

use crate::listener::Listener;
use crate::name::EventName;

/// A single positional argument delivered to listeners during dispatch.
///
/// Ordinary emissions carry [`EventArg::Value`] payloads. The `Name` and
/// `Listener` variants exist for the registry's own lifecycle
/// notifications, which pass the affected event name and the original
/// callback through the same dispatch path as everything else.
#[derive(Clone)]
pub enum EventArg {
    /// An application payload value.
    Value(Value),
    /// An event name.
    Name(EventName),
    /// A listener reference.
    Listener(Listener),
}

impl EventArg {
    /// Wrap anything JSON-representable as a payload argument.
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    /// The payload value, `None` for the lifecycle variants.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// The event name, `None` for other variants.
    pub fn as_name(&self) -> Option<&EventName> {
        match self {
            Self::Name(name) => Some(name),
            _ => None,
        }
    }

    /// The listener reference, `None` for other variants.
    pub fn as_listener(&self) -> Option<&Listener> {
        match self {
            Self::Listener(listener) => Some(listener),
            _ => None,
        }
    }
}

impl From<Value> for EventArg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<EventName> for EventArg {
    fn from(name: EventName) -> Self {
        Self::Name(name)
    }
}

impl From<Listener> for EventArg {
    fn from(listener: Listener) -> Self {
        Self::Listener(listener)
    }
}

// Listener trait objects are not Debug, so spell the variants out by hand.
impl fmt::Debug for EventArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Self::Listener(_) => f.write_str("Listener(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::listener;
    use serde_json::json;

    #[test]
    fn accessors_match_variants() {
        let value = EventArg::value(7);
        assert_eq!(value.as_value(), Some(&json!(7)));
        assert_eq!(value.as_name(), None);
        assert!(value.as_listener().is_none());

        let name = EventArg::from(EventName::from("ready"));
        assert_eq!(name.as_name(), Some(&EventName::from("ready")));
        assert_eq!(name.as_value(), None);

        let callback = EventArg::from(listener(|_registry, _args| {}));
        assert!(callback.as_listener().is_some());
    }

    #[test]
    fn debug_keeps_listeners_opaque() {
        let callback = EventArg::from(listener(|_registry, _args| {}));
        assert_eq!(format!("{callback:?}"), "Listener(..)");
        assert_eq!(format!("{:?}", EventArg::value("x")), "Value(String(\"x\"))");
    }
}
