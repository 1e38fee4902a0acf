//! Event bridging and the property set handed to the UI runtime.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::schema::{deserialize_ordered, serialize_ordered};

/// Mapping from a callback prop name (as the component calls it) to the DOM event name
/// dispatched on the host element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventMap {
    entries: Vec<(String, String)>,
}

impl EventMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`EventMap::insert`].
    pub fn with(mut self, callback: impl Into<String>, event: impl Into<String>) -> Self {
        self.insert(callback, event);
        self
    }

    /// Map a callback prop to an event name, replacing any earlier mapping for it.
    pub fn insert(&mut self, callback: impl Into<String>, event: impl Into<String>) {
        let callback = callback.into();
        let event = event.into();
        match self.entries.iter_mut().find(|(c, _)| *c == callback) {
            Some(entry) => entry.1 = event,
            None => self.entries.push((callback, event)),
        }
    }

    /// Event name dispatched for a callback prop.
    pub fn event_for(&self, callback: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| c == callback)
            .map(|(_, e)| e.as_str())
    }

    /// `(callback, event)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, e)| (c.as_str(), e.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C: Into<String>, E: Into<String>> FromIterator<(C, E)> for EventMap {
    fn from_iter<I: IntoIterator<Item = (C, E)>>(iter: I) -> Self {
        let mut map = EventMap::new();
        for (callback, event) in iter {
            map.insert(callback, event);
        }
        map
    }
}

impl Serialize for EventMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_ordered(&self.entries, serializer)
    }
}

impl<'de> Deserialize<'de> for EventMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries: Vec<(String, String)> = deserialize_ordered(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

/// A custom event dispatched on a host element.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomEvent {
    /// Event type (e.g., "change")
    pub name: String,

    /// Application payload
    pub detail: Value,

    pub bubbles: bool,

    /// Whether the event crosses shadow boundaries
    pub composed: bool,
}

impl CustomEvent {
    /// A bubbling, composed event: the only shape the adapter dispatches.
    pub fn bridged(name: impl Into<String>, detail: Value) -> Self {
        Self {
            name: name.into(),
            detail,
            bubbles: true,
            composed: true,
        }
    }
}

/// Callback prop given to the wrapped component.
#[derive(Clone)]
pub struct EventCallback(Rc<dyn Fn(Value)>);

impl EventCallback {
    pub fn new(f: impl Fn(Value) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the callback with a payload.
    pub fn call(&self, payload: Value) {
        (self.0)(payload)
    }
}

impl fmt::Debug for EventCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventCallback(..)")
    }
}

/// A single entry of a [`Props`] set.
#[derive(Debug, Clone)]
pub enum PropValue {
    /// Data value, coerced from an attribute or assigned directly
    Value(Value),
    /// Event bridge callback
    Callback(EventCallback),
}

/// Combined property set passed to the UI runtime on every render.
#[derive(Debug, Clone, Default)]
pub struct Props {
    entries: BTreeMap<String, PropValue>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_value(&mut self, name: impl Into<String>, value: Value) {
        self.entries.insert(name.into(), PropValue::Value(value));
    }

    /// Insert a callback. A callback replaces a data value of the same name.
    pub fn insert_callback(&mut self, name: impl Into<String>, callback: EventCallback) {
        self.entries.insert(name.into(), PropValue::Callback(callback));
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.entries.get(name)
    }

    /// Data value for a prop, if it holds one.
    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.entries.get(name)? {
            PropValue::Value(v) => Some(v),
            PropValue::Callback(_) => None,
        }
    }

    /// Callback for a prop, if it holds one.
    pub fn callback(&self, name: &str) -> Option<&EventCallback> {
        match self.entries.get(name)? {
            PropValue::Callback(cb) => Some(cb),
            PropValue::Value(_) => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, PropValue> {
        self.entries.iter()
    }

    /// Data values only, as a JSON object.
    pub fn to_json(&self) -> Value {
        let map = self
            .entries
            .iter()
            .filter_map(|(name, prop)| match prop {
                PropValue::Value(v) => Some((name.clone(), v.clone())),
                PropValue::Callback(_) => None,
            })
            .collect();
        Value::Object(map)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
