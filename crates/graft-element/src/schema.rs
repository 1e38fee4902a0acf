//! Property schemas: the typed contract between string attributes and component props.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Declared kind of a schema property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropKind {
    /// Plain text, passed through verbatim
    #[serde(alias = "string")]
    Text,
    /// Finite decimal number
    Number,
    /// Presence-style boolean
    Boolean,
    /// Structured data written as a JSON literal
    #[serde(alias = "object", alias = "array")]
    Json,
}

impl PropKind {
    /// Manifest spelling of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            PropKind::Text => "text",
            PropKind::Number => "number",
            PropKind::Boolean => "boolean",
            PropKind::Json => "json",
        }
    }
}

impl fmt::Display for PropKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered mapping from property name to declared kind.
///
/// Insertion order is kept: it is the order of the element's observed attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropSchema {
    entries: Vec<(String, PropKind)>,
}

impl PropSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`PropSchema::insert`].
    pub fn with(mut self, name: impl Into<String>, kind: PropKind) -> Self {
        self.insert(name, kind);
        self
    }

    /// Declare a property. Redeclaring a name changes its kind but keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, kind: PropKind) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = kind,
            None => self.entries.push((name, kind)),
        }
    }

    /// Look up the declared kind of a property.
    pub fn kind_of(&self, name: &str) -> Option<PropKind> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, kind)| *kind)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kind_of(name).is_some()
    }

    /// Property names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, PropKind)> {
        self.entries.iter().map(|(n, kind)| (n.as_str(), *kind))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, PropKind)> for PropSchema {
    fn from_iter<I: IntoIterator<Item = (S, PropKind)>>(iter: I) -> Self {
        let mut schema = PropSchema::new();
        for (name, kind) in iter {
            schema.insert(name, kind);
        }
        schema
    }
}

impl Serialize for PropSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_ordered(&self.entries, serializer)
    }
}

impl<'de> Deserialize<'de> for PropSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries: Vec<(String, PropKind)> = deserialize_ordered(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

pub(crate) fn serialize_ordered<V, S>(entries: &[(String, V)], serializer: S) -> Result<S::Ok, S::Error>
where
    V: Serialize,
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (key, value) in entries {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

/// Deserialize a map into `(key, value)` pairs in document order.
///
/// Usable as `#[serde(deserialize_with = "...")]` for `Vec<(String, V)>` fields.
pub fn deserialize_ordered<'de, V, D>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
where
    V: Deserialize<'de>,
    D: Deserializer<'de>,
{
    struct OrderedVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
        type Value = Vec<(String, V)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a table of property names")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((key, value)) = access.next_entry::<String, V>()? {
                entries.push((key, value));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(OrderedVisitor(PhantomData))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_declaration_order() {
        let schema = PropSchema::new()
            .with("start", PropKind::Number)
            .with("step", PropKind::Number)
            .with("label", PropKind::Text);

        assert_eq!(schema.names().collect::<Vec<_>>(), ["start", "step", "label"]);
    }

    #[test]
    fn redeclaring_changes_kind_in_place() {
        let schema = PropSchema::new()
            .with("a", PropKind::Text)
            .with("b", PropKind::Text)
            .with("a", PropKind::Json);

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.kind_of("a"), Some(PropKind::Json));
        assert_eq!(schema.names().next(), Some("a"));
    }

    #[test]
    fn deserializes_in_document_order() {
        let schema: PropSchema =
            serde_json::from_str(r#"{"zeta": "string", "alpha": "number", "mid": "object"}"#)
                .unwrap();

        assert_eq!(
            schema.iter().collect::<Vec<_>>(),
            [
                ("zeta", PropKind::Text),
                ("alpha", PropKind::Number),
                ("mid", PropKind::Json),
            ]
        );
    }

    #[test]
    fn rejects_unknown_kind() {
        let result: Result<PropSchema, _> = serde_json::from_str(r#"{"x": "date"}"#);

        assert!(result.is_err());
    }
}
