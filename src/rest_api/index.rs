//! # Index Registry
//!
//! Named index predicates and the request-parameter extractors that feed
//! them, plus the single key parser applied to every `:uid` path segment.
//!
//! Built once with chained calls and shared read-only afterwards:
//!
//! ```ignore
//! let registry = IndexRegistry::new()
//!     .key_parser(DocumentKey::parse_integer)
//!     .register(
//!         "byA",
//!         |value, item: &JsonDocument| item.get("a") == Some(value),
//!         |req| req.param_value("a"),
//!     );
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::store::Predicate;

/// Pulls an index query value out of a request
pub type Extractor = Arc<dyn Fn(&IndexRequest) -> Value + Send + Sync>;

/// Turns a `:uid` path segment into a store key. `None` marks an unusable key.
pub type KeyParser<K> = Arc<dyn Fn(&str) -> Option<K> + Send + Sync>;

/// What an extractor may look at: the index name and the query string
#[derive(Debug, Clone, Default)]
pub struct IndexRequest {
    pub index: String,
    pub query: HashMap<String, String>,
}

impl IndexRequest {
    pub fn new(index: impl Into<String>, query: HashMap<String, String>) -> Self {
        Self {
            index: index.into(),
            query,
        }
    }

    /// Raw query parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Query parameter as a JSON string, `null` when absent
    pub fn param_value(&self, name: &str) -> Value {
        self.param(name)
            .map(|v| Value::String(v.to_string()))
            .unwrap_or(Value::Null)
    }
}

/// A registered index
pub struct IndexEntry<R> {
    pub name: String,
    pub predicate: Predicate<R>,
    pub extractor: Extractor,
}

impl<R> IndexEntry<R> {
    /// Run the extractor against a request
    pub fn extract(&self, request: &IndexRequest) -> Value {
        (self.extractor)(request)
    }
}

impl<R> Clone for IndexEntry<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            predicate: Arc::clone(&self.predicate),
            extractor: Arc::clone(&self.extractor),
        }
    }
}

impl<R> fmt::Debug for IndexEntry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexEntry").field("name", &self.name).finish()
    }
}

/// Index name -> entry, plus one key parser
pub struct IndexRegistry<K, R> {
    entries: HashMap<String, IndexEntry<R>>,
    key_parser: KeyParser<K>,
}

impl<R> IndexRegistry<String, R> {
    /// Empty registry whose keys are the raw path segment
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            key_parser: Arc::new(identity_key),
        }
    }
}

impl<R> Default for IndexRegistry<String, R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Default key parser; empty segments are unusable
fn identity_key(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

impl<K, R> IndexRegistry<K, R> {
    /// Add or silently replace the index called `name`
    pub fn register<P, E>(mut self, name: impl Into<String>, predicate: P, extractor: E) -> Self
    where
        P: Fn(&Value, &R) -> bool + Send + Sync + 'static,
        E: Fn(&IndexRequest) -> Value + Send + Sync + 'static,
    {
        let name = name.into();
        let entry = IndexEntry {
            name: name.clone(),
            predicate: Arc::new(predicate),
            extractor: Arc::new(extractor),
        };
        self.entries.insert(name, entry);
        self
    }

    /// Replace the key parser, possibly changing the key type
    pub fn key_parser<K2, F>(self, parser: F) -> IndexRegistry<K2, R>
    where
        F: Fn(&str) -> Option<K2> + Send + Sync + 'static,
    {
        IndexRegistry {
            entries: self.entries,
            key_parser: Arc::new(parser),
        }
    }

    /// Look up an index. `None` is the normal "unknown index" outcome.
    pub fn resolve(&self, name: &str) -> Option<&IndexEntry<R>> {
        self.entries.get(name)
    }

    /// Apply the configured key parser. No validation beyond what it does.
    pub fn parse_key(&self, raw: &str) -> Option<K> {
        (self.key_parser)(raw)
    }

    /// Registered index names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, R> fmt::Debug for IndexRegistry<K, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexRegistry")
            .field("indexes", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DocumentKey, JsonDocument};
    use serde_json::json;

    fn doc(body: Value) -> JsonDocument {
        serde_json::from_value(body).unwrap()
    }

    fn by_a() -> IndexRegistry<String, JsonDocument> {
        IndexRegistry::new().register(
            "byA",
            |value: &Value, item: &JsonDocument| item.get("a") == Some(value),
            |req: &IndexRequest| req.param_value("a"),
        )
    }

    fn request(pairs: &[(&str, &str)]) -> IndexRequest {
        let query = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        IndexRequest::new("byA", query)
    }

    #[test]
    fn test_empty_registry_resolves_nothing() {
        let registry: IndexRegistry<String, JsonDocument> = IndexRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.resolve("byA").is_none());
    }

    #[test]
    fn test_resolve_and_apply_entry() {
        let registry = by_a();
        let entry = registry.resolve("byA").unwrap();
        assert_eq!(entry.name, "byA");

        let value = entry.extract(&request(&[("a", "hello")]));
        assert_eq!(value, json!("hello"));
        assert!((entry.predicate)(&value, &doc(json!({"uid": 1, "a": "hello"}))));
        assert!(!(entry.predicate)(&value, &doc(json!({"uid": 3, "a": "goodbye"}))));
    }

    #[test]
    fn test_missing_param_extracts_null() {
        let registry = by_a();
        let entry = registry.resolve("byA").unwrap();
        assert_eq!(entry.extract(&request(&[])), Value::Null);
    }

    #[test]
    fn test_register_overwrites() {
        let registry = by_a().register(
            "byA",
            |_: &Value, _: &JsonDocument| true,
            |_: &IndexRequest| Value::Null,
        );
        assert_eq!(registry.len(), 1);
        let entry = registry.resolve("byA").unwrap();
        assert!((entry.predicate)(&Value::Null, &doc(json!({"uid": 9}))));
    }

    #[test]
    fn test_default_key_parser_is_identity() {
        let registry = by_a();
        assert_eq!(registry.parse_key("34"), Some("34".to_string()));
        assert_eq!(registry.parse_key(""), None);
    }

    #[test]
    fn test_key_parser_changes_key_type_and_keeps_indexes() {
        let registry = by_a().key_parser(DocumentKey::parse_integer);
        assert_eq!(registry.parse_key("34"), Some(DocumentKey::Int(34)));
        assert_eq!(registry.parse_key("abc"), None);
        assert!(registry.resolve("byA").is_some());
    }

    #[test]
    fn test_names_sorted() {
        let registry = by_a().register(
            "all",
            |_: &Value, _: &JsonDocument| true,
            |_: &IndexRequest| Value::Null,
        );
        assert_eq!(registry.names(), vec!["all", "byA"]);
    }
}
