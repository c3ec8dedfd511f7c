//! # REST API Handler
//!
//! The six store-backed operations, independent of HTTP. Each one runs as
//! a single pass: extract, resolve or parse, call the store, classify.
//! Malformed identifiers and bodies are rejected before any store call.

use std::sync::Arc;

use serde_json::Value;

use crate::observability::{Logger, MetricsRegistry};
use crate::patch::Patch;
use crate::store::DocumentStore;

use super::errors::{RestError, RestResult};
use super::index::{IndexEntry, IndexRegistry, IndexRequest};
use super::response::BulkResponse;

/// Operations exposed over HTTP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FindOne,
    FindByIndex,
    UpsertOne,
    DeleteOne,
    DeleteByIndex,
    BulkPatch,
}

impl Operation {
    /// Log event name
    pub fn event(&self) -> &'static str {
        match self {
            Operation::FindOne => "FIND_ONE",
            Operation::FindByIndex => "FIND_BY_INDEX",
            Operation::UpsertOne => "UPSERT_ONE",
            Operation::DeleteOne => "DELETE_ONE",
            Operation::DeleteByIndex => "DELETE_BY_INDEX",
            Operation::BulkPatch => "BULK_PATCH",
        }
    }
}

/// Maps requests onto a document store
///
/// Holds no per-request state; the registry is read-only once built, so one
/// service is shared by every request task.
pub struct RestService<S: DocumentStore> {
    store: Arc<S>,
    indexes: Arc<IndexRegistry<S::Key, S::Record>>,
    metrics: Arc<MetricsRegistry>,
}

impl<S: DocumentStore> RestService<S> {
    pub fn new(store: Arc<S>, indexes: IndexRegistry<S::Key, S::Record>) -> Self {
        Self {
            store,
            indexes: Arc::new(indexes),
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn indexes(&self) -> &IndexRegistry<S::Key, S::Record> {
        &self.indexes
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Records matching a named index, in store order
    pub async fn find_by_index(&self, request: &IndexRequest) -> RestResult<Vec<S::Record>> {
        let result = self.scan(request).await;
        self.observe(Operation::FindByIndex, &request.index, result)
    }

    /// A single record by its path key
    pub async fn find_one(&self, uid: &str) -> RestResult<S::Record> {
        let result = self.lookup(uid).await;
        self.observe(Operation::FindOne, uid, result)
    }

    /// Insert or replace the record described by a JSON body
    pub async fn upsert_one(&self, body: &[u8]) -> RestResult<()> {
        let result = self.write(body).await;
        self.observe(Operation::UpsertOne, "-", result)
    }

    /// Remove a single record by its path key
    pub async fn delete_one(&self, uid: &str) -> RestResult<()> {
        let result = self.remove(uid).await;
        self.observe(Operation::DeleteOne, uid, result)
    }

    /// Remove every record matching a named index; returns the number removed
    pub async fn delete_by_index(&self, request: &IndexRequest) -> RestResult<usize> {
        let result = self.remove_matching(request).await;
        self.observe(Operation::DeleteByIndex, &request.index, result)
    }

    /// Decode a collection patch and apply it as a unit
    pub async fn bulk_patch(&self, body: &[u8]) -> RestResult<BulkResponse> {
        let result = self.patch(body).await;
        if let Ok(response) = &result {
            self.metrics.add_records_patched(response.count);
        }
        self.observe(Operation::BulkPatch, "-", result)
    }

    async fn scan(&self, request: &IndexRequest) -> RestResult<Vec<S::Record>> {
        let entry = self.resolve(&request.index)?;
        let value = entry.extract(request);
        Ok(self.store.find_all(&entry.predicate, &value).await?)
    }

    async fn lookup(&self, uid: &str) -> RestResult<S::Record> {
        let key = self.parse_key(uid)?;
        self.store.find(&key).await.map_err(|e| RestError::from_lookup(e, uid))
    }

    async fn write(&self, body: &[u8]) -> RestResult<()> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| RestError::BadPayload(e.to_string()))?;
        let record = self
            .store
            .decode(value)
            .ok_or_else(|| RestError::BadPayload("body is not a valid record".to_string()))?;
        let key = self.store.key_of(&record);
        if !self.addressable(&key) {
            return Err(RestError::BadPayload(format!("uid {} is not a valid key", key)));
        }
        Ok(self.store.upsert(record).await?)
    }

    async fn remove(&self, uid: &str) -> RestResult<()> {
        let key = self.parse_key(uid)?;
        Ok(self.store.remove(&key).await?)
    }

    async fn remove_matching(&self, request: &IndexRequest) -> RestResult<usize> {
        let entry = self.resolve(&request.index)?;
        let value = entry.extract(request);
        Ok(self.store.remove_all(&entry.predicate, &value).await?)
    }

    async fn patch(&self, body: &[u8]) -> RestResult<BulkResponse> {
        let patch = Patch::from_slice(body).map_err(|e| RestError::BadPayload(e.to_string()))?;
        let entries = patch
            .entries()
            .map_err(|e| RestError::BadPayload(e.to_string()))?;
        for (raw_key, _) in entries {
            let usable = self
                .store
                .decode_key(raw_key)
                .is_some_and(|key| self.addressable(&key));
            if !usable {
                return Err(RestError::BadPayload(format!("{} is not a valid key", raw_key)));
            }
        }
        let count = self.store.apply_patch(&patch).await?;
        Ok(BulkResponse::new(count))
    }

    fn resolve(&self, index: &str) -> RestResult<&IndexEntry<S::Record>> {
        self.indexes
            .resolve(index)
            .ok_or_else(|| RestError::UnknownIndex(index.to_string()))
    }

    fn parse_key(&self, uid: &str) -> RestResult<S::Key> {
        self.indexes
            .parse_key(uid)
            .ok_or_else(|| RestError::BadIdentifier(uid.to_string()))
    }

    /// A record key is usable only if the key parser yields it back from
    /// its path form; anything else could be written but never addressed.
    fn addressable(&self, key: &S::Key) -> bool {
        self.indexes.parse_key(&key.to_string()).as_ref() == Some(key)
    }

    /// Count the request and log its outcome
    fn observe<T>(&self, op: Operation, subject: &str, result: RestResult<T>) -> RestResult<T> {
        self.metrics.record_request(op);
        match &result {
            Ok(_) => Logger::trace(op.event(), &[("subject", subject)]),
            Err(err) => {
                self.metrics.record_failure(err);
                let message = err.to_string();
                let fields = [
                    ("error", message.as_str()),
                    ("kind", err.kind()),
                    ("subject", subject),
                ];
                match err {
                    RestError::BackendFailure(_) => Logger::warn(op.event(), &fields),
                    _ => Logger::trace(op.event(), &fields),
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::store::{
        DocumentKey, JsonDocument, Keyed, MemoryStore, Predicate, StoreError, StoreResult,
    };

    type Service = RestService<MemoryStore<JsonDocument>>;

    fn registry() -> IndexRegistry<DocumentKey, JsonDocument> {
        IndexRegistry::new()
            .key_parser(DocumentKey::parse_integer)
            .register(
                "byA",
                |value: &Value, item: &JsonDocument| item.get("a") == Some(value),
                |req: &IndexRequest| req.param_value("a"),
            )
    }

    async fn seeded() -> Service {
        let service = RestService::new(Arc::new(MemoryStore::new()), registry());
        for body in [
            json!({"uid": 1, "a": "hello", "b": "world"}),
            json!({"uid": 2, "a": "hello", "b": "friend"}),
            json!({"uid": 3, "a": "goodbye", "b": "Mr. Chips"}),
        ] {
            service.upsert_one(body.to_string().as_bytes()).await.unwrap();
        }
        service
    }

    fn by_a(value: &str) -> IndexRequest {
        IndexRequest::new("byA", [("a".to_string(), value.to_string())].into())
    }

    #[tokio::test]
    async fn test_find_by_index() {
        let service = seeded().await;
        let hits = service.find_by_index(&by_a("hello")).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_index() {
        let service = seeded().await;
        let request = IndexRequest::new("doesNotExist", Default::default());
        assert_eq!(
            service.find_by_index(&request).await,
            Err(RestError::UnknownIndex("doesNotExist".to_string()))
        );
        assert_eq!(
            service.delete_by_index(&request).await,
            Err(RestError::UnknownIndex("doesNotExist".to_string()))
        );
    }

    #[tokio::test]
    async fn test_find_one_classifies() {
        let service = seeded().await;
        assert_eq!(
            service.find_one("2").await.unwrap().get("b"),
            Some(&json!("friend"))
        );
        assert_eq!(
            service.find_one("99").await,
            Err(RestError::NotFound("99".to_string()))
        );
        assert_eq!(
            service.find_one("abc").await,
            Err(RestError::BadIdentifier("abc".to_string()))
        );
    }

    #[tokio::test]
    async fn test_upsert_rejects_bad_bodies() {
        let service = seeded().await;
        let err = service.upsert_one(b"{not json").await.unwrap_err();
        assert_eq!(err.kind(), "bad_payload");
        let err = service.upsert_one(br#"{"a": "no uid"}"#).await.unwrap_err();
        assert_eq!(err.kind(), "bad_payload");
        assert_eq!(service.store().len(), 3);
    }

    #[tokio::test]
    async fn test_upsert_rejects_keys_the_parser_cannot_produce() {
        let service = seeded().await;
        let err = service.upsert_one(br#"{"uid": "5"}"#).await.unwrap_err();
        assert_eq!(err.kind(), "bad_payload");
        assert_eq!(service.store().len(), 3);

        let strings = RestService::new(
            Arc::new(MemoryStore::<JsonDocument>::new()),
            IndexRegistry::new().key_parser(DocumentKey::parse_string),
        );
        let err = strings.upsert_one(br#"{"uid": 5}"#).await.unwrap_err();
        assert_eq!(err.kind(), "bad_payload");
        strings.upsert_one(br#"{"uid": "5"}"#).await.unwrap();
        assert_eq!(strings.find_one("5").await.unwrap().get("uid"), Some(&json!("5")));
    }

    #[tokio::test]
    async fn test_bulk_patch_rejects_unaddressable_keys() {
        let service = seeded().await;
        let body = json!({
            "op": "Map",
            "data": [
                [1, {"op": "Del"}],
                ["9", {"op": "Ins", "data": {"uid": "9"}}]
            ]
        });
        let err = service.bulk_patch(body.to_string().as_bytes()).await.unwrap_err();
        assert_eq!(err.kind(), "bad_payload");
        assert_eq!(service.store().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_one_missing_is_backend_failure() {
        let service = seeded().await;
        service.delete_one("3").await.unwrap();
        assert_eq!(service.delete_one("3").await.unwrap_err().kind(), "backend_failure");
        assert_eq!(service.find_one("3").await.unwrap_err().kind(), "not_found");
    }

    #[tokio::test]
    async fn test_delete_by_index() {
        let service = seeded().await;
        assert_eq!(service.delete_by_index(&by_a("hello")).await.unwrap(), 2);
        assert_eq!(service.store().len(), 1);
    }

    #[tokio::test]
    async fn test_bulk_patch() {
        let service = seeded().await;
        let body = json!({
            "op": "Map",
            "data": [[1, {"op": "Mrg", "data": {"b": {"op": "Rpl", "data": "pizza"}}}]]
        });
        let response = service.bulk_patch(body.to_string().as_bytes()).await.unwrap();
        assert_eq!(response.count, 1);
        assert_eq!(service.find_one("1").await.unwrap().get("b"), Some(&json!("pizza")));
        assert_eq!(service.metrics().snapshot().records_patched, 1);
    }

    #[tokio::test]
    async fn test_bulk_patch_rejects_non_collection_patch() {
        let service = seeded().await;
        let err = service.bulk_patch(br#"{"op": "Del"}"#).await.unwrap_err();
        assert_eq!(err.kind(), "bad_payload");
        let err = service.bulk_patch(b"[1, 2, 3]").await.unwrap_err();
        assert_eq!(err.kind(), "bad_payload");
    }

    #[tokio::test]
    async fn test_metrics_track_outcomes() {
        let service = seeded().await;
        let _ = service.find_one("1").await;
        let _ = service.find_one("99").await;
        let _ = service.find_one("x").await;

        let snapshot = service.metrics().snapshot();
        assert_eq!(snapshot.upsert_one, 3);
        assert_eq!(snapshot.find_one, 3);
        assert_eq!(snapshot.not_found, 1);
        assert_eq!(snapshot.rejected, 1);
    }

    /// Store that fails every call and counts how often it was reached
    #[derive(Default)]
    struct BrokenStore {
        calls: AtomicUsize,
    }

    impl BrokenStore {
        fn fail<T>(&self) -> StoreResult<T> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Backend("connection refused".to_string()))
        }
    }

    #[async_trait]
    impl DocumentStore for BrokenStore {
        type Key = DocumentKey;
        type Record = JsonDocument;

        fn decode(&self, body: Value) -> Option<JsonDocument> {
            serde_json::from_value(body).ok()
        }

        fn decode_key(&self, raw: &Value) -> Option<DocumentKey> {
            serde_json::from_value(raw.clone()).ok()
        }

        fn key_of(&self, record: &JsonDocument) -> DocumentKey {
            record.key()
        }

        async fn find(&self, _key: &DocumentKey) -> StoreResult<JsonDocument> {
            self.fail()
        }

        async fn find_all(
            &self,
            _predicate: &Predicate<JsonDocument>,
            _value: &Value,
        ) -> StoreResult<Vec<JsonDocument>> {
            self.fail()
        }

        async fn upsert(&self, _record: JsonDocument) -> StoreResult<()> {
            self.fail()
        }

        async fn remove(&self, _key: &DocumentKey) -> StoreResult<()> {
            self.fail()
        }

        async fn remove_all(
            &self,
            _predicate: &Predicate<JsonDocument>,
            _value: &Value,
        ) -> StoreResult<usize> {
            self.fail()
        }

        async fn apply_patch(&self, _patch: &Patch) -> StoreResult<usize> {
            self.fail()
        }
    }

    #[tokio::test]
    async fn test_backend_failures_are_classified() {
        let service = RestService::new(Arc::new(BrokenStore::default()), registry());

        assert_eq!(service.find_one("1").await.unwrap_err().kind(), "backend_failure");
        assert_eq!(
            service.find_by_index(&by_a("hello")).await.unwrap_err().kind(),
            "backend_failure"
        );
        assert_eq!(
            service.upsert_one(br#"{"uid": 1}"#).await.unwrap_err().kind(),
            "backend_failure"
        );
        assert_eq!(service.delete_one("1").await.unwrap_err().kind(), "backend_failure");
        assert_eq!(
            service.delete_by_index(&by_a("hello")).await.unwrap_err().kind(),
            "backend_failure"
        );
        let body = json!({"op": "Map", "data": [[1, {"op": "Del"}]]});
        assert_eq!(
            service.bulk_patch(body.to_string().as_bytes()).await.unwrap_err().kind(),
            "backend_failure"
        );
        assert_eq!(service.metrics().snapshot().backend_failures, 6);
    }

    #[tokio::test]
    async fn test_bad_input_never_reaches_store() {
        let store = Arc::new(BrokenStore::default());
        let service = RestService::new(Arc::clone(&store), registry());

        let _ = service.find_one("not-a-number").await;
        let _ = service.delete_one("").await;
        let _ = service.upsert_one(b"nope").await;
        let _ = service.bulk_patch(b"nope").await;
        let _ = service.upsert_one(br#"{"uid": "7"}"#).await;
        let _ = service
            .bulk_patch(br#"{"op": "Map", "data": [["7", {"op": "Del"}]]}"#)
            .await;
        let _ = service
            .find_by_index(&IndexRequest::new("missing", Default::default()))
            .await;

        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }
}
