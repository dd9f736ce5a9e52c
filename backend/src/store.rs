//! History store
//!
//! The gateway keeps its history in an external document store reached
//! through `append`, `upsert` and `query`, plus `get` for keyed documents. Callers must not
//! assume durability or read-your-writes consistency.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::StoreBackend;
use crate::error::{AppError, AppResult};

/// Sort order for [`DocumentStore::query`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

impl OrderBy {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: false,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: true,
        }
    }
}

/// Collection/document store capability
#[axum::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Add a document under a generated key, returning the key
    async fn append(&self, collection: &str, record: Value) -> AppResult<String>;

    /// Create or replace the document stored under `key`
    async fn upsert(&self, collection: &str, key: &str, record: Value) -> AppResult<()>;

    /// Document stored under `key`, if any
    async fn get(&self, collection: &str, key: &str) -> AppResult<Option<Value>>;

    /// Documents carrying `order_by.field`, sorted, at most `limit` of them
    async fn query(&self, collection: &str, order_by: &OrderBy, limit: usize)
        -> AppResult<Vec<Value>>;

    /// Short name reported by the health endpoint
    fn backend_name(&self) -> &'static str;
}

/// Build the store selected in configuration
pub fn create_store(backend: StoreBackend) -> Arc<dyn DocumentStore> {
    match backend {
        StoreBackend::Log => Arc::new(LoggingStore),
        StoreBackend::Memory => Arc::new(MemoryStore::default()),
    }
}

// ============================================================================
// Typed helpers
// ============================================================================

/// Serialize and append a record
pub async fn append_record<T: Serialize>(
    store: &dyn DocumentStore,
    collection: &str,
    record: &T,
) -> AppResult<String> {
    let value = serde_json::to_value(record)
        .map_err(|e| AppError::StorageError(format!("failed to encode record: {}", e)))?;
    store.append(collection, value).await
}

/// Serialize and upsert a record
pub async fn upsert_record<T: Serialize>(
    store: &dyn DocumentStore,
    collection: &str,
    key: &str,
    record: &T,
) -> AppResult<()> {
    let value = serde_json::to_value(record)
        .map_err(|e| AppError::StorageError(format!("failed to encode record: {}", e)))?;
    store.upsert(collection, key, value).await
}

/// Fetch and decode the record stored under `key`. An undecodable document
/// counts as missing.
pub async fn get_record<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    key: &str,
) -> AppResult<Option<T>> {
    let Some(document) = store.get(collection, key).await? else {
        return Ok(None);
    };
    match serde_json::from_value(document) {
        Ok(record) => Ok(Some(record)),
        Err(e) => {
            tracing::warn!(collection, key, error = %e, "Skipping undecodable document");
            Ok(None)
        }
    }
}

/// Query and decode records. Documents that do not decode are skipped.
pub async fn query_records<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    order_by: &OrderBy,
    limit: usize,
) -> AppResult<Vec<T>> {
    let documents = store.query(collection, order_by, limit).await?;
    Ok(documents
        .into_iter()
        .filter_map(|doc| match serde_json::from_value(doc) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(collection, error = %e, "Skipping undecodable document");
                None
            }
        })
        .collect())
}

// ============================================================================
// LoggingStore
// ============================================================================

/// Stand-in store: logs every write and never returns anything
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingStore;

#[axum::async_trait]
impl DocumentStore for LoggingStore {
    async fn append(&self, collection: &str, record: Value) -> AppResult<String> {
        let key = Uuid::new_v4().to_string();
        tracing::info!(collection, %key, %record, "Store append (not persisted)");
        Ok(key)
    }

    async fn upsert(&self, collection: &str, key: &str, record: Value) -> AppResult<()> {
        tracing::info!(collection, key, %record, "Store upsert (not persisted)");
        Ok(())
    }

    async fn get(&self, collection: &str, key: &str) -> AppResult<Option<Value>> {
        tracing::debug!(collection, key, "Store get (always empty)");
        Ok(None)
    }

    async fn query(
        &self,
        collection: &str,
        order_by: &OrderBy,
        limit: usize,
    ) -> AppResult<Vec<Value>> {
        tracing::debug!(collection, field = %order_by.field, limit, "Store query (always empty)");
        Ok(Vec::new())
    }

    fn backend_name(&self) -> &'static str {
        "log"
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-process store, insertion ordered per collection
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<(String, Value)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

#[axum::async_trait]
impl DocumentStore for MemoryStore {
    async fn append(&self, collection: &str, record: Value) -> AppResult<String> {
        let key = Uuid::new_v4().to_string();
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push((key.clone(), record));
        Ok(key)
    }

    async fn upsert(&self, collection: &str, key: &str, record: Value) -> AppResult<()> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = record,
            None => docs.push((key.to_string(), record)),
        }
        Ok(())
    }

    async fn get(&self, collection: &str, key: &str) -> AppResult<Option<Value>> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.iter().find(|(k, _)| k == key))
            .map(|(_, doc)| doc.clone()))
    }

    async fn query(
        &self,
        collection: &str,
        order_by: &OrderBy,
        limit: usize,
    ) -> AppResult<Vec<Value>> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matching: Vec<&Value> = docs
            .iter()
            .map(|(_, doc)| doc)
            .filter(|doc| doc.get(&order_by.field).is_some())
            .collect();

        matching.sort_by(|a, b| {
            let ordering = compare_fields(&a[&order_by.field], &b[&order_by.field]);
            if order_by.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });

        Ok(matching.into_iter().take(limit).cloned().collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Numbers sort before strings; other kinds compare equal
fn compare_fields(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Number(_), Value::String(_)) => Ordering::Less,
        (Value::String(_), Value::Number(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_orders_and_limits() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            for ts in [3, 1, 5, 2, 4] {
                store.append("weather_history", json!({ "timestamp": ts })).await.unwrap();
            }

            let newest = store
                .query("weather_history", &OrderBy::desc("timestamp"), 3)
                .await
                .unwrap();
            let stamps: Vec<_> = newest.iter().map(|d| d["timestamp"].as_i64().unwrap()).collect();
            assert_eq!(stamps, vec![5, 4, 3]);

            let oldest = store
                .query("weather_history", &OrderBy::asc("timestamp"), 2)
                .await
                .unwrap();
            let stamps: Vec<_> = oldest.iter().map(|d| d["timestamp"].as_i64().unwrap()).collect();
            assert_eq!(stamps, vec![1, 2]);
        });
    }

    #[test]
    fn test_query_skips_documents_without_field() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            store.append("c", json!({ "timestamp": 1 })).await.unwrap();
            store.append("c", json!({ "other": 2 })).await.unwrap();

            let docs = store.query("c", &OrderBy::asc("timestamp"), 10).await.unwrap();
            assert_eq!(docs.len(), 1);
        });
    }

    #[test]
    fn test_upsert_replaces_by_key() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            store.upsert("latest_status", "jakarta", json!({ "v": 1 })).await.unwrap();
            store.upsert("latest_status", "jakarta", json!({ "v": 2 })).await.unwrap();

            assert_eq!(store.len("latest_status").await, 1);
            assert_eq!(
                store.get("latest_status", "jakarta").await.unwrap(),
                Some(json!({ "v": 2 }))
            );
            assert_eq!(store.get("latest_status", "bandung").await.unwrap(), None);
        });
    }

    #[test]
    fn test_unknown_collection_is_empty() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            let docs = store.query("missing", &OrderBy::desc("timestamp"), 5).await.unwrap();
            assert!(docs.is_empty());
        });
    }

    #[test]
    fn test_logging_store_never_returns_documents() {
        tokio_test::block_on(async {
            let store = LoggingStore;
            store.append("c", json!({ "timestamp": 1 })).await.unwrap();
            let docs = store.query("c", &OrderBy::desc("timestamp"), 5).await.unwrap();
            assert!(docs.is_empty());
            assert_eq!(store.backend_name(), "log");
        });
    }
}
