//! Cache collaborator.
//!
//! [`CacheStore`] is the narrow interface the cache stages use. [`InMemoryStore`]
//! is a minimal unbounded implementation; eviction and invalidation are left to
//! richer stores.

use std::collections::{HashMap, HashSet};
use std::future::{self, Future};
use std::sync::{PoisonError, RwLock};

use graphwire_core::{CacheKey, Result};
use serde_json::Value;

/// A cached operation result.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheRecord {
    /// The `data` object as received from the server.
    pub data: Value,
    /// Keys the data depends on.
    pub dependent_keys: HashSet<CacheKey>,
}

/// Keyed storage for operation results.
pub trait CacheStore: Send + Sync + 'static {
    /// Read the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn read(&self, key: &str) -> impl Future<Output = Result<Option<CacheRecord>>> + Send;

    /// Store `record` under `key`, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn write(&self, key: CacheKey, record: CacheRecord) -> impl Future<Output = Result<()>> + Send;
}

/// Unbounded in-memory [`CacheStore`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<CacheKey, CacheRecord>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every record.
    pub fn clear(&self) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl CacheStore for InMemoryStore {
    fn read(&self, key: &str) -> impl Future<Output = Result<Option<CacheRecord>>> + Send {
        let record = self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned();
        future::ready(Ok(record))
    }

    fn write(&self, key: CacheKey, record: CacheRecord) -> impl Future<Output = Result<()>> + Send {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, record);
        future::ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn write_then_read() {
        let store = InMemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.read("QUERY_ROOT.Hero:abc").await.expect("read"), None);

        let record = CacheRecord {
            data: json!({ "hero": { "name": "R2-D2" } }),
            dependent_keys: HashSet::from(["QUERY_ROOT.hero".to_string()]),
        };
        store
            .write("QUERY_ROOT.Hero:abc".to_string(), record.clone())
            .await
            .expect("write");

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.read("QUERY_ROOT.Hero:abc").await.expect("read"),
            Some(record)
        );

        store.clear();
        assert!(store.is_empty());
    }
}
