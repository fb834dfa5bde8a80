use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

use super::types::{CacheStore, InMemoryCacheStore};

const CACHE_PREFIX: &str = "cache";

impl InMemoryCacheStore {
    pub(crate) fn new() -> Self {
        tracing::info!("Creating new in-memory generic cache store");
        Self {
            entry: HashMap::new(),
        }
    }

    fn make_key(prefix: &str, key: &str) -> String {
        format!("{CACHE_PREFIX}:{prefix}:{key}")
    }

    fn live_value(entry: &(CacheData, Option<chrono::DateTime<Utc>>)) -> Option<CacheData> {
        match entry.1 {
            Some(expires_at) if Utc::now() > expires_at => None,
            _ => Some(entry.0.clone()),
        }
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(()) // Nothing to initialize for in-memory store
    }

    async fn put(&mut self, prefix: &str, key: &str, value: CacheData) -> Result<(), StorageError> {
        let key = Self::make_key(prefix, key);
        self.entry.insert(key, (value, None));
        Ok(())
    }

    async fn put_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<(), StorageError> {
        let key = Self::make_key(prefix, key);
        let expires_at = Utc::now() + Duration::seconds(ttl as i64);
        self.entry.insert(key, (value, Some(expires_at)));
        Ok(())
    }

    async fn get(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError> {
        let key = Self::make_key(prefix, key);
        Ok(self.entry.get(&key).and_then(Self::live_value))
    }

    async fn take(&mut self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError> {
        let key = Self::make_key(prefix, key);
        Ok(self.entry.remove(&key).as_ref().and_then(Self::live_value))
    }

    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError> {
        let key = Self::make_key(prefix, key);
        self.entry.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(value: &str) -> CacheData {
        CacheData {
            value: value.to_string(),
        }
    }

    #[test]
    fn test_make_key() {
        assert_eq!(
            InMemoryCacheStore::make_key("oauth2", "oauth2state_abc"),
            "cache:oauth2:oauth2state_abc"
        );
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let mut store = InMemoryCacheStore::new();

        store.put("test", "key1", data("test value")).await.unwrap();

        let retrieved = store.get("test", "key1").await.unwrap();
        assert_eq!(retrieved.unwrap().value, "test value");
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store = InMemoryCacheStore::new();
        assert!(store.get("test", "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_with_ttl_expires() {
        let mut store = InMemoryCacheStore::new();

        store
            .put_with_ttl("test", "key2", data("short lived"), 60)
            .await
            .unwrap();
        assert!(store.get("test", "key2").await.unwrap().is_some());

        // Force the entry into the past
        let key = InMemoryCacheStore::make_key("test", "key2");
        if let Some(entry) = store.entry.get_mut(&key) {
            entry.1 = Some(Utc::now() - Duration::seconds(1));
        }
        assert!(store.get("test", "key2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_take_removes_entry() {
        let mut store = InMemoryCacheStore::new();

        store
            .put_with_ttl("test", "key3", data("one shot"), 60)
            .await
            .unwrap();

        let first = store.take("test", "key3").await.unwrap();
        assert_eq!(first.unwrap().value, "one shot");

        let second = store.take("test", "key3").await.unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_remove() {
        let mut store = InMemoryCacheStore::new();

        store.put("test", "key4", data("to remove")).await.unwrap();
        store.remove("test", "key4").await.unwrap();

        assert!(store.get("test", "key4").await.unwrap().is_none());
    }
}
