use super::{KeyValueCollection, Store};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory collection backed by a sorted map.
#[derive(Default)]
pub struct MemoryCollection {
    inner: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueCollection for MemoryCollection {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let map = self.inner.lock().await;
        let value = map.get(key).cloned();
        debug!(key, found = value.is_some(), "Memory GET");
        Ok(value)
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut map = self.inner.lock().await;
        debug!(key, "Memory PUT");
        map.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.inner.lock().await;
        map.remove(key);
        debug!(key, "Memory REMOVE");
        Ok(())
    }

    async fn entries(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let map = self.inner.lock().await;
        Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    async fn clear(&self) -> Result<()> {
        let mut map = self.inner.lock().await;
        map.clear();
        debug!("Memory CLEAR");
        Ok(())
    }
}

/// Volatile store; contents are lost when dropped.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Arc<MemoryCollection>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn collection(&self, name: &str) -> Result<Arc<dyn KeyValueCollection>> {
        if let Some(existing) = self
            .collections
            .read()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?
            .get(name)
        {
            let existing: Arc<dyn KeyValueCollection> = existing.clone();
            return Ok(existing);
        }

        let mut collections = self
            .collections
            .write()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?;
        let collection: Arc<dyn KeyValueCollection> = collections
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryCollection::new()))
            .clone();
        Ok(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collection_get_put() {
        let store = MemoryStore::new();
        let plans = store.collection("plans").unwrap();

        // Initially, collection is empty
        assert!(plans.get("2025-01").await.unwrap().is_none());

        plans.put("2025-01", b"{}".to_vec()).await.unwrap();
        assert_eq!(plans.get("2025-01").await.unwrap(), Some(b"{}".to_vec()));

        // Same name yields the same collection
        let again = store.collection("plans").unwrap();
        assert!(again.get("2025-01").await.unwrap().is_some());

        // Collections are isolated
        let actuals = store.collection("actuals").unwrap();
        assert!(actuals.get("2025-01").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_collection_entries_sorted() {
        let collection = MemoryCollection::new();
        collection.put("b", vec![2]).await.unwrap();
        collection.put("a", vec![1]).await.unwrap();

        let keys: Vec<String> = collection
            .entries()
            .await
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_collection_remove_and_clear() {
        let collection = MemoryCollection::new();
        collection.put("key1", vec![1]).await.unwrap();
        collection.put("key2", vec![2]).await.unwrap();

        collection.remove("key1").await.unwrap();
        assert!(collection.get("key1").await.unwrap().is_none());

        collection.clear().await.unwrap();
        assert!(collection.entries().await.unwrap().is_empty());
    }
}
