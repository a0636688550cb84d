use super::{KeyValueCollection, Store};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// One fjall partition.
pub struct DiskCollection {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn new(keyspace: Keyspace, partition: PartitionHandle) -> Self {
        Self {
            keyspace,
            partition,
        }
    }

    fn persist(&self) -> Result<()> {
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist keyspace")
    }
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self.partition.get(key)?.map(|v| v.to_vec());
        debug!(key, found = value.is_some(), "Disk GET");
        Ok(value)
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.partition.insert(key, value)?;
        self.persist()?;
        debug!(key, "Disk PUT");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.partition.remove(key)?;
        self.persist()?;
        debug!(key, "Disk REMOVE");
        Ok(())
    }

    async fn entries(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let mut out = Vec::new();
        for item in self.partition.iter() {
            let (key, value) = item?;
            let key = String::from_utf8(key.to_vec()).context("Stored key is not UTF-8")?;
            out.push((key, value.to_vec()));
        }
        Ok(out)
    }

    async fn clear(&self) -> Result<()> {
        let keys = self
            .partition
            .keys()
            .collect::<Result<Vec<_>, _>>()?;
        for key in keys {
            self.partition.remove(key)?;
        }
        self.persist()?;
        debug!("Disk CLEAR");
        Ok(())
    }
}

/// Persistent store: a fjall keyspace with one partition per collection.
pub struct DiskStore {
    keyspace: Keyspace,
    collections: Mutex<HashMap<String, Arc<DiskCollection>>>,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open data store at {}", path.display()))?;
        Ok(Self {
            keyspace,
            collections: Mutex::new(HashMap::new()),
        })
    }
}

impl Store for DiskStore {
    fn collection(&self, name: &str) -> Result<Arc<dyn KeyValueCollection>> {
        let mut collections = self
            .collections
            .lock()
            .map_err(|_| anyhow!("Disk store lock poisoned"))?;
        if let Some(existing) = collections.get(name) {
            let existing: Arc<dyn KeyValueCollection> = existing.clone();
            return Ok(existing);
        }

        let partition = self
            .keyspace
            .open_partition(name, PartitionCreateOptions::default())
            .with_context(|| format!("Failed to open collection '{name}'"))?;
        let collection = Arc::new(DiskCollection::new(self.keyspace.clone(), partition));
        collections.insert(name.to_string(), collection.clone());
        let collection: Arc<dyn KeyValueCollection> = collection;
        Ok(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_disk_get_put() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path()).unwrap();
        let plans = store.collection("plans").unwrap();

        // Initially, collection is empty
        assert!(plans.get("2025-01").await.unwrap().is_none());

        plans.put("2025-01", b"{\"a\":1}".to_vec()).await.unwrap();
        assert_eq!(
            plans.get("2025-01").await.unwrap(),
            Some(b"{\"a\":1}".to_vec())
        );

        // Get a non-existent key
        assert!(plans.get("2025-02").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_disk_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = DiskStore::open(dir.path()).unwrap();
            let settings = store.collection("settings").unwrap();
            settings.put("settings", b"{}".to_vec()).await.unwrap();
        }

        let store = DiskStore::open(dir.path()).unwrap();
        let settings = store.collection("settings").unwrap();
        assert_eq!(
            settings.get("settings").await.unwrap(),
            Some(b"{}".to_vec())
        );
    }

    #[tokio::test]
    async fn test_disk_entries_remove_clear() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path()).unwrap();
        let incomes = store.collection("incomes").unwrap();

        incomes.put("incomes:2", vec![2]).await.unwrap();
        incomes.put("incomes:1", vec![1]).await.unwrap();
        let entries = incomes.entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "incomes:1");

        incomes.remove("incomes:1").await.unwrap();
        assert!(incomes.get("incomes:1").await.unwrap().is_none());

        incomes.clear().await.unwrap();
        assert!(incomes.entries().await.unwrap().is_empty());
    }
}
