pub mod backup;
pub mod disk;
pub mod ledger;
pub mod memory;

use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use disk::DiskStore;
use std::sync::Arc;
use tracing::debug;

/// A named collection of byte values.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
    /// All entries ordered by key.
    async fn entries(&self) -> Result<Vec<(String, Vec<u8>)>>;
    async fn clear(&self) -> Result<()>;
}

/// A thread-safe key-value store that can hold multiple collections.
pub trait Store: Send + Sync {
    /// Opens the collection, creating it when missing.
    fn collection(&self, name: &str) -> Result<Arc<dyn KeyValueCollection>>;
}

/// Opens the on-disk store under the configured data directory.
pub fn open_store(config: &AppConfig) -> Result<Arc<dyn Store>> {
    let path = config.default_data_path()?.join("ledger");
    std::fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create data directory: {}", path.display()))?;
    debug!("Opening store at {}", path.display());
    let store = DiskStore::open(&path)?;
    Ok(Arc::new(store))
}
