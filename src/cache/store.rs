//! Key-value capability the token cache persists its record in.

use std::time::Duration;

use anyhow::Result;
use serde_json::Value;

use crate::cache::file_store::FileTokenStore;
use crate::cache::memory_store::MemoryTokenStore;
use crate::config::settings::TokenStoreConfig;

/// External key-value store with per entry ttl.
///
/// Entries past their ttl must read as absent. Implementations may be shared
/// between several clients or processes; last write wins.
pub trait TokenStore {
    fn get(&self, key: &str) -> impl std::future::Future<Output = Result<Option<Value>>> + Send;

    fn put(
        &self,
        key: &str,
        value: Value,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn has(&self, key: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
}

/// Store selected by configuration
#[derive(Debug, Clone)]
pub enum TokenStoreKind {
    Memory(MemoryTokenStore),
    File(FileTokenStore),
}

impl TokenStoreKind {
    pub fn from_config(config: &TokenStoreConfig) -> Self {
        match config {
            TokenStoreConfig::Memory => TokenStoreKind::Memory(MemoryTokenStore::new()),
            TokenStoreConfig::File { path } => TokenStoreKind::File(FileTokenStore::new(path)),
        }
    }
}

impl TokenStore for TokenStoreKind {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        match self {
            TokenStoreKind::Memory(s) => s.get(key).await,
            TokenStoreKind::File(s) => s.get(key).await,
        }
    }

    async fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<()> {
        match self {
            TokenStoreKind::Memory(s) => s.put(key, value, ttl).await,
            TokenStoreKind::File(s) => s.put(key, value, ttl).await,
        }
    }

    async fn has(&self, key: &str) -> Result<bool> {
        match self {
            TokenStoreKind::Memory(s) => s.has(key).await,
            TokenStoreKind::File(s) => s.has(key).await,
        }
    }
}
