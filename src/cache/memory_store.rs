use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::cache::store::TokenStore;
use crate::helpers::time;

#[derive(Debug, Clone)]
struct StoredEntry {
    value: Value,
    expires_at: DateTime<Utc>,
}

/// In-process store: key -> (value, expiration). Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    inner: Arc<RwLock<HashMap<String, StoredEntry>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Expiration of a live entry
    pub async fn expires_at(&self, key: &str) -> Option<DateTime<Utc>> {
        let now = time::now();
        self.inner
            .read()
            .await
            .get(key)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.expires_at)
    }
}

impl TokenStore for MemoryTokenStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let now = time::now();
        let map = self.inner.read().await;
        Ok(map
            .get(key)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.value.clone()))
    }

    async fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<()> {
        let expires_at = time::expires_after(time::now(), ttl);
        let mut map = self.inner.write().await;
        map.insert(key.to_owned(), StoredEntry { value, expires_at });
        Ok(())
    }

    async fn has(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
