use std::collections::HashMap;
use std::io::Write;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::store::TokenStore;
use crate::helpers::time;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FileEntry {
    value: Value,
    expires_at: i64, // UNIX timestamp
}

/// Store backed by one JSON document on disk.
///
/// Every process pointed at the same path sees the same entries. Writes are
/// atomic (unique tmp file, then rename), last write wins, and the file is
/// readable by the owner only.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    // serializes read-modify-write cycles within this process
    write_lock: Arc<Mutex<()>>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<HashMap<String, FileEntry>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("cannot read token store {}", self.path.display()))
            }
        };
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "token store is corrupted, ignoring its content");
                Ok(HashMap::new())
            }
        }
    }

    async fn write_entries(&self, entries: &HashMap<String, FileEntry>) -> Result<()> {
        let bytes = serde_json::to_vec(entries)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || persist_atomically(&path, &bytes)).await??;
        debug!(path = %self.path.display(), "token store written");
        Ok(())
    }
}

/// Each write gets its own owner-only temp file next to the target, then
/// replaces it with a rename. Concurrent writers never share a temp file.
fn persist_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("cannot create temp file in {}", parent.display()))?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("cannot replace token store {}", path.display()))?;
    Ok(())
}

impl TokenStore for FileTokenStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let now = time::now_i64();
        Ok(self
            .read_entries()
            .await?
            .remove(key)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.value))
    }

    async fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let now = time::now();
        let mut entries = self.read_entries().await?;
        entries.retain(|_, entry| now.timestamp() < entry.expires_at);
        entries.insert(
            key.to_owned(),
            FileEntry {
                value,
                expires_at: time::expires_after(now, ttl).timestamp(),
            },
        );
        self.write_entries(&entries).await
    }

    async fn has(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
