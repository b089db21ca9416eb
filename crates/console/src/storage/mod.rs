//! Persistent local storage for the console.
//!
//! Plays the part of browser local storage: a small string map that
//! survives restarts. The session store keeps its credential here.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::{debug, warn};

use crate::errors::ConsoleError;

#[async_trait]
pub trait LocalStorage: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: &str) -> Result<(), ConsoleError>;
    async fn remove(&self, key: &str) -> Result<(), ConsoleError>;
}

fn storage_err(e: impl std::fmt::Display) -> ConsoleError {
    ConsoleError::Storage(e.to_string())
}

/// JSON file-backed storage. Every write replaces the whole file.
pub struct FileStorage {
    entries: RwLock<HashMap<String, String>>,
    path: PathBuf,
}

impl FileStorage {
    /// Open or create the file. Unreadable contents start over with an empty map.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ConsoleError> {
        let path = path.into();
        common::env::ensure_parent_dir(&path).await.map_err(storage_err)?;

        let entries = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "local storage unreadable, starting empty");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        let storage = Self { entries: RwLock::new(entries), path };
        storage.flush(&*storage.entries.read().await).await?;
        Ok(Arc::new(storage))
    }

    /// Write through a sibling temp file so a crash never leaves half a file.
    async fn flush(&self, entries: &HashMap<String, String>) -> Result<(), ConsoleError> {
        let data = serde_json::to_vec_pretty(entries).map_err(storage_err)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data).await.map_err(storage_err)?;
        fs::rename(&tmp, &self.path).await.map_err(storage_err)?;
        debug!(path = %self.path.display(), keys = entries.len(), "local storage flushed");
        Ok(())
    }
}

#[async_trait]
impl LocalStorage for FileStorage {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ConsoleError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), ConsoleError> {
        let mut entries = self.entries.write().await;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.flush(&entries).await
    }
}

/// In-process storage for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStorage {
    map: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl LocalStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Option<String> {
        self.map.lock().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ConsoleError> {
        self.map
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), ConsoleError> {
        self.map.lock().unwrap_or_else(PoisonError::into_inner).remove(key);
        Ok(())
    }
}
