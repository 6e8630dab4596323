//! Key/value storage for the persisted local stores.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::ClientError;

/// Storage for serialized store snapshots, keyed by store name.
#[async_trait]
pub trait DraftStorage: Send + Sync {
    /// Read the snapshot stored under `key`, if any.
    async fn read(&self, key: &str) -> Result<Option<String>, ClientError>;

    /// Replace the snapshot stored under `key`.
    async fn write(&self, key: &str, contents: &str) -> Result<(), ClientError>;

    /// Delete the snapshot stored under `key`. Missing keys are not an error.
    async fn remove(&self, key: &str) -> Result<(), ClientError>;
}

/// One JSON file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl DraftStorage for FileStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, ClientError> {
        match tokio::fs::read_to_string(self.path(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, contents: &str) -> Result<(), ClientError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        // Replace atomically: write a sibling file, then rename over the target.
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), ClientError> {
        match tokio::fs::remove_file(self.path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local storage, used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl DraftStorage for MemoryStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn write(&self, key: &str, contents: &str) -> Result<(), ClientError> {
        self.entries
            .lock()
            .await
            .insert(key.to_owned(), contents.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), ClientError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
