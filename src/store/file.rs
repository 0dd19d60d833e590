//! Document store persisted to a JSON file.
//!
//! The whole store lives in memory and is rewritten to disk after each
//! mutation. Writes go to a sibling temp file first and are renamed into
//! place, so a crash never leaves a truncated data file behind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::store::memory::{MemoryStore, Snapshot};
use crate::store::{Document, DocumentStore, Fields, Query, StoreError};

pub struct JsonFileStore {
    memory: MemoryStore,
    path: PathBuf,
    /// Serializes mutate-then-write so the file never lags a later write.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store, loading existing contents if the file exists.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let memory = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => MemoryStore::new(),
            Ok(bytes) => {
                let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
                MemoryStore::from_snapshot(snapshot)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => MemoryStore::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            path = %path.display(),
            documents = memory.len(),
            "Loaded document store file"
        );

        Ok(Self {
            memory,
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(&self.memory.snapshot())?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!(path = %self.path.display(), "Persisted document store");
        Ok(())
    }

    /// Persist, or apply `undo` to memory if the write fails so memory
    /// never shows a change the file does not hold.
    async fn persist_or_undo(&self, undo: impl FnOnce(&MemoryStore)) -> Result<(), StoreError> {
        let result = self.persist().await;
        if let Err(e) = &result {
            tracing::warn!(path = %self.path.display(), error = %e, "Rolling back unpersisted change");
            undo(&self.memory);
        }
        result
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.memory.find(collection, id))
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<Document, StoreError> {
        let _guard = self.write_lock.lock().await;
        let doc = self.memory.insert_new(collection, fields);
        self.persist_or_undo(|memory| {
            memory.remove(collection, &doc.id);
        })
        .await?;
        Ok(doc)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Document, StoreError> {
        let _guard = self.write_lock.lock().await;
        let previous = self.memory.find(collection, id);
        let doc = self.memory.merge(collection, id, fields)?;
        self.persist_or_undo(|memory| {
            if let Some(previous) = previous {
                memory.put(collection, id, previous.fields);
            }
        })
        .await?;
        Ok(doc)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let Some(previous) = self.memory.find(collection, id) else {
            return Ok(());
        };
        self.memory.remove(collection, id);
        self.persist_or_undo(|memory| memory.put(collection, id, previous.fields))
            .await
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        Ok(self.memory.select(collection, query))
    }
}
