//! Document store subsystem.
//!
//! # Data Flow
//! ```text
//! records service
//!     → Collection (binds a store to one collection, records metrics)
//!     → DocumentStore trait object
//!         → memory.rs    (dashmap, process-local)
//!         → file.rs      (memory + JSON file mirror)
//!         → firestore.rs (Cloud Firestore REST v1)
//! ```
//!
//! # Design Decisions
//! - The concrete backend is chosen once at startup from configuration
//!   and injected as `Arc<dyn DocumentStore>`
//! - Documents are schema-less `{id, fields}` pairs; typing happens in the
//!   records layer
//! - Each store call is a single round trip with no retries

pub mod file;
pub mod firestore;
pub mod memory;
pub mod query;
pub mod value;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{StoreBackend, StoreConfig};
use crate::observability::metrics;

pub use file::JsonFileStore;
pub use firestore::FirestoreStore;
pub use memory::MemoryStore;
pub use query::{Direction, FilterOp, Query, DOCUMENT_ID};
pub use value::{FieldValue, Fields};

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store-assigned id, unique within its collection.
    pub id: String,
    pub fields: Fields,
}

/// Failures of the backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document `{collection}/{id}` does not exist")]
    NotFound { collection: String, id: String },

    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store returned status {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("unexpected document shape: {0}")]
    UnexpectedShape(String),

    #[error("store file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid store configuration: {0}")]
    Config(String),
}

/// A schema-less document-collection database.
///
/// Every operation is scoped by collection name and performs exactly one
/// call against the backend.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// Fetch one document. Returns `None` if it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Insert a new document under a store-generated id.
    async fn add(&self, collection: &str, fields: Fields) -> Result<Document, StoreError>;

    /// Overwrite the given fields of an existing document, leaving other
    /// fields untouched. Fails with [`StoreError::NotFound`] if the
    /// document does not exist.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Document, StoreError>;

    /// Remove a document. Removing a missing document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Run a filtered, ordered, limited query.
    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError>;
}

/// A store bound to one collection.
#[derive(Clone)]
pub struct Collection {
    store: Arc<dyn DocumentStore>,
    name: Arc<str>,
}

impl Collection {
    pub fn new(store: Arc<dyn DocumentStore>, name: &str) -> Self {
        Self {
            store,
            name: Arc::from(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn get(&self, id: &str) -> Result<Option<Document>, StoreError> {
        let start = Instant::now();
        let result = self.store.get(&self.name, id).await;
        metrics::record_store_operation("get", result.is_ok(), start);
        result
    }

    pub async fn add(&self, fields: Fields) -> Result<Document, StoreError> {
        let start = Instant::now();
        let result = self.store.add(&self.name, fields).await;
        metrics::record_store_operation("add", result.is_ok(), start);
        result
    }

    pub async fn update(&self, id: &str, fields: Fields) -> Result<Document, StoreError> {
        let start = Instant::now();
        let result = self.store.update(&self.name, id, fields).await;
        metrics::record_store_operation("update", result.is_ok(), start);
        result
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let start = Instant::now();
        let result = self.store.delete(&self.name, id).await;
        metrics::record_store_operation("delete", result.is_ok(), start);
        result
    }

    pub async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let start = Instant::now();
        let result = self.store.query(&self.name, query).await;
        metrics::record_store_operation("query", result.is_ok(), start);
        result
    }
}

/// Build the configured store backend.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    let store: Arc<dyn DocumentStore> = match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File => Arc::new(JsonFileStore::open(&config.file_path).await?),
        StoreBackend::Firestore => Arc::new(FirestoreStore::new(&config.firestore)?),
    };

    tracing::info!(
        backend = store.backend(),
        collection = %config.collection,
        "Document store ready"
    );
    Ok(store)
}

/// Generate a 20 character alphanumeric document id.
pub fn auto_id() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    (0..20)
        .map(|_| ALPHABET[fastrand::usize(..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_id_shape() {
        let id = auto_id();
        assert_eq!(id.len(), 20);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(id, auto_id());
    }

    #[tokio::test]
    async fn test_collection_scopes_calls() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let students = Collection::new(store.clone(), "students");
        let courses = Collection::new(store, "courses");

        let mut fields = Fields::new();
        fields.insert("name".into(), "Alice".into());
        let doc = students.add(fields).await.unwrap();

        assert!(students.get(&doc.id).await.unwrap().is_some());
        assert!(courses.get(&doc.id).await.unwrap().is_none());
        assert_eq!(students.name(), "students");
    }
}
