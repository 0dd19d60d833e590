//! In-process document store.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::store::{auto_id, Document, DocumentStore, Fields, Query, StoreError};

/// Collection name → (document id → fields).
pub type Snapshot = BTreeMap<String, BTreeMap<String, Fields>>;

/// A thread-safe document store held entirely in memory.
///
/// Each collection sits behind one `DashMap` entry, so every operation on a
/// collection observes a consistent view of it.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<DashMap<String, BTreeMap<String, Fields>>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a previously taken snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let store = Self::new();
        for (name, documents) in snapshot {
            store.collections.insert(name, documents);
        }
        store
    }

    /// Copy out every collection.
    pub fn snapshot(&self) -> Snapshot {
        self.collections
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Total number of documents across all collections.
    pub fn len(&self) -> usize {
        self.collections.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn find(&self, collection: &str, id: &str) -> Option<Document> {
        let documents = self.collections.get(collection)?;
        documents.get(id).map(|fields| Document {
            id: id.to_owned(),
            fields: fields.clone(),
        })
    }

    pub(crate) fn insert_new(&self, collection: &str, fields: Fields) -> Document {
        let mut documents = self.collections.entry(collection.to_owned()).or_default();
        let mut id = auto_id();
        while documents.contains_key(&id) {
            id = auto_id();
        }
        documents.insert(id.clone(), fields.clone());
        Document { id, fields }
    }

    pub(crate) fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Document, StoreError> {
        let not_found = || StoreError::NotFound {
            collection: collection.to_owned(),
            id: id.to_owned(),
        };

        let mut documents = self.collections.get_mut(collection).ok_or_else(not_found)?;
        let existing = documents.get_mut(id).ok_or_else(not_found)?;
        existing.extend(fields);

        Ok(Document {
            id: id.to_owned(),
            fields: existing.clone(),
        })
    }

    /// Write `fields` under `id` verbatim, replacing any existing document.
    pub(crate) fn put(&self, collection: &str, id: &str, fields: Fields) {
        self.collections
            .entry(collection.to_owned())
            .or_default()
            .insert(id.to_owned(), fields);
    }

    pub(crate) fn remove(&self, collection: &str, id: &str) -> bool {
        self.collections
            .get_mut(collection)
            .is_some_and(|mut documents| documents.remove(id).is_some())
    }

    pub(crate) fn select(&self, collection: &str, query: &Query) -> Vec<Document> {
        let Some(documents) = self.collections.get(collection) else {
            return Vec::new();
        };
        let scan: Vec<Document> = documents
            .iter()
            .map(|(id, fields)| Document {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect();
        drop(documents);

        query.apply(scan)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.find(collection, id))
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<Document, StoreError> {
        Ok(self.insert_new(collection, fields))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Document, StoreError> {
        self.merge(collection, id, fields)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.remove(collection, id);
        Ok(())
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        Ok(self.select(collection, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Direction, FieldValue};

    fn fields(name: &str, marks: i64) -> Fields {
        let mut fields = Fields::new();
        fields.insert("name".into(), name.into());
        fields.insert("marks".into(), marks.into());
        fields
    }

    #[tokio::test]
    async fn test_add_get_delete() {
        let store = MemoryStore::new();
        let doc = store.add("students", fields("Alice", 87)).await.unwrap();

        let fetched = store.get("students", &doc.id).await.unwrap().unwrap();
        assert_eq!(fetched, doc);

        store.delete("students", &doc.id).await.unwrap();
        assert!(store.get("students", &doc.id).await.unwrap().is_none());

        // Deleting again is not an error.
        store.delete("students", &doc.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemoryStore::new();
        let mut initial = fields("Alice", 87);
        initial.insert("house".into(), "Gryffindor".into());
        let doc = store.add("students", initial).await.unwrap();

        let updated = store
            .update("students", &doc.id, fields("Alicia", 92))
            .await
            .unwrap();

        assert_eq!(updated.id, doc.id);
        assert_eq!(updated.fields["name"], FieldValue::from("Alicia"));
        assert_eq!(updated.fields["marks"], FieldValue::from(92i64));
        assert_eq!(updated.fields["house"], FieldValue::from("Gryffindor"));
    }

    #[tokio::test]
    async fn test_update_missing_document() {
        let store = MemoryStore::new();
        let err = store
            .update("students", "missing", fields("Nobody", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_query_and_snapshot_round_trip() {
        let store = MemoryStore::new();
        for (name, marks) in [("A", 50), ("B", 90), ("C", 70)] {
            store.add("students", fields(name, marks)).await.unwrap();
        }

        let query = Query::new().order_by("marks", Direction::Descending).limit(2);
        let top = store.query("students", &query).await.unwrap();
        let names: Vec<_> = top.iter().map(|d| d.fields["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["B", "C"]);

        let restored = MemoryStore::from_snapshot(store.snapshot());
        assert_eq!(restored.len(), 3);
        assert!(restored.query("courses", &Query::new()).await.unwrap().is_empty());
    }
}
