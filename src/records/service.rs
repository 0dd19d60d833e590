//! Student record operations over a document collection.
//!
//! Each operation performs exactly one store call and maps the resulting
//! documents into [`StudentRecord`]s.

use chrono::Utc;

use crate::records::model::{StudentInput, StudentRecord, MARKS, NAME, TIMESTAMP};
use crate::store::{Collection, Direction, Query, StoreError, DOCUMENT_ID};

#[derive(Clone)]
pub struct StudentService {
    students: Collection,
}

impl StudentService {
    pub fn new(students: Collection) -> Self {
        Self { students }
    }

    /// All records, newest first.
    pub async fn list(&self) -> Result<Vec<StudentRecord>, StoreError> {
        let query = Query::new().order_by(TIMESTAMP, Direction::Descending);
        self.fetch(&query).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<StudentRecord>, StoreError> {
        self.students
            .get(id)
            .await?
            .map(StudentRecord::try_from)
            .transpose()
    }

    pub async fn create(&self, input: StudentInput) -> Result<StudentRecord, StoreError> {
        let doc = self.students.add(input.into_fields(Utc::now())).await?;
        let record = StudentRecord::try_from(doc)?;
        tracing::debug!(id = %record.id, "Student created");
        Ok(record)
    }

    /// Overwrite name and marks and restamp. Fails with
    /// [`StoreError::NotFound`] when `id` does not exist.
    pub async fn update(&self, id: &str, input: StudentInput) -> Result<StudentRecord, StoreError> {
        let doc = self.students.update(id, input.into_fields(Utc::now())).await?;
        StudentRecord::try_from(doc)
    }

    /// Remove a record. Removing an unknown id is not an error.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.students.delete(id).await
    }

    /// Up to `limit` records by marks descending; equal marks are ordered
    /// by id ascending.
    pub async fn top_performers(&self, limit: usize) -> Result<Vec<StudentRecord>, StoreError> {
        let query = Query::new()
            .order_by(MARKS, Direction::Descending)
            .order_by(DOCUMENT_ID, Direction::Ascending)
            .limit(limit);
        self.fetch(&query).await
    }

    /// Records whose name starts with `prefix` (case-sensitive).
    pub async fn search(&self, prefix: &str) -> Result<Vec<StudentRecord>, StoreError> {
        let query = Query::new().prefix(NAME, prefix);
        self.fetch(&query).await
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<StudentRecord>, StoreError> {
        self.students
            .query(query)
            .await?
            .into_iter()
            .map(StudentRecord::try_from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::records::model::Marks;
    use crate::store::MemoryStore;

    fn service() -> StudentService {
        StudentService::new(Collection::new(Arc::new(MemoryStore::new()), "students"))
    }

    fn input(name: &str, marks: f64) -> StudentInput {
        StudentInput {
            name: name.into(),
            marks: Marks::new(marks).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let service = service();
        let created = service.create(input("Alice", 87.0)).await.unwrap();
        let fetched = service.get(&created.id).await.unwrap().unwrap();
        assert_eq!(created, fetched);
    }

    #[tokio::test]
    async fn test_update_restamps_and_keeps_id() {
        let service = service();
        let created = service.create(input("Alice", 87.0)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        let updated = service.update(&created.id, input("Alice B", 91.0)).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Alice B");
        assert!(updated.timestamp > created.timestamp);
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let err = service().update("nope", input("X", 1.0)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let service = service();
        let first = service.create(input("First", 10.0)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = service.create(input("Second", 20.0)).await.unwrap();

        let ids: Vec<_> = service.list().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_top_performers_tie_break() {
        let service = service();
        let mut tied = Vec::new();
        for name in ["A", "B", "C"] {
            tied.push(service.create(input(name, 80.0)).await.unwrap().id);
        }
        service.create(input("D", 95.5)).await.unwrap();
        tied.sort();

        let top = service.top_performers(3).await.unwrap();
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].name, "D");
        assert_eq!(top[1].id, tied[0]);
        assert_eq!(top[2].id, tied[1]);
    }

    #[tokio::test]
    async fn test_search_prefix() {
        let service = service();
        for name in ["Alice", "Alan", "alice", "Bob"] {
            service.create(input(name, 50.0)).await.unwrap();
        }

        let mut names: Vec<_> = service
            .search("Al")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["Alan", "Alice"]);
    }
}
