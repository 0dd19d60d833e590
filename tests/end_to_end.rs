//! End-to-end tests over a real socket, using the Rust SDK.

use std::time::Duration;

use serde_json::json;
use student_records_sdk::{NewStudent, RecordsClient};

mod common;

#[tokio::test]
async fn test_student_lifecycle_over_http() {
    let server = common::spawn_server().await;
    let client = RecordsClient::new(&server.base_url);

    let health = client.health().await.unwrap();
    assert_eq!(health.status, 200);
    assert_eq!(health.body.message.as_deref(), Some("ok"));

    let created = client.create(&NewStudent::new("Alice", 87.0)).await.unwrap();
    assert_eq!(created.status, 201);
    let alice = created.body.data.unwrap();
    assert_eq!(alice.name, "Alice");
    assert_eq!(alice.marks, 87.0);

    let fetched = client.get(&alice.id).await.unwrap();
    assert_eq!(fetched.body.data.as_ref(), Some(&alice));

    let updated = client
        .update(&alice.id, &NewStudent::new("Alice", 93.5))
        .await
        .unwrap();
    assert_eq!(updated.status, 200);
    assert_eq!(updated.body.data.unwrap().marks, 93.5);

    client.create(&NewStudent::new("Bob", 70.0)).await.unwrap();
    client.create(&NewStudent::new("Alan", 99.0)).await.unwrap();

    let top = client.top_performers(Some(2)).await.unwrap().body.data.unwrap();
    let top_names: Vec<&str> = top.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(top_names, ["Alan", "Alice"]);

    let found = client.search("Al").await.unwrap().body.data.unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|s| s.name.starts_with("Al")));

    let deleted = client.delete(&alice.id).await.unwrap();
    assert_eq!(deleted.status, 200);
    assert!(deleted.body.success);

    let missing = client.get(&alice.id).await.unwrap();
    assert_eq!(missing.status, 404);
    assert!(!missing.body.success);
    assert_eq!(missing.body.message.as_deref(), Some("Student not found"));

    assert_eq!(client.list().await.unwrap().body.data.unwrap().len(), 2);

    server.shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server should stop after shutdown")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_validation_errors_over_http() {
    let server = common::spawn_server().await;
    let client = RecordsClient::new(&server.base_url);

    let missing = client.create_raw(&json!({"name": "Alice"})).await.unwrap();
    assert_eq!(missing.status, 400);
    assert_eq!(missing.body.error.as_deref(), Some("Validation error"));
    assert_eq!(missing.body.message.as_deref(), Some("Name and marks are required"));

    let out_of_range = client.create(&NewStudent::new("Alice", 101.0)).await.unwrap();
    assert_eq!(out_of_range.status, 400);
    assert_eq!(
        out_of_range.body.message.as_deref(),
        Some("Marks must be a number between 0 and 100")
    );

    let empty_search = client.search("").await.unwrap();
    assert_eq!(empty_search.status, 400);

    server.shutdown.trigger();
}
