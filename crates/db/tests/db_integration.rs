//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `shipreg_test`)
//!   `TEST_DB_PASSWORD` (default: `shipreg_test`)
//!   `TEST_DB_NAME` (default: `shipreg_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use sea_orm::Set;
use shipreg_common::IdGenerator;
use shipreg_db::entities::notification::{self, NotificationType};
use shipreg_db::repositories::NotificationRepository;
use shipreg_db::test_utils::{TestDatabase, TestDbConfig, TestRedisConfig};

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_cleanup() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    let result = db.cleanup().await;
    assert!(result.is_ok(), "Cleanup failed: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_notification_round_trip() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.cleanup().await.expect("Cleanup failed");

    let repo = NotificationRepository::new(Arc::clone(db.connection()));
    let id = IdGenerator::new().generate();

    let created = repo
        .create(notification::ActiveModel {
            id: Set(id.clone()),
            user_id: Set("itest-user".to_string()),
            title: Set("Survey booked".to_string()),
            message: Set("Hull survey booked for next week".to_string()),
            notification_type: Set(NotificationType::Reminder),
            link: Set(None),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
            read_at: Set(None),
        })
        .await
        .expect("Insert failed");
    assert_eq!(created.id, id);
    assert!(!created.is_read);

    assert_eq!(repo.count_unread("itest-user").await.unwrap(), 1);
    assert!(repo.mark_as_read(&id).await.unwrap());
    assert_eq!(repo.count_unread("itest-user").await.unwrap(), 0);

    let rows = repo.find_by_user("itest-user", 10).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_read);
    assert!(rows[0].read_at.is_some());

    assert_eq!(repo.delete_all_for_user("itest-user").await.unwrap(), 1);
    db.cleanup().await.expect("Cleanup failed");
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_redis_config_from_env() {
    let config = TestRedisConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
}

#[test]
fn test_database_url_format() {
    let config = TestDbConfig {
        host: "testhost".to_string(),
        port: 5432,
        username: "testuser".to_string(),
        password: "testpass".to_string(),
        database: "testdb".to_string(),
    };

    let url = config.database_url();
    assert!(url.starts_with("postgres://"));
    assert!(url.contains("testhost"));
    assert!(url.contains("5432"));
    assert!(url.contains("testuser"));
    assert!(url.contains("testdb"));
}
