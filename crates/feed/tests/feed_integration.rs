//! Redis feed integration tests.
//!
//! These tests require a running Redis instance.
//! Run with: `cargo test --test feed_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_REDIS_HOST` (default: localhost)
//!   `TEST_REDIS_PORT` (default: 6380)

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use shipreg_common::config::RedisConfig;
use shipreg_core::services::FeedPublisher;
use shipreg_db::entities::notification::{self, NotificationType};
use shipreg_db::test_utils::TestRedisConfig;
use shipreg_feed::RedisFeed;

fn redis_config() -> RedisConfig {
    RedisConfig {
        url: TestRedisConfig::default().redis_url(),
        prefix: "shipreg_test".to_string(),
    }
}

fn test_notification(id: &str, user_id: &str) -> notification::Model {
    notification::Model {
        id: id.to_string(),
        user_id: user_id.to_string(),
        title: "Certificate expiring".to_string(),
        message: "Renew before the end of the month".to_string(),
        notification_type: NotificationType::Deadline,
        link: None,
        is_read: false,
        created_at: chrono::Utc::now().into(),
        read_at: None,
    }
}

#[tokio::test]
#[ignore = "requires running Redis instance"]
async fn test_feed_connection() {
    let feed = RedisFeed::new(&redis_config()).await;
    assert!(feed.is_ok(), "Failed to connect to Redis: {:?}", feed.err());
}

#[tokio::test]
#[ignore = "requires running Redis instance"]
async fn test_feed_start_and_shutdown() {
    let feed = RedisFeed::new(&redis_config())
        .await
        .expect("Failed to connect to Redis");

    let result = feed.start().await;
    assert!(result.is_ok(), "Failed to subscribe: {:?}", result.err());

    feed.shutdown().await.expect("Failed to shutdown");
}

#[tokio::test]
#[ignore = "requires running Redis instance"]
async fn test_publish_reaches_local_subscriber() {
    let feed = RedisFeed::new(&redis_config())
        .await
        .expect("Failed to connect to Redis");
    feed.start().await.expect("Failed to subscribe");

    let mut rx = feed.subscribe_local();

    feed.publish_notification_created(&test_notification("itest-n1", "itest-user"))
        .await
        .expect("Failed to publish");

    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("Timed out waiting for feed event")
        .expect("Feed channel closed");
    assert_eq!(event.user_id(), "itest-user");

    feed.shutdown().await.expect("Failed to shutdown");
}
