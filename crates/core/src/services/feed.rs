//! Change-feed events and the publishing port.
//!
//! The feed carries row-insert events from whichever transport the host
//! wires in (Redis Pub/Sub in this workspace); the actual implementation
//! lives in the feed crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shipreg_common::AppResult;
use shipreg_db::entities::notification;
use std::sync::Arc;

/// Events delivered over the notification change feed.
///
/// Insert events carry the full row so consumers can mirror it into their
/// cache without a round trip to the store. Delivery is at-least-once and
/// unordered across partitions; consumers de-duplicate by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FeedEvent {
    /// A notification row was inserted.
    NotificationCreated {
        /// The inserted row.
        notification: notification::Model,
    },
}

impl FeedEvent {
    /// The user the event is scoped to.
    #[must_use]
    pub fn user_id(&self) -> &str {
        match self {
            Self::NotificationCreated { notification } => &notification.user_id,
        }
    }
}

/// Trait for publishing change-feed events.
///
/// Lets the writer service publish inserts without depending on the
/// transport implementation.
#[async_trait]
pub trait FeedPublisher: Send + Sync {
    /// Publish a notification-created event.
    async fn publish_notification_created(
        &self,
        notification: &notification::Model,
    ) -> AppResult<()>;
}

/// A no-op implementation of [`FeedPublisher`] for testing or when
/// real-time delivery is disabled.
#[derive(Clone, Default)]
pub struct NoOpFeedPublisher;

#[async_trait]
impl FeedPublisher for NoOpFeedPublisher {
    async fn publish_notification_created(
        &self,
        _notification: &notification::Model,
    ) -> AppResult<()> {
        Ok(())
    }
}

/// Wrapper for boxed `FeedPublisher` trait object.
pub type FeedPublisherService = Arc<dyn FeedPublisher>;
