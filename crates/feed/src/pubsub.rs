//! Redis Pub/Sub transport for the notification change feed.
//!
//! Bridges row-insert events between processes: writers publish to Redis,
//! and each process re-broadcasts incoming events on a local channel that
//! notification centers subscribe to. Delivery is at-least-once; consumers
//! de-duplicate and reconcile.

use std::sync::Arc;

use async_trait::async_trait;
use fred::clients::{Client, SubscriberClient};
use fred::error::{Error as RedisError, ErrorKind as RedisErrorKind};
use fred::interfaces::{ClientLike, EventInterface, PubsubInterface};
use fred::types::config::Config as FredConfig;
use shipreg_common::{AppError, AppResult, config::RedisConfig};
use shipreg_core::services::{FeedEvent, FeedPublisher};
use shipreg_db::entities::notification;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Redis-backed change feed.
///
/// Every insert goes to a firehose channel and to the target user's own
/// channel, so a consumer can subscribe either broadly (back office) or to
/// exactly one user (a portal session).
#[derive(Clone)]
pub struct RedisFeed {
    publisher: Client,
    subscriber: SubscriberClient,
    prefix: String,
    /// Local broadcast channel for events received from Redis.
    local_tx: broadcast::Sender<FeedEvent>,
}

impl RedisFeed {
    /// Connect the publisher and subscriber clients.
    pub async fn new(config: &RedisConfig) -> Result<Self, RedisError> {
        let fred_config = FredConfig::from_url(&config.url)?;

        let publisher = Client::new(fred_config.clone(), None, None, None);
        publisher.init().await?;

        let subscriber = SubscriberClient::new(fred_config, None, None, None);
        subscriber.init().await?;

        let (local_tx, _) = broadcast::channel(1000);

        info!("Notification feed connected to Redis");

        Ok(Self {
            publisher,
            subscriber,
            prefix: config.prefix.clone(),
            local_tx,
        })
    }

    /// Subscribe to the firehose channel and start the decode loop.
    pub async fn start(&self) -> Result<(), RedisError> {
        self.subscriber.subscribe(self.firehose_channel()).await?;

        info!(channel = %self.firehose_channel(), "Subscribed to notification feed");

        let local_tx = self.local_tx.clone();
        let mut message_stream = self.subscriber.message_rx();

        tokio::spawn(async move {
            while let Ok(message) = message_stream.recv().await {
                if let Some(payload) = message.value.as_string() {
                    match serde_json::from_str::<FeedEvent>(&payload) {
                        Ok(event) => {
                            debug!(user_id = %event.user_id(), "Received feed event");
                            if local_tx.send(event).is_err() {
                                debug!("No local subscribers for feed event");
                            }
                        }
                        Err(e) => {
                            warn!("Failed to parse feed message: {}", e);
                        }
                    }
                }
            }
            info!("Feed message stream ended");
        });

        Ok(())
    }

    /// Subscribe to a single user's channel.
    pub async fn subscribe_user(&self, user_id: &str) -> Result<(), RedisError> {
        let channel = self.user_channel(user_id);
        self.subscriber.subscribe(&channel).await?;
        debug!(user_id, "Subscribed to user feed channel");
        Ok(())
    }

    /// Unsubscribe from a single user's channel.
    pub async fn unsubscribe_user(&self, user_id: &str) -> Result<(), RedisError> {
        let channel = self.user_channel(user_id);
        self.subscriber.unsubscribe(&channel).await?;
        debug!(user_id, "Unsubscribed from user feed channel");
        Ok(())
    }

    /// Publish an event to the firehose and the target user's channel.
    pub async fn publish(&self, event: &FeedEvent) -> Result<(), RedisError> {
        let payload = serde_json::to_string(event).map_err(|e| {
            RedisError::new(
                RedisErrorKind::InvalidArgument,
                format!("Serialization error: {e}"),
            )
        })?;

        let _: () = self
            .publisher
            .publish(self.firehose_channel(), payload.clone())
            .await?;
        let _: () = self
            .publisher
            .publish(self.user_channel(event.user_id()), payload)
            .await?;

        debug!(user_id = %event.user_id(), "Published feed event");
        Ok(())
    }

    /// Get a receiver for locally re-broadcast feed events.
    #[must_use]
    pub fn subscribe_local(&self) -> broadcast::Receiver<FeedEvent> {
        self.local_tx.subscribe()
    }

    /// Get the number of local subscribers.
    #[must_use]
    pub fn local_subscriber_count(&self) -> usize {
        self.local_tx.receiver_count()
    }

    /// Close both Redis connections. Local receivers see the stream end.
    pub async fn shutdown(&self) -> Result<(), RedisError> {
        self.subscriber.quit().await?;
        self.publisher.quit().await?;
        info!("Notification feed shut down");
        Ok(())
    }

    fn firehose_channel(&self) -> String {
        format!("{}:notifications", self.prefix)
    }

    fn user_channel(&self, user_id: &str) -> String {
        format!("{}:user:{}", self.prefix, user_id)
    }
}

/// Lets the writer service publish inserts without depending on this crate.
#[async_trait]
impl FeedPublisher for RedisFeed {
    async fn publish_notification_created(
        &self,
        notification: &notification::Model,
    ) -> AppResult<()> {
        self.publish(&FeedEvent::NotificationCreated {
            notification: notification.clone(),
        })
        .await
        .map_err(|e| AppError::Redis(e.to_string()))
    }
}

/// Build a shared [`FeedPublisher`] handle from a connected feed.
#[must_use]
pub fn into_publisher(feed: RedisFeed) -> Arc<dyn FeedPublisher> {
    Arc::new(feed)
}
