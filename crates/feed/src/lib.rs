//! Redis change-feed transport for shipreg notifications.
//!
//! - **Pub/Sub**: firehose plus per-user channels
//! - **Local fan-out**: a broadcast channel per process for centers

pub mod pubsub;

pub use pubsub::{RedisFeed, into_publisher};
