//! Notification domain services.

pub mod alerter;
pub mod center;
pub mod feed;
pub mod notification;

pub use alerter::{Alerter, AlerterService, NoOpAlerter};
pub use center::{NotificationCenter, NotificationObserver, ObserverId};
pub use feed::{FeedEvent, FeedPublisher, FeedPublisherService, NoOpFeedPublisher};
pub use notification::{CreateNotificationInput, NotificationService};
