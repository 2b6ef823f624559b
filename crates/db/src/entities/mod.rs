//! Database entities.

#![allow(missing_docs)]

pub mod notification;
pub mod notification_settings;

pub use notification::Entity as Notification;
pub use notification_settings::Entity as NotificationSettings;
