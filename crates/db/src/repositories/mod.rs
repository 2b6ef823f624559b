//! Database repositories.

pub mod notification;
pub mod notification_settings;

pub use notification::NotificationRepository;
pub use notification_settings::{NotificationSettingsRepository, SettingsUpdate};
