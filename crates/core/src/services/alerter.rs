//! Side-effect port for notification arrival.
//!
//! The center triggers these in a fixed order when a notification arrives;
//! implementations own the presentation details (popup auto-dismiss,
//! permission prompting, badge rendering). Every call is best-effort: a
//! failure is logged by the caller and never rolls back the cache.

use async_trait::async_trait;
use shipreg_common::AppResult;
use shipreg_db::entities::notification;
use std::sync::Arc;

/// Trait for the user-facing side effects of a new notification.
#[async_trait]
pub trait Alerter: Send + Sync {
    /// Show a transient popup for the notification.
    async fn show_popup(&self, notification: &notification::Model) -> AppResult<()>;

    /// Play the alert sound.
    async fn play_sound(&self) -> AppResult<()>;

    /// Render the unread count (the portal annotates the page title).
    async fn set_unread_badge(&self, unread: u64) -> AppResult<()>;

    /// Raise a native desktop notification. Implementations must not block
    /// on permission prompts.
    async fn push_native(&self, notification: &notification::Model) -> AppResult<()>;
}

/// A no-op implementation of [`Alerter`] for headless use and tests.
#[derive(Clone, Default)]
pub struct NoOpAlerter;

#[async_trait]
impl Alerter for NoOpAlerter {
    async fn show_popup(&self, _notification: &notification::Model) -> AppResult<()> {
        Ok(())
    }

    async fn play_sound(&self) -> AppResult<()> {
        Ok(())
    }

    async fn set_unread_badge(&self, _unread: u64) -> AppResult<()> {
        Ok(())
    }

    async fn push_native(&self, _notification: &notification::Model) -> AppResult<()> {
        Ok(())
    }
}

/// Wrapper for boxed `Alerter` trait object.
pub type AlerterService = Arc<dyn Alerter>;
