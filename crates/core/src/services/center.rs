//! Per-user notification center.
//!
//! Maintains an in-memory, eventually-consistent mirror of a user's
//! notifications: one bulk load at startup, live inserts from the change
//! feed, a periodic reconciliation tick for the unread count, and a full
//! reload whenever the host signals that the page became visible again
//! (feed subscriptions may have been suspended while backgrounded).
//!
//! Mutations go remote-first: the cache is only updated after the store
//! confirms the write, so the UI never shows read state that did not
//! persist. Store failures are logged and surfaced as `false`; they never
//! escape as errors to observers.

use crate::services::alerter::AlerterService;
use crate::services::feed::FeedEvent;
use chrono::Utc;
use shipreg_common::{AppError, AppResult, CurrentUser, NotificationConfig};
use shipreg_db::{
    entities::notification,
    repositories::{NotificationRepository, NotificationSettingsRepository, SettingsUpdate},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, RwLock};
use std::time::Duration;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Observer callback: receives a snapshot of the cache and the unread
/// count. The slice is only valid for the duration of the call.
pub type NotificationObserver = Box<dyn Fn(&[notification::Model], u64) + Send + Sync>;

/// Handle for unregistering an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverId(u64);

/// Locally mirrored side-effect preferences, readable synchronously by the
/// dispatch path.
#[derive(Debug, Clone, Copy)]
struct Preferences {
    sound_enabled: bool,
    desktop_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            desktop_enabled: true,
        }
    }
}

/// Cache state. A single async mutex serializes every mutation, so
/// handlers run to completion without interleaving.
#[derive(Default)]
struct CacheState {
    /// Ordered by `created_at` descending; feed arrivals are prepended.
    notifications: Vec<notification::Model>,
    /// Always recomputed from `notifications` after a local mutation.
    unread_count: u64,
    /// Whether the initial load has happened (gates the immediate callback
    /// for late observers).
    loaded: bool,
    observers: Vec<(ObserverId, NotificationObserver)>,
    next_observer_id: u64,
}

impl CacheState {
    fn recompute_unread(&mut self) {
        self.unread_count = self.notifications.iter().filter(|n| !n.is_read).count() as u64;
    }

    fn notify_observers(&self) {
        for (_, observer) in &self.observers {
            observer(&self.notifications, self.unread_count);
        }
    }
}

/// Per-user notification center.
///
/// Lifecycle: construct, [`initialize`](Self::initialize) once, then
/// [`shutdown`](Self::shutdown) when the session ends (terminal; build a
/// fresh instance to resubscribe). Mutating calls after shutdown are
/// rejected without touching the store or the feed.
pub struct NotificationCenter {
    repo: NotificationRepository,
    settings_repo: NotificationSettingsRepository,
    alerter: AlerterService,
    current_user: Option<CurrentUser>,
    config: NotificationConfig,
    prefs: RwLock<Preferences>,
    state: Mutex<CacheState>,
    tasks: StdMutex<Vec<JoinHandle<()>>>,
    initialized: AtomicBool,
    stopped: AtomicBool,
}

impl NotificationCenter {
    /// Create a new notification center for `current_user`.
    ///
    /// Collaborators are injected here; the center reads no ambient state.
    #[must_use]
    pub fn new(
        repo: NotificationRepository,
        settings_repo: NotificationSettingsRepository,
        alerter: AlerterService,
        current_user: Option<CurrentUser>,
        config: NotificationConfig,
    ) -> Self {
        Self {
            repo,
            settings_repo,
            alerter,
            current_user,
            config,
            prefs: RwLock::new(Preferences::default()),
            state: Mutex::new(CacheState::default()),
            tasks: StdMutex::new(Vec::new()),
            initialized: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        }
    }

    /// Start the center: load settings and the newest notifications, then
    /// spawn the feed listener, the reconciliation tick, and the
    /// visibility watcher.
    ///
    /// Fails with [`AppError::NotInitialized`] when constructed without a
    /// user; nothing is subscribed or spawned in that case.
    pub async fn initialize(
        self: &Arc<Self>,
        feed: broadcast::Receiver<FeedEvent>,
        visibility: watch::Receiver<bool>,
    ) -> AppResult<()> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(AppError::Stopped);
        }
        let user = self
            .current_user
            .clone()
            .ok_or(AppError::NotInitialized)?;
        if self.initialized.swap(true, Ordering::SeqCst) {
            warn!(user_id = %user.id, "Notification center initialized twice; ignoring");
            return Ok(());
        }

        self.load_preferences(&user.id).await;
        self.load_notifications(self.config.page_limit).await;

        let mut handles = vec![
            self.spawn_feed_listener(feed, user.id.clone()),
            self.spawn_reconcile_tick(),
            self.spawn_visibility_watcher(visibility),
        ];
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.append(&mut handles);
        }

        info!(user_id = %user.id, "Notification center initialized");
        Ok(())
    }

    /// Replace the cache with the newest `limit` notifications.
    ///
    /// Idempotent. On store failure the previous cache is kept and an
    /// empty sequence is returned.
    pub async fn load_notifications(&self, limit: u64) -> Vec<notification::Model> {
        let Some(user_id) = self.active_user() else {
            return Vec::new();
        };

        match self.repo.find_by_user(user_id, limit).await {
            Ok(rows) => {
                let mut state = self.state.lock().await;
                state.notifications = rows.clone();
                state.recompute_unread();
                state.loaded = true;
                state.notify_observers();
                rows
            }
            Err(e) => {
                error!(error = %e, "Failed to load notifications");
                Vec::new()
            }
        }
    }

    /// Mark one notification as read, remote-first.
    ///
    /// Returns `false` when the store write fails or matches nothing; the
    /// cache is left untouched in that case.
    pub async fn mark_as_read(&self, notification_id: &str) -> bool {
        let Some(_user_id) = self.active_user() else {
            return false;
        };

        match self.repo.mark_as_read(notification_id).await {
            Ok(true) => {
                let unread = {
                    let mut state = self.state.lock().await;
                    if let Some(entry) = state
                        .notifications
                        .iter_mut()
                        .find(|n| n.id == notification_id)
                    {
                        if !entry.is_read {
                            entry.is_read = true;
                            entry.read_at = Some(Utc::now().into());
                        }
                    }
                    state.recompute_unread();
                    state.unread_count
                };
                self.update_badge(unread).await;
                true
            }
            Ok(false) => {
                debug!(notification_id, "mark_as_read matched no row");
                false
            }
            Err(e) => {
                error!(error = %e, notification_id, "Failed to mark notification as read");
                false
            }
        }
    }

    /// Mark every notification as read. All-or-nothing: the cache is only
    /// flipped after the bulk store update succeeds.
    pub async fn mark_all_as_read(&self) -> bool {
        let Some(user_id) = self.active_user() else {
            return false;
        };

        match self.repo.mark_all_as_read(user_id).await {
            Ok(_) => {
                let now = Utc::now().into();
                {
                    let mut state = self.state.lock().await;
                    for entry in &mut state.notifications {
                        if !entry.is_read {
                            entry.is_read = true;
                            entry.read_at = Some(now);
                        }
                    }
                    state.unread_count = 0;
                }
                self.update_badge(0).await;
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to mark all notifications as read");
                false
            }
        }
    }

    /// Delete one notification (ownership enforced by the store query).
    pub async fn delete_notification(&self, notification_id: &str) -> bool {
        let Some(user_id) = self.active_user() else {
            return false;
        };

        match self.repo.delete(notification_id, user_id).await {
            Ok(true) => {
                let unread = {
                    let mut state = self.state.lock().await;
                    state.notifications.retain(|n| n.id != notification_id);
                    state.recompute_unread();
                    state.unread_count
                };
                self.update_badge(unread).await;
                true
            }
            Ok(false) => {
                debug!(notification_id, "delete matched no owned row");
                false
            }
            Err(e) => {
                error!(error = %e, notification_id, "Failed to delete notification");
                false
            }
        }
    }

    /// Delete every notification of the current user.
    pub async fn delete_all_notifications(&self) -> bool {
        let Some(user_id) = self.active_user() else {
            return false;
        };

        match self.repo.delete_all_for_user(user_id).await {
            Ok(_) => {
                {
                    let mut state = self.state.lock().await;
                    state.notifications.clear();
                    state.unread_count = 0;
                }
                self.update_badge(0).await;
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to delete all notifications");
                false
            }
        }
    }

    /// Register an observer. When the initial load already happened the
    /// callback fires immediately with the current state, so late
    /// subscribers never miss the first paint. Observers are invoked in
    /// registration order. After shutdown the observer is dropped without
    /// firing; the returned ID is inert.
    pub async fn on_notification(&self, observer: NotificationObserver) -> ObserverId {
        let mut state = self.state.lock().await;
        let id = ObserverId(state.next_observer_id);
        state.next_observer_id += 1;

        if self.stopped.load(Ordering::SeqCst) {
            debug!("Observer registration ignored after shutdown");
            return id;
        }

        if state.loaded {
            observer(&state.notifications, state.unread_count);
        }
        state.observers.push((id, observer));
        id
    }

    /// Unregister a previously registered observer.
    pub async fn remove_observer(&self, id: ObserverId) {
        let mut state = self.state.lock().await;
        state.observers.retain(|(observer_id, _)| *observer_id != id);
    }

    /// Persist a settings change and mirror it locally on success.
    pub async fn update_settings(&self, update: SettingsUpdate) -> bool {
        let Some(user_id) = self.active_user() else {
            return false;
        };

        match self.settings_repo.upsert(user_id, update).await {
            Ok(model) => {
                if let Ok(mut prefs) = self.prefs.write() {
                    prefs.sound_enabled = model.sound_enabled;
                    prefs.desktop_enabled = model.desktop_enabled;
                }
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to update notification settings");
                false
            }
        }
    }

    /// Current unread count.
    pub async fn unread_count(&self) -> u64 {
        self.state.lock().await.unread_count
    }

    /// Snapshot of the cached notifications, newest first.
    pub async fn notifications(&self) -> Vec<notification::Model> {
        self.state.lock().await.notifications.clone()
    }

    /// Whether the center has been shut down.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Stop the center: abort the background tasks and drop all
    /// observers. Terminal; the feed is never reopened.
    pub async fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Ok(mut tasks) = self.tasks.lock() {
            for task in tasks.drain(..) {
                task.abort();
            }
        }
        self.state.lock().await.observers.clear();
        info!("Notification center shut down");
    }

    // === internals ===

    /// Returns the current user's ID, or `None` when the center is
    /// stopped or was built without a user.
    fn active_user(&self) -> Option<&str> {
        if self.stopped.load(Ordering::SeqCst) {
            debug!("Operation ignored after shutdown");
            return None;
        }
        self.current_user.as_ref().map(|u| u.id.as_str())
    }

    async fn load_preferences(&self, user_id: &str) {
        match self.settings_repo.find_by_user(user_id).await {
            Ok(Some(settings)) => {
                if let Ok(mut prefs) = self.prefs.write() {
                    prefs.sound_enabled = settings.sound_enabled;
                    prefs.desktop_enabled = settings.desktop_enabled;
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Failed to load notification settings; using defaults");
            }
        }
    }

    fn spawn_feed_listener(
        self: &Arc<Self>,
        mut feed: broadcast::Receiver<FeedEvent>,
        user_id: String,
    ) -> JoinHandle<()> {
        let center = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match feed.recv().await {
                    Ok(FeedEvent::NotificationCreated { notification }) => {
                        if notification.user_id == user_id {
                            center.handle_new_notification(notification).await;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Notification feed lagged; reconciliation will catch up");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Notification feed closed");
                        break;
                    }
                }
            }
        })
    }

    fn spawn_reconcile_tick(self: &Arc<Self>) -> JoinHandle<()> {
        let center = Arc::clone(self);
        let interval_secs = self.config.reconcile_interval_secs.max(1);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            // The first tick completes immediately; initialize already loaded.
            interval.tick().await;
            loop {
                interval.tick().await;
                center.reconcile_unread().await;
            }
        })
    }

    fn spawn_visibility_watcher(
        self: &Arc<Self>,
        mut visibility: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let center = Arc::clone(self);
        let limit = self.config.page_limit;
        tokio::spawn(async move {
            while visibility.changed().await.is_ok() {
                let visible = *visibility.borrow_and_update();
                if visible {
                    debug!("Page became visible; reloading notifications");
                    center.load_notifications(limit).await;
                }
            }
        })
    }

    /// Mirror a feed-delivered insert into the cache, then dispatch side
    /// effects. Duplicates (at-least-once delivery) are dropped by ID.
    async fn handle_new_notification(&self, notification: notification::Model) {
        let unread = {
            let mut state = self.state.lock().await;
            if state.notifications.iter().any(|n| n.id == notification.id) {
                debug!(notification_id = %notification.id, "Duplicate feed delivery ignored");
                return;
            }
            state.notifications.insert(0, notification.clone());
            state.recompute_unread();
            state.notify_observers();
            state.unread_count
        };

        // Side effects run in a fixed order and never undo the cache
        // mutation; the notification is real even if the popup fails.
        let prefs = self.prefs.read().map(|p| *p).unwrap_or_default();
        if let Err(e) = self.alerter.show_popup(&notification).await {
            warn!(error = %e, "Failed to show notification popup");
        }
        if prefs.sound_enabled {
            if let Err(e) = self.alerter.play_sound().await {
                warn!(error = %e, "Failed to play notification sound");
            }
        }
        self.update_badge(unread).await;
        if prefs.desktop_enabled {
            if let Err(e) = self.alerter.push_native(&notification).await {
                warn!(error = %e, "Failed to raise native notification");
            }
        }
    }

    /// Re-derive the unread count from the store, correcting for feed
    /// events missed while the subscription was degraded.
    async fn reconcile_unread(&self) -> u64 {
        let Some(user_id) = self.active_user() else {
            return 0;
        };

        match self.repo.count_unread(user_id).await {
            Ok(count) => {
                {
                    let mut state = self.state.lock().await;
                    state.unread_count = count;
                }
                self.update_badge(count).await;
                count
            }
            Err(e) => {
                warn!(error = %e, "Unread reconciliation failed; keeping cached count");
                self.state.lock().await.unread_count
            }
        }
    }

    async fn update_badge(&self, unread: u64) {
        if let Err(e) = self.alerter.set_unread_badge(unread).await {
            warn!(error = %e, "Failed to update unread badge");
        }
    }
}
