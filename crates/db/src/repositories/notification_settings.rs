//! Notification settings repository.

use std::sync::Arc;

use crate::entities::{NotificationSettings, notification_settings};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use shipreg_common::{AppError, AppResult};

/// A partial settings change.
///
/// The recognized keys are closed; anything else is unrepresentable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    /// New value for the sound preference, if changing.
    pub sound_enabled: Option<bool>,
    /// New value for the desktop-notification preference, if changing.
    pub desktop_enabled: Option<bool>,
}

/// Notification settings repository for database operations.
#[derive(Clone)]
pub struct NotificationSettingsRepository {
    db: Arc<DatabaseConnection>,
}

impl NotificationSettingsRepository {
    /// Create a new notification settings repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the settings row for a user.
    pub async fn find_by_user(
        &self,
        user_id: &str,
    ) -> AppResult<Option<notification_settings::Model>> {
        NotificationSettings::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Apply a partial update, inserting the row if the user has none yet.
    ///
    /// Keys absent from `update` keep their current value (or the column
    /// default when the row is new).
    pub async fn upsert(
        &self,
        user_id: &str,
        update: SettingsUpdate,
    ) -> AppResult<notification_settings::Model> {
        let existing = self.find_by_user(user_id).await?;
        let now = Utc::now().into();

        match existing {
            Some(model) => {
                let mut active: notification_settings::ActiveModel = model.into();
                if let Some(sound) = update.sound_enabled {
                    active.sound_enabled = Set(sound);
                }
                if let Some(desktop) = update.desktop_enabled {
                    active.desktop_enabled = Set(desktop);
                }
                active.updated_at = Set(now);
                active
                    .update(self.db.as_ref())
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))
            }
            None => {
                let active = notification_settings::ActiveModel {
                    user_id: Set(user_id.to_string()),
                    sound_enabled: Set(update.sound_enabled.unwrap_or(true)),
                    desktop_enabled: Set(update.desktop_enabled.unwrap_or(true)),
                    updated_at: Set(now),
                };
                active
                    .insert(self.db.as_ref())
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn settings_row(user_id: &str, sound: bool, desktop: bool) -> notification_settings::Model {
        notification_settings::Model {
            user_id: user_id.to_string(),
            sound_enabled: sound,
            desktop_enabled: desktop,
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_user_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<notification_settings::Model>::new()])
                .into_connection(),
        );

        let repo = NotificationSettingsRepository::new(db);
        let found = repo.find_by_user("user1").await.unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_upsert_inserts_with_defaults() {
        let inserted = settings_row("user1", false, true);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // No existing row, then the insert round-trip.
                .append_query_results([Vec::<notification_settings::Model>::new()])
                .append_query_results([vec![inserted]])
                .into_connection(),
        );

        let repo = NotificationSettingsRepository::new(db);
        let model = repo
            .upsert(
                "user1",
                SettingsUpdate {
                    sound_enabled: Some(false),
                    desktop_enabled: None,
                },
            )
            .await
            .unwrap();

        assert!(!model.sound_enabled);
        assert!(model.desktop_enabled);
    }

    #[tokio::test]
    async fn test_upsert_preserves_unchanged_keys() {
        let existing = settings_row("user1", false, false);
        let mut updated = existing.clone();
        updated.sound_enabled = true;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![existing]])
                .append_query_results([vec![updated]])
                .into_connection(),
        );

        let repo = NotificationSettingsRepository::new(db);
        let model = repo
            .upsert(
                "user1",
                SettingsUpdate {
                    sound_enabled: Some(true),
                    desktop_enabled: None,
                },
            )
            .await
            .unwrap();

        assert!(model.sound_enabled);
        assert!(!model.desktop_enabled);
    }
}
