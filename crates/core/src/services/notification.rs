//! Notification writer service.
//!
//! Administrative flows (branch employees, admins) create notifications for
//! other users through this service; it never touches a session's local
//! cache. Created rows are pushed onto the change feed so live centers pick
//! them up without polling.

use crate::services::feed::FeedPublisherService;
use chrono::Utc;
use sea_orm::Set;
use shipreg_common::{AppError, AppResult, CurrentUser, IdGenerator};
use shipreg_db::{
    entities::notification::{self, NotificationType},
    repositories::NotificationRepository,
};
use validator::{Validate, ValidationError};

/// Input for creating a notification.
#[derive(Debug, Clone, Validate)]
pub struct CreateNotificationInput {
    /// Display label.
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    /// Body text.
    #[validate(length(min = 1, max = 4096))]
    pub message: String,
    /// Notification type.
    pub notification_type: NotificationType,
    /// Target on click: an absolute URL or a portal-relative path.
    #[validate(custom(function = validate_link))]
    pub link: Option<String>,
}

impl CreateNotificationInput {
    /// Build an `info` notification input.
    #[must_use]
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            notification_type: NotificationType::Info,
            link: None,
        }
    }
}

fn validate_link(link: &str) -> Result<(), ValidationError> {
    if link.starts_with('/') || url::Url::parse(link).is_ok() {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_link"))
    }
}

/// Notification writer for administrative flows.
#[derive(Clone)]
pub struct NotificationService {
    repo: NotificationRepository,
    feed: Option<FeedPublisherService>,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(repo: NotificationRepository) -> Self {
        Self {
            repo,
            feed: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the feed publisher.
    pub fn set_feed_publisher(&mut self, feed: FeedPublisherService) {
        self.feed = Some(feed);
    }

    /// Create a notification for a single user.
    pub async fn create(
        &self,
        acting_user: &CurrentUser,
        user_id: &str,
        input: &CreateNotificationInput,
    ) -> AppResult<notification::Model> {
        self.check_privilege(acting_user)?;
        input.validate()?;

        let model = self.repo.create(self.build_row(user_id, input)).await?;
        self.publish(&model).await;
        Ok(model)
    }

    /// Create the same notification for many users.
    pub async fn create_bulk(
        &self,
        acting_user: &CurrentUser,
        user_ids: &[String],
        input: &CreateNotificationInput,
    ) -> AppResult<Vec<notification::Model>> {
        self.check_privilege(acting_user)?;
        input.validate()?;

        let rows = user_ids
            .iter()
            .map(|user_id| self.build_row(user_id, input))
            .collect();
        let models = self.repo.create_many(rows).await?;

        for model in &models {
            self.publish(model).await;
        }
        Ok(models)
    }

    /// Create a deadline reminder (registration or certificate expiry).
    pub async fn notify_deadline(
        &self,
        acting_user: &CurrentUser,
        user_id: &str,
        title: impl Into<String>,
        message: impl Into<String>,
        link: Option<String>,
    ) -> AppResult<notification::Model> {
        self.create(
            acting_user,
            user_id,
            &CreateNotificationInput {
                title: title.into(),
                message: message.into(),
                notification_type: NotificationType::Deadline,
                link,
            },
        )
        .await
    }

    /// Create a payment notice.
    pub async fn notify_payment(
        &self,
        acting_user: &CurrentUser,
        user_id: &str,
        title: impl Into<String>,
        message: impl Into<String>,
        link: Option<String>,
    ) -> AppResult<notification::Model> {
        self.create(
            acting_user,
            user_id,
            &CreateNotificationInput {
                title: title.into(),
                message: message.into(),
                notification_type: NotificationType::Payment,
                link,
            },
        )
        .await
    }

    /// Create a registration status update.
    pub async fn notify_status_update(
        &self,
        acting_user: &CurrentUser,
        user_id: &str,
        title: impl Into<String>,
        message: impl Into<String>,
        link: Option<String>,
    ) -> AppResult<notification::Model> {
        self.create(
            acting_user,
            user_id,
            &CreateNotificationInput {
                title: title.into(),
                message: message.into(),
                notification_type: NotificationType::Update,
                link,
            },
        )
        .await
    }

    fn check_privilege(&self, acting_user: &CurrentUser) -> AppResult<()> {
        if acting_user.role.can_create_notifications() {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "role {} may not create notifications",
                acting_user.role.as_str()
            )))
        }
    }

    fn build_row(&self, user_id: &str, input: &CreateNotificationInput) -> notification::ActiveModel {
        notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            title: Set(input.title.clone()),
            message: Set(input.message.clone()),
            notification_type: Set(input.notification_type.clone()),
            link: Set(input.link.clone()),
            is_read: Set(false),
            created_at: Set(Utc::now().into()),
            read_at: Set(None),
        }
    }

    /// Feed publishing is best-effort: the row is already persisted, and
    /// reconciliation covers consumers that miss the event.
    async fn publish(&self, model: &notification::Model) {
        if let Some(ref feed) = self.feed {
            if let Err(e) = feed.publish_notification_created(model).await {
                tracing::warn!(error = %e, notification_id = %model.id, "Failed to publish feed event");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::feed::FeedPublisher;
    use async_trait::async_trait;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use shipreg_common::UserRole;
    use std::sync::{Arc, Mutex};

    struct RecordingFeed {
        published: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl FeedPublisher for RecordingFeed {
        async fn publish_notification_created(
            &self,
            notification: &notification::Model,
        ) -> AppResult<()> {
            self.published
                .lock()
                .unwrap()
                .push(notification.id.clone());
            Ok(())
        }
    }

    fn admin() -> CurrentUser {
        CurrentUser::new("admin1", UserRole::Admin)
    }

    fn inserted_row(id: &str, user_id: &str) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: "Inspection scheduled".to_string(),
            message: "Your vessel inspection is on Thursday".to_string(),
            notification_type: NotificationType::Reminder,
            link: None,
            is_read: false,
            created_at: Utc::now().into(),
            read_at: None,
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> (NotificationService, Arc<RecordingFeed>) {
        let feed = Arc::new(RecordingFeed {
            published: Mutex::new(Vec::new()),
        });
        let mut service = NotificationService::new(NotificationRepository::new(Arc::new(db)));
        service.set_feed_publisher(feed.clone());
        (service, feed)
    }

    #[tokio::test]
    async fn test_create_inserts_and_publishes() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[inserted_row("n1", "owner1")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let (service, feed) = service_with(db);

        let input = CreateNotificationInput {
            title: "Inspection scheduled".to_string(),
            message: "Your vessel inspection is on Thursday".to_string(),
            notification_type: NotificationType::Reminder,
            link: None,
        };
        let model = service.create(&admin(), "owner1", &input).await.unwrap();

        assert_eq!(model.user_id, "owner1");
        assert!(!model.is_read);
        assert_eq!(feed.published.lock().unwrap().as_slice(), ["n1"]);
    }

    #[tokio::test]
    async fn test_create_rejects_ship_owner() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let (service, feed) = service_with(db);

        let owner = CurrentUser::new("owner1", UserRole::ShipOwner);
        let result = service
            .create(&owner, "owner2", &CreateNotificationInput::info("Hi", "there"))
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert!(feed.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let (service, _feed) = service_with(db);

        let result = service
            .create(&admin(), "owner1", &CreateNotificationInput::info("", "body"))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_link() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let (service, _feed) = service_with(db);

        let mut input = CreateNotificationInput::info("Title", "body");
        input.link = Some("not a link".to_string());

        let result = service.create(&admin(), "owner1", &input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_bulk_publishes_per_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[inserted_row("n1", "owner1")]])
            .append_query_results([[inserted_row("n2", "owner2")]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();
        let (service, feed) = service_with(db);

        let user_ids = vec!["owner1".to_string(), "owner2".to_string()];
        let models = service
            .create_bulk(
                &admin(),
                &user_ids,
                &CreateNotificationInput::info("Fleet notice", "Port closure this weekend"),
            )
            .await
            .unwrap();

        assert_eq!(models.len(), 2);
        assert_eq!(feed.published.lock().unwrap().as_slice(), ["n1", "n2"]);
    }
}
