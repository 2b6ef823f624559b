//! Notification entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification types.
///
/// Drives icon and color selection in the presentation layer; the
/// subsystem itself treats all types uniformly.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    #[sea_orm(string_value = "info")]
    Info,
    #[sea_orm(string_value = "success")]
    Success,
    #[sea_orm(string_value = "warning")]
    Warning,
    #[sea_orm(string_value = "error")]
    Error,
    #[sea_orm(string_value = "reminder")]
    Reminder,
    #[sea_orm(string_value = "deadline")]
    Deadline,
    #[sea_orm(string_value = "payment")]
    Payment,
    #[sea_orm(string_value = "update")]
    Update,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user receiving the notification. Every query is scoped to this.
    pub user_id: String,

    /// Display label.
    pub title: String,

    /// Body text.
    pub message: String,

    /// Notification type.
    pub notification_type: NotificationType,

    /// Target on click (URL or portal-relative path).
    #[sea_orm(nullable)]
    pub link: Option<String>,

    /// Has this notification been read?
    #[sea_orm(default_value = false)]
    pub is_read: bool,

    pub created_at: DateTimeWithTimeZone,

    /// Set exactly once, when `is_read` flips to true.
    #[sea_orm(nullable)]
    pub read_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
