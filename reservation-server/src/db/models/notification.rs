//! Notification Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::client::{NotificationDto, NotificationKind};
use surrealdb::RecordId;

/// Notification ID type
pub type NotificationId = RecordId;

/// In-app notification matching the SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<NotificationId>,
    /// Owning user
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    pub kind: NotificationKind,
    pub message: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub reservation: Option<RecordId>,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub read: bool,
    /// Unix millis
    pub created_at: i64,
}

impl Notification {
    /// Client-facing view of this notification
    pub fn to_dto(&self) -> NotificationDto {
        NotificationDto {
            id: self.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            kind: self.kind,
            message: self.message.clone(),
            reservation_id: self.reservation.as_ref().map(|t| t.to_string()),
            read: self.read,
            created_at: self.created_at,
        }
    }
}
