//! Notification Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Notification;
use crate::utils::time::now_millis;
use shared::client::NotificationKind;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "notification";

/// How many unread notifications a single fetch returns
pub const UNREAD_FETCH_LIMIT: usize = 10;

#[derive(Clone)]
pub struct NotificationRepository {
    base: BaseRepository,
}

impl NotificationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a notification for a user
    pub async fn create(
        &self,
        user: &RecordId,
        kind: NotificationKind,
        message: String,
        reservation: Option<RecordId>,
    ) -> RepoResult<Notification> {
        let notification = Notification {
            id: None,
            user: user.clone(),
            kind,
            message,
            reservation,
            read: false,
            created_at: now_millis(),
        };

        let created: Option<Notification> =
            self.base.db().create(TABLE).content(notification).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create notification".to_string()))
    }

    /// Unread notifications for a user, newest first, capped at
    /// [`UNREAD_FETCH_LIMIT`]
    pub async fn find_unread(&self, user: &RecordId) -> RepoResult<Vec<Notification>> {
        let notifications: Vec<Notification> = self
            .base
            .db()
            .query(format!(
                "SELECT * FROM notification \
                 WHERE user = $user AND read = false \
                 ORDER BY created_at DESC LIMIT {}",
                UNREAD_FETCH_LIMIT
            ))
            .bind(("user", user.clone()))
            .await?
            .take(0)?;
        Ok(notifications)
    }

    /// Mark a batch of notifications as read
    pub async fn mark_read(&self, ids: Vec<RecordId>) -> RepoResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.base
            .db()
            .query("UPDATE notification SET read = true WHERE id IN $ids")
            .bind(("ids", ids))
            .await?;
        Ok(())
    }

    /// Notifications attached to a reservation (any read state)
    pub async fn find_by_reservation(
        &self,
        reservation: &RecordId,
    ) -> RepoResult<Vec<Notification>> {
        let notifications: Vec<Notification> = self
            .base
            .db()
            .query("SELECT * FROM notification WHERE reservation = $res")
            .bind(("res", reservation.clone()))
            .await?
            .take(0)?;
        Ok(notifications)
    }
}
