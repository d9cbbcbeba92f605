//! Notification API Handlers

use axum::{Json, extract::State};
use surrealdb::RecordId;

use crate::AppError;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use shared::client::NotificationListResponse;

/// GET /api/notifications - 最新未读通知 (至多 10 条)
///
/// 取出的通知立即标记为已读，第二次请求不再返回。
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> Result<Json<NotificationListResponse>, AppError> {
    let user_id: RecordId = user
        .id
        .parse()
        .map_err(|_| AppError::invalid(format!("Invalid user ID: {}", user.id)))?;

    let repo = state.notifications();
    let notifications = repo.find_unread(&user_id).await?;

    let ids: Vec<RecordId> = notifications.iter().filter_map(|n| n.id.clone()).collect();
    repo.mark_read(ids).await?;

    Ok(Json(NotificationListResponse {
        notifications: notifications.iter().map(|n| n.to_dto()).collect(),
    }))
}
