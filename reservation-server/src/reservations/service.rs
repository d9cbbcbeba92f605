//! 预订生命周期管理
//!
//! 状态机：pending → active / cancelled，pending|active → finished。
//! 创建后 30 秒由调度器自动确认 (pending → active)；到了预订时间
//! 仍未取消的记录在用户下次读取列表时统一翻转为 finished。

use chrono_tz::Tz;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::RecordId;
use tokio::time::Duration;

use crate::db::models::{Reservation, ReservationCreate};
use crate::db::repository::{
    NotificationRepository, RepoError, ReservationRepository, UserRepository,
};
use crate::floorplans;
use crate::services::Mailer;
use crate::utils::time::{now_millis, parse_date, parse_time_slot, slot_start_millis};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};
use shared::client::{
    CreateReservationRequest, FavoriteTable, NotificationKind, ReservationStatus,
};
use shared::{AppError, AppResult, ErrorCode};

use super::favorites::compute_favorites;

/// How long a reservation stays pending before auto-approval
pub const APPROVAL_DELAY: Duration = Duration::from_secs(30);

/// 预订服务
#[derive(Clone)]
pub struct ReservationService {
    reservations: ReservationRepository,
    users: UserRepository,
    notifications: NotificationRepository,
    mailer: Mailer,
    tz: Tz,
}

impl ReservationService {
    pub fn new(db: Surreal<Db>, mailer: Mailer, tz: Tz) -> Self {
        Self {
            reservations: ReservationRepository::new(db.clone()),
            users: UserRepository::new(db.clone()),
            notifications: NotificationRepository::new(db),
            mailer,
            tz,
        }
    }

    pub fn repository(&self) -> &ReservationRepository {
        &self.reservations
    }

    /// 创建预订，初始状态 pending
    ///
    /// 同一 (平面图, 桌台, 日期, 时段) 已存在 active 预订时返回 409。
    /// pending 预订不阻塞新的创建，冲突在确认时再次裁决。
    pub async fn create(
        &self,
        user_id: &str,
        req: CreateReservationRequest,
    ) -> AppResult<Reservation> {
        let user: RecordId = user_id
            .parse()
            .map_err(|_| AppError::invalid(format!("Invalid user ID: {}", user_id)))?;

        validate_required_text(&req.floorplan_id, "floorplanId", MAX_SHORT_TEXT_LEN)?;
        validate_required_text(&req.table_id, "tableId", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(req.table_name.as_deref(), "tableName", MAX_NAME_LEN)?;
        validate_optional_text(req.note.as_deref(), "note", MAX_NOTE_LEN)?;
        parse_date(&req.date)?;
        parse_time_slot(&req.time_slot)?;

        if req.guests == 0 {
            return Err(AppError::validation("guests must be at least 1"));
        }

        // 仅 active 预订视为占用
        if self
            .reservations
            .find_active_slot(&req.floorplan_id, &req.table_id, &req.date, &req.time_slot)
            .await?
            .is_some()
        {
            return Err(AppError::slot_conflict());
        }

        let starts_at = slot_start_millis(&req.date, &req.time_slot, self.tz)?;
        let table_name = req
            .table_name
            .clone()
            .or_else(|| floorplans::find_table_label(&req.floorplan_id, &req.table_id));

        let created = self
            .reservations
            .create(ReservationCreate {
                user: user.clone(),
                floorplan_id: req.floorplan_id,
                table_id: req.table_id,
                table_name,
                date: req.date,
                time_slot: req.time_slot,
                guests: req.guests,
                note: req.note,
                starts_at,
            })
            .await?;

        // 反向引用仅作提示用途，写失败不影响预订本身
        if let Some(id) = &created.id
            && let Err(e) = self.users.push_reservation(&user, id).await
        {
            tracing::warn!(error = %e, "Failed to append reservation to user list");
        }

        tracing::info!(
            reservation = %created.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            table = %created.table_id,
            date = %created.date,
            slot = %created.time_slot,
            "Reservation created (pending)"
        );

        Ok(created)
    }

    /// 用户的预订列表 + 常用桌台
    ///
    /// 读取前先做一次 finished 对账，保证返回的状态反映当前时间。
    pub async fn list(
        &self,
        user_id: &str,
    ) -> AppResult<(Vec<Reservation>, Vec<FavoriteTable>)> {
        let user: RecordId = user_id
            .parse()
            .map_err(|_| AppError::invalid(format!("Invalid user ID: {}", user_id)))?;

        self.reconcile_finished(&user).await?;

        let reservations = self.reservations.find_by_user(&user).await?;
        let finished = self.reservations.find_finished_by_user(&user).await?;
        let favorites = compute_favorites(&finished);

        Ok((reservations, favorites))
    }

    /// 把该用户已过预订时间的 pending/active 记录翻转为 finished
    ///
    /// 幂等：同一时钟下重复调用不再产生变化。
    pub async fn reconcile_finished(&self, user: &RecordId) -> AppResult<usize> {
        let flipped = self.reservations.finish_past(user, now_millis()).await?;
        if flipped > 0 {
            tracing::debug!(user = %user, count = flipped, "Reservations reconciled to finished");
        }
        Ok(flipped)
    }

    /// 取消本人的预订
    ///
    /// 非本人或不存在一律 404，不向调用方区分两种情况。
    /// 不校验先前状态：pending / finished 也可以取消，客户端 UI 是唯一的闸门。
    pub async fn cancel(&self, user_id: &str, reservation_id: &str) -> AppResult<Reservation> {
        let user: RecordId = user_id
            .parse()
            .map_err(|_| AppError::invalid(format!("Invalid user ID: {}", user_id)))?;

        self.reservations
            .find_owned(reservation_id, &user)
            .await?
            .ok_or_else(AppError::reservation_not_found)?;

        let cancelled = self
            .reservations
            .set_status(reservation_id, ReservationStatus::Cancelled)
            .await?
            .ok_or_else(AppError::reservation_not_found)?;

        tracing::info!(reservation = reservation_id, "Reservation cancelled");
        Ok(cancelled)
    }

    /// 管理后门：无条件设置预订状态
    pub async fn update_status(
        &self,
        reservation_id: &str,
        status: ReservationStatus,
    ) -> AppResult<Reservation> {
        let updated = self
            .reservations
            .set_status(reservation_id, status)
            .await?
            .ok_or_else(AppError::reservation_not_found)?;

        tracing::info!(
            reservation = reservation_id,
            status = status.as_str(),
            "Reservation status updated"
        );
        Ok(updated)
    }

    /// 确认单条 pending 预订 (CAS)
    ///
    /// 只有仍处于 pending 的记录才会被翻转为 active；翻转成功才发
    /// 通知和邮件，因此并发调度器不会重复通知。
    pub async fn approve_pending(&self, reservation: &Reservation) -> AppResult<bool> {
        let Some(id) = &reservation.id else {
            return Ok(false);
        };

        let Some(approved) = self.reservations.approve_if_pending(id).await? else {
            // 已被其它调度轮次处理，或用户在等待期内取消
            return Ok(false);
        };

        let table_label = approved
            .table_name
            .clone()
            .unwrap_or_else(|| approved.table_id.clone());
        let message = format!(
            "Your reservation for {} on {} at {} has been approved!",
            table_label, approved.date, approved.time_slot
        );

        // 通知与邮件都是尽力而为，失败只记日志，不回滚已确认的预订
        if let Err(e) = self
            .notifications
            .create(
                &approved.user,
                NotificationKind::ReservationApproved,
                message,
                approved.id.clone(),
            )
            .await
        {
            tracing::warn!(error = %e, "Failed to create approval notification");
        }

        match self.users.find_by_id(&approved.user.to_string()).await {
            Ok(Some(user)) => {
                if let Err(e) = self
                    .mailer
                    .send_reservation_approved(
                        &user.email,
                        &user.first_name,
                        &table_label,
                        &approved.date,
                        &approved.time_slot,
                        approved.guests,
                    )
                    .await
                {
                    tracing::warn!(error = %e, "Failed to send approval email");
                }
            }
            Ok(None) => {
                tracing::warn!(user = %approved.user, "Approval email skipped, user missing");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Approval email skipped, user lookup failed");
            }
        }

        tracing::info!(reservation = %id, "Reservation approved");
        Ok(true)
    }

    /// 扫描一轮：确认所有等待超过 [`APPROVAL_DELAY`] 的 pending 预订
    ///
    /// 返回本轮确认的数量。
    pub async fn process_pending(&self) -> AppResult<usize> {
        let cutoff = now_millis() - APPROVAL_DELAY.as_millis() as i64;
        let due = self.reservations.find_pending_created_before(cutoff).await?;

        let mut approved = 0;
        for reservation in &due {
            // 单条失败不中断本轮，剩余预订各自独立尝试
            match self.approve_pending(reservation).await {
                Ok(true) => approved += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(
                        reservation = %reservation.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
                        error = %e,
                        "Failed to approve pending reservation"
                    );
                }
            }
        }

        Ok(approved)
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            // 仓储层的消息已经是完整句子，原样透传
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}
