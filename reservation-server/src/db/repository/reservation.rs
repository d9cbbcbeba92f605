//! Reservation Repository
//!
//! 预订数据访问层。所有状态转换都在这里以单条 SurrealQL 语句表达，
//! 条件写在 WHERE 里，避免 read-modify-write 竞争。

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Reservation, ReservationCreate};
use crate::utils::time::now_millis;
use shared::client::ReservationStatus;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "reservation";

#[derive(Clone)]
pub struct ReservationRepository {
    base: BaseRepository,
}

impl ReservationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find reservation by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Reservation>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let reservation: Option<Reservation> = self.base.db().select(thing).await?;
        Ok(reservation)
    }

    /// Find reservation by id, scoped to its owner
    pub async fn find_owned(&self, id: &str, user: &RecordId) -> RepoResult<Option<Reservation>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM reservation WHERE id = $id AND user = $user LIMIT 1")
            .bind(("id", thing))
            .bind(("user", user.clone()))
            .await?;
        let reservations: Vec<Reservation> = result.take(0)?;
        Ok(reservations.into_iter().next())
    }

    /// All reservations of a user, newest first
    pub async fn find_by_user(&self, user: &RecordId) -> RepoResult<Vec<Reservation>> {
        let reservations: Vec<Reservation> = self
            .base
            .db()
            .query("SELECT * FROM reservation WHERE user = $user ORDER BY created_at DESC")
            .bind(("user", user.clone()))
            .await?
            .take(0)?;
        Ok(reservations)
    }

    /// Active reservation already holding this exact slot, if any
    pub async fn find_active_slot(
        &self,
        floorplan_id: &str,
        table_id: &str,
        date: &str,
        time_slot: &str,
    ) -> RepoResult<Option<Reservation>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM reservation \
                 WHERE floorplan_id = $fp AND table_id = $table \
                 AND date = $date AND time_slot = $slot \
                 AND status = 'active' LIMIT 1",
            )
            .bind(("fp", floorplan_id.to_string()))
            .bind(("table", table_id.to_string()))
            .bind(("date", date.to_string()))
            .bind(("slot", time_slot.to_string()))
            .await?;
        let reservations: Vec<Reservation> = result.take(0)?;
        Ok(reservations.into_iter().next())
    }

    /// Create a reservation in `pending` state
    pub async fn create(&self, data: ReservationCreate) -> RepoResult<Reservation> {
        let now = now_millis();
        let reservation = Reservation {
            id: None,
            user: data.user,
            floorplan_id: data.floorplan_id,
            table_id: data.table_id,
            table_name: data.table_name,
            date: data.date,
            time_slot: data.time_slot,
            guests: data.guests,
            note: data.note,
            status: ReservationStatus::Pending,
            starts_at: data.starts_at,
            created_at: now,
            updated_at: now,
        };

        let created: Option<Reservation> =
            self.base.db().create(TABLE).content(reservation).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create reservation".to_string()))
    }

    /// Set status unconditionally
    pub async fn set_status(
        &self,
        id: &str,
        status: ReservationStatus,
    ) -> RepoResult<Option<Reservation>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $id SET status = $status, updated_at = $now RETURN AFTER")
            .bind(("id", thing))
            .bind(("status", status))
            .bind(("now", now_millis()))
            .await?;
        let reservations: Vec<Reservation> = result.take(0)?;
        Ok(reservations.into_iter().next())
    }

    /// Promote `pending` to `active` as a single conditional update.
    ///
    /// Returns `None` when the reservation is missing OR no longer pending,
    /// so two concurrent sweeps can never both claim the same approval.
    pub async fn approve_if_pending(&self, id: &RecordId) -> RepoResult<Option<Reservation>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE reservation SET status = 'active', updated_at = $now \
                 WHERE id = $id AND status = 'pending' RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("now", now_millis()))
            .await?;
        let reservations: Vec<Reservation> = result.take(0)?;
        Ok(reservations.into_iter().next())
    }

    /// Pending reservations created at or before the cutoff, oldest first
    pub async fn find_pending_created_before(
        &self,
        cutoff_millis: i64,
    ) -> RepoResult<Vec<Reservation>> {
        let reservations: Vec<Reservation> = self
            .base
            .db()
            .query(
                "SELECT * FROM reservation \
                 WHERE status = 'pending' AND created_at <= $cutoff \
                 ORDER BY created_at ASC",
            )
            .bind(("cutoff", cutoff_millis))
            .await?
            .take(0)?;
        Ok(reservations)
    }

    /// Mark this user's past pending/active reservations as finished.
    ///
    /// Returns the number of rows flipped. Idempotent: a second call with
    /// the same clock sees nothing left to update.
    pub async fn finish_past(&self, user: &RecordId, now_millis: i64) -> RepoResult<usize> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE reservation SET status = 'finished', updated_at = $now \
                 WHERE user = $user AND status IN ['pending', 'active'] \
                 AND starts_at < $now RETURN AFTER",
            )
            .bind(("user", user.clone()))
            .bind(("now", now_millis))
            .await?;
        let reservations: Vec<Reservation> = result.take(0)?;
        Ok(reservations.len())
    }

    /// This user's finished reservations, for favorites aggregation
    pub async fn find_finished_by_user(&self, user: &RecordId) -> RepoResult<Vec<Reservation>> {
        let reservations: Vec<Reservation> = self
            .base
            .db()
            .query(
                "SELECT * FROM reservation \
                 WHERE user = $user AND status = 'finished' \
                 ORDER BY starts_at ASC",
            )
            .bind(("user", user.clone()))
            .await?
            .take(0)?;
        Ok(reservations)
    }
}
