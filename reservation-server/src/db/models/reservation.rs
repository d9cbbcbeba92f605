//! Reservation Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::client::{ReservationDto, ReservationStatus};
use surrealdb::RecordId;

/// Reservation ID type
pub type ReservationId = RecordId;

/// Reservation entity matching the SurrealDB schema
///
/// `starts_at` is derived from `date` + `time_slot` in the business timezone
/// when the reservation is created; the repository layer compares only
/// millis, never re-parses the strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<ReservationId>,
    /// Owning user
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    pub floorplan_id: String,
    pub table_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    /// Calendar date, YYYY-MM-DD
    pub date: String,
    /// Wall-clock slot, HH:MM
    pub time_slot: String,
    pub guests: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub status: ReservationStatus,
    /// Slot start, Unix millis (business timezone)
    pub starts_at: i64,
    /// Unix millis
    pub created_at: i64,
    /// Unix millis
    pub updated_at: i64,
}

impl Reservation {
    /// Client-facing view of this reservation
    pub fn to_dto(&self) -> ReservationDto {
        ReservationDto {
            id: self.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            floorplan_id: self.floorplan_id.clone(),
            table_id: self.table_id.clone(),
            table_name: self.table_name.clone(),
            date: self.date.clone(),
            time_slot: self.time_slot.clone(),
            guests: self.guests,
            note: self.note.clone(),
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Create reservation payload (repository level, user already resolved)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCreate {
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    pub floorplan_id: String,
    pub table_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    pub date: String,
    pub time_slot: String,
    pub guests: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub starts_at: i64,
}
