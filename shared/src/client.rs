//! Client-related types shared between server and client
//!
//! Common request/response types used in API communication. Wire format is
//! camelCase to match the web client.

use serde::{Deserialize, Serialize};

// Re-export the response envelope for convenience
pub use crate::error::ApiResponse;

// =============================================================================
// Domain enums
// =============================================================================

/// Reservation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Initial state after a booking request
    Pending,
    /// Approved by the auto-approval sweep or an explicit status update
    Active,
    /// Cancelled by the user
    Cancelled,
    /// The reservation's date/time has passed
    Finished,
}

impl ReservationStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Active => "active",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Finished => "finished",
        }
    }
}

/// Subscription tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Premium,
}

/// Subscription billing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Inactive,
    Active,
    PastDue,
}

/// Notification kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    #[serde(rename = "reservationApproved")]
    ReservationApproved,
}

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Register request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// Register response data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user: RegisteredUser,
}

/// Minimal user view returned from register
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    pub id: String,
    pub email: String,
    pub is_verified: bool,
}

/// Login request - identifier is email or phone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub refresh_token: String,
    pub user: UserInfo,
}

/// Refresh request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh response - a fresh token pair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub token: String,
    pub refresh_token: String,
}

/// OAuth login request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthRequest {
    pub provider: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub oauth_id: String,
}

// =============================================================================
// User API DTOs
// =============================================================================

/// User information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub subscription: SubscriptionInfo,
    #[serde(default)]
    pub reservations: Vec<String>,
}

/// Subscription information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionInfo {
    pub tier: SubscriptionTier,
    pub status: SubscriptionStatus,
    /// Unix millis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    /// Unix millis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

/// Profile response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: UserInfo,
}

/// Subscription activation request (demo payment form)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateSubscriptionRequest {
    pub card_number: String,
    pub card_holder: String,
    pub expiry: String,
    pub cvc: String,
}

impl Default for SubscriptionInfo {
    fn default() -> Self {
        Self {
            tier: SubscriptionTier::Free,
            status: SubscriptionStatus::Inactive,
            started_at: None,
            expires_at: None,
        }
    }
}

/// Subscription mutation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    pub message: String,
    pub subscription: SubscriptionInfo,
}

// =============================================================================
// Reservation API DTOs
// =============================================================================

/// Create reservation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
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
}

/// Status update request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateReservationStatusRequest {
    pub status: ReservationStatus,
}

/// Reservation as seen by clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDto {
    pub id: String,
    pub floorplan_id: String,
    pub table_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    pub date: String,
    pub time_slot: String,
    pub guests: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub status: ReservationStatus,
    /// Unix millis
    pub created_at: i64,
    /// Unix millis
    pub updated_at: i64,
}

/// Single-reservation envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationResponse {
    pub reservation: ReservationDto,
}

/// List response: reservations plus the derived favorites summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationListResponse {
    pub reservations: Vec<ReservationDto>,
    pub favorites: Vec<FavoriteTable>,
}

/// Derived "book again" summary entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteTable {
    pub table_id: String,
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    pub floorplan_id: String,
    pub last_date: String,
    pub last_time_slot: String,
}

// =============================================================================
// Notification API DTOs
// =============================================================================

/// Notification as seen by clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDto {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<String>,
    pub read: bool,
    /// Unix millis
    pub created_at: i64,
}

/// Unread notifications envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<NotificationDto>,
}

// =============================================================================
// Floorplan API DTOs
// =============================================================================

/// Table availability status on a floorplan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    Free,
    Reserved,
    Unavailable,
}

/// Floorplan section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorSection {
    pub id: String,
    pub name: String,
}

/// A table placed on a floorplan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorTable {
    pub id: String,
    pub label: String,
    pub x: u32,
    pub y: u32,
    pub capacity: u32,
    pub status: TableStatus,
}

/// Floorplan with sections and table positions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Floorplan {
    pub id: String,
    pub name: String,
    pub sections: Vec<FloorSection>,
    pub tables: Vec<FloorTable>,
}

/// Floorplan catalog envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorplanListResponse {
    pub floorplans: Vec<Floorplan>,
}

/// Per-table availability entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityEntry {
    pub table_id: String,
    pub status: TableStatus,
}

/// Availability response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub floorplan_id: String,
    pub availability: Vec<AvailabilityEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reservation_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&ReservationStatus::Pending).unwrap(),
            "\"pending\""
        );
        let parsed: ReservationStatus = serde_json::from_str("\"finished\"").unwrap();
        assert_eq!(parsed, ReservationStatus::Finished);
    }

    #[test]
    fn test_notification_kind_wire_format() {
        assert_eq!(
            serde_json::to_string(&NotificationKind::ReservationApproved).unwrap(),
            "\"reservationApproved\""
        );
    }

    #[test]
    fn test_create_request_camel_case() {
        let json = r#"{
            "floorplanId": "fp-main-hall",
            "tableId": "T1",
            "tableName": "Table 1",
            "date": "2025-12-24",
            "timeSlot": "20:00",
            "guests": 4
        }"#;
        let req: CreateReservationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.table_id, "T1");
        assert_eq!(req.time_slot, "20:00");
        assert!(req.note.is_none());
    }
}
