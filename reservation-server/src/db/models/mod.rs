//! Database Models

// Serde helpers
pub mod serde_helpers;

// Accounts
pub mod user;

// Reservations
pub mod notification;
pub mod reservation;

// Re-exports
pub use notification::{Notification, NotificationId};
pub use reservation::{Reservation, ReservationCreate, ReservationId};
pub use user::{User, UserCreate, UserId, UserProfileUpdate};
