//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 4xxx: Reservation errors
/// - 5xxx: Subscription errors
/// - 6xxx: Upload errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Reservation errors (4xxx)
    Reservation,
    /// Subscription errors (5xxx)
    Subscription,
    /// Upload errors (6xxx)
    Upload,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            4000..5000 => Self::Reservation,
            5000..6000 => Self::Subscription,
            6000..7000 => Self::Upload,
            _ => Self::System,
        }
    }

    /// Determine category from an [`ErrorCode`]
    pub fn of(code: ErrorCode) -> Self {
        Self::from_code(code.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_ranges() {
        assert_eq!(ErrorCategory::of(ErrorCode::NotFound), ErrorCategory::General);
        assert_eq!(ErrorCategory::of(ErrorCode::TokenExpired), ErrorCategory::Auth);
        assert_eq!(
            ErrorCategory::of(ErrorCode::SlotConflict),
            ErrorCategory::Reservation
        );
        assert_eq!(
            ErrorCategory::of(ErrorCode::DatabaseError),
            ErrorCategory::System
        );
    }
}
