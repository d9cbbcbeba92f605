//! Unified error handling
//!
//! Error codes are shared between the server and its clients so that the
//! frontend can branch on a stable numeric code instead of parsing
//! messages.
//!
//! - [`ErrorCode`] - stable u16 codes, grouped by domain
//! - [`ErrorCategory`] - code-range classification
//! - [`AppError`] - application error carrying a code + message
//! - [`ApiResponse`] - unified response envelope

pub mod category;
pub mod codes;
pub mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
