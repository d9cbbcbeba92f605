//! Shared types for the reservation platform
//!
//! Common types used by the server and any future client crates:
//! error codes, error/response structures and API DTOs.

pub mod client;
pub mod error;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
