//! 预订领域模块
//!
//! - [`ReservationService`] - 生命周期管理 (创建、确认、取消、对账)
//! - [`ReservationScheduler`] - 周期性自动确认
//! - [`favorites`] - 常用桌台聚合

pub mod favorites;
pub mod scheduler;
pub mod service;

pub use favorites::{FAVORITES_LIMIT, compute_favorites};
pub use scheduler::{ReservationScheduler, SWEEP_PERIOD};
pub use service::{APPROVAL_DELAY, ReservationService};
