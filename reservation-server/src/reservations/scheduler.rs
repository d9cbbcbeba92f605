//! 预订确认调度器
//!
//! 每 [`SWEEP_PERIOD`] 扫描一次，把等待超过 30 秒的 pending 预订
//! 翻转为 active。翻转本身是条件更新，多个实例并发扫描也不会
//! 重复确认。
//!
//! 注册为 `TaskKind::Periodic`，在 `start_background_tasks()` 中启动。

use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use super::service::ReservationService;

/// How often the scheduler sweeps for due pending reservations
pub const SWEEP_PERIOD: Duration = Duration::from_secs(5);

/// 预订确认调度器
pub struct ReservationScheduler {
    service: ReservationService,
    shutdown: CancellationToken,
    period: Duration,
}

impl ReservationScheduler {
    pub fn new(service: ReservationService, shutdown: CancellationToken) -> Self {
        Self::with_period(service, shutdown, SWEEP_PERIOD)
    }

    /// 自定义扫描间隔，测试用
    pub fn with_period(
        service: ReservationService,
        shutdown: CancellationToken,
        period: Duration,
    ) -> Self {
        Self {
            service,
            shutdown,
            period,
        }
    }

    /// 主循环：启动扫一次 → 周期触发
    pub async fn run(self) {
        tracing::info!("Reservation scheduler started");

        // 启动补扫：重启期间到期的 pending 立即处理
        self.sweep_once().await;

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.period) => {}
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Reservation scheduler received shutdown signal");
                    break;
                }
            }

            self.sweep_once().await;
        }

        tracing::info!("Reservation scheduler stopped");
    }

    async fn sweep_once(&self) {
        match self.service.process_pending().await {
            Ok(0) => {}
            Ok(n) => tracing::info!(approved = n, "Pending reservations approved"),
            Err(e) => tracing::error!("Reservation sweep failed: {}", e),
        }
    }
}
