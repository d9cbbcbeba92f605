use std::path::PathBuf;
use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::error::{Result, ServerError};
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{NotificationRepository, UserRepository};
use crate::reservations::{ReservationScheduler, ReservationService};
use crate::services::Mailer;

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是核心数据结构，持有所有服务的共享引用。
/// 使用 Arc / Clone 实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | mailer | Mailer | 邮件服务 |
/// | reservations | ReservationService | 预订生命周期 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 邮件服务
    pub mailer: Mailer,
    /// 预订服务
    pub reservations: ReservationService,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (database/, uploads/, logs/)
    /// 2. 数据库 (work_dir/database/reservations.db)
    /// 3. 各服务 (JWT, Mailer, ReservationService)
    pub async fn initialize(config: &Config) -> Result<Self> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| ServerError::Config(format!("Failed to create work directory: {e}")))?;

        let db_path = config.database_dir().join("reservations.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .map_err(|e| ServerError::Database(e.to_string()))?;
        let db = db_service.db;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let mailer = Mailer::new(
            config.smtp.clone(),
            config.mail_from.clone(),
            config.public_base_url.clone(),
        )
        .map_err(|e| ServerError::Config(format!("Mailer setup failed: {e}")))?;

        let reservations = ReservationService::new(db.clone(), mailer.clone(), config.timezone);

        Ok(Self {
            config: config.clone(),
            db,
            jwt_service,
            mailer,
            reservations,
        })
    }

    /// 启动后台任务
    ///
    /// 必须在 `Server::run()` 里调用，返回的管理器负责 graceful shutdown。
    ///
    /// 启动的任务：
    /// - 预订确认调度器 (ReservationScheduler)
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let scheduler =
            ReservationScheduler::new(self.reservations.clone(), tasks.shutdown_token());
        tasks.spawn("reservation_scheduler", TaskKind::Periodic, scheduler.run());

        tasks.log_summary();
        tasks
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 用户仓库
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.db.clone())
    }

    /// 通知仓库
    pub fn notifications(&self) -> NotificationRepository {
        NotificationRepository::new(self.db.clone())
    }
}
