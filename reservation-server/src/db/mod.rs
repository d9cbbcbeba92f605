//! Database Module
//!
//! Embedded SurrealDB (RocksDB engine) connection and schema setup.

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the embedded database at the given path
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        db.use_ns("reservations")
            .use_db("main")
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        Self::define_schema(&db).await?;

        tracing::info!(path = %db_path, "Database connection established (SurrealDB/RocksDB)");

        Ok(Self { db })
    }

    /// Define unique indexes. SurrealDB tables are otherwise schemaless;
    /// the API boundary enforces field shapes.
    async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
        db.query("DEFINE INDEX IF NOT EXISTS user_email ON user FIELDS email UNIQUE")
            .query("DEFINE INDEX IF NOT EXISTS user_phone ON user FIELDS phone UNIQUE")
            .query("DEFINE INDEX IF NOT EXISTS reservation_user ON reservation FIELDS user")
            .query("DEFINE INDEX IF NOT EXISTS notification_user ON notification FIELDS user")
            .await
            .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;
        Ok(())
    }
}
