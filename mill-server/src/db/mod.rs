//! Database Module
//!
//! 嵌入式 SurrealDB 连接与模式定义。数据库句柄在进程启动时打开一次，
//! 经由 `ServerState` 注入各组件。

pub mod models;
pub mod repository;
pub mod schema;
pub mod sequence;

use std::path::Path;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::utils::AppError;

pub use sequence::SequenceAllocator;

const NAMESPACE: &str = "tarpmill";
const DATABASE: &str = "mill";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open the on-disk database (RocksDB backend) and apply schema
    pub async fn open(db_path: &Path) -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        Self::prepare(db).await
    }

    /// Open an in-memory database (tests, ephemeral dev runs)
    pub async fn open_memory() -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open memory database: {e}")))?;

        Self::prepare(db).await
    }

    async fn prepare(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        schema::define_schema(&db)
            .await
            .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;

        tracing::info!("Database ready (ns={}, db={})", NAMESPACE, DATABASE);

        Ok(Self { db })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_on_disk_applies_schema() {
        let tmp = tempfile::tempdir().unwrap();
        let service = DbService::open(&tmp.path().join("mill.db")).await.unwrap();

        // 唯一索引生效: 同名用户第二次插入必须失败
        service
            .db
            .query("CREATE user SET username = 'dup', password_hash = 'x', role = 'operator', is_active = true, created_at = 0")
            .await
            .unwrap()
            .check()
            .unwrap();
        let second = service
            .db
            .query("CREATE user SET username = 'dup', password_hash = 'x', role = 'operator', is_active = true, created_at = 0")
            .await
            .unwrap()
            .check();
        assert!(second.is_err());
    }
}
