//! Stock Ledger
//!
//! 维护非负库存数量与派生状态。
//!
//! - `decrement` 封底为 0，发货路径上短缺不报错：缺口记录为
//!   STOCK_DRIFT 告警 (账面与实际的漂移必须可见，而不是静默)。
//! - `increment` 生产入库，总是成功。
//! - 同一实体的并发变更通过 per-entity 异步锁串行化，
//!   避免两个并发扣减都读到旧值 (lost update)。
//! - 状态重算是纯函数 [`StockStatus::classify`]，每次变更后执行。

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio::sync::Mutex;

use crate::db::models::{AlertSeverity, AlertType, StockStatus};
use crate::db::repository::AlertRepository;
use crate::utils::{AppError, AppResult, ErrorCode};

/// 库存实体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockKind {
    Product,
    RawMaterial,
}

impl StockKind {
    pub fn table(&self) -> &'static str {
        match self {
            StockKind::Product => "product",
            StockKind::RawMaterial => "raw_material",
        }
    }

    fn not_found_code(&self) -> ErrorCode {
        match self {
            StockKind::Product => ErrorCode::ProductNotFound,
            StockKind::RawMaterial => ErrorCode::RawMaterialNotFound,
        }
    }
}

/// 变更后的库存水位
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StockLevel {
    pub stock: f64,
    pub status: StockStatus,
}

#[derive(Debug, Clone, Deserialize)]
struct StockRow {
    name: String,
    unit: Option<String>,
    stock: f64,
    reorder_level: Option<f64>,
    status: StockStatus,
}

/// 库存台账
pub struct StockLedger {
    db: Surreal<Db>,
    alerts: AlertRepository,
    /// per-entity 锁表 (key = "table:key")
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl StockLedger {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            alerts: AlertRepository::new(db.clone()),
            db,
            locks: DashMap::new(),
        }
    }

    fn lock_for(&self, kind: StockKind, key: &str) -> Arc<Mutex<()>> {
        let lock_key = format!("{}:{}", kind.table(), key);
        self.locks
            .entry(lock_key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 扣减库存 (封底为 0)
    ///
    /// 发货路径不因短缺失败；被截断的数量以 STOCK_DRIFT 告警暴露。
    pub async fn decrement(&self, kind: StockKind, key: &str, amount: f64) -> AppResult<StockLevel> {
        if amount < 0.0 {
            return Err(AppError::validation("decrement amount cannot be negative"));
        }
        // 不在这里封底：apply 需要看到负的请求值才能算出漂移量
        self.apply(kind, key, |stock| stock - amount).await
    }

    /// 入库 (生产完成、采购)
    pub async fn increment(&self, kind: StockKind, key: &str, amount: f64) -> AppResult<StockLevel> {
        if amount < 0.0 {
            return Err(AppError::validation("increment amount cannot be negative"));
        }
        self.apply(kind, key, |stock| stock + amount).await
    }

    /// 绝对值矫正 (人工盘点路径)
    pub async fn set_absolute(&self, kind: StockKind, key: &str, stock: f64) -> AppResult<StockLevel> {
        if stock < 0.0 {
            return Err(AppError::validation("stock cannot be negative"));
        }
        self.apply(kind, key, |_| stock).await
    }

    /// 读-算-写，持 per-entity 锁
    async fn apply(
        &self,
        kind: StockKind,
        key: &str,
        f: impl FnOnce(f64) -> f64,
    ) -> AppResult<StockLevel> {
        let lock = self.lock_for(kind, key);
        let _guard = lock.lock().await;

        let row: Option<StockRow> = self
            .db
            .select((kind.table(), key))
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        let row = row.ok_or_else(|| {
            AppError::with_message(
                kind.not_found_code(),
                format!("{} {} not found", kind.table(), key),
            )
        })?;

        let requested = f(row.stock);
        let new_stock = requested.max(0.0);
        let new_status = StockStatus::classify(new_stock, row.reorder_level);

        self.db
            .query(format!(
                "UPDATE type::thing('{}', $key) SET stock = $stock, status = $status, updated_at = $now",
                kind.table()
            ))
            .bind(("key", key.to_string()))
            .bind(("stock", new_stock))
            .bind(("status", new_status))
            .bind(("now", shared::util::now_millis()))
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .check()
            .map_err(|e| AppError::database(e.to_string()))?;

        // 封底截断：账面扣不动的数量即漂移
        if requested < 0.0 {
            let drift = -requested;
            tracing::warn!(
                entity = %format!("{}:{}", kind.table(), key),
                name = %row.name,
                drift,
                "Stock decrement clamped at zero, book quantity drifted"
            );
            if let Err(e) = self
                .alerts
                .create(
                    AlertType::StockDrift,
                    AlertSeverity::Warning,
                    format!(
                        "Stock drift for {}: {} {} could not be deducted (clamped at 0)",
                        row.name,
                        drift,
                        row.unit.clone().unwrap_or_default()
                    ),
                )
                .await
            {
                tracing::warn!(error = %e, "Failed to record stock drift alert");
            }
        }

        // 阈值穿越告警 (只在状态恶化时发一次)
        if new_status.needs_alert() && new_status != row.status {
            let severity = match new_status {
                StockStatus::OutOfStock => AlertSeverity::Error,
                _ => AlertSeverity::Warning,
            };
            if let Err(e) = self
                .alerts
                .create(
                    AlertType::StockLow,
                    severity,
                    format!(
                        "Low stock alert for {}. Current stock: {} {}",
                        row.name,
                        new_stock,
                        row.unit.unwrap_or_default()
                    ),
                )
                .await
            {
                tracing::warn!(error = %e, "Failed to record low stock alert");
            }
        }

        Ok(StockLevel {
            stock: new_stock,
            status: new_status,
        })
    }
}
