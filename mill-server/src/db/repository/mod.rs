//! Repository Module
//!
//! Provides CRUD and projection queries over the SurrealDB tables.
//! 库存数量的写入不在仓储层：stock/status 字段只能经由 `StockLedger`，
//! 订单行数量与发货记录只能经由 `DispatchWorkflow`。

// Parties
pub mod customer;
pub mod user;

// Inventory
pub mod product;
pub mod raw_material;

// Orders
pub mod order;

// Dispatch
pub mod dispatch;

// Production
pub mod production;

// System
pub mod alert;
pub mod report;

// Re-exports
pub use alert::AlertRepository;
pub use customer::CustomerRepository;
pub use dispatch::DispatchRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use production::ProductionRepository;
pub use raw_material::RawMaterialRepository;
pub use report::ReportRepository;
pub use user::UserRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

use crate::utils::{AppError, ErrorCode};

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// 分页参数 (1-based page)
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl Pagination {
    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1) * self.limit
    }

    /// 总页数
    pub fn total_pages(&self, total: u64) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        total.div_ceil(self.limit as u64)
    }
}

/// 分页响应信息
#[derive(Debug, Clone, serde::Serialize)]
pub struct PageInfo {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl PageInfo {
    pub fn new(pagination: Pagination, total: u64) -> Self {
        Self {
            total,
            page: pagination.page,
            limit: pagination.limit,
            total_pages: pagination.total_pages(total),
        }
    }
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_offset() {
        let p = Pagination { page: 1, limit: 10 };
        assert_eq!(p.offset(), 0);
        let p = Pagination { page: 3, limit: 20 };
        assert_eq!(p.offset(), 40);
        // page 0 clamps to first page
        let p = Pagination { page: 0, limit: 10 };
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_total_pages() {
        let p = Pagination { page: 1, limit: 10 };
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(10), 1);
        assert_eq!(p.total_pages(11), 2);
    }
}
