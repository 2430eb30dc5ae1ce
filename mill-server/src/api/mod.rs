//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 认证相关接口
//! - [`users`] - 用户管理接口 (管理员)
//! - [`customers`] - 客户管理接口
//! - [`orders`] - 订单管理接口
//! - [`products`] - 成品管理接口
//! - [`raw_materials`] - 原料管理接口
//! - [`inventory`] - 库存汇总/入库接口
//! - [`dispatches`] - 发货管理接口
//! - [`production`] - 生产批次接口
//! - [`alerts`] - 告警接口
//! - [`dashboard`] - 制造仪表盘
//! - [`reports`] - 经营报表

pub mod alerts;
pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod dispatches;
pub mod health;
pub mod inventory;
pub mod orders;
pub mod production;
pub mod products;
pub mod raw_materials;
pub mod reports;
pub mod users;

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppError, AppResult};
