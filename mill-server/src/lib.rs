//! Tarp Mill Server - 帆布厂生产管理系统后端
//!
//! # 架构概述
//!
//! 本模块是后端服务的主入口，提供以下核心功能：
//!
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储，模型 + 仓储层
//! - **认证** (`auth`): JWT + Argon2 认证体系
//! - **库存台账** (`stock`): 库存数量与派生状态的唯一写入方
//! - **发货工作流** (`dispatch`): 订单到发货的两阶段库存核销
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! mill-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、密码哈希
//! ├── db/            # 数据库层 (模型、仓储、序号分配)
//! ├── stock/         # 库存台账
//! ├── dispatch/      # 发货工作流
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod dispatch;
pub mod stock;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use db::{DbService, SequenceAllocator};
pub use dispatch::DispatchWorkflow;
pub use stock::StockLedger;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置进程环境：加载 .env 并初始化日志
pub fn setup_environment() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), None, log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
  ______                    __  ___ _ ____
 /_  __/___ __________     /  |/  (_) / /
  / / / __ `/ ___/ __ \   / /|_/ / / / /
 / / / /_/ / /  / /_/ /  / /  / / / / /
/_/  \__,_/_/  / .___/  /_/  /_/_/_/_/
              /_/
    "#
    );
}
