use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::dispatch::{DispatchPolicy, DispatchWorkflow};
use crate::stock::StockLedger;
use crate::utils::AppResult;

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是后端的核心数据结构，持有所有服务的共享引用。
/// 使用 Arc 实现浅拷贝，所有权成本极低。数据库句柄在进程启动时
/// 打开一次，通过 state 注入各组件，各模块不得自行新建连接。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | stock | Arc<StockLedger> | 库存台账 (唯一的库存写入方) |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 库存台账
    pub stock: Arc<StockLedger>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/mill.db) + 模式定义
    /// 3. JWT 服务、库存台账
    /// 4. 默认管理员账号 (首次启动)
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        // 0. Ensure work_dir structure exists
        config
            .ensure_work_dir_structure()
            .map_err(|e| crate::utils::AppError::internal(format!("work_dir: {e}")))?;

        // 1. Initialize DB
        let db_path = config.database_dir().join("mill.db");
        let db_service = DbService::open(&db_path).await?;
        let db = db_service.db;

        // 2. Initialize services
        let jwt_service = Arc::new(JwtService::default());
        let stock = Arc::new(StockLedger::new(db.clone()));

        let state = Self {
            config: config.clone(),
            db,
            jwt_service,
            stock,
        };

        // 3. Seed default admin account on first boot
        crate::db::repository::UserRepository::new(state.db.clone())
            .seed_default_admin()
            .await?;

        Ok(state)
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 构造发货工作流 (携带配置中的显式策略)
    pub fn dispatch_workflow(&self) -> DispatchWorkflow {
        DispatchWorkflow::new(
            self.db.clone(),
            self.stock.clone(),
            DispatchPolicy {
                single_dispatch_per_order: self.config.single_dispatch_per_order,
                order_total_policy: self.config.order_total_policy,
                tx_timeout_ms: self.config.tx_timeout_ms,
            },
        )
    }
}
