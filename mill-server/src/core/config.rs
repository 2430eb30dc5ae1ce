use crate::auth::JwtConfig;
use crate::dispatch::OrderTotalPolicy;

/// 服务器配置 - 所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/tarpmill | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | TX_TIMEOUT_MS | 10000 | 发货事务超时(毫秒) |
/// | SINGLE_DISPATCH_PER_ORDER | false | 每个订单只允许一次发货 (旧版行为) |
/// | ORDER_TOTAL_POLICY | increment | 全量交付时订单总额策略: increment \| keep |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/tarpmill HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// 发货原子事务超时时间 (毫秒)
    pub tx_timeout_ms: u64,

    // === 发货策略 (显式命名，见 DESIGN.md Open Questions) ===
    /// 每个订单只允许一次发货记录 (旧版 1:1 行为)
    pub single_dispatch_per_order: bool,
    /// 全量交付时订单总额的处理策略
    pub order_total_policy: OrderTotalPolicy,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/tarpmill".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            tx_timeout_ms: std::env::var("TX_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10000),
            single_dispatch_per_order: std::env::var("SINGLE_DISPATCH_PER_ORDER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            order_total_policy: std::env::var("ORDER_TOTAL_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(OrderTotalPolicy::IncrementByDispatchAmount),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据库目录
    pub fn database_dir(&self) -> std::path::PathBuf {
        std::path::PathBuf::from(&self.work_dir).join("database")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        Ok(())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
