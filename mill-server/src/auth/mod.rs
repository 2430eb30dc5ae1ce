//! 认证模块 - JWT 认证与密码哈希
//!
//! # 组成
//!
//! - [`JwtService`] - 令牌生成与验证 (HS256)
//! - [`CurrentUser`] - 请求上下文中的用户信息 (extractor)
//! - [`require_auth`] / [`require_admin`] - Axum 中间件
//! - [`hash_password`] / [`verify_password`] - Argon2id 密码哈希

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_admin, require_auth};
pub use password::{hash_password, verify_password};
