//! User Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Known role names (role 字段为字符串，便于前端直接使用)
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_OPERATOR: &str = "operator";

/// 校验角色名是否合法
pub fn is_valid_role(role: &str) -> bool {
    matches!(role, ROLE_ADMIN | ROLE_MANAGER | ROLE_OPERATOR)
}

/// User entity (password hash never leaves the db layer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

/// Create user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub password: String,
    pub role: String,
}

/// Update user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserUpdate {
    pub password: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

/// API-facing user representation (without the hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: i64,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.map(|id| id.to_string()).unwrap_or_default(),
            username: user.username,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_validation() {
        assert!(is_valid_role("admin"));
        assert!(is_valid_role("operator"));
        assert!(!is_valid_role("root"));
        assert!(!is_valid_role(""));
    }
}
