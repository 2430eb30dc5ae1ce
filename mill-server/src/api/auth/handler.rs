//! Auth API Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::auth::{CurrentUser, verify_password};
use crate::core::ServerState;
use crate::db::models::UserResponse;
use crate::db::repository::UserRepository;
use crate::security_log;
use crate::utils::{AppError, AppResult};

/// 登录请求
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 登录响应
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// POST /api/auth/login - 登录
///
/// 用户名不存在与密码错误返回同一错误 (防枚举)。
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .find_by_username(&payload.username)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    if !user.is_active {
        security_log!("WARN", "login_disabled_account", username = payload.username.clone());
        return Err(AppError::new(crate::utils::ErrorCode::AccountDisabled));
    }

    if !verify_password(&payload.password, &user.password_hash) {
        security_log!("WARN", "login_failed", username = payload.username.clone());
        return Err(AppError::invalid_credentials());
    }

    let user_id = user
        .id
        .as_ref()
        .map(|id| id.key().to_string())
        .unwrap_or_default();
    let token = state
        .jwt_service
        .generate_token(&user_id, &user.username, &user.role)
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

    security_log!("INFO", "login_success", username = user.username.clone());

    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

/// GET /api/auth/me - 当前用户信息
pub async fn me(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<UserResponse>> {
    let repo = UserRepository::new(state.db.clone());
    let record = repo
        .find_by_id(&user.id)
        .await?
        .ok_or_else(|| AppError::new(crate::utils::ErrorCode::UserNotFound))?;
    Ok(Json(record.into()))
}
