//! User API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{UserCreate, UserResponse, UserUpdate};
use crate::db::repository::UserRepository;
use crate::utils::{AppError, AppResult, ErrorCode};

/// GET /api/users - 用户列表
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<UserResponse>>> {
    let repo = UserRepository::new(state.db.clone());
    let users = repo.find_all().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// POST /api/users - 创建用户
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<UserResponse>> {
    let repo = UserRepository::new(state.db.clone());
    let user = repo.create(payload).await?;
    Ok(Json(user.into()))
}

/// PUT /api/users/{id} - 更新用户
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<UserResponse>> {
    let repo = UserRepository::new(state.db.clone());
    let user = repo.update(&id, payload).await?;
    Ok(Json(user.into()))
}

/// DELETE /api/users/{id} - 删除用户
///
/// 不允许删除自己。
pub async fn remove(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    if current.id == id {
        return Err(AppError::new(ErrorCode::UserCannotDeleteSelf));
    }

    let repo = UserRepository::new(state.db.clone());
    repo.delete(&id).await?;
    Ok(Json(true))
}
