//! User Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::auth::hash_password;
use crate::db::models::user::{ROLE_ADMIN, is_valid_role};
use crate::db::models::{User, UserCreate, UserUpdate};
use crate::db::schema::is_unique_index_violation;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const USER_TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all users
    pub async fn find_all(&self) -> RepoResult<Vec<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user ORDER BY username ASC")
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users)
    }

    /// Find user by record key
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let user: Option<User> = self.base.db().select((USER_TABLE, id)).await?;
        Ok(user)
    }

    /// Find user by username (login path)
    pub async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE username = $username LIMIT 1")
            .bind(("username", username.to_string()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user (hashes the password)
    pub async fn create(&self, data: UserCreate) -> RepoResult<User> {
        if data.username.trim().is_empty() {
            return Err(RepoError::Validation("username is required".into()));
        }
        if data.password.len() < 8 {
            return Err(RepoError::Validation(
                "password must be at least 8 characters".into(),
            ));
        }
        if !is_valid_role(&data.role) {
            return Err(RepoError::Validation(format!("invalid role: {}", data.role)));
        }

        let password_hash = hash_password(&data.password)
            .map_err(|e| RepoError::Database(e.to_string()))?;

        let user = User {
            id: None,
            username: data.username,
            password_hash,
            role: data.role,
            is_active: true,
            created_at: shared::util::now_millis(),
        };

        let created: Option<User> = self
            .base
            .db()
            .create(USER_TABLE)
            .content(user)
            .await
            .map_err(|e| {
                if is_unique_index_violation(&e, "user_username") {
                    RepoError::Duplicate("Username already exists".into())
                } else {
                    RepoError::from(e)
                }
            })?;

        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Update password / role / active flag
    pub async fn update(&self, id: &str, data: UserUpdate) -> RepoResult<User> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))?;

        if let Some(ref role) = data.role
            && !is_valid_role(role)
        {
            return Err(RepoError::Validation(format!("invalid role: {role}")));
        }

        let password_hash = match data.password {
            Some(ref password) => {
                if password.len() < 8 {
                    return Err(RepoError::Validation(
                        "password must be at least 8 characters".into(),
                    ));
                }
                Some(hash_password(password).map_err(|e| RepoError::Database(e.to_string()))?)
            }
            None => None,
        };

        let updated = User {
            id: existing.id.clone(),
            username: existing.username.clone(),
            password_hash: password_hash.unwrap_or(existing.password_hash),
            role: data.role.unwrap_or(existing.role),
            is_active: data.is_active.unwrap_or(existing.is_active),
            created_at: existing.created_at,
        };

        let user: Option<User> = self
            .base
            .db()
            .update((USER_TABLE, id))
            .content(updated)
            .await?;
        user.ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Delete a user
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let deleted: Option<User> = self.base.db().delete((USER_TABLE, id)).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }

    /// 首次启动时创建默认管理员 (admin / 环境变量 ADMIN_PASSWORD)
    ///
    /// 已存在任何用户时不做任何事。
    pub async fn seed_default_admin(&self) -> RepoResult<()> {
        let mut result = self
            .base
            .db()
            .query("SELECT VALUE count() FROM user GROUP ALL")
            .await?;
        let counts: Vec<i64> = result.take(0)?;
        if counts.first().copied().unwrap_or(0) > 0 {
            return Ok(());
        }

        let password =
            std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "change-me-now".to_string());
        self.create(UserCreate {
            username: "admin".to_string(),
            password,
            role: ROLE_ADMIN.to_string(),
        })
        .await?;

        tracing::warn!("Seeded default admin user; change its password immediately");
        Ok(())
    }
}
