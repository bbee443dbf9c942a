use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::config::BootstrapConfig;
use crate::entities::{Role, user_entity as user};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{hash_password, validate_password};

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
}

impl UserService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list_users(&self) -> AppResult<Vec<UserResponse>> {
        let users = user::Entity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        let found = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.pool)
            .await?;
        Ok(found)
    }

    pub async fn create_user(&self, username: &str, password: &str, role: Role) -> AppResult<user::Model> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::ValidationError("Username is required".to_string()));
        }
        validate_password(password)?;
        if self.find_by_username(username).await?.is_some() {
            return Err(AppError::ValidationError(format!(
                "Username already exists: {username}"
            )));
        }

        let now = Utc::now();
        let created = user::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(hash_password(password)?),
            role: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(created)
    }

    /// 启动时根据配置创建初始管理员；已存在同名用户时不做任何修改
    pub async fn ensure_bootstrap_admin(&self, cfg: &BootstrapConfig) -> AppResult<Option<i64>> {
        let (username, password) = match (&cfg.admin_username, &cfg.admin_password) {
            (Some(u), Some(p)) => (u, p),
            (None, None) => return Ok(None),
            _ => {
                return Err(AppError::ConfigError(
                    "bootstrap.admin_username and bootstrap.admin_password must be set together"
                        .to_string(),
                ));
            }
        };

        if self.find_by_username(username).await?.is_some() {
            log::debug!("Bootstrap admin '{username}' already exists");
            return Ok(None);
        }

        let admin = self.create_user(username, password, Role::Admin).await?;
        log::info!("Bootstrap admin '{}' created with id {}", admin.username, admin.id);
        Ok(Some(admin.id))
    }
}
