//! User repository. Loads principals together with their ordered groups.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use super::entities::{user, user_group};
use crate::domain::User;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Create a principal with its group memberships in one transaction
    async fn create(
        &self,
        username: String,
        password_hash: String,
        groups: Vec<String>,
    ) -> AppResult<User>;
}

/// SeaORM implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn with_groups<C: ConnectionTrait>(conn: &C, model: user::Model) -> AppResult<User> {
        let groups = user_group::Entity::find()
            .filter(user_group::Column::UserId.eq(model.id))
            .order_by_asc(user_group::Column::Position)
            .all(conn)
            .await?
            .into_iter()
            .map(|g| g.group_name)
            .collect();

        Ok(User {
            id: model.id,
            username: model.username,
            password_hash: model.password_hash,
            is_active: model.is_active,
            groups,
            created_at: model.created_at,
        })
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        match user::Entity::find_by_id(id).one(&self.db).await? {
            Some(model) => Ok(Some(Self::with_groups(&self.db, model).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;

        match model {
            Some(model) => Ok(Some(Self::with_groups(&self.db, model).await?)),
            None => Ok(None),
        }
    }

    async fn create(
        &self,
        username: String,
        password_hash: String,
        groups: Vec<String>,
    ) -> AppResult<User> {
        let txn = self.db.begin().await?;

        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username),
            password_hash: Set(password_hash),
            is_active: Set(true),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(&txn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict("User"),
            _ => AppError::from(e),
        })?;

        for (position, group_name) in groups.into_iter().enumerate() {
            user_group::ActiveModel {
                user_id: Set(model.id),
                group_name: Set(group_name),
                position: Set(position as i32),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        let user = Self::with_groups(&txn, model).await?;
        txn.commit().await?;
        Ok(user)
    }
}
