use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::users::repo_types::{NewUser, User, DEFAULT_ROLE};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("phone number already registered")]
    Duplicate,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistent collection of users.
///
/// Phone-keyed mutations only touch records that are not soft-deleted;
/// `find_by_phone` and `find_by_id` return deleted records too.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Verified, non-deleted users in registration order.
    async fn list_verified(&self) -> Result<Vec<User>, StoreError>;
    async fn insert(&self, new_user: &NewUser) -> Result<User, StoreError>;
    /// Undelete `id`, overwrite its name and clear the verified flag.
    /// `None` when the record is missing or not deleted.
    async fn reactivate(&self, id: Uuid, full_name: &str) -> Result<Option<User>, StoreError>;
    async fn mark_verified(&self, phone: &str) -> Result<Option<User>, StoreError>;
    async fn update_name(&self, phone: &str, full_name: &str)
        -> Result<Option<User>, StoreError>;
    async fn soft_delete(&self, phone: &str) -> Result<Option<User>, StoreError>;
}

const USER_COLUMNS: &str = "id, full_name, phone, email, password_hash, role, \
     is_phone_verified, is_deleted, job_category, job_type, created_at";

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE phone = $1"
        ))
        .bind(phone)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn list_verified(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE is_phone_verified AND NOT is_deleted
            ORDER BY created_at ASC
            "#
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }

    async fn insert(&self, new_user: &NewUser) -> Result<User, StoreError> {
        let result = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, full_name, phone, email, password_hash, role, job_category, job_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.full_name)
        .bind(&new_user.phone)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(DEFAULT_ROLE)
        .bind(&new_user.job_category)
        .bind(&new_user.job_type)
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Duplicate)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn reactivate(&self, id: Uuid, full_name: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET is_deleted = FALSE, is_phone_verified = FALSE, full_name = $2
             WHERE id = $1 AND is_deleted
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(full_name)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn mark_verified(&self, phone: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET is_phone_verified = TRUE
             WHERE phone = $1 AND NOT is_deleted
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(phone)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn update_name(
        &self,
        phone: &str,
        full_name: &str,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET full_name = $2
             WHERE phone = $1 AND NOT is_deleted
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(phone)
        .bind(full_name)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn soft_delete(&self, phone: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET is_deleted = TRUE
             WHERE phone = $1 AND NOT is_deleted
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(phone)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}
