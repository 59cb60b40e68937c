use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub phone: String, // lookup key, stored as submitted (trimmed)
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub role: String,
    pub is_phone_verified: bool,
    pub is_deleted: bool,
    pub job_category: Option<String>,
    pub job_type: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Validated input for a first-time registration.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub job_category: Option<String>,
    pub job_type: Option<String>,
}

pub const DEFAULT_ROLE: &str = "user";
