//! User database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the users table
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub email: Option<String>,
    pub agree_to_rules: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
