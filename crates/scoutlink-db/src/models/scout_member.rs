//! ScoutMember database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the scout_members table
#[derive(Debug, Clone, FromRow)]
pub struct ScoutMemberModel {
    pub user_id: i64,
    pub membership_number: String,
    pub firstname: String,
    pub lastname: String,
    pub details: serde_json::Value,
    pub verified_at: DateTime<Utc>,
}
