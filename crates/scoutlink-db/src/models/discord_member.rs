//! DiscordMember database model

use sqlx::FromRow;

/// Database model for the discord_members table
#[derive(Debug, Clone, FromRow)]
pub struct DiscordMemberModel {
    pub discord_id: String,
    pub user_id: i64,
    pub nickname: Option<String>,
}
