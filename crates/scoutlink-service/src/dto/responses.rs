//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use serde::Serialize;

use scoutlink_core::Snowflake;

/// Outcome of a web verification attempt
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl VerifyResponse {
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// A user as shown in the admin listing
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Snowflake,
    pub email: Option<String>,
    pub agree_to_rules: bool,
    pub scout_member: Option<ScoutMemberResponse>,
    pub discord_member: Option<DiscordMemberResponse>,
    pub minecraft_players: Vec<MinecraftPlayerResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ScoutMemberResponse {
    pub membership_number: String,
    pub firstname: String,
    pub lastname: String,
    pub verified_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct DiscordMemberResponse {
    pub discord_id: String,
    pub nickname: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MinecraftPlayerResponse {
    pub name: String,
}

/// Paginated admin listing
#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub page: i64,
    pub per_page: i64,
    pub users: Vec<UserResponse>,
}
