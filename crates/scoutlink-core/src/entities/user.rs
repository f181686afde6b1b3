//! User entity - the central identity aggregate
//!
//! A User is created lazily on first contact from any adapter and accumulates
//! linked identities over time: at most one scouting membership, at most one
//! Discord presence, and any number of Minecraft usernames.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entities::{DiscordMember, MinecraftPlayer, ScoutMember};
use crate::value_objects::Snowflake;

/// Central user aggregate owning all linked identities
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: Snowflake,
    /// Unique if present; the strongest caller-asserted identifier
    pub email: Option<String>,
    /// Monotonic false -> true, never reset
    pub agree_to_rules: bool,
    pub scout_member: Option<ScoutMember>,
    pub discord_member: Option<DiscordMember>,
    pub minecraft_players: Vec<MinecraftPlayer>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a bare User with no linked identities
    pub fn new(id: Snowflake, email: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            agree_to_rules: false,
            scout_member: None,
            discord_member: None,
            minecraft_players: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether a verified scouting membership is attached
    #[inline]
    pub fn has_scout_identity(&self) -> bool {
        self.scout_member.is_some()
    }

    /// Find a linked Minecraft player by case-insensitive name match
    pub fn find_minecraft_player(&self, name: &str) -> Option<&MinecraftPlayer> {
        self.minecraft_players
            .iter()
            .find(|mc| mc.name.eq_ignore_ascii_case(name))
    }

    /// The Discord snowflake this user is linked to, if any
    pub fn discord_id(&self) -> Option<&str> {
        self.discord_member.as_ref().map(|dm| dm.discord_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_has_no_identities() {
        let user = User::new(Snowflake::new(1), Some("a@example.com".to_string()));
        assert!(!user.has_scout_identity());
        assert!(user.discord_member.is_none());
        assert!(user.minecraft_players.is_empty());
        assert!(!user.agree_to_rules);
    }

    #[test]
    fn test_find_minecraft_player_is_case_insensitive() {
        let mut user = User::new(Snowflake::new(1), None);
        user.minecraft_players.push(MinecraftPlayer {
            id: 1,
            name: "Notch".to_string(),
            oper: String::new(),
            time: String::new(),
            uuid: String::new(),
        });

        assert!(user.find_minecraft_player("NOTCH").is_some());
        assert!(user.find_minecraft_player("notch").is_some());
        assert!(user.find_minecraft_player("Jeb").is_none());
    }
}
