//! User aggregate <-> model mappers
//!
//! The aggregate is loaded from four tables; this module assembles the rows
//! into a single `User` entity.

use scoutlink_core::entities::{DiscordMember, MinecraftPlayer, ScoutMember, User};
use scoutlink_core::value_objects::Snowflake;

use crate::models::{DiscordMemberModel, MinecraftPlayerModel, ScoutMemberModel, UserModel};

impl From<ScoutMemberModel> for ScoutMember {
    fn from(model: ScoutMemberModel) -> Self {
        ScoutMember {
            membership_number: model.membership_number,
            firstname: model.firstname,
            lastname: model.lastname,
            details: model.details,
            verified_at: model.verified_at,
        }
    }
}

impl From<DiscordMemberModel> for DiscordMember {
    fn from(model: DiscordMemberModel) -> Self {
        DiscordMember {
            discord_id: model.discord_id,
            nickname: model.nickname,
        }
    }
}

impl From<MinecraftPlayerModel> for MinecraftPlayer {
    fn from(model: MinecraftPlayerModel) -> Self {
        MinecraftPlayer {
            id: model.id,
            name: model.name,
            oper: model.oper,
            time: model.time,
            uuid: model.uuid,
        }
    }
}

/// Assemble a full User aggregate from its table rows
pub fn assemble_user(
    user: UserModel,
    scout: Option<ScoutMemberModel>,
    discord: Option<DiscordMemberModel>,
    minecraft: Vec<MinecraftPlayerModel>,
) -> User {
    User {
        id: Snowflake::new(user.id),
        email: user.email,
        agree_to_rules: user.agree_to_rules,
        scout_member: scout.map(ScoutMember::from),
        discord_member: discord.map(DiscordMember::from),
        minecraft_players: minecraft.into_iter().map(MinecraftPlayer::from).collect(),
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_assemble_full_aggregate() {
        let now = Utc::now();
        let user = assemble_user(
            UserModel {
                id: 42,
                email: Some("a@example.com".to_string()),
                agree_to_rules: true,
                created_at: now,
                updated_at: now,
            },
            Some(ScoutMemberModel {
                user_id: 42,
                membership_number: "1234567".to_string(),
                firstname: "Alex".to_string(),
                lastname: "Smith".to_string(),
                details: serde_json::json!({"detail": {"memFlag": true}}),
                verified_at: now,
            }),
            Some(DiscordMemberModel {
                discord_id: "999".to_string(),
                user_id: 42,
                nickname: None,
            }),
            vec![MinecraftPlayerModel {
                id: 1,
                user_id: 42,
                name: "Alex".to_string(),
                oper: String::new(),
                time: String::new(),
                uuid: String::new(),
            }],
        );

        assert_eq!(user.id.into_inner(), 42);
        assert!(user.has_scout_identity());
        assert_eq!(user.discord_id(), Some("999"));
        assert_eq!(user.minecraft_players.len(), 1);
    }

    #[test]
    fn test_assemble_bare_aggregate() {
        let now = Utc::now();
        let user = assemble_user(
            UserModel {
                id: 7,
                email: None,
                agree_to_rules: false,
                created_at: now,
                updated_at: now,
            },
            None,
            None,
            Vec::new(),
        );

        assert!(user.email.is_none());
        assert!(!user.has_scout_identity());
        assert!(user.discord_member.is_none());
        assert!(user.minecraft_players.is_empty());
    }
}
