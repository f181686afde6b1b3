//! Entity -> response DTO mappers

use scoutlink_core::entities::{DiscordMember, MinecraftPlayer, ScoutMember, User};

use super::responses::{
    DiscordMemberResponse, MinecraftPlayerResponse, ScoutMemberResponse, UserResponse,
};

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            agree_to_rules: user.agree_to_rules,
            scout_member: user.scout_member.as_ref().map(ScoutMemberResponse::from),
            discord_member: user.discord_member.as_ref().map(DiscordMemberResponse::from),
            minecraft_players: user
                .minecraft_players
                .iter()
                .map(MinecraftPlayerResponse::from)
                .collect(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<&ScoutMember> for ScoutMemberResponse {
    fn from(scout: &ScoutMember) -> Self {
        // The opaque verification payload stays server-side
        Self {
            membership_number: scout.membership_number.clone(),
            firstname: scout.firstname.clone(),
            lastname: scout.lastname.clone(),
            verified_at: scout.verified_at,
        }
    }
}

impl From<&DiscordMember> for DiscordMemberResponse {
    fn from(member: &DiscordMember) -> Self {
        Self {
            discord_id: member.discord_id.clone(),
            nickname: member.nickname.clone(),
        }
    }
}

impl From<&MinecraftPlayer> for MinecraftPlayerResponse {
    fn from(player: &MinecraftPlayer) -> Self {
        Self {
            name: player.name.clone(),
        }
    }
}
