//! DiscordMember entity - a User's Discord presence

use serde::Serialize;

/// Discord presence attached to a User
///
/// The `discord_id` is unique across users but may be detached from one User
/// and reattached to another during a duplicate merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscordMember {
    /// Discord's own snowflake, kept as the string it arrives as
    pub discord_id: String,
    /// Nickname override chosen by the user, if any
    pub nickname: Option<String>,
}
