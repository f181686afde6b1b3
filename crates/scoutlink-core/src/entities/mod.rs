//! Domain entities

mod discord_member;
mod member_record;
mod minecraft_player;
mod scout_member;
mod user;

pub use discord_member::DiscordMember;
pub use member_record::{MemberDetail, MemberRecord, WwcDojStatus};
pub use minecraft_player::MinecraftPlayer;
pub use scout_member::ScoutMember;
pub use user::User;
