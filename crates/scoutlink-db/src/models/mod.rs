//! Database models with SQLx FromRow derives

mod discord_member;
mod minecraft_player;
mod scout_member;
mod user;

pub use discord_member::DiscordMemberModel;
pub use minecraft_player::MinecraftPlayerModel;
pub use scout_member::ScoutMemberModel;
pub use user::UserModel;
