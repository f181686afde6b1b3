//! MinecraftPlayer database model

use sqlx::FromRow;

/// Database model for the minecraft_players table
#[derive(Debug, Clone, FromRow)]
pub struct MinecraftPlayerModel {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub oper: String,
    pub time: String,
    pub uuid: String,
}
