//! MinecraftPlayer entity - a linked Minecraft username

use serde::Serialize;

/// A Minecraft username linked to a User; zero-or-many per user
///
/// Names are matched case-insensitively. `oper`, `time` and `uuid` are
/// operational metadata maintained by the game-server side and not used by
/// the identity core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinecraftPlayer {
    pub id: i64,
    pub name: String,
    pub oper: String,
    pub time: String,
    pub uuid: String,
}
