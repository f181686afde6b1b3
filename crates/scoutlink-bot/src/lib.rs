//! # scoutlink-bot
//!
//! Discord adapter: slash commands for verification and linking, the rules
//! acceptance flow, and the projection of resolved users onto live guild
//! members (nickname + managed roles).

pub mod bot;
pub mod commands;
pub mod error;
pub mod member_sync;

pub use bot::{run, Bot};
pub use error::{BotError, BotResult};
