//! # scoutlink-core
//!
//! Domain layer containing entities, value objects, repository traits, and the
//! identity descriptor. This crate has zero dependencies on infrastructure
//! (database, web framework, Discord client, etc.).

pub mod descriptor;
pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use descriptor::{FallbackHints, UserDescriptor};
pub use entities::{DiscordMember, MemberRecord, MinecraftPlayer, ScoutMember, User};
pub use error::DomainError;
pub use traits::{
    MembershipVerifier, NewUser, RepoResult, ScoutCredentials, ScoutVerification, UserRepository,
};
pub use value_objects::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
