//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Every query returns the full User aggregate
//! with all linked identities loaded.

use async_trait::async_trait;

use crate::entities::User;
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Seed data for creating a User
///
/// Only the identifiers the descriptor actually carried are attached at
/// creation; everything else accumulates later.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Snowflake,
    pub email: Option<String>,
    pub discord_id: Option<String>,
}

/// A successful verification to upsert as a ScoutMember sub-record
#[derive(Debug, Clone)]
pub struct ScoutVerification {
    pub membership_number: String,
    pub firstname: String,
    pub lastname: String,
    /// Opaque payload retained for later role derivation
    pub details: serde_json::Value,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by durable id
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Find user by exact email match
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Find user by the Discord ID on its DiscordMember
    async fn find_by_discord_id(&self, discord_id: &str) -> RepoResult<Option<User>>;

    /// Find user by the membership number on its ScoutMember
    async fn find_by_membership_number(&self, membership_number: &str)
        -> RepoResult<Option<User>>;

    /// Find user owning a Minecraft player by case-insensitive name
    async fn find_by_minecraft_name(&self, name: &str) -> RepoResult<Option<User>>;

    /// Create a new user seeded with whichever identifiers are present
    ///
    /// A uniqueness violation (racing creation) surfaces as
    /// `DomainError::UserCreationFailed`.
    async fn create(&self, new_user: &NewUser) -> RepoResult<User>;

    /// Fold `duplicate` into `survivor` in one atomic step
    ///
    /// The Discord presence, email (when the survivor has none), Minecraft
    /// players, and rules acceptance move onto the survivor; the duplicate
    /// row is deleted. A partial merge must never be observable.
    async fn merge_into(&self, duplicate: Snowflake, survivor: Snowflake) -> RepoResult<()>;

    /// Record or replace the user's email
    async fn update_email(&self, id: Snowflake, email: &str) -> RepoResult<()>;

    /// Attach or move a Discord presence onto this user
    async fn upsert_discord_member(
        &self,
        id: Snowflake,
        discord_id: &str,
        nickname: Option<&str>,
    ) -> RepoResult<()>;

    /// Create or refresh the ScoutMember sub-record; never duplicates a
    /// membership number
    async fn upsert_scout_member(
        &self,
        id: Snowflake,
        verification: &ScoutVerification,
    ) -> RepoResult<()>;

    /// Case-insensitive upsert of a Minecraft username; detaches the name
    /// from any other owner (last claim wins)
    async fn upsert_minecraft_player(&self, id: Snowflake, name: &str) -> RepoResult<()>;

    /// Overwrite the Discord nickname override
    async fn set_nickname(&self, id: Snowflake, nickname: &str) -> RepoResult<()>;

    /// Set agree_to_rules true; never clears it
    async fn record_rule_acceptance(&self, id: Snowflake) -> RepoResult<()>;

    /// Page through all users, 1-based page index
    async fn list(&self, page: i64, per_page: i64) -> RepoResult<Vec<User>>;
}
