//! Verification workflow
//!
//! Orchestrates "verify membership → attach scout identity → optionally
//! attach Minecraft/nickname → mark rules-agreed". Each operation re-resolves
//! the User before mutating, so two requests arriving under different
//! identifiers for the same person converge on one record.

use tracing::{info, instrument};

use scoutlink_core::entities::MemberRecord;
use scoutlink_core::error::DomainError;
use scoutlink_core::traits::{
    MembershipVerifier, ScoutCredentials, ScoutVerification, UserRepository,
};
use scoutlink_core::{User, UserDescriptor};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::resolver::{IdentityResolver, ResolveOptions};

/// Verification workflow service
pub struct VerificationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> VerificationService<'a> {
    /// Create a new VerificationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn resolver(&self) -> IdentityResolver<'_> {
        IdentityResolver::new(self.ctx)
    }

    /// Verify membership credentials and attach the scout identity
    ///
    /// The membership number is added as a fallback hint so a User created
    /// earlier under another identifier is found and merged, not duplicated.
    /// Re-verifying with the same credentials is idempotent and refreshes
    /// the retained payload.
    #[instrument(skip(self, credentials, descriptor), fields(membership_number = %credentials.membership_number))]
    pub async fn verify(
        &self,
        credentials: &ScoutCredentials,
        descriptor: &UserDescriptor,
    ) -> ServiceResult<(User, MemberRecord)> {
        let record = self.ctx.verifier().verify_member(credentials).await?;

        let descriptor = descriptor
            .clone()
            .with_membership_fallback(credentials.membership_number.clone());
        let user = self
            .resolver()
            .resolve(&descriptor, ResolveOptions::create_fresh())
            .await?;

        self.ctx
            .user_repo()
            .upsert_scout_member(
                user.id,
                &ScoutVerification {
                    membership_number: credentials.membership_number.clone(),
                    // Names as held by the registrar, not as typed
                    firstname: record.detail.firstname.clone(),
                    lastname: record.detail.surname.clone(),
                    details: record.to_details(),
                },
            )
            .await?;
        info!(user_id = %user.id, "scout membership verified and attached");

        let user = self.reload(user.id).await?;
        Ok((user, record))
    }

    /// Attach a Minecraft username; case-insensitive upsert, last claim wins
    #[instrument(skip(self, descriptor))]
    pub async fn link_minecraft_username(
        &self,
        username: &str,
        descriptor: &UserDescriptor,
    ) -> ServiceResult<User> {
        let user = self
            .resolver()
            .resolve(descriptor, ResolveOptions::create_fresh())
            .await?;

        self.ctx
            .user_repo()
            .upsert_minecraft_player(user.id, username)
            .await?;
        info!(user_id = %user.id, username, "minecraft username linked");

        self.reload(user.id).await
    }

    /// Attach a Discord presence to the user a membership number points at
    ///
    /// Pure lookup: linking never creates a user, so `None` means neither
    /// the membership number nor the Discord ID matched anyone.
    #[instrument(skip(self))]
    pub async fn link_discord(
        &self,
        membership_number: &str,
        discord_id: &str,
    ) -> ServiceResult<Option<User>> {
        let descriptor =
            UserDescriptor::by_discord(discord_id).with_membership_fallback(membership_number);
        let user = match self
            .resolver()
            .resolve(&descriptor, ResolveOptions::lookup())
            .await
        {
            Ok(user) => user,
            Err(ServiceError::Domain(DomainError::UserNotFound)) => return Ok(None),
            Err(e) => return Err(e),
        };

        if user.discord_id() != Some(discord_id) {
            self.ctx
                .user_repo()
                .upsert_discord_member(user.id, discord_id, None)
                .await?;
        }

        self.reload(user.id).await.map(Some)
    }

    /// Overwrite the Discord nickname override
    ///
    /// Only meaningful for a User with a Discord presence; a descriptor that
    /// cannot carry one (email alone) is unsupported.
    #[instrument(skip(self, descriptor))]
    pub async fn set_nickname(
        &self,
        nickname: &str,
        descriptor: &UserDescriptor,
    ) -> ServiceResult<User> {
        if descriptor.discord_id.is_none() {
            return Err(DomainError::ActionUnsupported(
                "nickname requires a Discord identity".to_string(),
            )
            .into());
        }

        let user = self
            .resolver()
            .resolve(descriptor, ResolveOptions::create_fresh())
            .await?;

        self.ctx.user_repo().set_nickname(user.id, nickname).await?;
        self.reload(user.id).await
    }

    /// Record rules acceptance; monotonic, never cleared
    #[instrument(skip(self, descriptor))]
    pub async fn record_rule_acceptance(&self, descriptor: &UserDescriptor) -> ServiceResult<User> {
        let user = self
            .resolver()
            .resolve(descriptor, ResolveOptions::create_fresh())
            .await?;

        self.ctx.user_repo().record_rule_acceptance(user.id).await?;
        info!(user_id = %user.id, "rules acceptance recorded");

        self.reload(user.id).await
    }

    /// Pure read of the rules-acceptance flag; false when no User matches
    #[instrument(skip(self, descriptor))]
    pub async fn has_accepted_rules(&self, descriptor: &UserDescriptor) -> ServiceResult<bool> {
        match self
            .resolver()
            .resolve(descriptor, ResolveOptions::lookup())
            .await
        {
            Ok(user) => Ok(user.agree_to_rules),
            Err(ServiceError::Domain(DomainError::UserNotFound)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Resolve and fail with `UserDisagreesWithRules` unless rules are accepted
    ///
    /// Used by adapters to gate operations on prior acceptance.
    #[instrument(skip(self, descriptor))]
    pub async fn ensure_rules_accepted(&self, descriptor: &UserDescriptor) -> ServiceResult<User> {
        let user = self
            .resolver()
            .resolve(descriptor, ResolveOptions::lookup())
            .await?;
        if !user.agree_to_rules {
            return Err(DomainError::UserDisagreesWithRules.into());
        }
        Ok(user)
    }

    /// Page through all users (admin listing)
    #[instrument(skip(self))]
    pub async fn list_users(&self, page: i64, per_page: i64) -> ServiceResult<Vec<User>> {
        Ok(self.ctx.user_repo().list(page, per_page).await?)
    }

    async fn reload(&self, id: scoutlink_core::Snowflake) -> ServiceResult<User> {
        self.ctx.resolution_cache().invalidate_user(id);
        self.ctx
            .user_repo()
            .find_by_id(id)
            .await?
            .ok_or(DomainError::UserNotFound.into())
    }
}
