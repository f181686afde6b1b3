//! Identity resolver
//!
//! Takes a loosely-identified actor (email, Discord ID, or fallback hints)
//! and resolves it to exactly one durable User, creating or merging records
//! as needed. This is where the one-user-per-identity invariants are
//! enforced, so the resolution order matters:
//!
//! 1. cached resolution for this descriptor, unless a fresh read is forced
//! 2. email (strongest caller-asserted identifier)
//! 3. Discord ID
//! 4. fallback hints (membership number, then Minecraft username)
//! 5. create, when permitted
//!
//! Every successful resolution then runs one reconciliation pass: if a
//! fallback hint points at a *different* User than the one resolved, the two
//! are the same real person contacted under different identifiers, and the
//! scout-identity-rich side survives the merge.

use tracing::{info, instrument, warn};

use scoutlink_core::error::DomainError;
use scoutlink_core::traits::{NewUser, UserRepository};
use scoutlink_core::{Snowflake, User, UserDescriptor};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Options controlling a single resolution
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// Create a User seeded from the descriptor when nothing matches
    pub create_if_missing: bool,
    /// Bypass the resolution cache and read from the store
    pub fresh: bool,
}

impl ResolveOptions {
    /// Find-or-create, accepting a cached resolution
    pub fn create() -> Self {
        Self {
            create_if_missing: true,
            fresh: false,
        }
    }

    /// Find-or-create, forcing a store read
    pub fn create_fresh() -> Self {
        Self {
            create_if_missing: true,
            fresh: true,
        }
    }

    /// Pure lookup; fails with `UserNotFound` when nothing matches
    pub fn lookup() -> Self {
        Self {
            create_if_missing: false,
            fresh: false,
        }
    }
}

/// Identity resolver service
pub struct IdentityResolver<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> IdentityResolver<'a> {
    /// Create a new IdentityResolver
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Resolve a descriptor to exactly one User
    #[instrument(skip(self, descriptor), fields(has_email = descriptor.email.is_some(), discord_id = descriptor.discord_id.as_deref()))]
    pub async fn resolve(
        &self,
        descriptor: &UserDescriptor,
        options: ResolveOptions,
    ) -> ServiceResult<User> {
        let descriptor = self.apply_run_as(descriptor);

        if descriptor.is_empty() {
            return Err(ServiceError::validation(
                "descriptor carries no identifier to resolve by",
            ));
        }

        if !options.fresh {
            if let Some(user) = self.ctx.resolution_cache().get(&descriptor) {
                return Ok(user);
            }
        }

        let user = match self.resolve_uncached(&descriptor, options).await {
            Ok(user) => user,
            // A racing creation inserted our identity first; it is now
            // findable, so one more lookup settles it.
            Err(ServiceError::Domain(DomainError::UserCreationFailed(_))) => {
                self.resolve_uncached(&descriptor, ResolveOptions::lookup())
                    .await?
            }
            Err(e) => return Err(e),
        };

        let user = self.reconcile(user, &descriptor).await?;
        let user = self.update_identifiers(user, &descriptor).await?;

        self.ctx.resolution_cache().put(&descriptor, &user);
        Ok(user)
    }

    /// Top up the resolved User with primary identifiers it lacks
    ///
    /// A User found via a fallback hint was created under a different
    /// identifier; the one the caller just used is attached so the next
    /// request finds the record directly. Existing identifiers are never
    /// overwritten here.
    async fn update_identifiers(
        &self,
        user: User,
        descriptor: &UserDescriptor,
    ) -> ServiceResult<User> {
        let repo = self.ctx.user_repo();
        let mut changed = false;

        if let Some(discord_id) = &descriptor.discord_id {
            if user.discord_member.is_none() {
                repo.upsert_discord_member(user.id, discord_id, None).await?;
                changed = true;
            }
        }

        if let Some(email) = &descriptor.email {
            if user.email.is_none() {
                repo.update_email(user.id, email).await?;
                changed = true;
            }
        }

        if !changed {
            return Ok(user);
        }

        self.ctx.resolution_cache().invalidate_user(user.id);
        repo.find_by_id(user.id)
            .await?
            .ok_or_else(|| ServiceError::internal("user disappeared during identifier top-up"))
    }

    /// Swap the Discord ID for its act-as target, when one is registered
    fn apply_run_as(&self, descriptor: &UserDescriptor) -> UserDescriptor {
        let mut descriptor = descriptor.clone();
        if let Some(discord_id) = &descriptor.discord_id {
            let effective = self.ctx.run_as().effective_discord_id(discord_id);
            if effective != *discord_id {
                descriptor.discord_id = Some(effective);
            }
        }
        descriptor
    }

    async fn resolve_uncached(
        &self,
        descriptor: &UserDescriptor,
        options: ResolveOptions,
    ) -> ServiceResult<User> {
        let repo = self.ctx.user_repo();

        if let Some(email) = &descriptor.email {
            if let Some(user) = repo.find_by_email(email).await? {
                return Ok(user);
            }
        }

        if let Some(discord_id) = &descriptor.discord_id {
            if let Some(user) = repo.find_by_discord_id(discord_id).await? {
                return Ok(user);
            }
        }

        if let Some(user) = self.find_by_fallback(descriptor, None).await? {
            return Ok(user);
        }

        if !options.create_if_missing {
            return Err(DomainError::UserNotFound.into());
        }

        let new_user = NewUser {
            id: self.ctx.generate_id(),
            email: descriptor.email.clone(),
            discord_id: descriptor.discord_id.clone(),
        };
        let user = repo.create(&new_user).await?;
        info!(user_id = %user.id, "created user from descriptor");
        Ok(user)
    }

    /// Search fallback hints among users other than `exclude`
    async fn find_by_fallback(
        &self,
        descriptor: &UserDescriptor,
        exclude: Option<Snowflake>,
    ) -> ServiceResult<Option<User>> {
        let repo = self.ctx.user_repo();

        if let Some(membership_number) = &descriptor.fallback.scout_membership_number {
            if let Some(user) = repo.find_by_membership_number(membership_number).await? {
                if exclude != Some(user.id) {
                    return Ok(Some(user));
                }
            }
        }

        if let Some(username) = &descriptor.fallback.minecraft_username {
            if let Some(user) = repo.find_by_minecraft_name(username).await? {
                if exclude != Some(user.id) {
                    return Ok(Some(user));
                }
            }
        }

        Ok(None)
    }

    /// Duplicate reconciliation, run after every resolution
    ///
    /// When a fallback hint points at a different User than the one already
    /// resolved, fold the scout-identity-poor side into the rich one: the
    /// Discord presence, email, Minecraft players and rules acceptance move
    /// to the survivor and the duplicate row is deleted.
    async fn reconcile(&self, user: User, descriptor: &UserDescriptor) -> ServiceResult<User> {
        let Some(other) = self.find_by_fallback(descriptor, Some(user.id)).await? else {
            return Ok(user);
        };

        if user.has_scout_identity() {
            // Two distinct verified memberships cannot be the same person;
            // leave both records alone.
            warn!(
                resolved = %user.id,
                conflicting = %other.id,
                "fallback hint matches a second verified user; not merging"
            );
            return Ok(user);
        }

        let repo = self.ctx.user_repo();
        let survivor_id = other.id;
        info!(duplicate = %user.id, survivor = %survivor_id, "merging duplicate user");

        // One atomic store operation; a failure part-way must never leave
        // the Discord linkage or email detached from both rows.
        repo.merge_into(user.id, survivor_id).await?;

        self.ctx.resolution_cache().invalidate_user(user.id);
        self.ctx.resolution_cache().invalidate_user(survivor_id);

        repo.find_by_id(survivor_id)
            .await?
            .ok_or_else(|| ServiceError::internal("merge survivor disappeared during merge"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use scoutlink_core::SnowflakeGenerator;

    use crate::services::{RunAsRegistry, ServiceContextBuilder};
    use crate::testing::{MemoryUserRepository, StaticVerifier};

    use super::*;

    fn context() -> (ServiceContext, Arc<MemoryUserRepository>) {
        let repo = Arc::new(MemoryUserRepository::new());
        let ctx = ServiceContextBuilder::new()
            .user_repo(repo.clone())
            .verifier(Arc::new(StaticVerifier::current_member("1234567", "Ben", "Jamin")))
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(0)))
            .build()
            .unwrap();
        (ctx, repo)
    }

    #[tokio::test]
    async fn test_resolving_same_discord_id_twice_returns_same_user() {
        let (ctx, _) = context();
        let resolver = IdentityResolver::new(&ctx);
        let desc = UserDescriptor::by_discord("D1");

        let first = resolver.resolve(&desc, ResolveOptions::create()).await.unwrap();
        let second = resolver.resolve(&desc, ResolveOptions::create_fresh()).await.unwrap();

        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_lookup_without_match_fails_with_user_not_found() {
        let (ctx, _) = context();
        let resolver = IdentityResolver::new(&ctx);

        let err = resolver
            .resolve(&UserDescriptor::by_email("ghost@x.com"), ResolveOptions::lookup())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_empty_descriptor_is_rejected() {
        let (ctx, _) = context();
        let resolver = IdentityResolver::new(&ctx);

        let err = resolver
            .resolve(&UserDescriptor::default(), ResolveOptions::create())
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_email_match_wins_over_discord() {
        let (ctx, _) = context();
        let resolver = IdentityResolver::new(&ctx);

        let by_email = resolver
            .resolve(&UserDescriptor::by_email("a@x.com"), ResolveOptions::create())
            .await
            .unwrap();

        let mut desc = UserDescriptor::by_email("a@x.com");
        desc.discord_id = Some("D9".to_string());
        let again = resolver.resolve(&desc, ResolveOptions::create_fresh()).await.unwrap();

        assert_eq!(by_email.id, again.id);
    }

    #[tokio::test]
    async fn test_fallback_membership_number_finds_existing_user() {
        let (ctx, repo) = context();
        let resolver = IdentityResolver::new(&ctx);

        let verified = resolver
            .resolve(&UserDescriptor::by_email("a@x.com"), ResolveOptions::create())
            .await
            .unwrap();
        repo.attach_scout(verified.id, "M1").await;

        let desc = UserDescriptor::by_discord("D2").with_membership_fallback("M1");
        let resolved = resolver.resolve(&desc, ResolveOptions::create_fresh()).await.unwrap();

        assert_eq!(resolved.id, verified.id);
        assert_eq!(resolved.discord_id(), Some("D2"));
    }

    #[tokio::test]
    async fn test_merge_on_fallback_deletes_identity_poor_duplicate() {
        let (ctx, repo) = context();
        let resolver = IdentityResolver::new(&ctx);

        // U1: discord-only duplicate
        let u1 = resolver
            .resolve(&UserDescriptor::by_discord("D2"), ResolveOptions::create())
            .await
            .unwrap();

        // U2: scout-verified survivor
        let u2 = resolver
            .resolve(&UserDescriptor::by_email("real@x.com"), ResolveOptions::create())
            .await
            .unwrap();
        repo.attach_scout(u2.id, "M1").await;

        // Re-contact from Discord with the membership number as a hint
        let desc = UserDescriptor::by_discord("D2").with_membership_fallback("M1");
        let merged = resolver.resolve(&desc, ResolveOptions::create_fresh()).await.unwrap();

        assert_eq!(merged.id, u2.id, "survivor must be the scout-rich side");
        assert_eq!(merged.discord_id(), Some("D2"));
        assert!(repo.find_by_id(u1.id).await.unwrap().is_none(), "duplicate row must be gone");
    }

    #[tokio::test]
    async fn test_merge_moves_every_linked_identity_to_the_survivor() {
        let (ctx, repo) = context();
        let resolver = IdentityResolver::new(&ctx);

        // U1: web contact with an email, a Discord presence, and a player
        let u1 = resolver
            .resolve(&UserDescriptor::by_email("a@x.com"), ResolveOptions::create())
            .await
            .unwrap();
        repo.upsert_discord_member(u1.id, "D2", None).await.unwrap();
        repo.upsert_minecraft_player(u1.id, "Notch").await.unwrap();

        // U2: scout-verified under a different Discord presence
        let u2 = resolver
            .resolve(&UserDescriptor::by_discord("D9"), ResolveOptions::create())
            .await
            .unwrap();
        repo.attach_scout(u2.id, "M1").await;

        let desc = UserDescriptor::by_discord("D2").with_membership_fallback("M1");
        let merged = resolver.resolve(&desc, ResolveOptions::create_fresh()).await.unwrap();

        assert_eq!(merged.id, u2.id);
        assert_eq!(merged.discord_id(), Some("D2"));
        assert_eq!(merged.email.as_deref(), Some("a@x.com"));
        assert_eq!(merged.minecraft_players.len(), 1);
        assert_eq!(merged.minecraft_players[0].name, "Notch");
        assert!(repo.find_by_id(u1.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_merge_preserves_rules_acceptance() {
        let (ctx, repo) = context();
        let resolver = IdentityResolver::new(&ctx);

        let u1 = resolver
            .resolve(&UserDescriptor::by_discord("D2"), ResolveOptions::create())
            .await
            .unwrap();
        repo.record_rule_acceptance(u1.id).await.unwrap();

        let u2 = resolver
            .resolve(&UserDescriptor::by_email("real@x.com"), ResolveOptions::create())
            .await
            .unwrap();
        repo.attach_scout(u2.id, "M1").await;

        let desc = UserDescriptor::by_discord("D2").with_membership_fallback("M1");
        let merged = resolver.resolve(&desc, ResolveOptions::create_fresh()).await.unwrap();

        assert!(merged.agree_to_rules);
    }

    #[tokio::test]
    async fn test_two_verified_users_are_not_merged() {
        let (ctx, repo) = context();
        let resolver = IdentityResolver::new(&ctx);

        let u1 = resolver
            .resolve(&UserDescriptor::by_discord("D1"), ResolveOptions::create())
            .await
            .unwrap();
        repo.attach_scout(u1.id, "M1").await;

        let u2 = resolver
            .resolve(&UserDescriptor::by_email("b@x.com"), ResolveOptions::create())
            .await
            .unwrap();
        repo.attach_scout(u2.id, "M2").await;

        let desc = UserDescriptor::by_discord("D1").with_membership_fallback("M2");
        let resolved = resolver.resolve(&desc, ResolveOptions::create_fresh()).await.unwrap();

        assert_eq!(resolved.id, u1.id);
        assert!(repo.find_by_id(u2.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_run_as_override_redirects_resolution() {
        let repo = Arc::new(MemoryUserRepository::new());
        let run_as = Arc::new(RunAsRegistry::new());
        let ctx = ServiceContextBuilder::new()
            .user_repo(repo.clone())
            .verifier(Arc::new(StaticVerifier::current_member("1", "A", "B")))
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(0)))
            .run_as(run_as.clone())
            .build()
            .unwrap();
        let resolver = IdentityResolver::new(&ctx);

        let target = resolver
            .resolve(&UserDescriptor::by_discord("B"), ResolveOptions::create())
            .await
            .unwrap();

        run_as.set_override("A".to_string(), "B".to_string());
        let acted = resolver
            .resolve(&UserDescriptor::by_discord("A"), ResolveOptions::create_fresh())
            .await
            .unwrap();
        assert_eq!(acted.id, target.id);

        run_as.clear_override("A");
        let own = resolver
            .resolve(&UserDescriptor::by_discord("A"), ResolveOptions::create_fresh())
            .await
            .unwrap();
        assert_ne!(own.id, target.id);
    }

    #[tokio::test]
    async fn test_cached_resolution_is_reused_until_invalidated() {
        let (ctx, repo) = context();
        let resolver = IdentityResolver::new(&ctx);
        let desc = UserDescriptor::by_discord("D1");

        let first = resolver.resolve(&desc, ResolveOptions::create()).await.unwrap();
        let lookups_after_first = repo.lookup_count();

        let second = resolver.resolve(&desc, ResolveOptions::create()).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(repo.lookup_count(), lookups_after_first, "cache hit must not re-query");

        ctx.resolution_cache().invalidate_user(first.id);
        let third = resolver.resolve(&desc, ResolveOptions::create()).await.unwrap();
        assert_eq!(first.id, third.id);
        assert!(repo.lookup_count() > lookups_after_first);
    }

    #[tokio::test]
    async fn test_creation_race_falls_back_to_lookup() {
        let (ctx, repo) = context();
        let resolver = IdentityResolver::new(&ctx);

        // Simulate a racing insert: the repo rejects the next create, but a
        // row for the identity exists by the time the retry looks again.
        let raced = repo
            .create(&NewUser {
                id: Snowflake::new(424_242),
                email: None,
                discord_id: Some("D1".to_string()),
            })
            .await
            .unwrap();
        repo.fail_next_create();
        repo.hide_discord_id_once("D1");

        let resolved = resolver
            .resolve(&UserDescriptor::by_discord("D1"), ResolveOptions::create_fresh())
            .await
            .unwrap();

        assert_eq!(resolved.id, raced.id);
    }
}
