//! End-to-end identity flows over the in-memory store
//!
//! Each test drives the public service API the way the web form and the
//! Discord bot do, and asserts the durable-identity guarantees: one User
//! per person, merge instead of duplicate, idempotent re-verification, and
//! stable projection.

use integration_tests::{
    context_sharing_repo, context_with_record, credentials, member_record, unverified_context,
    verified_context,
};
use scoutlink_core::traits::{ScoutVerification, UserRepository};
use scoutlink_core::{DomainError, UserDescriptor};
use scoutlink_service::testing::StaticVerifier;
use scoutlink_service::{
    IdentityResolver, Projector, ResolveOptions, ServiceError, VerificationService,
};

#[tokio::test]
async fn verification_is_idempotent_and_refreshes_payload() {
    let (ctx, repo) = verified_context("M100");
    let descriptor = UserDescriptor::by_email("ben@example.com");

    let service = VerificationService::new(&ctx);
    let (first, _) = service.verify(&credentials("M100"), &descriptor).await.unwrap();
    let (second, _) = service.verify(&credentials("M100"), &descriptor).await.unwrap();

    assert_eq!(first.id, second.id);
    let all = repo.list(1, 100).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(
        all[0].scout_member.as_ref().unwrap().membership_number,
        "M100"
    );

    // A later verification with a changed registry answer replaces the payload
    let ctx2 = context_sharing_repo(
        repo.clone(),
        StaticVerifier::with_record(member_record("M100", "VENT", true)),
    );
    let (refreshed, record) = VerificationService::new(&ctx2)
        .verify(&credentials("M100"), &descriptor)
        .await
        .unwrap();

    assert_eq!(refreshed.id, first.id);
    assert_eq!(record.detail.class_id, "VENT");
    let scout = refreshed.scout_member.unwrap();
    let retained = scout.member_record().unwrap();
    assert_eq!(retained.detail.class_id, "VENT");
}

#[tokio::test]
async fn resolving_same_discord_id_never_duplicates() {
    let (ctx, repo) = verified_context("M101");
    let resolver = IdentityResolver::new(&ctx);
    let descriptor = UserDescriptor::by_discord("D1");

    let first = resolver.resolve(&descriptor, ResolveOptions::create()).await.unwrap();
    let second = resolver.resolve(&descriptor, ResolveOptions::create()).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(repo.list(1, 100).await.unwrap().len(), 1);
}

#[tokio::test]
async fn fallback_hint_merges_duplicate_into_scout_identity() {
    let (ctx, repo) = verified_context("M200");
    let resolver = IdentityResolver::new(&ctx);

    // U1: contacted via web, then linked a Discord presence; never verified
    let u1 = resolver
        .resolve(
            &UserDescriptor::by_email("a@x.com"),
            ResolveOptions::create(),
        )
        .await
        .unwrap();
    repo.upsert_discord_member(u1.id, "D2", None).await.unwrap();

    // U2: verified under membership M200 in a different session
    let u2 = resolver
        .resolve(
            &UserDescriptor::by_discord("D9"),
            ResolveOptions::create(),
        )
        .await
        .unwrap();
    repo.attach_scout(u2.id, "M200").await;

    // The same person comes back as D2, now quoting their membership number
    let resolved = resolver
        .resolve(
            &UserDescriptor::by_discord("D2").with_membership_fallback("M200"),
            ResolveOptions::create_fresh(),
        )
        .await
        .unwrap();

    assert_eq!(resolved.id, u2.id, "the scout-identity side survives");
    assert_eq!(resolved.discord_id(), Some("D2"));
    assert_eq!(resolved.email.as_deref(), Some("a@x.com"));
    assert!(repo.find_by_id(u1.id).await.unwrap().is_none(), "duplicate is gone");
    assert_eq!(repo.list(1, 100).await.unwrap().len(), 1);
}

#[tokio::test]
async fn rules_acceptance_is_monotonic_across_operations() {
    let (ctx, repo) = verified_context("M300");
    let service = VerificationService::new(&ctx);
    let descriptor = UserDescriptor::by_discord("D5");

    let accepted = service.record_rule_acceptance(&descriptor).await.unwrap();
    assert!(accepted.agree_to_rules);

    let (after_verify, _) = service.verify(&credentials("M300"), &descriptor).await.unwrap();
    assert!(after_verify.agree_to_rules);

    let after_link = service
        .link_minecraft_username("Notch", &descriptor)
        .await
        .unwrap();
    assert!(after_link.agree_to_rules);

    let stored = repo.find_by_id(after_link.id).await.unwrap().unwrap();
    assert!(stored.agree_to_rules);
}

#[tokio::test]
async fn minecraft_linking_is_case_insensitive() {
    let (ctx, _repo) = verified_context("M400");
    let service = VerificationService::new(&ctx);
    let descriptor = UserDescriptor::by_discord("D7");

    service.link_minecraft_username("Notch", &descriptor).await.unwrap();
    let user = service.link_minecraft_username("NOTCH", &descriptor).await.unwrap();

    assert_eq!(user.minecraft_players.len(), 1);
    assert_eq!(user.minecraft_players[0].name, "NOTCH");
}

#[tokio::test]
async fn nickname_projection_composes_override_and_minecraft_names() {
    let (ctx, _repo) = verified_context("M500");
    let service = VerificationService::new(&ctx);
    let descriptor = UserDescriptor::by_discord("D8");

    service.verify(&credentials("M500"), &descriptor).await.unwrap();
    service.set_nickname("Benno", &descriptor).await.unwrap();
    service.link_minecraft_username("Notch", &descriptor).await.unwrap();
    service.link_minecraft_username("Jeb", &descriptor).await.unwrap();

    let projection = Projector::new(&ctx).project(&descriptor).await.unwrap();
    assert_eq!(projection.nickname.as_deref(), Some("Benno | Notch,Jeb"));
}

#[tokio::test]
async fn nickname_projection_falls_back_to_scout_firstname() {
    let (ctx, _repo) = verified_context("M501");
    let service = VerificationService::new(&ctx);
    let descriptor = UserDescriptor::by_discord("D9");

    service.verify(&credentials("M501"), &descriptor).await.unwrap();

    let projection = Projector::new(&ctx).project(&descriptor).await.unwrap();
    assert_eq!(projection.nickname.as_deref(), Some("Ben"));
}

#[tokio::test]
async fn nickname_projection_is_null_without_any_source() {
    let (ctx, _repo) = verified_context("M502");
    let resolver = IdentityResolver::new(&ctx);
    let descriptor = UserDescriptor::by_discord("D10");

    resolver.resolve(&descriptor, ResolveOptions::create()).await.unwrap();

    let projection = Projector::new(&ctx).project(&descriptor).await.unwrap();
    assert_eq!(projection.nickname, None);
}

#[tokio::test]
async fn stale_membership_payload_blocks_verified_role() {
    let (ctx, repo) = verified_context("M600");
    let service = VerificationService::new(&ctx);
    let descriptor = UserDescriptor::by_discord("D11");

    let (user, _) = service.verify(&credentials("M600"), &descriptor).await.unwrap();
    service.record_rule_acceptance(&descriptor).await.unwrap();

    // The retained payload goes stale: membership no longer current
    repo.upsert_scout_member(
        user.id,
        &ScoutVerification {
            membership_number: "M600".to_string(),
            firstname: "Ben".to_string(),
            lastname: "Jamin".to_string(),
            details: member_record("M600", "SCOUT", false).to_details(),
        },
    )
    .await
    .unwrap();

    let projection = Projector::new(&ctx).project(&descriptor).await.unwrap();
    assert!(!projection.roles.iter().any(|r| r == "Verified"));
    assert!(projection.roles.iter().any(|r| r == "Scout"));
}

#[tokio::test]
async fn unknown_classification_yields_unmatched_section_role() {
    let (ctx, _repo) = context_with_record(member_record("M700", "XYZ", true));
    let service = VerificationService::new(&ctx);
    let descriptor = UserDescriptor::by_discord("D12");

    service.verify(&credentials("M700"), &descriptor).await.unwrap();
    service.record_rule_acceptance(&descriptor).await.unwrap();

    let projection = Projector::new(&ctx).project(&descriptor).await.unwrap();
    assert!(projection.roles.iter().any(|r| r == "Unmatched section"));
    assert!(projection.roles.iter().any(|r| r == "Verified"));
}

#[tokio::test]
async fn act_as_override_redirects_and_reverts() {
    let (ctx, _repo) = verified_context("M800");
    let service = VerificationService::new(&ctx);
    let resolver = IdentityResolver::new(&ctx);

    let (target, _) = service
        .verify(&credentials("M800"), &UserDescriptor::by_discord("B"))
        .await
        .unwrap();

    ctx.run_as().set_override("A".to_string(), "B".to_string());
    let as_target = resolver
        .resolve(&UserDescriptor::by_discord("A"), ResolveOptions::lookup())
        .await
        .unwrap();
    assert_eq!(as_target.id, target.id);

    ctx.run_as().clear_override("A");
    let own = resolver
        .resolve(&UserDescriptor::by_discord("A"), ResolveOptions::lookup())
        .await;
    assert!(matches!(
        own,
        Err(ServiceError::Domain(DomainError::UserNotFound))
    ));
}

#[tokio::test]
async fn failed_registry_match_creates_no_user() {
    let (ctx, repo) = unverified_context();
    let service = VerificationService::new(&ctx);

    let result = service
        .verify(&credentials("M900"), &UserDescriptor::by_email("no@x.com"))
        .await;

    assert!(matches!(
        result,
        Err(ServiceError::Domain(DomainError::ExtranetMemberNotVerified))
    ));
    assert!(repo.list(1, 100).await.unwrap().is_empty());
}
