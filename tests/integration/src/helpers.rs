//! Test helpers
//!
//! Assembles service contexts over the in-memory repository and the static
//! membership verifier.

use std::sync::Arc;

use scoutlink_core::entities::MemberRecord;
use scoutlink_core::SnowflakeGenerator;
use scoutlink_service::testing::{MemoryUserRepository, StaticVerifier};
use scoutlink_service::{ServiceContext, ServiceContextBuilder};

/// Context whose verifier accepts the given identity as a current member
pub fn verified_context(
    membership_number: &str,
) -> (ServiceContext, Arc<MemoryUserRepository>) {
    context_with(StaticVerifier::current_member(
        membership_number,
        "Ben",
        "Jamin",
    ))
}

/// Context whose verifier always answers with the given payload
pub fn context_with_record(record: MemberRecord) -> (ServiceContext, Arc<MemoryUserRepository>) {
    context_with(StaticVerifier::with_record(record))
}

/// Context whose verifier rejects everyone
pub fn unverified_context() -> (ServiceContext, Arc<MemoryUserRepository>) {
    context_with(StaticVerifier::not_verified())
}

/// Build a full service context around the given verifier
pub fn context_with(verifier: StaticVerifier) -> (ServiceContext, Arc<MemoryUserRepository>) {
    let repo = Arc::new(MemoryUserRepository::new());
    let ctx = context_sharing_repo(repo.clone(), verifier);
    (ctx, repo)
}

/// Build another context over an existing store, e.g. to simulate the
/// registry answering differently on a later verification
pub fn context_sharing_repo(
    repo: Arc<MemoryUserRepository>,
    verifier: StaticVerifier,
) -> ServiceContext {
    ServiceContextBuilder::new()
        .user_repo(repo)
        .verifier(Arc::new(verifier))
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(0)))
        .build()
        .expect("context builds")
}
