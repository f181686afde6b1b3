//! Membership verifier trait (port) - the external registrar boundary

use async_trait::async_trait;

use crate::entities::MemberRecord;
use crate::error::DomainError;

/// Credentials a member supplies to prove their registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoutCredentials {
    pub membership_number: String,
    pub firstname: String,
    pub lastname: String,
}

/// External membership registrar, treated as untrusted and possibly slow
///
/// Errors are already mapped into the domain taxonomy: transport or protocol
/// faults become `ExtranetQueryFailed`, a well-formed "no such member"
/// response becomes `ExtranetMemberNotVerified`.
#[async_trait]
pub trait MembershipVerifier: Send + Sync {
    async fn verify_member(
        &self,
        credentials: &ScoutCredentials,
    ) -> Result<MemberRecord, DomainError>;
}
