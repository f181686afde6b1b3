//! Domain errors - the identity core's error taxonomy

use thiserror::Error;

/// Domain layer errors
///
/// `ExtranetMemberNotVerified` is a valid negative result, not a fault:
/// adapters present it as "no match" and it is never logged as an error.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("No user matched the supplied identifiers")]
    UserNotFound,

    #[error("Unable to create user: {0}")]
    UserCreationFailed(String),

    #[error("Failed to query the membership portal: {0}")]
    ExtranetQueryFailed(String),

    #[error("Member not verified as a current scouting member")]
    ExtranetMemberNotVerified,

    #[error("User has not accepted the community rules")]
    UserDisagreesWithRules,

    #[error("Action unsupported for the supplied identifiers: {0}")]
    ActionUnsupported(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl DomainError {
    /// Get an error code string for API responses and reference codes
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::UserCreationFailed(_) => "USER_CREATION_FAILED",
            Self::ExtranetQueryFailed(_) => "EXTRANET_QUERY_FAILED",
            Self::ExtranetMemberNotVerified => "EXTRANET_MEMBER_NOT_VERIFIED",
            Self::UserDisagreesWithRules => "USER_DISAGREES_WITH_RULES",
            Self::ActionUnsupported(_) => "ACTION_UNSUPPORTED",
            Self::DatabaseError(_) => "DATABASE_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound)
    }

    /// Check if this is an expected negative outcome rather than a fault
    pub fn is_expected_negative(&self) -> bool {
        matches!(self, Self::ExtranetMemberNotVerified | Self::UserNotFound)
    }

    /// Check if this is a uniqueness conflict (e.g. a racing creation)
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::UserCreationFailed(_))
    }

    /// Check if the operation may succeed if simply retried by the caller
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ExtranetQueryFailed(_) | Self::UserCreationFailed(_))
    }
}
