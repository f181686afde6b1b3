//! Bot error type
//!
//! Wraps service and Discord API failures. Unexpected errors are shown to
//! the user only as an opaque reference token; the full error is logged.

use base64::Engine as _;
use scoutlink_service::ServiceError;
use thiserror::Error;

/// Errors surfacing from command handling
#[derive(Debug, Error)]
pub enum BotError {
    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("Discord API error: {0}")]
    Discord(#[from] serenity::Error),

    #[error("Missing required option: {0}")]
    MissingOption(&'static str),
}

impl BotError {
    /// Error code matching the service taxonomy
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Service(e) => e.error_code(),
            Self::Discord(_) => "DISCORD_API_ERROR",
            Self::MissingOption(_) => "MISSING_OPTION",
        }
    }

    /// Opaque reference token for user-facing failure messages
    ///
    /// An operator can base64-decode it to recover the code and message.
    #[must_use]
    pub fn reference(&self) -> String {
        let payload = format!("{}|{}", self.code(), self);
        base64::engine::general_purpose::STANDARD.encode(payload)
    }

    /// Message shown to the user when a command fails unexpectedly
    #[must_use]
    pub fn user_message(&self) -> String {
        format!(
            "Something went wrong. Give this to an admin: `{}`",
            self.reference()
        )
    }
}

/// Type alias for bot results
pub type BotResult<T> = Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_decodes_to_code_and_message() {
        let err = BotError::MissingOption("rego");
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(err.reference())
            .unwrap();
        let decoded = String::from_utf8(decoded).unwrap();
        assert!(decoded.starts_with("MISSING_OPTION|"));
        assert!(decoded.contains("rego"));
    }
}
