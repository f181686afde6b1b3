//! Membership portal client
//!
//! The portal is a PHP application: a lookup only works once a session cookie
//! exists, so each verification first hits the status-check page to prime the
//! session, then queries the member-detail endpoint. Rate-limit responses
//! (HTTP 429) are retried with bounded exponential backoff.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, instrument, warn};

use scoutlink_common::{retry_with_backoff, BackoffPolicy, ExtranetConfig};
use scoutlink_core::entities::MemberRecord;
use scoutlink_core::error::DomainError;
use scoutlink_core::traits::{MembershipVerifier, ScoutCredentials};

const SESSION_PATH: &str = "/member-status-check/vic";
const DETAIL_PATH: &str = "/scoutmemberdetail/scout-member-detail/get-scout-member-detail";

/// Errors internal to one lookup attempt; only rate limits are retried
enum FetchError {
    RateLimited,
    Other(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.status() == Some(StatusCode::TOO_MANY_REQUESTS) {
            Self::RateLimited
        } else {
            Self::Other(e.to_string())
        }
    }
}

/// Membership portal client
///
/// Holds a cookie store so the primed session carries over to the detail
/// request.
pub struct ExtranetClient {
    http: reqwest::Client,
    base_url: String,
    backoff: BackoffPolicy,
}

impl ExtranetClient {
    /// Build a client from portal configuration
    pub fn new(config: &ExtranetConfig) -> Result<Self, DomainError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::ExtranetQueryFailed(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            backoff: BackoffPolicy::default(),
        })
    }

    /// Escape a name the way the portal's own form does
    fn escape_name(name: &str) -> String {
        name.replace(' ', "+").replace('\'', "_")
    }

    async fn fetch_member_detail(
        &self,
        credentials: &ScoutCredentials,
    ) -> Result<MemberRecord, FetchError> {
        // Set the lookup state in the portal's PHP session
        self.http
            .get(format!("{}{SESSION_PATH}", self.base_url))
            .send()
            .await?
            .error_for_status()?;

        let response = self
            .http
            .get(format!("{}{DETAIL_PATH}", self.base_url))
            .query(&[
                ("memberRegid", credentials.membership_number.as_str()),
                (
                    "memberFirstname",
                    &Self::escape_name(&credentials.firstname),
                ),
                ("memberSurname", &Self::escape_name(&credentials.lastname)),
            ])
            .send()
            .await?
            .error_for_status()?;

        let record = response.json::<MemberRecord>().await?;
        Ok(record)
    }
}

#[async_trait]
impl MembershipVerifier for ExtranetClient {
    #[instrument(skip(self, credentials), fields(membership_number = %credentials.membership_number))]
    async fn verify_member(
        &self,
        credentials: &ScoutCredentials,
    ) -> Result<MemberRecord, DomainError> {
        let record = retry_with_backoff(
            self.backoff,
            |e| matches!(e, FetchError::RateLimited),
            || self.fetch_member_detail(credentials),
        )
        .await
        .map_err(|e| match e {
            FetchError::RateLimited => {
                warn!("portal rate limit persisted past retry cap");
                DomainError::ExtranetQueryFailed("rate limited by the portal".to_string())
            }
            FetchError::Other(msg) => DomainError::ExtranetQueryFailed(msg),
        })?;

        if !record.is_current_member() {
            debug!("portal returned a negative membership result");
            return Err(DomainError::ExtranetMemberNotVerified);
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_name_spaces_and_apostrophes() {
        assert_eq!(ExtranetClient::escape_name("Mary Jane"), "Mary+Jane");
        assert_eq!(ExtranetClient::escape_name("O'Brien"), "O_Brien");
        assert_eq!(
            ExtranetClient::escape_name("Anne Marie O'Neil"),
            "Anne+Marie+O_Neil"
        );
        assert_eq!(ExtranetClient::escape_name("Plain"), "Plain");
    }

    #[test]
    fn test_client_builds_with_trailing_slash_base() {
        let config = ExtranetConfig {
            base_url: "https://portal.example.org/memberportal/".to_string(),
            timeout_secs: 5,
        };
        let client = ExtranetClient::new(&config).unwrap();
        assert_eq!(client.base_url, "https://portal.example.org/memberportal");
    }
}
