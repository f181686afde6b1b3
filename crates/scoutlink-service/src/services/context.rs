//! Service context - dependency container for services
//!
//! Holds the repository, the membership verifier, the snowflake generator,
//! and the two pieces of process-wide state (act-as overrides, resolution
//! cache) that services share.

use std::sync::Arc;

use scoutlink_core::traits::{MembershipVerifier, UserRepository};
use scoutlink_core::SnowflakeGenerator;

use super::cache::ResolutionCache;
use super::run_as::RunAsRegistry;

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
#[derive(Clone)]
pub struct ServiceContext {
    user_repo: Arc<dyn UserRepository>,
    verifier: Arc<dyn MembershipVerifier>,
    snowflake_generator: Arc<SnowflakeGenerator>,
    run_as: Arc<RunAsRegistry>,
    resolution_cache: Arc<ResolutionCache>,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        verifier: Arc<dyn MembershipVerifier>,
        snowflake_generator: Arc<SnowflakeGenerator>,
        run_as: Arc<RunAsRegistry>,
    ) -> Self {
        Self {
            user_repo,
            verifier,
            snowflake_generator,
            run_as,
            resolution_cache: Arc::new(ResolutionCache::default()),
        }
    }

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the membership verifier
    pub fn verifier(&self) -> &dyn MembershipVerifier {
        self.verifier.as_ref()
    }

    /// Get the act-as override registry
    pub fn run_as(&self) -> &RunAsRegistry {
        self.run_as.as_ref()
    }

    /// Get the resolution cache
    pub fn resolution_cache(&self) -> &ResolutionCache {
        self.resolution_cache.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> scoutlink_core::Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("user_repo", &"dyn UserRepository")
            .field("verifier", &"dyn MembershipVerifier")
            .finish()
    }
}

/// Builder for creating ServiceContext
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    verifier: Option<Arc<dyn MembershipVerifier>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    run_as: Option<Arc<RunAsRegistry>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            user_repo: None,
            verifier: None,
            snowflake_generator: None,
            run_as: None,
        }
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn verifier(mut self, verifier: Arc<dyn MembershipVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn run_as(mut self, registry: Arc<RunAsRegistry>) -> Self {
        self.run_as = Some(registry);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> super::error::ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.user_repo
                .ok_or_else(|| super::error::ServiceError::validation("user_repo is required"))?,
            self.verifier
                .ok_or_else(|| super::error::ServiceError::validation("verifier is required"))?,
            self.snowflake_generator.ok_or_else(|| {
                super::error::ServiceError::validation("snowflake_generator is required")
            })?,
            self.run_as.unwrap_or_default(),
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
