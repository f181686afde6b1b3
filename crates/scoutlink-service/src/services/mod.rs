//! Application services

mod cache;
mod context;
mod error;
mod projector;
mod resolver;
mod run_as;
mod verification;

pub use cache::ResolutionCache;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use projector::{Projection, Projector, MANAGED_ROLES};
pub use resolver::{IdentityResolver, ResolveOptions};
pub use run_as::RunAsRegistry;
pub use verification::VerificationService;
