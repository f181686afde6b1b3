//! # scoutlink-service
//!
//! Application layer containing the identity resolution core, verification
//! workflow, role/nickname projection, and DTOs.

pub mod dto;
pub mod services;
pub mod testing;

pub use services::{
    IdentityResolver, Projection, Projector, ResolutionCache, ResolveOptions, RunAsRegistry,
    ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult, VerificationService,
    MANAGED_ROLES,
};
